//! C7 PlainScalarFolder (spec §4.7): joins the per-line fragments
//! [`crate::scanner::InlineScanner::parse_plain_scalar`] produces into the
//! full text of a plain scalar that spans more than one physical line.
//!
//! The scanner only ever looks at one physical line (see its doc comment);
//! deciding whether the *next* line still belongs to the same scalar
//! requires knowing the enclosing node's indentation, which only the block
//! parser tracks. Grounded in the teacher's `yaml_parser_scan_plain_scalar`
//! (`scanner.rs`), which interleaves exactly this "scan a run, then peek at
//! the next line's indentation" loop inline; here it is pulled out into its
//! own function so [`crate::block_parser`] can drive it without owning the
//! folding rules itself.

use crate::error::Result;
use crate::line_model::Line;
use crate::scanner::InlineScanner;

/// Continues folding a plain scalar starting from the position right after
/// an initial [`InlineScanner::parse_plain_scalar`] call returned
/// `first_fragment`. `min_indent` is the least indentation a continuation
/// line must have to still belong to the scalar; less-indented lines, and
/// any line beginning with a document marker, end it. Returns the folded
/// text and the position of the first line not consumed.
pub fn fold_plain_scalar(
    lines: &[Line],
    mut line_idx: usize,
    mut col: usize,
    first_fragment: String,
    min_indent: u32,
    flow_context: bool,
    stop_at_colon: bool,
) -> Result<(String, usize, usize)> {
    let mut out = first_fragment;
    let mut pending_blanks = 0u32;

    loop {
        if line_idx >= lines.len() {
            break;
        }

        let at_line_end = col >= lines[line_idx].chars.len();
        if !at_line_end {
            // The last scan stopped mid-line (comment, colon, flow
            // terminator) rather than running off the end of the line —
            // that always ends the scalar.
            break;
        }

        let mut probe = line_idx + 1;
        while probe < lines.len() && lines[probe].is_blank() {
            pending_blanks += 1;
            probe += 1;
        }
        if probe >= lines.len() {
            line_idx = probe;
            break;
        }
        let next = &lines[probe];
        if next.indent < min_indent {
            line_idx = probe;
            col = 0;
            break;
        }
        if is_document_marker(next) {
            line_idx = probe;
            col = 0;
            break;
        }

        let mut scanner = InlineScanner::at(lines, probe, next.indent as usize);
        let frag = scanner.parse_plain_scalar(stop_at_colon, flow_context)?;
        if frag.is_empty() {
            line_idx = probe;
            col = next.indent as usize;
            break;
        }

        if pending_blanks == 0 {
            out.push(' ');
        } else {
            for _ in 0..pending_blanks {
                out.push('\n');
            }
        }
        out.push_str(&frag);
        pending_blanks = 0;

        let (new_line_idx, new_col) = scanner.position();
        line_idx = new_line_idx;
        col = new_col;
    }

    Ok((out, line_idx, col))
}

pub(crate) fn is_document_marker(line: &Line) -> bool {
    let content = line.content();
    content == "---"
        || content.starts_with("--- ")
        || content == "..."
        || content.starts_with("... ")
}
