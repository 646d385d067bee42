//! C6 BlockScalarReader (spec §4.6): literal (`|`) and folded (`>`) block
//! scalars.
//!
//! Grounded in the teacher's `yaml_parser_scan_block_scalar` family
//! (`scanner.rs`): header parsing (indicator + optional indent digit +
//! optional chomp, in either order), auto-detection of the required indent
//! from the first non-empty body line, and chomping of the trailing break
//! run. Operates directly on `&[Line]` (see [`crate::line_model`]) rather
//! than the teacher's character buffer, since the body is always
//! line-oriented.

use crate::document::{Chomp, ScalarStyle};
use crate::error::{Error, Location, Result};
use crate::line_model::Line;
use crate::plain_folder::is_document_marker;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockScalarKind {
    Literal,
    Folded,
}

/// Parses the scalar header on the line containing `|`/`>` (spec §4.6.1).
/// `header` is the text starting at the indicator, e.g. `"|2-"` or `">+"`.
fn parse_header(header: &str, location: Location) -> Result<(BlockScalarKind, Option<u8>, Chomp)> {
    let mut chars = header.chars();
    let kind = match chars.next() {
        Some('|') => BlockScalarKind::Literal,
        Some('>') => BlockScalarKind::Folded,
        _ => return Err(Error::syntax("Invalid block scalar header", location)),
    };

    let mut indent = None;
    let mut chomp = Chomp::Clip;
    let mut seen_indent = false;
    let mut seen_chomp = false;

    for ch in chars {
        match ch {
            '-' if !seen_chomp => {
                chomp = Chomp::Strip;
                seen_chomp = true;
            }
            '+' if !seen_chomp => {
                chomp = Chomp::Keep;
                seen_chomp = true;
            }
            '1'..='9' if !seen_indent => {
                indent = Some(ch.to_digit(10).unwrap() as u8);
                seen_indent = true;
            }
            ' ' | '\t' => break,
            _ => return Err(Error::syntax("Invalid block scalar header", location)),
        }
    }

    Ok((kind, indent, chomp))
}

/// Reads a block scalar body starting on the line after the header.
///
/// `header_line_indent` is the indentation of the line carrying `|`/`>`
/// itself; the body's required indent (when not given explicitly) is
/// detected from the first non-empty line and must exceed it (spec
/// §4.6.2). `body_start` is the index into `lines` of the first line after
/// the header. Returns the resulting scalar plus the index of the first
/// line not consumed.
pub fn read_block_scalar(
    lines: &[Line],
    body_start: usize,
    header: &str,
    header_line_indent: u32,
    header_location: Location,
) -> Result<(ScalarStyle, String, usize)> {
    let (kind, explicit_indent, chomp) = parse_header(header, header_location)?;

    let mut idx = body_start;
    let required_indent = if let Some(n) = explicit_indent {
        header_line_indent + n as u32
    } else {
        let mut detected = None;
        let mut probe = body_start;
        // A leading blank line more indented than the first content line is
        // invalid (spec §4.6.2) — track the most-indented one seen so far
        // and check it once the content line (if any) is found.
        let mut widest_blank: Option<(u32, Location)> = None;
        while probe < lines.len() {
            let line = &lines[probe];
            if line.is_blank() {
                let loc = Location::new(line.number, 1);
                let wider = match widest_blank {
                    Some((mi, _)) => line.indent > mi,
                    None => true,
                };
                if wider {
                    widest_blank = Some((line.indent, loc));
                }
                probe += 1;
                continue;
            }
            if line.indent <= header_line_indent {
                break;
            }
            detected = Some(line.indent);
            break;
        }
        let n = match detected {
            Some(n) => n,
            // No content line was found to detect an indent from. At the
            // document root (`header_line_indent == 0`) this leaves the
            // required indent at 0 — body lines may sit at column 0 too,
            // with only a document marker or end of input able to close the
            // scalar (spec §4.6.3). Nested under a nonzero header, fall back
            // to one past the header so the scalar still ends where its
            // enclosing block's next sibling begins.
            None if header_line_indent == 0 => 0,
            None => header_line_indent + 1,
        };
        if let Some((mi, loc)) = widest_blank {
            if detected.is_some() && mi > n {
                return Err(Error::indentation(loc));
            }
        }
        n
    };

    let mut body_lines: Vec<String> = Vec::new();
    let mut trailing_blanks = 0u32;
    loop {
        if idx >= lines.len() {
            break;
        }
        let line = &lines[idx];
        if required_indent == 0 && is_document_marker(line) {
            for _ in 0..trailing_blanks {
                body_lines.pop();
            }
            break;
        }
        // A tab among the columns the required indent claims is always
        // invalid (spec §4.6.3): tab width is ambiguous, so it can't be
        // trusted to decide whether this line is inside or outside the
        // body. Checked ahead of the blank/under-indent tests below, since
        // those would otherwise just read it as an ordinary short line.
        let indent_prefix_len = (required_indent as usize).min(line.chars.len());
        if line.chars[..indent_prefix_len].contains(&'\t') {
            return Err(Error::indentation(Location::new(line.number, 1)));
        }
        if line.is_blank() {
            body_lines.push(String::new());
            trailing_blanks += 1;
            idx += 1;
            continue;
        }
        if line.indent < required_indent {
            for _ in 0..trailing_blanks {
                body_lines.pop();
            }
            break;
        }
        let content: String = line.chars[required_indent as usize..].iter().collect();
        body_lines.push(content);
        trailing_blanks = 0;
        idx += 1;
    }

    let joined = match kind {
        BlockScalarKind::Literal => join_literal(&body_lines),
        BlockScalarKind::Folded => join_folded(&body_lines),
    };

    let text = apply_chomp(&joined, chomp);

    let style = match kind {
        BlockScalarKind::Literal => ScalarStyle::Literal {
            chomp,
            indent: explicit_indent,
        },
        BlockScalarKind::Folded => ScalarStyle::Folded {
            chomp,
            indent: explicit_indent,
        },
    };

    Ok((style, text, idx))
}

fn join_literal(lines: &[String]) -> String {
    let mut out = String::new();
    for line in lines {
        out.push_str(line);
        out.push('\n');
    }
    out
}

/// Folds a literal-scalar body per §4.6.4: a line break between two
/// more-indented ("more indented than the body") lines is kept literally;
/// otherwise a single break folds to a space, and runs of blank lines fold
/// to one break per blank line.
fn join_folded(lines: &[String]) -> String {
    let mut out = String::new();
    let mut prev_was_more_indented = false;
    let mut pending_breaks = 0u32;

    for (i, line) in lines.iter().enumerate() {
        let more_indented = line.starts_with(' ') || line.starts_with('\t');
        let is_blank = line.is_empty();

        if i == 0 {
            out.push_str(line);
        } else if is_blank {
            pending_breaks += 1;
        } else if prev_was_more_indented || more_indented {
            out.push('\n');
            for _ in 0..pending_breaks {
                out.push('\n');
            }
            pending_breaks = 0;
            out.push_str(line);
        } else if pending_breaks > 0 {
            for _ in 0..pending_breaks {
                out.push('\n');
            }
            pending_breaks = 0;
            out.push_str(line);
        } else {
            out.push(' ');
            out.push_str(line);
        }
        prev_was_more_indented = more_indented;
    }
    for _ in 0..pending_breaks {
        out.push('\n');
    }
    out.push('\n');
    out
}

fn apply_chomp(joined: &str, chomp: Chomp) -> String {
    match chomp {
        Chomp::Strip => joined.trim_end_matches('\n').to_string(),
        Chomp::Keep => joined.to_string(),
        Chomp::Clip => {
            if joined.is_empty() {
                joined.to_string()
            } else {
                let trimmed = joined.trim_end_matches('\n');
                format!("{trimmed}\n")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::line_model::split_lines;
    use pretty_assertions::assert_eq;

    #[test]
    fn literal_clip_keeps_single_trailing_break() {
        let input = "key: |\n  line one\n  line two\n";
        let lines = split_lines(input);
        let (style, text, next) =
            read_block_scalar(&lines, 1, "|", 0, Location::new(1, 6)).unwrap();
        assert_eq!(text, "line one\nline two\n");
        assert_eq!(style, ScalarStyle::Literal { chomp: Chomp::Clip, indent: None });
        assert_eq!(next, 3);
    }

    #[test]
    fn literal_strip_removes_trailing_breaks() {
        let input = "key: |-\n  a\n  b\n\n\n";
        let lines = split_lines(input);
        let (_, text, _) = read_block_scalar(&lines, 1, "|-", 0, Location::new(1, 6)).unwrap();
        assert_eq!(text, "a\nb");
    }

    #[test]
    fn literal_keep_preserves_trailing_blank_lines() {
        let input = "key: |+\n  a\n\n\n";
        let lines = split_lines(input);
        let (_, text, _) = read_block_scalar(&lines, 1, "|+", 0, Location::new(1, 6)).unwrap();
        assert_eq!(text, "a\n\n\n");
    }

    #[test]
    fn folded_joins_plain_lines_with_space() {
        let input = "key: >\n  a\n  b\n  c\n";
        let lines = split_lines(input);
        let (_, text, _) = read_block_scalar(&lines, 1, ">", 0, Location::new(1, 6)).unwrap();
        assert_eq!(text, "a b c\n");
    }

    #[test]
    fn folded_blank_line_becomes_break() {
        let input = "key: >\n  a\n\n  b\n";
        let lines = split_lines(input);
        let (_, text, _) = read_block_scalar(&lines, 1, ">", 0, Location::new(1, 6)).unwrap();
        assert_eq!(text, "a\nb\n");
    }

    #[test]
    fn folded_more_indented_line_kept_literal() {
        let input = "key: >\n  a\n   more\n  b\n";
        let lines = split_lines(input);
        let (_, text, _) = read_block_scalar(&lines, 1, ">", 0, Location::new(1, 6)).unwrap();
        assert_eq!(text, "a\n more\nb\n");
    }

    #[test]
    fn explicit_indent_indicator_is_honored() {
        let input = "key: |2\n    a\nstray\n";
        let lines = split_lines(input);
        let (_, text, next) =
            read_block_scalar(&lines, 1, "|2", 0, Location::new(1, 6)).unwrap();
        assert_eq!(text, "  a\n");
        assert_eq!(next, 2);
    }

    #[test]
    fn tab_within_required_indent_errors() {
        let input = "key: |\n  a\n\tb\n";
        let lines = split_lines(input);
        let err = read_block_scalar(&lines, 1, "|", 0, Location::new(1, 6)).unwrap_err();
        assert!(matches!(err, Error::InvalidIndentation { .. }));
    }

    #[test]
    fn greater_indented_leading_blank_errors() {
        let input = "key: |\n    \n  a\n";
        let lines = split_lines(input);
        let err = read_block_scalar(&lines, 1, "|", 0, Location::new(1, 6)).unwrap_err();
        assert!(matches!(err, Error::InvalidIndentation { .. }));
    }

    #[test]
    fn document_marker_terminates_zero_indent_block_scalar() {
        let input = "|\na\n...\nb\n";
        let lines = split_lines(input);
        let (_, text, next) = read_block_scalar(&lines, 1, "|", 0, Location::new(1, 1)).unwrap();
        assert_eq!(text, "a\n");
        assert_eq!(next, 2);
    }
}
