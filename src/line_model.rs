//! C1 LineModel (spec §4.1): splits input into annotated physical lines.
//!
//! The teacher's scanner works directly off a rolling `VecDeque<char>` fed
//! by a byte reader (`scanner.rs`/`reader.rs`); this crate instead commits
//! the whole (already-decoded) input to lines up front, which is what lets
//! `InlineScanner` (C3) address "the next line" randomly rather than only
//! ever looking one character ahead. Per-line `Vec<char>` storage mirrors
//! the teacher's choice of a `char` buffer over raw bytes, so indexing by
//! column never splits a UTF-8 sequence.

/// One physical line of input (spec §3.1).
#[derive(Debug, Clone)]
pub struct Line {
    /// 1-based physical line number.
    pub number: u32,
    /// Count of leading spaces and tabs, each counted as one column.
    pub indent: u32,
    /// The raw line text, including trailing whitespace.
    pub raw: String,
    /// True iff a tab appears anywhere in the leading indent run.
    pub has_tab_indent: bool,
    /// `raw` decoded to chars, for O(1) column-indexed access.
    pub(crate) chars: Vec<char>,
}

impl Line {
    fn new(number: u32, raw: &str) -> Self {
        let chars: Vec<char> = raw.chars().collect();
        let mut indent = 0u32;
        let mut has_tab_indent = false;
        for &ch in &chars {
            if ch == ' ' {
                indent += 1;
            } else if ch == '\t' {
                indent += 1;
                has_tab_indent = true;
            } else {
                break;
            }
        }
        Line {
            number,
            indent,
            raw: raw.to_string(),
            has_tab_indent,
            chars,
        }
    }

    /// Line content with the leading indent run removed.
    pub fn content(&self) -> String {
        self.chars[self.indent as usize..].iter().collect()
    }

    pub fn is_blank(&self) -> bool {
        self.chars[self.indent as usize..]
            .iter()
            .all(|c| *c == ' ' || *c == '\t')
    }
}

/// Splits normalized input into a vector of [`Line`]s (spec §4.1).
///
/// Never fails: any input, including the empty string, produces a line
/// vector (possibly a single empty line). A trailing `'\n'` ends the
/// preceding line rather than introducing an extra empty one, so `"a\nb\n"`
/// yields two lines, not three — matching ordinary text-file line counting
/// and keeping block-scalar trailing-break counting exact.
pub fn split_lines(input: &str) -> Vec<Line> {
    let mut normalized = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                normalized.push('\n');
            }
            other => normalized.push(other),
        }
    }

    if !normalized.is_empty() && normalized.ends_with('\n') {
        normalized.pop();
    }

    normalized
        .split('\n')
        .enumerate()
        .map(|(i, raw)| Line::new(i as u32 + 1, raw))
        .collect()
}
