//! Unicode character classification shared by the scanner, block-scalar
//! reader, and writer. Ported from the teacher's `macros.rs` macro family
//! (`IS_SPACE`, `IS_BREAK`, `IS_BLANKZ`, `is_printable`, ...) into plain
//! functions over `char` rather than macros over a byte/char buffer.

/// True for the YAML "indicator" characters that may start a plain scalar
/// only in restricted positions (see spec §4.10 scalar styling).
pub(crate) const BLOCK_INDICATORS: &[char] = &[
    '-', '?', ':', ',', '[', ']', '{', '}', '#', '&', '*', '!', '|', '>', '\'', '"', '%', '@', '`',
];

pub(crate) fn is_space(ch: char) -> bool {
    ch == ' '
}

pub(crate) fn is_tab(ch: char) -> bool {
    ch == '\t'
}

pub(crate) fn is_blank(ch: char) -> bool {
    is_space(ch) || is_tab(ch)
}

/// Line break per YAML 1.2 (includes the Unicode NEL/LS/PS breaks in
/// addition to CR/LF, matching the teacher's `is_break`).
pub(crate) fn is_break(ch: char) -> bool {
    matches!(ch, '\r' | '\n' | '\u{0085}' | '\u{2028}' | '\u{2029}')
}

pub(crate) fn is_blankz(ch: Option<char>) -> bool {
    match ch {
        None => true,
        Some(ch) => is_blank(ch) || is_break(ch),
    }
}

pub(crate) fn is_digit(ch: char) -> bool {
    ch.is_ascii_digit()
}

pub(crate) fn is_alpha(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_' || ch == '-'
}

pub(crate) fn hex_digit_value(ch: char) -> Option<u32> {
    ch.to_digit(16)
}

/// Printable per YAML 1.2 §5.1, ported from the teacher's `is_printable`.
pub(crate) fn is_printable(ch: char) -> bool {
    match ch {
        '\u{feff}' | '\u{fffe}' | '\u{ffff}' => false,
        '\x09' | '\x0a' | '\x0d' | '\x20'..='\x7e' => true,
        '\u{00a0}'..='\u{d7ff}' => true,
        '\u{e000}'..='\u{fffd}' => true,
        '\u{10000}'..='\u{10ffff}' => true,
        _ => false,
    }
}

pub(crate) fn is_flow_terminator(ch: char) -> bool {
    matches!(ch, ',' | '[' | ']' | '{' | '}')
}
