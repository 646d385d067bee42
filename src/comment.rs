//! C2 CommentStripper (spec §4.2): pure function stripping a trailing
//! unquoted `#` comment from a single line's content.

/// Returns the prefix of `content` up to (not including) the first unquoted
/// `#` that starts a comment. Returns `content` unmodified if there is no
/// comment.
///
/// A `#` starts a comment only when outside single/double quotes and either
/// at column 0 or immediately preceded by whitespace. Escapes inside double
/// quotes are not interpreted here — a bare `"` always toggles quote state,
/// matching the spec's note that the stripper only tracks delimiters.
pub fn strip_comment(content: &str) -> &str {
    let mut in_single = false;
    let mut in_double = false;
    let mut preceded_by_whitespace = true;

    for (idx, ch) in content.char_indices() {
        match ch {
            '\'' if !in_double => in_single = !in_single,
            '"' if !in_single => in_double = !in_double,
            '#' if !in_single && !in_double && preceded_by_whitespace => {
                return &content[..idx];
            }
            _ => {}
        }
        preceded_by_whitespace = ch == ' ' || ch == '\t';
    }

    content
}
