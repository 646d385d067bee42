//! C3 InlineScanner (spec §4.3): character-level scanner over inline YAML
//! content (tags, anchors, aliases, quoted and plain scalars).
//!
//! Grounded in the teacher's scalar/tag/anchor scanning routines
//! (`yaml_parser_scan_tag`, `scan_anchor`, `scan_flow_scalar`,
//! `scan_plain_scalar` in `scanner.rs`), adapted from the teacher's rolling
//! `VecDeque<char>` + byte-reader design to a scanner addressing a
//! pre-split `&[Line]` directly: crossing a physical line boundary while
//! inside a quoted scalar or flow collection is exposed to callers as a
//! virtual `'\n'` character, which is what lets `parse_double_quoted` and
//! `parse_single_quoted` implement YAML line folding as an ordinary local
//! loop instead of needing the caller to pre-join lines into one buffer.
//! `parse_plain_scalar` stays single-line on purpose — see its doc comment.

use crate::chars;
use crate::error::{Error, Location, Result};
use crate::line_model::Line;
use crate::plain_folder::is_document_marker;
use crate::tag_resolver::RawTag;

pub struct InlineScanner<'a> {
    lines: &'a [Line],
    line_idx: usize,
    col: usize,
}

impl<'a> InlineScanner<'a> {
    pub fn at(lines: &'a [Line], line_idx: usize, col: usize) -> Self {
        InlineScanner { lines, line_idx, col }
    }

    pub fn position(&self) -> (usize, usize) {
        (self.line_idx, self.col)
    }

    pub fn location(&self) -> Location {
        if self.line_idx < self.lines.len() {
            Location::new(self.lines[self.line_idx].number, self.col as u32 + 1)
        } else if let Some(last) = self.lines.last() {
            Location::new(last.number, last.chars.len() as u32 + 1)
        } else {
            Location::new(1, 1)
        }
    }

    pub fn at_eof(&self) -> bool {
        self.current_char().is_none()
    }

    /// Public peek, for callers (the block parser's flow-collection
    /// recursion) that need to branch on the next character themselves
    /// rather than through one of the `parse_*` routines.
    pub fn peek_char(&self) -> Option<char> {
        self.current_char()
    }

    /// Public single-step advance, paired with [`Self::peek_char`].
    pub fn advance_one(&mut self) {
        self.advance();
    }

    /// Skips whitespace, comments, and (unlike
    /// [`Self::skip_whitespace_and_comments`]) line breaks — flow context
    /// (spec §4.5.5) allows a value to continue on a following line with no
    /// folding significance, so a flow-collection walk needs a separator
    /// skip that crosses lines. `min_indent` is the enclosing flow
    /// collection's opener column: every non-blank line crossed must be
    /// indented at or past it, and none may be a `---`/`...` document
    /// marker (spec §4.5.5).
    pub fn skip_flow_separators(&mut self, min_indent: u32) -> Result<()> {
        loop {
            self.skip_whitespace_and_comments();
            if self.current_char() == Some('\n') {
                self.advance();
                self.check_line_crossing(min_indent)?;
            } else {
                break;
            }
        }
        Ok(())
    }

    /// Validates the line just entered by crossing a virtual `'\n'` inside a
    /// multi-line quoted scalar (spec §4.5.4) or flow collection (spec
    /// §4.5.5): a document marker always fails, and a non-blank line must be
    /// indented at or past `min_indent` (blank lines are exempt from the
    /// indent check in both specs).
    fn check_line_crossing(&self, min_indent: u32) -> Result<()> {
        if self.line_idx >= self.lines.len() {
            return Ok(());
        }
        let line = &self.lines[self.line_idx];
        if line.is_blank() {
            return Ok(());
        }
        let loc = Location::new(line.number, 1);
        if is_document_marker(line) {
            return Err(Error::syntax(
                "Document marker inside multi-line scalar or flow collection",
                loc,
            ));
        }
        if line.indent < min_indent {
            return Err(Error::indentation(loc));
        }
        Ok(())
    }

    fn current_char(&self) -> Option<char> {
        if self.line_idx >= self.lines.len() {
            return None;
        }
        let line = &self.lines[self.line_idx];
        if self.col < line.chars.len() {
            Some(line.chars[self.col])
        } else if self.line_idx + 1 < self.lines.len() {
            Some('\n')
        } else {
            None
        }
    }

    fn advance(&mut self) {
        if self.line_idx >= self.lines.len() {
            return;
        }
        let len = self.lines[self.line_idx].chars.len();
        if self.col < len {
            self.col += 1;
        } else if self.line_idx + 1 < self.lines.len() {
            self.line_idx += 1;
            self.col = 0;
        }
    }

    /// Lookahead by `n` characters without consuming.
    fn peek_ahead(&self, n: usize) -> Option<char> {
        let mut line_idx = self.line_idx;
        let mut col = self.col;
        for _ in 0..n {
            if line_idx >= self.lines.len() {
                return None;
            }
            let len = self.lines[line_idx].chars.len();
            if col < len {
                col += 1;
            } else if line_idx + 1 < self.lines.len() {
                line_idx += 1;
                col = 0;
            } else {
                return None;
            }
        }
        if line_idx >= self.lines.len() {
            return None;
        }
        let line = &self.lines[line_idx];
        if col < line.chars.len() {
            Some(line.chars[col])
        } else if line_idx + 1 < self.lines.len() {
            Some('\n')
        } else {
            None
        }
    }

    /// §4.3.1: advance over spaces/tabs and, when at start-of-text or after
    /// whitespace, over `# ...` up to end of line. Idempotent.
    pub fn skip_whitespace_and_comments(&mut self) {
        loop {
            while matches!(self.current_char(), Some(c) if c == ' ' || c == '\t') {
                self.advance();
            }
            if self.current_char() == Some('#') {
                while !matches!(self.current_char(), None | Some('\n')) {
                    self.advance();
                }
            } else {
                break;
            }
        }
    }

    /// §4.3.2: reads any interleaving of `!...` tags and `&...` anchors.
    pub fn parse_decorators(&mut self, flow_context: bool) -> Result<(Option<RawTag>, Option<String>)> {
        let mut tag = None;
        let mut anchor = None;
        loop {
            self.skip_whitespace_and_comments();
            match self.current_char() {
                Some('!') => {
                    if tag.is_some() {
                        return Err(Error::syntax(
                            "Multiple tags/anchors on node",
                            self.location(),
                        ));
                    }
                    tag = Some(self.parse_tag(flow_context)?);
                }
                Some('&') => {
                    if anchor.is_some() {
                        return Err(Error::syntax(
                            "Multiple tags/anchors on node",
                            self.location(),
                        ));
                    }
                    anchor = Some(self.parse_anchor()?);
                }
                _ => break,
            }
        }
        Ok((tag, anchor))
    }

    /// Decides what a tag-scanning loop should do with `c` (spec §4.3.3,
    /// §9 "Open question — flow-only tag terminators"): `,`/`]`/`}` end the
    /// tag only inside flow context (they belong to the enclosing flow
    /// syntax there); outside flow they cannot appear in a tag at all. `{`
    /// is never legal in a tag in either context.
    fn tag_scan_action(&self, c: char, flow_context: bool, start_loc: Location) -> Result<bool> {
        if chars::is_blank(c) || chars::is_break(c) {
            return Ok(true);
        }
        if c == '{' {
            return Err(Error::syntax("Invalid tag", start_loc));
        }
        if c == ',' || c == ']' || c == '}' {
            return if flow_context {
                Ok(true)
            } else {
                Err(Error::syntax("Invalid tag", start_loc))
            };
        }
        if c == ':' {
            return Ok(chars::is_blankz(self.peek_ahead(1)));
        }
        Ok(false)
    }

    /// §4.3.3.
    pub fn parse_tag(&mut self, flow_context: bool) -> Result<RawTag> {
        let start_loc = self.location();
        debug_assert_eq!(self.current_char(), Some('!'));
        self.advance();

        if self.current_char() == Some('<') {
            self.advance();
            let mut uri = String::new();
            loop {
                match self.current_char() {
                    Some('>') => {
                        self.advance();
                        break;
                    }
                    Some(c) if !chars::is_blank(c) && !chars::is_break(c) => {
                        uri.push(c);
                        self.advance();
                    }
                    _ => return Err(Error::syntax("Invalid tag", start_loc)),
                }
            }
            if uri.is_empty() {
                return Err(Error::syntax("Invalid tag", start_loc));
            }
            return Ok(RawTag::Verbatim(uri));
        }

        let mut run = String::new();
        let mut handle_closed = false;
        loop {
            match self.current_char() {
                Some('!') if !handle_closed => {
                    self.advance();
                    handle_closed = true;
                    break;
                }
                Some(c) => {
                    if self.tag_scan_action(c, flow_context, start_loc)? {
                        break;
                    }
                    run.push(c);
                    self.advance();
                }
                None => break,
            }
        }

        if handle_closed {
            let handle = format!("!{run}!");
            let mut suffix = String::new();
            loop {
                match self.current_char() {
                    Some(c) => {
                        if self.tag_scan_action(c, flow_context, start_loc)? {
                            break;
                        }
                        suffix.push(c);
                        self.advance();
                    }
                    None => break,
                }
            }
            Ok(RawTag::Shorthand { handle, suffix })
        } else {
            Ok(RawTag::Shorthand {
                handle: "!".to_string(),
                suffix: run,
            })
        }
    }

    fn scan_name(&mut self) -> String {
        let mut s = String::new();
        loop {
            match self.current_char() {
                Some(c) if chars::is_blank(c) || chars::is_break(c) => break,
                Some(c) if chars::is_flow_terminator(c) => break,
                Some(c) => {
                    s.push(c);
                    self.advance();
                }
                None => break,
            }
        }
        s
    }

    /// §4.3.4.
    pub fn parse_anchor(&mut self) -> Result<String> {
        debug_assert_eq!(self.current_char(), Some('&'));
        self.advance();
        Ok(self.scan_name())
    }

    /// §4.3.4.
    pub fn parse_alias(&mut self) -> Result<String> {
        let loc = self.location();
        debug_assert_eq!(self.current_char(), Some('*'));
        self.advance();
        let name = self.scan_name();
        if name.is_empty() {
            return Err(Error::syntax("Alias without name", loc));
        }
        Ok(name)
    }

    fn decode_hex_escape(&mut self, n: usize, start_loc: Location) -> Result<String> {
        let mut v: u32 = 0;
        for _ in 0..n {
            match self.current_char().and_then(chars::hex_digit_value) {
                Some(d) => {
                    v = v * 16 + d;
                    self.advance();
                }
                None => return Err(Error::syntax("Unknown escape sequence", start_loc)),
            }
        }
        char::from_u32(v)
            .map(|c| c.to_string())
            .ok_or_else(|| Error::syntax("Unknown escape sequence", start_loc))
    }

    fn decode_escape(&mut self, c: char, start_loc: Location) -> Result<String> {
        let out = match c {
            '"' => {
                self.advance();
                "\"".to_string()
            }
            '\\' => {
                self.advance();
                "\\".to_string()
            }
            '/' => {
                self.advance();
                "/".to_string()
            }
            'b' => {
                self.advance();
                "\u{8}".to_string()
            }
            'f' => {
                self.advance();
                "\u{c}".to_string()
            }
            'n' => {
                self.advance();
                "\n".to_string()
            }
            'r' => {
                self.advance();
                "\r".to_string()
            }
            't' => {
                self.advance();
                "\t".to_string()
            }
            '0' => {
                self.advance();
                "\0".to_string()
            }
            'a' => {
                self.advance();
                "\u{7}".to_string()
            }
            'v' => {
                self.advance();
                "\u{b}".to_string()
            }
            'e' => {
                self.advance();
                "\u{1b}".to_string()
            }
            ' ' => {
                self.advance();
                " ".to_string()
            }
            '\t' => {
                self.advance();
                "\t".to_string()
            }
            'x' => {
                self.advance();
                self.decode_hex_escape(2, start_loc)?
            }
            'u' => {
                self.advance();
                self.decode_hex_escape(4, start_loc)?
            }
            'U' => {
                self.advance();
                self.decode_hex_escape(8, start_loc)?
            }
            _ => return Err(Error::syntax("Unknown escape sequence", start_loc)),
        };
        Ok(out)
    }

    /// §4.3.5. `min_indent` is the node's own `expected_indent` (spec
    /// §4.5.4's "parent indent") — the threshold every continuation line
    /// must meet once the scalar spans more than one physical line.
    pub fn parse_double_quoted(&mut self, min_indent: u32) -> Result<String> {
        let start_loc = self.location();
        debug_assert_eq!(self.current_char(), Some('"'));
        self.advance();
        let mut out = String::new();
        loop {
            match self.current_char() {
                None => return Err(Error::syntax("Unterminated double-quoted scalar", start_loc)),
                Some('"') => {
                    self.advance();
                    break;
                }
                Some('\\') => {
                    self.advance();
                    match self.current_char() {
                        Some('\n') => {
                            self.advance();
                            self.check_line_crossing(min_indent)?;
                            while matches!(self.current_char(), Some(c) if c == ' ' || c == '\t') {
                                self.advance();
                            }
                        }
                        Some(c) => {
                            let decoded = self.decode_escape(c, start_loc)?;
                            out.push_str(&decoded);
                        }
                        None => {
                            return Err(Error::syntax("Unterminated double-quoted scalar", start_loc))
                        }
                    }
                }
                Some('\n') => self.fold_line_break(&mut out, min_indent)?,
                Some(c) => {
                    out.push(c);
                    self.advance();
                }
            }
        }
        Ok(out)
    }

    /// §4.3.6. See [`Self::parse_double_quoted`] for `min_indent`.
    pub fn parse_single_quoted(&mut self, min_indent: u32) -> Result<String> {
        let start_loc = self.location();
        debug_assert_eq!(self.current_char(), Some('\''));
        self.advance();
        let mut out = String::new();
        loop {
            match self.current_char() {
                None => return Err(Error::syntax("Unterminated single-quoted scalar", start_loc)),
                Some('\'') => {
                    self.advance();
                    if self.current_char() == Some('\'') {
                        out.push('\'');
                        self.advance();
                    } else {
                        break;
                    }
                }
                Some('\n') => self.fold_line_break(&mut out, min_indent)?,
                Some(c) => {
                    out.push(c);
                    self.advance();
                }
            }
        }
        Ok(out)
    }

    /// Shared line-folding step for quoted scalars (§4.3.5/§4.3.6): strips
    /// trailing blank from the accumulated output, then folds N consecutive
    /// breaks to N-1 breaks (a single break folds to one space). Validates
    /// every line crossed against `min_indent` (spec §4.5.4).
    fn fold_line_break(&mut self, out: &mut String, min_indent: u32) -> Result<()> {
        trim_trailing_blank(out);
        let mut breaks = 0u32;
        while self.current_char() == Some('\n') {
            breaks += 1;
            self.advance();
            self.check_line_crossing(min_indent)?;
        }
        while matches!(self.current_char(), Some(c) if c == ' ' || c == '\t') {
            self.advance();
        }
        if breaks == 1 {
            out.push(' ');
        } else {
            for _ in 0..breaks.saturating_sub(1) {
                out.push('\n');
            }
        }
        Ok(())
    }

    /// §4.3.7. Scans only up to the end of the current physical line — a
    /// plain scalar spanning multiple lines is a sequence of these calls
    /// stitched together by [`crate::plain_folder`], which alone knows the
    /// node's required indentation and hence when a following line still
    /// belongs to the scalar.
    pub fn parse_plain_scalar(&mut self, stop_at_colon: bool, flow_context: bool) -> Result<String> {
        let mut out = String::new();
        let mut preceded_by_whitespace = true;
        loop {
            match self.current_char() {
                None => break,
                Some('\n') => break,
                Some(c) if flow_context && chars::is_flow_terminator(c) => break,
                Some('#') if preceded_by_whitespace => break,
                Some(':') => {
                    let next = self.peek_ahead(1);
                    let stops = chars::is_blankz(next)
                        || matches!(next, Some(n) if flow_context && chars::is_flow_terminator(n));
                    if stop_at_colon && stops {
                        break;
                    }
                    if stops {
                        return Err(Error::syntax("Invalid plain scalar", self.location()));
                    }
                    out.push(':');
                    self.advance();
                    preceded_by_whitespace = false;
                }
                Some(c) => {
                    out.push(c);
                    preceded_by_whitespace = c == ' ' || c == '\t';
                    self.advance();
                }
            }
        }
        Ok(out.trim().to_string())
    }
}

fn trim_trailing_blank(s: &mut String) {
    while matches!(s.chars().last(), Some(c) if c == ' ' || c == '\t') {
        s.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::line_model::split_lines;
    use pretty_assertions::assert_eq;

    fn scanner(input: &'static str) -> (Vec<Line>, usize, usize) {
        (split_lines(input), 0, 0)
    }

    #[test]
    fn plain_scalar_trims_and_stops_at_colon_space() {
        let lines = split_lines("key: value");
        let mut s = InlineScanner::at(&lines, 0, 0);
        let key = s.parse_plain_scalar(true, false).unwrap();
        assert_eq!(key, "key");
    }

    #[test]
    fn plain_scalar_without_stop_at_colon_allows_bare_colon_non_space() {
        let lines = split_lines("http://example.com");
        let mut s = InlineScanner::at(&lines, 0, 0);
        let v = s.parse_plain_scalar(false, false).unwrap();
        assert_eq!(v, "http://example.com");
    }

    #[test]
    fn plain_scalar_colon_space_is_invalid_when_not_stopping() {
        let lines = split_lines("a: b");
        let mut s = InlineScanner::at(&lines, 0, 0);
        assert!(s.parse_plain_scalar(false, false).is_err());
    }

    #[test]
    fn double_quoted_decodes_escapes() {
        let (lines, li, c) = scanner(r#""a\tb\n☺""#);
        let mut s = InlineScanner::at(&lines, li, c);
        let v = s.parse_double_quoted(0).unwrap();
        assert_eq!(v, "a\tb\n\u{263A}");
    }

    #[test]
    fn double_quoted_folds_across_lines() {
        let input = "\"a\n  b\"";
        let lines = split_lines(input);
        let mut s = InlineScanner::at(&lines, 0, 0);
        let v = s.parse_double_quoted(0).unwrap();
        assert_eq!(v, "a b");
    }

    #[test]
    fn double_quoted_backslash_newline_suppresses_fold() {
        let input = "\"a\\\n  b\"";
        let lines = split_lines(input);
        let mut s = InlineScanner::at(&lines, 0, 0);
        let v = s.parse_double_quoted(0).unwrap();
        assert_eq!(v, "ab");
    }

    #[test]
    fn single_quoted_doubles_escape_quote() {
        let lines = split_lines("'it''s'");
        let mut s = InlineScanner::at(&lines, 0, 0);
        let v = s.parse_single_quoted(0).unwrap();
        assert_eq!(v, "it's");
    }

    #[test]
    fn unterminated_double_quote_errors() {
        let lines = split_lines("\"abc");
        let mut s = InlineScanner::at(&lines, 0, 0);
        assert!(s.parse_double_quoted(0).is_err());
    }

    #[test]
    fn double_quoted_rejects_document_marker_on_continuation_line() {
        let input = "\"a\n--- b\"";
        let lines = split_lines(input);
        let mut s = InlineScanner::at(&lines, 0, 0);
        let err = s.parse_double_quoted(0).unwrap_err();
        assert!(matches!(err, Error::InvalidSyntax { .. }));
    }

    #[test]
    fn double_quoted_rejects_under_indented_continuation_line() {
        let input = "  \"a\nb\"";
        let lines = split_lines(input);
        let mut s = InlineScanner::at(&lines, 0, 2);
        let err = s.parse_double_quoted(2).unwrap_err();
        assert!(matches!(err, Error::InvalidIndentation { .. }));
    }

    #[test]
    fn single_quoted_rejects_document_marker_on_continuation_line() {
        let input = "'a\n... b'";
        let lines = split_lines(input);
        let mut s = InlineScanner::at(&lines, 0, 0);
        let err = s.parse_single_quoted(0).unwrap_err();
        assert!(matches!(err, Error::InvalidSyntax { .. }));
    }

    #[test]
    fn tag_verbatim_form() {
        let lines = split_lines("!<tag:example.com,2024:foo> rest");
        let mut s = InlineScanner::at(&lines, 0, 0);
        let tag = s.parse_tag(false).unwrap();
        assert_eq!(tag, RawTag::Verbatim("tag:example.com,2024:foo".to_string()));
    }

    #[test]
    fn tag_named_handle_form() {
        let lines = split_lines("!e!foo rest");
        let mut s = InlineScanner::at(&lines, 0, 0);
        let tag = s.parse_tag(false).unwrap();
        assert_eq!(
            tag,
            RawTag::Shorthand {
                handle: "!e!".into(),
                suffix: "foo".into()
            }
        );
    }

    #[test]
    fn tag_comma_terminates_in_flow_context() {
        let lines = split_lines("!foo, bar");
        let mut s = InlineScanner::at(&lines, 0, 0);
        let tag = s.parse_tag(true).unwrap();
        assert_eq!(
            tag,
            RawTag::Shorthand {
                handle: "!".into(),
                suffix: "foo".into()
            }
        );
    }

    #[test]
    fn tag_comma_errors_outside_flow_context() {
        let lines = split_lines("!foo, bar");
        let mut s = InlineScanner::at(&lines, 0, 0);
        assert!(s.parse_tag(false).is_err());
    }

    #[test]
    fn alias_without_name_errors() {
        let lines = split_lines("* ");
        let mut s = InlineScanner::at(&lines, 0, 0);
        assert!(s.parse_alias().is_err());
    }

    #[test]
    fn duplicate_tag_errors() {
        let lines = split_lines("!a !b value");
        let mut s = InlineScanner::at(&lines, 0, 0);
        assert!(s.parse_decorators(false).is_err());
    }
}
