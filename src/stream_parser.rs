//! C4 DocumentStreamParser (spec §4.4): the top-level driver. Consumes
//! directives and document markers, hands each document's content to
//! [`crate::block_parser::BlockParser`], and collects the resulting
//! [`Document`]s.
//!
//! Grounded in the teacher's `yaml_parser_parse` document-loop
//! (`parser.rs`), which drives the same directive/marker state machine
//! (`YAML_PARSE_IMPLICIT_DOCUMENT_START_STATE`,
//! `YAML_PARSE_DOCUMENT_START_STATE`, `YAML_PARSE_DOCUMENT_CONTENT_STATE`,
//! `YAML_PARSE_DOCUMENT_END_STATE`) over a token stream; here the same
//! states are plain loop steps over `&[Line]` instead of token lookahead.

use crate::block_parser::BlockParser;
use crate::chars;
use crate::comment;
use crate::document::Document;
use crate::error::{Error, Location, Result};
use crate::line_model::{split_lines, Line};
use crate::tag_resolver::TagHandleTable;

/// Parses a full YAML character stream into zero or more documents (spec
/// §4.4). Each document gets a fresh [`TagHandleTable`] seeded with the
/// defaults and mutated only by that document's own `%TAG` directives.
pub fn parse_documents(input: &str) -> Result<Vec<Document>> {
    let lines = split_lines(input);
    let mut driver = StreamParser::new(&lines);
    driver.run()
}

struct StreamParser<'a> {
    lines: &'a [Line],
    index: usize,
    tag_handles: TagHandleTable,
    pending_tag_handles: TagHandleTable,
    require_document_start: bool,
    allow_directives: bool,
}

impl<'a> StreamParser<'a> {
    fn new(lines: &'a [Line]) -> Self {
        StreamParser {
            lines,
            index: 0,
            tag_handles: TagHandleTable::defaults(),
            pending_tag_handles: TagHandleTable::defaults(),
            require_document_start: false,
            allow_directives: true,
        }
    }

    fn run(&mut self) -> Result<Vec<Document>> {
        let mut docs = Vec::new();
        loop {
            self.skip_blank_lines();
            if self.index >= self.lines.len() {
                break;
            }

            if self.require_document_start && !self.at_document_start() && !self.at_directive_or_end() {
                let line = &self.lines[self.index];
                return Err(Error::syntax(
                    "Missing document start marker",
                    Location::new(line.number, line.indent + 1),
                ));
            }

            self.consume_directives()?;

            if self.at_end_marker() {
                self.allow_directives = true;
                self.index += 1;
                continue;
            }

            self.tag_handles = self.pending_tag_handles.clone();
            self.pending_tag_handles = TagHandleTable::defaults();
            self.allow_directives = false;

            if self.index >= self.lines.len() {
                break;
            }

            let explicit_start = self.at_document_start();
            let parser = BlockParser::new(self.lines, &self.tag_handles);
            let (root, next_idx) = if explicit_start {
                let line = &self.lines[self.index];
                let rest_col = line.indent as usize + 3;
                if rest_col >= line.chars.len() {
                    parser.parse_node(self.index + 1, 0)?
                } else {
                    let raw: String = line.chars[rest_col..].iter().collect();
                    if comment::strip_comment(&raw).trim().is_empty() {
                        parser.parse_node(self.index + 1, 0)?
                    } else {
                        parser.parse_node(self.index, 0)?
                    }
                }
            } else {
                let indent = self.lines[self.index].indent;
                parser.parse_node(self.index, indent)?
            };
            self.index = next_idx;

            self.skip_blank_lines();
            let explicit_end = self.at_end_marker();
            if explicit_end {
                self.allow_directives = true;
                self.index += 1;
            }

            docs.push(Document { root, explicit_start, explicit_end });
            self.require_document_start = true;
        }
        Ok(docs)
    }

    fn skip_blank_lines(&mut self) {
        while self.index < self.lines.len() {
            let line = &self.lines[self.index];
            if line.is_blank() {
                self.index += 1;
                continue;
            }
            let raw: String = line.chars[line.indent as usize..].iter().collect();
            if comment::strip_comment(&raw).trim().is_empty() {
                self.index += 1;
                continue;
            }
            break;
        }
    }

    fn at_document_start(&self) -> bool {
        self.line_starts_with("---")
    }

    fn at_end_marker(&self) -> bool {
        self.line_starts_with("...")
    }

    fn at_directive(&self) -> bool {
        self.index < self.lines.len() && self.lines[self.index].indent == 0 && {
            let line = &self.lines[self.index];
            !line.chars.is_empty() && line.chars[0] == '%'
        }
    }

    fn at_directive_or_end(&self) -> bool {
        self.at_directive() || self.at_end_marker()
    }

    fn line_starts_with(&self, marker: &str) -> bool {
        if self.index >= self.lines.len() {
            return false;
        }
        let line = &self.lines[self.index];
        if line.indent != 0 {
            return false;
        }
        let marker_chars: Vec<char> = marker.chars().collect();
        if line.chars.len() < marker_chars.len() || line.chars[..marker_chars.len()] != marker_chars[..] {
            return false;
        }
        match line.chars.get(marker_chars.len()) {
            None => true,
            Some(c) => c.is_whitespace(),
        }
    }

    /// Consumes a run of `%YAML`/`%TAG` directive lines at the front of the
    /// current position, storing handles into `pending_tag_handles`. Stops
    /// at the first non-directive line. A directive is only legal at the
    /// very start of the stream or between a `...` and the next document's
    /// `---` (spec §4.4); `allow_directives` tracks that window.
    fn consume_directives(&mut self) -> Result<()> {
        let mut seen_yaml_version = false;
        while self.at_directive() {
            let line = &self.lines[self.index];
            let loc = Location::new(line.number, 1);
            if !self.allow_directives {
                return Err(Error::syntax(
                    "Directive must be preceded by a document end marker",
                    loc,
                ));
            }
            let line_content = line.content();
            let content = comment::strip_comment(&line_content);
            let mut parts = content.split_whitespace();
            match parts.next() {
                Some("%YAML") => {
                    if seen_yaml_version {
                        return Err(Error::syntax("Duplicate %YAML directive", loc));
                    }
                    let version = parts.next().ok_or_else(|| Error::syntax("Malformed %YAML directive", loc))?;
                    if parts.next().is_some() || !is_valid_version(version) {
                        return Err(Error::syntax("Malformed %YAML directive", loc));
                    }
                    seen_yaml_version = true;
                }
                Some("%TAG") => {
                    let handle = parts.next().ok_or_else(|| Error::syntax("Malformed %TAG directive", loc))?;
                    let prefix = parts.next().ok_or_else(|| Error::syntax("Malformed %TAG directive", loc))?;
                    if parts.next().is_some() || !is_valid_handle(handle) || prefix.is_empty() {
                        return Err(Error::syntax("Malformed %TAG directive", loc));
                    }
                    self.pending_tag_handles.set(handle, prefix);
                }
                _ => return Err(Error::syntax("Unknown directive", loc)),
            }
            self.index += 1;
            self.skip_blank_lines();
        }
        Ok(())
    }
}

fn is_valid_version(version: &str) -> bool {
    let mut parts = version.split('.');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(major), Some(minor), None) => {
            !major.is_empty()
                && !minor.is_empty()
                && major.chars().all(chars::is_digit)
                && minor.chars().all(chars::is_digit)
        }
        _ => false,
    }
}

/// A tag handle is `!`, or `!` + one or more word characters + `!` (spec
/// §4.3.3's named-handle form).
fn is_valid_handle(handle: &str) -> bool {
    if handle == "!" {
        return true;
    }
    handle.len() >= 3
        && handle.starts_with('!')
        && handle.ends_with('!')
        && handle[1..handle.len() - 1].chars().all(chars::is_alpha)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{DocumentNode, Scalar, ScalarStyle};
    use pretty_assertions::assert_eq;

    fn plain(text: &str) -> DocumentNode {
        DocumentNode::Scalar(Scalar { text: text.to_string(), style: ScalarStyle::Plain }, None, None)
    }

    #[test]
    fn single_implicit_document() {
        let docs = parse_documents("a: 1\n").unwrap();
        assert_eq!(docs.len(), 1);
        assert!(!docs[0].explicit_start);
        assert!(!docs[0].explicit_end);
        assert_eq!(
            docs[0].root,
            DocumentNode::Mapping(vec![(plain("a"), plain("1"))], crate::document::CollectionStyle::Block, None, None)
        );
    }

    #[test]
    fn explicit_markers_roundtrip() {
        let docs = parse_documents("---\nvalue\n...\n").unwrap();
        assert_eq!(docs.len(), 1);
        assert!(docs[0].explicit_start);
        assert!(docs[0].explicit_end);
        assert_eq!(docs[0].root, plain("value"));
    }

    #[test]
    fn content_on_document_marker_line() {
        let docs = parse_documents("--- value\n").unwrap();
        assert_eq!(docs[0].root, plain("value"));
    }

    #[test]
    fn directives_and_two_documents() {
        let input = "%YAML 1.2\n%TAG !e! tag:example.com,2024:\n---\n!e!foo bar\n...\n---\nbaz\n";
        let docs = parse_documents(input).unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(
            docs[0].root,
            DocumentNode::Scalar(
                Scalar { text: "bar".to_string(), style: ScalarStyle::Plain },
                Some("tag:example.com,2024:foo".to_string()),
                None
            )
        );
        assert_eq!(docs[1].root, plain("baz"));
    }

    #[test]
    fn tag_handles_reset_between_documents() {
        let input = "%TAG !e! tag:example.com,2024:\n---\n!e!foo bar\n---\n!e!foo baz\n";
        let err = parse_documents(input).unwrap_err();
        assert!(matches!(err, Error::InvalidSyntax { message: "Unknown tag handle", .. }));
    }

    #[test]
    fn missing_document_start_after_first_document_errors() {
        let input = "a: 1\n...\nb: 2\n";
        let err = parse_documents(input).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidSyntax { message: "Missing document start marker", .. }
        ));
    }

    #[test]
    fn end_marker_then_explicit_start_allowed() {
        let input = "a: 1\n...\n---\nb: 2\n";
        let docs = parse_documents(input).unwrap();
        assert_eq!(docs.len(), 2);
        assert!(docs[1].explicit_start);
        assert_eq!(
            docs[1].root,
            DocumentNode::Mapping(
                vec![(plain("b"), plain("2"))],
                crate::document::CollectionStyle::Block,
                None,
                None
            )
        );
    }

    #[test]
    fn directive_after_implicit_document_without_end_marker_errors() {
        let input = "a: 1\n%YAML 1.2\n---\nb\n";
        let err = parse_documents(input).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidSyntax { message: "Directive must be preceded by a document end marker", .. }
        ));
    }

    #[test]
    fn directive_after_explicit_end_marker_allowed() {
        let input = "---\na: 1\n...\n%YAML 1.2\n---\nb\n";
        let docs = parse_documents(input).unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[1].root, plain("b"));
    }

    #[test]
    fn malformed_yaml_directive_errors() {
        let err = parse_documents("%YAML 1\n---\na\n").unwrap_err();
        assert!(matches!(err, Error::InvalidSyntax { message: "Malformed %YAML directive", .. }));
    }

    #[test]
    fn duplicate_yaml_directive_errors() {
        let err = parse_documents("%YAML 1.1\n%YAML 1.2\n---\na\n").unwrap_err();
        assert!(matches!(err, Error::InvalidSyntax { message: "Duplicate %YAML directive", .. }));
    }

    #[test]
    fn empty_input_yields_no_documents() {
        assert_eq!(parse_documents("").unwrap(), vec![]);
        assert_eq!(parse_documents("\n\n").unwrap(), vec![]);
    }

    #[test]
    fn comment_only_input_yields_no_documents() {
        assert_eq!(parse_documents("# just a comment\n").unwrap(), vec![]);
    }
}
