//! `yamlcore`: a hand-written, indentation-sensitive YAML 1.2 reader/writer
//! core built around a flat value-event stream.
//!
//! The pipeline mirrors the teacher's own staged design
//! (`reader.rs` -> `scanner.rs` -> `parser.rs` -> `document.rs` ->
//! `emitter.rs`), restaffed around this crate's own stages:
//!
//! ```text
//! &str -> LineModel -> CommentStripper -> BlockParser -> DocumentTree
//!      -> EventEmitter -> [ValueEvent] -> Writer -> String
//! ```
//!
//! [`parse_str`] drives the read side end-to-end; [`emit_events`] drives the
//! write side. Callers who need the intermediate stages (a parsed
//! [`Document`] tree, or a raw [`ValueEvent`] stream) can reach them through
//! the crate's public modules directly.

#![forbid(unsafe_code)]

mod block_parser;
mod block_scalar;
mod chars;
mod comment;
mod document;
mod error;
mod event;
mod event_emitter;
mod line_model;
mod plain_folder;
mod scanner;
mod schema;
mod stream_parser;
mod tag_resolver;
mod writer;

pub use document::{Chomp, CollectionStyle, Document, DocumentNode, Scalar, ScalarStyle};
pub use error::{Error, Location, Result, WriteResult, WriterError};
pub use event::{StyleHint, TagValue, ValueEvent};
pub use event_emitter::emit_document;
pub use schema::Value;
pub use writer::{Writer, WriterOptions};

/// Parses a full YAML character stream into zero or more documents (spec
/// §4.4, §6 "External interfaces"). This is the read-side entry point;
/// multi-document streams (separated by `---`/`...`) come back as one
/// [`Document`] per root.
pub fn parse_str(input: &str) -> Result<Vec<Document>> {
    stream_parser::parse_documents(input)
}

/// Renders a single [`ValueEvent`] stream to `out` (spec §4.10, §6
/// "External interfaces"). Callers with multiple documents drive one
/// `Writer` per document, exactly as the teacher drives one `Emitter` per
/// `yaml_document_t`.
pub fn emit_events<W: std::io::Write>(
    events: Vec<ValueEvent>,
    out: W,
    options: WriterOptions,
) -> WriteResult<()> {
    let mut writer = Writer::new(out, options);
    for event in events {
        writer.emit(event)?;
    }
    writer.finish().map(|_| ())
}

/// Convenience wrapper over [`emit_events`] for callers who just want text
/// back (spec §1 "Crate shape" — `to_string` alongside `parse_str`).
pub fn emit_to_string(events: Vec<ValueEvent>, options: WriterOptions) -> WriteResult<String> {
    let mut buf = Vec::new();
    emit_events(events, &mut buf, options)?;
    String::from_utf8(buf).map_err(|_| WriterError::InvalidEvent("Rendered output is not valid UTF-8"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn events_for(input: &str) -> Vec<ValueEvent> {
        let docs = parse_str(input).unwrap();
        assert_eq!(docs.len(), 1, "expected exactly one document");
        emit_document(&docs[0]).unwrap()
    }

    /// Scenario 1 (spec §8.4): flow mapping in block sequence.
    #[test]
    fn flow_mapping_in_block_sequence() {
        let events = events_for("- {a: 1, b: 2}\n- {c: 3}\n");
        assert_eq!(
            events,
            vec![
                ValueEvent::BeginArray,
                ValueEvent::BeginObject,
                ValueEvent::Key,
                ValueEvent::Scalar(Value::Str("a".into())),
                ValueEvent::Scalar(Value::Int(1)),
                ValueEvent::Key,
                ValueEvent::Scalar(Value::Str("b".into())),
                ValueEvent::Scalar(Value::Int(2)),
                ValueEvent::EndObject,
                ValueEvent::BeginObject,
                ValueEvent::Key,
                ValueEvent::Scalar(Value::Str("c".into())),
                ValueEvent::Scalar(Value::Int(3)),
                ValueEvent::EndObject,
                ValueEvent::EndArray,
            ]
        );
    }

    /// Scenario 2 (spec §8.4): literal scalar with clip chomping.
    #[test]
    fn literal_scalar_clip_chomping() {
        let events = events_for("msg: |\n  line1\n  line2\n");
        assert_eq!(
            events,
            vec![
                ValueEvent::BeginObject,
                ValueEvent::Key,
                ValueEvent::Scalar(Value::Str("msg".into())),
                ValueEvent::Scalar(Value::Str("line1\nline2\n".into())),
                ValueEvent::EndObject,
            ]
        );
    }

    /// Scenario 3 (spec §8.4): folded scalar with an embedded blank line.
    #[test]
    fn folded_scalar_with_blank_line() {
        let events = events_for("text: >\n  a\n  b\n\n  c\n");
        assert_eq!(
            events,
            vec![
                ValueEvent::BeginObject,
                ValueEvent::Key,
                ValueEvent::Scalar(Value::Str("text".into())),
                ValueEvent::Scalar(Value::Str("a b\nc\n".into())),
                ValueEvent::EndObject,
            ]
        );
    }

    /// Scenario 4 (spec §8.4): anchor and alias. Merge-key (`<<`) expansion
    /// is out of scope (spec §9 Non-goals) — `<<` round-trips as an ordinary
    /// plain-scalar key whose alias value replays the anchored mapping.
    #[test]
    fn anchor_and_alias_without_merge_key_expansion() {
        let events = events_for("defaults: &d\n  timeout: 30\nprod:\n  <<: *d\n  host: p\n");
        assert_eq!(
            events,
            vec![
                ValueEvent::BeginObject,
                ValueEvent::Key,
                ValueEvent::Scalar(Value::Str("defaults".into())),
                ValueEvent::Anchor("d".into()),
                ValueEvent::BeginObject,
                ValueEvent::Key,
                ValueEvent::Scalar(Value::Str("timeout".into())),
                ValueEvent::Scalar(Value::Int(30)),
                ValueEvent::EndObject,
                ValueEvent::Key,
                ValueEvent::Scalar(Value::Str("prod".into())),
                ValueEvent::BeginObject,
                ValueEvent::Key,
                ValueEvent::Scalar(Value::Str("<<".into())),
                ValueEvent::BeginObject,
                ValueEvent::Key,
                ValueEvent::Scalar(Value::Str("timeout".into())),
                ValueEvent::Scalar(Value::Int(30)),
                ValueEvent::EndObject,
                ValueEvent::Key,
                ValueEvent::Scalar(Value::Str("host".into())),
                ValueEvent::Scalar(Value::Str("p".into())),
                ValueEvent::EndObject,
                ValueEvent::EndObject,
            ]
        );
    }

    /// Scenario 5 (spec §8.4): explicit complex key.
    #[test]
    fn explicit_complex_key() {
        let events = events_for("? [a, b]\n: 1\n");
        assert_eq!(
            events,
            vec![
                ValueEvent::BeginObject,
                ValueEvent::Key,
                ValueEvent::BeginArray,
                ValueEvent::Scalar(Value::Str("a".into())),
                ValueEvent::Scalar(Value::Str("b".into())),
                ValueEvent::EndArray,
                ValueEvent::Scalar(Value::Int(1)),
                ValueEvent::EndObject,
            ]
        );
    }

    /// Scenario 6 (spec §8.4): directives and two documents, with a tag
    /// handle that must not leak past the `...`/`---` boundary.
    #[test]
    fn directives_and_two_documents() {
        let input = "%YAML 1.2\n%TAG !e! tag:example.com,2024:\n---\n!e!foo bar\n...\n---\nbaz\n";
        let docs = parse_str(input).unwrap();
        assert_eq!(docs.len(), 2);

        let first = emit_document(&docs[0]).unwrap();
        assert_eq!(
            first,
            vec![
                ValueEvent::Tag(TagValue("tag:example.com,2024:foo".into())),
                ValueEvent::Scalar(Value::Str("bar".into())),
            ]
        );

        let second = emit_document(&docs[1]).unwrap();
        assert_eq!(second, vec![ValueEvent::Scalar(Value::Str("baz".into()))]);
    }

    /// Full round trip: parse, emit events, write back out, and confirm the
    /// structural shape survives even though the text itself is free to
    /// change (spec §9 "Style hints" — round-trips are structural, not
    /// textual).
    #[test]
    fn parse_then_write_round_trips_structurally() {
        let input = "name: widget\ntags:\n  - a\n  - b\ncount: 3\n";
        let docs = parse_str(input).unwrap();
        let events = emit_document(&docs[0]).unwrap();

        let mut out = Vec::new();
        emit_events(events.clone(), &mut out, WriterOptions::default()).unwrap();
        let rendered = String::from_utf8(out).unwrap();

        let reparsed = parse_str(&rendered).unwrap();
        let reparsed_events = emit_document(&reparsed[0]).unwrap();
        assert_eq!(events, reparsed_events);
    }

    #[test]
    fn empty_input_yields_no_documents() {
        assert_eq!(parse_str("").unwrap(), vec![]);
    }

    #[test]
    fn emit_to_string_matches_emit_events() {
        let events = vec![ValueEvent::Scalar(Value::Str("hello".into()))];
        assert_eq!(emit_to_string(events, WriterOptions::default()).unwrap(), "hello");
    }
}
