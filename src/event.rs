//! ValueEvent (spec §3.8): the flat stream produced by [`crate::event_emitter`]
//! and consumed by [`crate::writer::Writer`].
//!
//! Grounded in the teacher's `Event`/`EventData` (`event.rs`), flattened from
//! the teacher's begin/end-with-parameters shape (`DocumentStart{version,
//! tag_directives,..}`, `MappingStart{anchor,tag,implicit,style}`, ...) into
//! the decorator-then-value sequence the spec's event grammar calls for:
//! `Style`/`Tag`/`Anchor` are independent events that precede a value rather
//! than being bundled into that value's begin-event.

use crate::schema::Value;

/// Non-semantic rendering hint a parser or application may attach to the
/// next value (spec §9 "Style hints" design note).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleHint {
    Plain,
    SingleQuoted,
    DoubleQuoted,
    Literal,
    Folded,
    Block,
    Flow,
}

/// A resolved tag attached to the following value.
#[derive(Debug, Clone, PartialEq)]
pub struct TagValue(pub String);

/// Sum type emitted by the event emitter and accepted by the writer (spec
/// §3.8). Ordering contract: within a single value, decorator events appear
/// in the fixed order `Style -> Tag(s) -> Anchor -> (value start)`. `Key` is
/// a marker with no payload of its own — it is immediately followed by the
/// ordinary event sequence for the key (usually a bare `Scalar`, but a
/// complex key such as `? [a, b]` is `Key, BeginArray, Scalar(a),
/// Scalar(b), EndArray`), then by the entry's value sequence. `Key` events
/// appear only between `BeginObject` and the matching `EndObject`.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueEvent {
    Style(StyleHint),
    Tag(TagValue),
    Anchor(String),
    Alias(String),
    Scalar(Value),
    BeginArray,
    EndArray,
    BeginObject,
    EndObject,
    Key,
}
