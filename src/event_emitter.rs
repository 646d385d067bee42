//! C9 EventEmitter (spec §4.9): walks a [`Document`] tree depth-first and
//! produces the flat [`ValueEvent`] stream.
//!
//! Grounded in the teacher's `Document::to_event_stream`-style tree walk
//! (`document.rs`/`emitter.rs`), adapted to the spec's decorator-then-value
//! event ordering and its by-name alias replay instead of the teacher's
//! arena-index alias resolution.

use std::collections::HashMap;

use crate::document::{Document, DocumentNode, Scalar, ScalarStyle};
use crate::error::{Error, Result};
use crate::event::{TagValue, ValueEvent};
use crate::schema::{self, Value};

/// Emits the full event stream for one parsed document (spec §4.9).
pub fn emit_document(doc: &Document) -> Result<Vec<ValueEvent>> {
    let mut out = Vec::new();
    let mut anchors: HashMap<String, Vec<ValueEvent>> = HashMap::new();
    emit_node(&doc.root, &mut anchors, &mut out)?;
    Ok(out)
}

fn emit_node(
    node: &DocumentNode,
    anchors: &mut HashMap<String, Vec<ValueEvent>>,
    out: &mut Vec<ValueEvent>,
) -> Result<()> {
    if let DocumentNode::Alias(name) = node {
        let cached = anchors
            .get(name)
            .cloned()
            .ok_or_else(|| Error::UnresolvedAlias(name.clone()))?;
        out.extend(cached);
        return Ok(());
    }

    if let Some(tag) = node.tag() {
        out.push(ValueEvent::Tag(TagValue(tag.to_string())));
    }
    if let Some(anchor) = node.anchor() {
        if anchors.contains_key(anchor) {
            return Err(Error::DuplicateAnchor(anchor.to_string()));
        }
        out.push(ValueEvent::Anchor(anchor.to_string()));
    }

    let body_start = out.len();
    match node {
        DocumentNode::Scalar(scalar, tag, _anchor) => {
            out.push(ValueEvent::Scalar(resolve_scalar(scalar, tag.as_deref())));
        }
        DocumentNode::Sequence(items, _, _, _) => {
            out.push(ValueEvent::BeginArray);
            for item in items {
                emit_node(item, anchors, out)?;
            }
            out.push(ValueEvent::EndArray);
        }
        DocumentNode::Mapping(entries, _, _, _) => {
            out.push(ValueEvent::BeginObject);
            for (key, value) in entries {
                out.push(ValueEvent::Key);
                emit_node(key, anchors, out)?;
                emit_node(value, anchors, out)?;
            }
            out.push(ValueEvent::EndObject);
        }
        DocumentNode::Alias(_) => unreachable!("aliases are handled before decorator emission"),
    }

    if let Some(anchor) = node.anchor() {
        anchors.insert(anchor.to_string(), out[body_start..].to_vec());
    }

    Ok(())
}

fn resolve_scalar(scalar: &Scalar, tag: Option<&str>) -> Value {
    match tag {
        Some(t) => schema::resolve_explicit(t, &scalar.text),
        None if scalar.style == ScalarStyle::Plain => schema::resolve_implicit(&scalar.text),
        None => Value::Str(scalar.text.clone()),
    }
}
