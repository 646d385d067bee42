//! C8 TagResolver (spec §4.8) plus the tag-handle table (spec §3.7).
//!
//! Grounded in the teacher's `yaml_parser_scan_tag_handle`/`scan_tag_uri`
//! (`scanner.rs`) for the handle/suffix split, and its `TagDirective`
//! (`yaml.rs`) for the handle→prefix table shape; percent-decoding has no
//! teacher analogue (libyaml does not decode tag URIs) so it is grounded
//! directly in the spec's own description (§4.8) instead.

use std::collections::HashMap;

use crate::error::{Error, Location, Result};

/// A raw tag token as produced by [`crate::scanner::InlineScanner::parse_tag`],
/// before handle expansion.
#[derive(Debug, Clone, PartialEq)]
pub enum RawTag {
    /// `!<URI>` — resolves to the URI content verbatim (after percent-decoding).
    Verbatim(String),
    /// Any of `!`, `!!suffix`, `!handle!suffix`, `!suffix` — `handle` is the
    /// exact handle text (`"!"`, `"!!"`, or `"!x!"`) and `suffix` may be empty.
    Shorthand { handle: String, suffix: String },
}

/// Mapping `handle -> prefix` (spec §3.7), seeded with the two default
/// handles and mutated by `%TAG` directives.
#[derive(Debug, Clone)]
pub struct TagHandleTable {
    handles: HashMap<String, String>,
}

impl TagHandleTable {
    pub fn defaults() -> Self {
        let mut handles = HashMap::new();
        handles.insert("!".to_string(), "!".to_string());
        handles.insert("!!".to_string(), "tag:yaml.org,2002:".to_string());
        TagHandleTable { handles }
    }

    pub fn set(&mut self, handle: &str, prefix: &str) {
        self.handles.insert(handle.to_string(), prefix.to_string());
    }

    pub fn get(&self, handle: &str) -> Option<&str> {
        self.handles.get(handle).map(String::as_str)
    }
}

/// Resolves a [`RawTag`] against `table` into the fully-expanded tag string
/// (spec §4.8).
pub fn resolve_tag(raw: &RawTag, table: &TagHandleTable, location: Location) -> Result<String> {
    match raw {
        RawTag::Verbatim(uri) => percent_decode(uri, location),
        RawTag::Shorthand { handle, suffix } => {
            let prefix = table
                .get(handle)
                .ok_or_else(|| Error::syntax("Unknown tag handle", location))?;
            let decoded = percent_decode(suffix, location)?;
            Ok(format!("{prefix}{decoded}"))
        }
    }
}

/// Decodes `%HH` percent-escapes in a tag suffix/URI, reassembling the
/// resulting bytes as UTF-8 (spec §4.8).
fn percent_decode(input: &str, location: Location) -> Result<String> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            if i + 2 >= bytes.len() {
                return Err(Error::syntax("Invalid tag", location));
            }
            let hi = (bytes[i + 1] as char).to_digit(16);
            let lo = (bytes[i + 2] as char).to_digit(16);
            match (hi, lo) {
                (Some(hi), Some(lo)) => {
                    out.push((hi * 16 + lo) as u8);
                    i += 3;
                }
                _ => return Err(Error::syntax("Invalid tag", location)),
            }
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).map_err(|_| Error::syntax("Invalid tag", location))
}
