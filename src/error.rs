//! Error taxonomy (spec §7). Grounded in the teacher's layered
//! `ReaderError`/`ScannerError`/`ParserError`/`ComposerError` `#[from]` chain
//! (`error.rs`), collapsed to one flat parse-time error type and one
//! separate writer-time error type, matching the spec's two independent
//! contracts: parse errors always carry a [`Location`], writer errors never
//! do.

use std::fmt;

/// A 1-based physical position in the input (spec §3.9).
#[derive(Copy, Clone, Default, Debug, PartialEq, Eq)]
pub struct Location {
    pub line: u32,
    pub column: u32,
}

impl Location {
    pub fn new(line: u32, column: u32) -> Self {
        Location { line, column }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {} column {}", self.line, self.column)
    }
}

/// All parse-time failures (spec §7). Every variant that can be attributed
/// to a specific spot in the input carries a [`Location`].
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("input is not valid UTF-8")]
    InvalidEncoding,

    #[error("{location}: {message}")]
    InvalidSyntax {
        message: &'static str,
        location: Location,
    },

    #[error("{location}: invalid indentation")]
    InvalidIndentation { location: Location },

    #[error("duplicate anchor `{0}`")]
    DuplicateAnchor(String),

    #[error("unresolved alias `*{0}`")]
    UnresolvedAlias(String),
}

impl Error {
    pub(crate) fn syntax(message: &'static str, location: Location) -> Self {
        Error::InvalidSyntax { message, location }
    }

    pub(crate) fn indentation(location: Location) -> Self {
        Error::InvalidIndentation { location }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the [`crate::writer::Writer`] event API (spec §7, §4.10
/// "Contracts"). These never carry a `Location` since the writer's input is
/// an event stream, not source text — mirrors the teacher's
/// `EmitterError`/`WriterError` split, where `WriterError` wraps I/O and
/// `EmitterError` wraps API misuse.
#[derive(Debug, thiserror::Error)]
pub enum WriterError {
    #[error("{0}")]
    InvalidEvent(&'static str),

    #[error("{0}")]
    InvalidState(&'static str),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type WriteResult<T> = std::result::Result<T, WriterError>;
