//! Document tree (spec §3.2–§3.6). Grounded in the teacher's `document.rs`
//! `Node`/`NodeData`, but expressed as an ordinary recursive Rust enum
//! (`Vec<DocumentNode>` naturally owns its children) instead of the
//! teacher's index-into-arena `Vec<Node>` + `i32` handles — the arena is a
//! holdover from libyaml's C ABI (`yaml_node_t` referenced by integer id
//! across an FFI boundary); a safe Rust tree has no such constraint and a
//! directly-owned tree is the idiomatic shape plain recursive descent
//! produces naturally.

/// Chomping indicator for block scalars (spec §3.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Chomp {
    /// `-`: remove all trailing line breaks.
    Strip,
    /// default: keep a single trailing line break if the body is non-empty.
    Clip,
    /// `+`: keep all trailing line breaks.
    Keep,
}

/// How a scalar was written (spec §3.2).
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarStyle {
    Plain,
    SingleQuoted,
    DoubleQuoted,
    Literal { chomp: Chomp, indent: Option<u8> },
    Folded { chomp: Chomp, indent: Option<u8> },
}

/// How a collection was written (spec §3.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionStyle {
    Block,
    Flow,
}

/// A scalar value plus the style it was read in (spec §3.4).
#[derive(Debug, Clone, PartialEq)]
pub struct Scalar {
    pub text: String,
    pub style: ScalarStyle,
}

/// A node in the parsed document tree (spec §3.5).
///
/// Invariants upheld by construction throughout `block_parser.rs`:
/// a node carries at most one tag and at most one anchor; `Alias` carries
/// neither; mapping entries preserve insertion order and duplicate keys are
/// preserved syntactically (semantic dedup is a downstream concern).
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentNode {
    Scalar(Scalar, Option<String>, Option<String>),
    Sequence(Vec<DocumentNode>, CollectionStyle, Option<String>, Option<String>),
    Mapping(
        Vec<(DocumentNode, DocumentNode)>,
        CollectionStyle,
        Option<String>,
        Option<String>,
    ),
    Alias(String),
}

impl DocumentNode {
    pub fn tag(&self) -> Option<&str> {
        match self {
            DocumentNode::Scalar(_, tag, _) => tag.as_deref(),
            DocumentNode::Sequence(_, _, tag, _) => tag.as_deref(),
            DocumentNode::Mapping(_, _, tag, _) => tag.as_deref(),
            DocumentNode::Alias(_) => None,
        }
    }

    pub fn anchor(&self) -> Option<&str> {
        match self {
            DocumentNode::Scalar(_, _, anchor) => anchor.as_deref(),
            DocumentNode::Sequence(_, _, _, anchor) => anchor.as_deref(),
            DocumentNode::Mapping(_, _, _, anchor) => anchor.as_deref(),
            DocumentNode::Alias(_) => None,
        }
    }

    pub(crate) fn empty_scalar() -> DocumentNode {
        DocumentNode::Scalar(
            Scalar {
                text: String::new(),
                style: ScalarStyle::Plain,
            },
            None,
            None,
        )
    }
}

/// A parsed YAML document (spec §3.6).
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub root: DocumentNode,
    pub explicit_start: bool,
    pub explicit_end: bool,
}
