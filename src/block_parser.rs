//! C5 BlockParser (spec §4.5): the recursive-descent core that turns
//! annotated lines into a [`DocumentNode`] tree, interleaving block
//! structure (indentation-delimited sequences and mappings) with the inline
//! grammar ([`InlineScanner`], [`block_scalar`], [`plain_folder`]) at
//! whatever column a value happens to start.
//!
//! Grounded in the teacher's `yaml_parser_parse_node`/`parse_block_sequence`/
//! `parse_block_mapping` family (`parser.rs`), which drives the same
//! indentation-stack dispatch from a state machine over scanner tokens; here
//! the state machine is replaced with plain recursion over `&[Line]`, since
//! the whole input is already resident rather than arriving token-by-token
//! from the teacher's one-token-lookahead scanner.

use crate::block_scalar;
use crate::chars;
use crate::comment;
use crate::document::{CollectionStyle, DocumentNode, Scalar, ScalarStyle};
use crate::error::{Error, Location, Result};
use crate::line_model::Line;
use crate::scanner::InlineScanner;
use crate::tag_resolver::{self, TagHandleTable};

/// Drives `parse_node` over a fixed line table and tag-handle table for one
/// document (spec §4.5's single recursive entry point).
pub struct BlockParser<'a> {
    lines: &'a [Line],
    tag_handles: &'a TagHandleTable,
}

impl<'a> BlockParser<'a> {
    pub fn new(lines: &'a [Line], tag_handles: &'a TagHandleTable) -> Self {
        BlockParser { lines, tag_handles }
    }

    /// Parses one node starting at or after `start`, requiring its opening
    /// line to be indented at least `expected_indent`. A `start` at or past
    /// end of input, or whose first usable line is under-indented, yields
    /// an empty scalar without consuming anything (spec §4.5's "absent
    /// node" case — e.g. a mapping value left blank).
    pub fn parse_node(&self, start: usize, expected_indent: u32) -> Result<(DocumentNode, usize)> {
        let idx = self.skip_blank_lines(start);
        if idx >= self.lines.len() || self.lines[idx].indent < expected_indent {
            return Ok((DocumentNode::empty_scalar(), idx));
        }
        let line = &self.lines[idx];
        if line.has_tab_indent {
            return Err(Error::indentation(Location::new(line.number, 1)));
        }
        self.parse_node_at(idx, line.indent as usize, expected_indent)
    }

    /// Parses one node whose content starts at `(idx, col)` — `col` may be
    /// the line's own leading indent (the ordinary case) or a column further
    /// right on the same line (an inline sequence/mapping value, e.g. the
    /// `key: value` after the colon, or the `item` after `- `).
    /// `expected_indent` is the indent required of any further lines that
    /// continue *this* node (a nested block collection opened here must
    /// align to `col`, matching the "compact nested collection" convention).
    fn parse_node_at(
        &self,
        idx: usize,
        col: usize,
        expected_indent: u32,
    ) -> Result<(DocumentNode, usize)> {
        let mut scanner = InlineScanner::at(self.lines, idx, col);
        let (raw_tag, anchor) = scanner.parse_decorators(false)?;
        let decorator_loc = scanner.location();
        let tag = match raw_tag {
            Some(rt) => Some(tag_resolver::resolve_tag(&rt, self.tag_handles, decorator_loc)?),
            None => None,
        };
        let (li, scol) = scanner.position();
        let eff_end = self.effective_end(li, scol);

        if scol >= eff_end {
            if tag.is_some() || anchor.is_some() {
                let (inner, next_idx) = self.parse_node(li + 1, expected_indent)?;
                return Ok((with_decorators(inner, tag, anchor), next_idx));
            }
            return Ok((DocumentNode::empty_scalar(), li + 1));
        }

        let cur_line = &self.lines[li];
        let slice = &cur_line.chars[scol..eff_end];

        if slice_starts_with(slice, "- ") || slice_eq(slice, "-") {
            if tag.is_some() || anchor.is_some() {
                return Err(Error::syntax(
                    "Sequence entry cannot be preceded by tag or anchor",
                    decorator_loc,
                ));
            }
            return self.parse_block_sequence(li, scol as u32);
        }

        if slice_starts_with(slice, "? ") || slice_eq(slice, "?") {
            let (node, next_idx) = self.parse_block_mapping(li, scol)?;
            return Ok((with_decorators(node, tag, anchor), next_idx));
        }

        if let Some(rel) = find_implicit_colon(slice) {
            if !is_bare_decorator_colon(slice, rel) {
                let (node, next_idx) = self.parse_block_mapping(li, scol)?;
                return Ok((with_decorators(node, tag, anchor), next_idx));
            }
        }

        match slice[0] {
            '[' => {
                scanner.advance_one();
                let node = self.parse_flow_sequence(&mut scanner, tag, anchor, scol as u32)?;
                let next_idx = scanner.position().0 + 1;
                Ok((node, next_idx))
            }
            '{' => {
                scanner.advance_one();
                let node = self.parse_flow_mapping(&mut scanner, tag, anchor, scol as u32)?;
                let next_idx = scanner.position().0 + 1;
                Ok((node, next_idx))
            }
            '|' | '>' => {
                let header: String = slice.iter().collect();
                let (style, text, next_idx) = block_scalar::read_block_scalar(
                    self.lines,
                    li + 1,
                    &header,
                    cur_line.indent,
                    decorator_loc,
                )?;
                Ok((DocumentNode::Scalar(Scalar { text, style }, tag, anchor), next_idx))
            }
            '"' => {
                let text = scanner.parse_double_quoted(expected_indent)?;
                let next_idx = scanner.position().0 + 1;
                Ok((
                    DocumentNode::Scalar(
                        Scalar { text, style: ScalarStyle::DoubleQuoted },
                        tag,
                        anchor,
                    ),
                    next_idx,
                ))
            }
            '\'' => {
                let text = scanner.parse_single_quoted(expected_indent)?;
                let next_idx = scanner.position().0 + 1;
                Ok((
                    DocumentNode::Scalar(
                        Scalar { text, style: ScalarStyle::SingleQuoted },
                        tag,
                        anchor,
                    ),
                    next_idx,
                ))
            }
            '*' => {
                if tag.is_some() || anchor.is_some() {
                    return Err(Error::syntax("Alias cannot carry tag or anchor", decorator_loc));
                }
                let name = scanner.parse_alias()?;
                let next_idx = scanner.position().0 + 1;
                Ok((DocumentNode::Alias(name), next_idx))
            }
            _ => {
                let frag = scanner.parse_plain_scalar(true, false)?;
                let (fli, fcol) = scanner.position();
                // `expected_indent` is the indent required of this node by its
                // enclosing context (0 at the root, `map_col + 1` for a mapping
                // value, `seq_indent + 1` for a sequence item) — exactly the
                // threshold a continuation line of this scalar must clear.
                let (text, next_idx, _) =
                    crate::plain_folder::fold_plain_scalar(self.lines, fli, fcol, frag, expected_indent, false, true)?;
                Ok((
                    DocumentNode::Scalar(Scalar { text, style: ScalarStyle::Plain }, tag, anchor),
                    next_idx,
                ))
            }
        }
    }

    /// Block sequence (spec §4.5.2): a run of `- ` (or bare `-`) lines at
    /// exactly `seq_indent`. An empty remainder after the dash means the
    /// item is the node found on subsequent lines indented past the dash;
    /// a non-empty remainder is parsed inline starting right after it.
    /// `seq_indent` is the column of the dash itself. The dispatch line
    /// (`start_idx`) is consumed unconditionally — the caller already
    /// confirmed its shape, and for a compact nested sequence (`- - a`) that
    /// column sits mid-line, past where `start_idx`'s own leading-whitespace
    /// indent would suggest. Every sibling item after the first, in
    /// contrast, is a fresh physical line whose *actual* leading indent must
    /// equal `seq_indent` exactly.
    fn parse_block_sequence(&self, start_idx: usize, seq_indent: u32) -> Result<(DocumentNode, usize)> {
        let mut items = Vec::new();
        let (first, next_idx) = self.parse_sequence_item(start_idx, seq_indent)?;
        items.push(first);
        let mut cur = next_idx;
        loop {
            let probe = self.skip_blank_lines(cur);
            if probe >= self.lines.len() {
                cur = probe;
                break;
            }
            let line = &self.lines[probe];
            if line.indent != seq_indent {
                cur = probe;
                break;
            }
            if line.has_tab_indent {
                return Err(Error::indentation(Location::new(line.number, 1)));
            }
            let eff_end = self.effective_end(probe, line.indent as usize);
            let slice = &line.chars[line.indent as usize..eff_end];
            if !(slice_starts_with(slice, "- ") || slice_eq(slice, "-")) {
                cur = probe;
                break;
            }
            let (item, next_idx) = self.parse_sequence_item(probe, seq_indent)?;
            items.push(item);
            cur = next_idx;
        }
        Ok((DocumentNode::Sequence(items, CollectionStyle::Block, None, None), cur))
    }

    /// Parses the single item introduced by the dash at column `seq_indent`
    /// on line `idx`.
    fn parse_sequence_item(&self, idx: usize, seq_indent: u32) -> Result<(DocumentNode, usize)> {
        let dash_col = seq_indent as usize;
        let eff_end = self.effective_end(idx, dash_col);
        let line = &self.lines[idx];
        let mut value_col = dash_col + 1;
        while value_col < eff_end && chars::is_blank(line.chars[value_col]) {
            value_col += 1;
        }
        if value_col >= eff_end {
            self.parse_node(idx + 1, seq_indent + 1)
        } else {
            self.parse_node_at(idx, value_col, seq_indent + 1)
        }
    }

    /// Block mapping (spec §4.5.3): a run of implicit (`key: value`) or
    /// explicit (`? key` / `: value`) entries at exactly `map_col`, in any
    /// mixture. Stops at the first line that matches neither shape.
    /// `map_col` is the column the entry's key (or `?`) starts at. As with
    /// [`Self::parse_block_sequence`], the dispatch line is consumed
    /// unconditionally (a compact nested mapping, e.g. `- a: {b: c}`'s `a`
    /// itself, sits mid-line) while every following sibling entry must be a
    /// fresh physical line whose actual leading indent equals `map_col`.
    fn parse_block_mapping(&self, start_idx: usize, map_col: usize) -> Result<(DocumentNode, usize)> {
        let mut entries = Vec::new();
        let (first, next_idx) = self
            .mapping_entry(start_idx, map_col)?
            .expect("caller verified mapping shape before dispatching here");
        entries.push(first);
        let mut cur = next_idx;
        loop {
            let probe = self.skip_blank_lines(cur);
            if probe >= self.lines.len() {
                cur = probe;
                break;
            }
            let line = &self.lines[probe];
            if line.indent as usize != map_col {
                cur = probe;
                break;
            }
            if line.has_tab_indent {
                return Err(Error::indentation(Location::new(line.number, 1)));
            }
            match self.mapping_entry(probe, map_col)? {
                Some((entry, next_idx)) => {
                    entries.push(entry);
                    cur = next_idx;
                }
                None => {
                    cur = probe;
                    break;
                }
            }
        }
        Ok((DocumentNode::Mapping(entries, CollectionStyle::Block, None, None), cur))
    }

    /// Parses one mapping entry at `(idx, map_col)` if the line has that
    /// shape (explicit `? `/`?`, or implicit with a qualifying unquoted
    /// `:`); `None` if it has neither, meaning the mapping ends before this
    /// line.
    fn mapping_entry(
        &self,
        idx: usize,
        map_col: usize,
    ) -> Result<Option<((DocumentNode, DocumentNode), usize)>> {
        let eff_end = self.effective_end(idx, map_col);
        if map_col >= eff_end {
            return Ok(None);
        }
        let line = &self.lines[idx];
        let slice = &line.chars[map_col..eff_end];

        if slice_starts_with(slice, "? ") || slice_eq(slice, "?") {
            let (key, value, next_idx) = self.parse_explicit_entry(idx, map_col)?;
            return Ok(Some(((key, value), next_idx)));
        }
        if let Some(rel) = find_implicit_colon(slice) {
            if !is_bare_decorator_colon(slice, rel) {
                let (key, value, next_idx) = self.parse_implicit_entry(idx, map_col, rel)?;
                return Ok(Some(((key, value), next_idx)));
            }
        }
        Ok(None)
    }

    /// `key: value` (spec §4.5.3, implicit form). The key is scanned
    /// inline-only (it cannot itself be a multi-line block node — it must
    /// fit between the entry's indent and the colon on one line); the value
    /// follows the usual empty-remainder-means-next-line rule.
    fn parse_implicit_entry(
        &self,
        idx: usize,
        map_col: usize,
        colon_rel: usize,
    ) -> Result<(DocumentNode, DocumentNode, usize)> {
        let colon_abs = map_col + colon_rel;
        let key = if colon_abs > map_col {
            self.parse_inline_key(idx, map_col)?
        } else {
            DocumentNode::empty_scalar()
        };

        let eff_end = self.effective_end(idx, map_col);
        let mut vcol = colon_abs + 1;
        while vcol < eff_end && chars::is_blank(self.lines[idx].chars[vcol]) {
            vcol += 1;
        }
        if vcol >= eff_end {
            let (value, next_idx) = self.parse_node(idx + 1, map_col as u32 + 1)?;
            Ok((key, value, next_idx))
        } else {
            let vslice = &self.lines[idx].chars[vcol..eff_end];
            if slice_starts_with(vslice, "- ") || slice_eq(vslice, "-") {
                return Err(Error::syntax(
                    "Sequence value must start on a new line",
                    Location::new(self.lines[idx].number, vcol as u32 + 1),
                ));
            }
            let (value, next_idx) = self.parse_node_at(idx, vcol, map_col as u32 + 1)?;
            Ok((key, value, next_idx))
        }
    }

    /// `? key` / `: value` (spec §4.5.3, explicit form). Unlike the implicit
    /// form, both key and value may themselves be full nested block nodes.
    fn parse_explicit_entry(
        &self,
        idx: usize,
        map_col: usize,
    ) -> Result<(DocumentNode, DocumentNode, usize)> {
        let line = &self.lines[idx];
        let eff_end = self.effective_end(idx, map_col);
        let mut kcol = map_col + 1;
        while kcol < eff_end && chars::is_blank(line.chars[kcol]) {
            kcol += 1;
        }
        let (key, after_key_idx) = if kcol >= eff_end {
            self.parse_node(idx + 1, map_col as u32 + 1)?
        } else {
            self.parse_node_at(idx, kcol, map_col as u32 + 1)?
        };

        let probe = self.skip_blank_lines(after_key_idx);
        if probe < self.lines.len() {
            let pline = &self.lines[probe];
            if pline.indent as usize == map_col && !pline.has_tab_indent {
                let peff_end = self.effective_end(probe, map_col);
                let pslice = &pline.chars[map_col..peff_end];
                if slice_starts_with(pslice, ": ") || slice_eq(pslice, ":") {
                    let mut vcol = map_col + 1;
                    while vcol < peff_end && chars::is_blank(pline.chars[vcol]) {
                        vcol += 1;
                    }
                    let (value, next_idx) = if vcol >= peff_end {
                        self.parse_node(probe + 1, map_col as u32 + 1)?
                    } else {
                        self.parse_node_at(probe, vcol, map_col as u32 + 1)?
                    };
                    return Ok((key, value, next_idx));
                }
            }
        }
        Ok((key, DocumentNode::empty_scalar(), after_key_idx))
    }

    /// Parses an implicit mapping's key, which per spec §4.5.3 is always
    /// inline: a quoted scalar, a flow collection, an alias, or a plain
    /// scalar run up to (not including) the colon already located by the
    /// caller. Never re-dispatches through [`Self::parse_node_at`] — doing
    /// so on the same line would just rediscover the same colon.
    fn parse_inline_key(&self, idx: usize, col: usize) -> Result<DocumentNode> {
        let mut scanner = InlineScanner::at(self.lines, idx, col);
        let (raw_tag, anchor) = scanner.parse_decorators(false)?;
        let loc = scanner.location();
        let tag = match raw_tag {
            Some(rt) => Some(tag_resolver::resolve_tag(&rt, self.tag_handles, loc)?),
            None => None,
        };
        match scanner.peek_char() {
            Some('"') => {
                let text = scanner.parse_double_quoted(col as u32)?;
                Ok(DocumentNode::Scalar(Scalar { text, style: ScalarStyle::DoubleQuoted }, tag, anchor))
            }
            Some('\'') => {
                let text = scanner.parse_single_quoted(col as u32)?;
                Ok(DocumentNode::Scalar(Scalar { text, style: ScalarStyle::SingleQuoted }, tag, anchor))
            }
            Some('[') => {
                let (_, opener_col) = scanner.position();
                scanner.advance_one();
                self.parse_flow_sequence(&mut scanner, tag, anchor, opener_col as u32)
            }
            Some('{') => {
                let (_, opener_col) = scanner.position();
                scanner.advance_one();
                self.parse_flow_mapping(&mut scanner, tag, anchor, opener_col as u32)
            }
            Some('*') => {
                if tag.is_some() || anchor.is_some() {
                    return Err(Error::syntax("Alias cannot carry tag or anchor", loc));
                }
                let name = scanner.parse_alias()?;
                Ok(DocumentNode::Alias(name))
            }
            _ => {
                let text = scanner.parse_plain_scalar(true, false)?;
                Ok(DocumentNode::Scalar(Scalar { text, style: ScalarStyle::Plain }, tag, anchor))
            }
        }
    }

    /// Flow collection value (spec §4.5.5): shared by top-level dispatch,
    /// mapping-key dispatch, and recursive flow nesting. The `InlineScanner`
    /// cursor already crosses physical lines transparently via its virtual
    /// `'\n'` (see its doc comment), so the only addition needed here is
    /// [`InlineScanner::skip_flow_separators`] treating that `'\n'` as
    /// ordinary whitespace between flow tokens.
    fn parse_flow_value(&self, scanner: &mut InlineScanner, min_indent: u32) -> Result<DocumentNode> {
        scanner.skip_flow_separators(min_indent)?;
        let (raw_tag, anchor) = scanner.parse_decorators(true)?;
        let loc = scanner.location();
        let tag = match raw_tag {
            Some(rt) => Some(tag_resolver::resolve_tag(&rt, self.tag_handles, loc)?),
            None => None,
        };
        scanner.skip_flow_separators(min_indent)?;
        match scanner.peek_char() {
            Some('[') => {
                let (_, opener_col) = scanner.position();
                scanner.advance_one();
                self.parse_flow_sequence(scanner, tag, anchor, opener_col as u32)
            }
            Some('{') => {
                let (_, opener_col) = scanner.position();
                scanner.advance_one();
                self.parse_flow_mapping(scanner, tag, anchor, opener_col as u32)
            }
            Some('"') => {
                let text = scanner.parse_double_quoted(min_indent)?;
                Ok(DocumentNode::Scalar(Scalar { text, style: ScalarStyle::DoubleQuoted }, tag, anchor))
            }
            Some('\'') => {
                let text = scanner.parse_single_quoted(min_indent)?;
                Ok(DocumentNode::Scalar(Scalar { text, style: ScalarStyle::SingleQuoted }, tag, anchor))
            }
            Some('*') => {
                if tag.is_some() || anchor.is_some() {
                    return Err(Error::syntax("Alias cannot carry tag or anchor", loc));
                }
                let name = scanner.parse_alias()?;
                Ok(DocumentNode::Alias(name))
            }
            _ => {
                let text = scanner.parse_plain_scalar(true, true)?;
                Ok(DocumentNode::Scalar(Scalar { text, style: ScalarStyle::Plain }, tag, anchor))
            }
        }
    }

    /// `min_indent` is this collection's own opener column (spec §4.5.5):
    /// every non-blank continuation line crossed while scanning its content
    /// must be indented at least that far, and none may be a `---`/`...`
    /// document marker.
    fn parse_flow_sequence(
        &self,
        scanner: &mut InlineScanner,
        tag: Option<String>,
        anchor: Option<String>,
        min_indent: u32,
    ) -> Result<DocumentNode> {
        let mut items = Vec::new();
        scanner.skip_flow_separators(min_indent)?;
        if scanner.peek_char() == Some(']') {
            scanner.advance_one();
            return Ok(DocumentNode::Sequence(items, CollectionStyle::Flow, tag, anchor));
        }
        loop {
            items.push(self.parse_flow_value(scanner, min_indent)?);
            scanner.skip_flow_separators(min_indent)?;
            match scanner.peek_char() {
                Some(',') => {
                    scanner.advance_one();
                    scanner.skip_flow_separators(min_indent)?;
                    if scanner.peek_char() == Some(']') {
                        scanner.advance_one();
                        break;
                    }
                }
                Some(']') => {
                    scanner.advance_one();
                    break;
                }
                _ => return Err(Error::syntax("Unterminated flow collection", scanner.location())),
            }
        }
        Ok(DocumentNode::Sequence(items, CollectionStyle::Flow, tag, anchor))
    }

    /// See [`Self::parse_flow_sequence`] for `min_indent`.
    fn parse_flow_mapping(
        &self,
        scanner: &mut InlineScanner,
        tag: Option<String>,
        anchor: Option<String>,
        min_indent: u32,
    ) -> Result<DocumentNode> {
        let mut entries = Vec::new();
        scanner.skip_flow_separators(min_indent)?;
        if scanner.peek_char() == Some('}') {
            scanner.advance_one();
            return Ok(DocumentNode::Mapping(entries, CollectionStyle::Flow, tag, anchor));
        }
        loop {
            scanner.skip_flow_separators(min_indent)?;
            let key = if scanner.peek_char() == Some('?') {
                scanner.advance_one();
                scanner.skip_flow_separators(min_indent)?;
                self.parse_flow_value(scanner, min_indent)?
            } else {
                self.parse_flow_value(scanner, min_indent)?
            };
            scanner.skip_flow_separators(min_indent)?;
            let value = if scanner.peek_char() == Some(':') {
                scanner.advance_one();
                scanner.skip_flow_separators(min_indent)?;
                self.parse_flow_value(scanner, min_indent)?
            } else {
                DocumentNode::empty_scalar()
            };
            entries.push((key, value));
            scanner.skip_flow_separators(min_indent)?;
            match scanner.peek_char() {
                Some(',') => {
                    scanner.advance_one();
                    scanner.skip_flow_separators(min_indent)?;
                    if scanner.peek_char() == Some('}') {
                        scanner.advance_one();
                        break;
                    }
                }
                Some('}') => {
                    scanner.advance_one();
                    break;
                }
                _ => return Err(Error::syntax("Unterminated flow collection", scanner.location())),
            }
        }
        Ok(DocumentNode::Mapping(entries, CollectionStyle::Flow, tag, anchor))
    }

    /// Skips lines that are blank or comment-only (spec §4.2/§4.5): neither
    /// carries structure, so dispatch always looks past them.
    fn skip_blank_lines(&self, start: usize) -> usize {
        let mut idx = start;
        while idx < self.lines.len() {
            let line = &self.lines[idx];
            if line.is_blank() {
                idx += 1;
                continue;
            }
            let raw: String = line.chars[line.indent as usize..].iter().collect();
            if comment::strip_comment(&raw).trim().is_empty() {
                idx += 1;
                continue;
            }
            break;
        }
        idx
    }

    /// The column at which `line`'s usable content (after stripping a
    /// trailing comment and trailing whitespace) ends, starting the scan at
    /// `col`. Dispatch and entry parsing both work from this bound so a
    /// trailing `# comment` is never mistaken for part of a value.
    fn effective_end(&self, idx: usize, col: usize) -> usize {
        let line = &self.lines[idx];
        if col >= line.chars.len() {
            return col;
        }
        let raw: String = line.chars[col..].iter().collect();
        let trimmed_len = comment::strip_comment(&raw).trim_end().chars().count();
        col + trimmed_len
    }
}

fn with_decorators(node: DocumentNode, tag: Option<String>, anchor: Option<String>) -> DocumentNode {
    match node {
        DocumentNode::Scalar(s, _, _) => DocumentNode::Scalar(s, tag, anchor),
        DocumentNode::Sequence(items, style, _, _) => DocumentNode::Sequence(items, style, tag, anchor),
        DocumentNode::Mapping(entries, style, _, _) => DocumentNode::Mapping(entries, style, tag, anchor),
        DocumentNode::Alias(name) => DocumentNode::Alias(name),
    }
}

fn slice_starts_with(slice: &[char], pat: &str) -> bool {
    let pat: Vec<char> = pat.chars().collect();
    slice.len() >= pat.len() && slice[..pat.len()] == pat[..]
}

fn slice_eq(slice: &[char], pat: &str) -> bool {
    let pat: Vec<char> = pat.chars().collect();
    slice == pat.as_slice()
}

/// Finds the leftmost `:` that splits a mapping entry (spec §4.5.3): outside
/// quotes, at flow-bracket depth 0, and immediately followed by whitespace
/// or end of content (a trailing bare `:` with nothing after it also
/// counts). Returns the offset relative to `slice`.
fn find_implicit_colon(slice: &[char]) -> Option<usize> {
    let mut in_single = false;
    let mut in_double = false;
    let mut depth = 0i32;
    for (i, &c) in slice.iter().enumerate() {
        match c {
            '\'' if !in_double => in_single = !in_single,
            '"' if !in_single => in_double = !in_double,
            '[' | '{' if !in_single && !in_double => depth += 1,
            ']' | '}' if !in_single && !in_double => depth -= 1,
            ':' if !in_single && !in_double && depth == 0 => {
                let stops = match slice.get(i + 1) {
                    None => true,
                    Some(c) => c.is_whitespace(),
                };
                if stops {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// A bare `*alias:` or `&anchor:` — decorator syntax immediately followed by
/// a trailing colon with nothing after it — is not a mapping key (spec
/// §4.5.3's carve-out); it is the decorator-then-scalar dispatch that should
/// run instead.
fn is_bare_decorator_colon(slice: &[char], colon_rel: usize) -> bool {
    if colon_rel == 0 || colon_rel != slice.len() - 1 {
        return false;
    }
    let head = &slice[..colon_rel];
    (head[0] == '*' || head[0] == '&') && !head[1..].iter().any(|c| c.is_whitespace())
}
