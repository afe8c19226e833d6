use std::sync::Arc;

use im::{HashMap, Vector};

use crate::error::Result;
use crate::models::{Document, Kind, Node, Value};

use super::rule::{BLOCKS, Rule, RulesSet};
use super::{lex, serialize};

/// Well-known property keys threaded through a transformation.
pub mod props {
    /// `Bool`: when false, templating tags are never parsed.
    pub const TEMPLATE: &str = "template";
    /// `List`: tags that close implicitly (else/elif branches).
    pub const UNENDING_TAGS: &str = "unending_tags";
    /// `List`: self-closing tags that never open a scope.
    pub const VOID_TAGS: &str = "void_tags";
    /// `Number`: deepest level whose content is still parsed.
    pub const MAX_DEPTH: &str = "max_depth";

    pub const DEFAULT_MAX_DEPTH: usize = 128;
    pub const DEFAULT_UNENDING_TAGS: [&str; 4] = ["else", "elif", "elsif", "when"];
    pub const DEFAULT_VOID_TAGS: [&str; 10] = [
        "include",
        "set",
        "assign",
        "import",
        "extends",
        "increment",
        "decrement",
        "cycle",
        "break",
        "continue",
    ];
}

/// Immutable snapshot of an in-progress transformation.
///
/// In the parse direction `text` is the remaining input and `nodes` the
/// output accumulator; in the serialize direction `nodes` is the stack of
/// nodes still to emit. Every operation returns a new `State`; the text is
/// shared and truncated by moving an offset, nodes and properties are
/// persistent collections.
#[derive(Clone, Debug)]
pub struct State {
    source: Arc<str>,
    offset: usize,
    nodes: Vector<Node>,
    active_rules: Arc<str>,
    rules_set: Arc<RulesSet>,
    depth: usize,
    properties: HashMap<String, Value>,
}

impl State {
    /// A fresh state using the `blocks` rule set of `rules_set`.
    pub fn create(rules_set: RulesSet) -> Self {
        Self {
            source: Arc::from(""),
            offset: 0,
            nodes: Vector::new(),
            active_rules: Arc::from(BLOCKS),
            rules_set: Arc::new(rules_set),
            depth: 0,
            properties: HashMap::new(),
        }
    }

    /// Remaining unconsumed text.
    pub fn text(&self) -> &str {
        &self.source[self.offset..]
    }

    /// Whether the remaining text starts a line of the current source.
    pub fn at_line_start(&self) -> bool {
        self.offset == 0 || self.source[..self.offset].ends_with('\n')
    }

    pub fn nodes(&self) -> &Vector<Node> {
        &self.nodes
    }

    pub fn active_rules(&self) -> &str {
        &self.active_rules
    }

    /// Rules of the active set, in match order.
    pub fn rules(&self) -> &[Arc<dyn Rule>] {
        self.rules_set.get(&self.active_rules)
    }

    pub fn rules_set(&self) -> &RulesSet {
        &self.rules_set
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Kind of the nodes at this level: block when the stack is empty or any
    /// node is a block-kind block, inline otherwise.
    pub fn kind(&self) -> Kind {
        if self.nodes.is_empty() || self.nodes.iter().any(Node::is_block_kind) {
            Kind::Block
        } else {
            Kind::Inline
        }
    }

    pub fn use_rules(mut self, name: &str) -> Self {
        self.active_rules = Arc::from(name);
        self
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.source = Arc::from(text);
        self.offset = 0;
        self
    }

    pub fn with_nodes(mut self, nodes: Vector<Node>) -> Self {
        self.nodes = nodes;
        self
    }

    pub fn push(mut self, node: Node) -> Self {
        self.nodes.push_back(node);
        self
    }

    /// Drops `n` bytes from the front of the remaining text.
    pub fn skip(mut self, n: usize) -> Self {
        self.offset = (self.offset + n).min(self.source.len());
        self
    }

    pub fn peek(&self) -> Option<&Node> {
        self.nodes.front()
    }

    pub fn shift(self) -> Self {
        self.shift_n(1)
    }

    pub fn shift_n(mut self, n: usize) -> Self {
        let n = n.min(self.nodes.len());
        self.nodes = self.nodes.skip(n);
        self
    }

    /// One level deeper.
    pub fn down(self) -> Self {
        self.down_by(1)
    }

    pub fn down_by(mut self, levels: usize) -> Self {
        self.depth += levels;
        self
    }

    /// One level up.
    pub fn up(mut self) -> Self {
        self.depth = self.depth.saturating_sub(1);
        self
    }

    pub fn prop(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    pub fn with_prop(mut self, key: impl Into<String>, value: Value) -> Self {
        self.properties.insert(key.into(), value);
        self
    }

    /// Sets a property to a list of tag names.
    pub fn with_tags<I, S>(self, key: &str, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with_prop(key, Value::symbols(tags))
    }

    /// Whether the tag list stored under `key` contains `tag`.
    pub fn has_tag(&self, key: &str, tag: &str) -> bool {
        self.prop(key)
            .and_then(Value::as_list)
            .is_some_and(|tags| tags.iter().any(|t| t.as_str() == Some(tag)))
    }

    pub fn template_enabled(&self) -> bool {
        self.prop(props::TEMPLATE)
            .and_then(Value::as_bool)
            .unwrap_or(true)
    }

    pub fn max_depth(&self) -> usize {
        self.prop(props::MAX_DEPTH)
            .and_then(Value::as_number)
            .map(|n| n.max(0.0) as usize)
            .unwrap_or(props::DEFAULT_MAX_DEPTH)
    }

    /// Parses `text` into nodes with the active rule set.
    pub fn deserialize(&self, text: &str) -> Result<Vector<Node>> {
        let state = self.clone().down().with_text(text).with_nodes(Vector::new());
        lex::run(state)
    }

    pub fn deserialize_to_document(&self, text: &str) -> Result<Document> {
        Ok(Document {
            nodes: self.deserialize(text)?,
        })
    }

    /// Emits `nodes` as text with the active rule set.
    pub fn serialize(&self, nodes: Vector<Node>) -> Result<String> {
        let state = self.clone().down().with_text("").with_nodes(nodes);
        serialize::run(state)
    }

    pub fn serialize_document(&self, document: &Document) -> Result<String> {
        self.serialize(document.nodes.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Block, types};

    fn empty() -> State {
        State::create(RulesSet::new())
    }

    #[test]
    fn empty_stack_is_block_kind() {
        assert_eq!(empty().kind(), Kind::Block);
    }

    #[test]
    fn inline_only_stack_is_inline_kind() {
        let state = empty()
            .push(Node::text_node("a"))
            .push(Block::new(types::BOLD).as_inline().into());
        assert_eq!(state.kind(), Kind::Inline);
    }

    #[test]
    fn any_block_sibling_makes_block_kind() {
        let state = empty()
            .push(Node::text_node("a"))
            .push(Block::new(types::PARAGRAPH).into());
        assert_eq!(state.kind(), Kind::Block);
    }

    #[test]
    fn transitions_return_new_states() {
        let base = empty().with_text("hello");
        let skipped = base.clone().skip(2);
        assert_eq!(base.text(), "hello");
        assert_eq!(skipped.text(), "llo");

        let pushed = base.clone().push(Node::text_node("x"));
        assert!(base.nodes().is_empty());
        assert_eq!(pushed.nodes().len(), 1);
    }

    #[test]
    fn line_start_follows_the_offset() {
        let state = empty().with_text("ab\ncd");
        assert!(state.at_line_start());
        assert!(!state.clone().skip(1).at_line_start());
        assert!(state.skip(3).at_line_start());
    }

    #[test]
    fn skip_is_clamped_to_text() {
        assert_eq!(empty().with_text("ab").skip(10).text(), "");
    }

    #[test]
    fn shift_takes_from_the_front() {
        let state = empty()
            .push(Node::text_node("a"))
            .push(Node::text_node("b"))
            .push(Node::text_node("c"));
        let shifted = state.clone().shift();
        assert_eq!(shifted.peek(), Some(&Node::text_node("b")));
        assert_eq!(state.shift_n(5).nodes().len(), 0);
    }

    #[test]
    fn depth_moves_by_one() {
        let state = empty().down().down();
        assert_eq!(state.depth(), 2);
        assert_eq!(state.up().depth(), 1);
        assert_eq!(empty().up().depth(), 0);
    }

    #[test]
    fn tag_properties() {
        let state = empty().with_tags(props::UNENDING_TAGS, ["else", "elif"]);
        assert!(state.has_tag(props::UNENDING_TAGS, "else"));
        assert!(!state.has_tag(props::UNENDING_TAGS, "if"));
        assert!(!state.has_tag(props::VOID_TAGS, "else"));
    }

    #[test]
    fn defaults_for_missing_properties() {
        let state = empty();
        assert!(state.template_enabled());
        assert_eq!(state.max_depth(), props::DEFAULT_MAX_DEPTH);

        let state = state
            .with_prop(props::TEMPLATE, Value::Bool(false))
            .with_prop(props::MAX_DEPTH, Value::Number(3.0));
        assert!(!state.template_enabled());
        assert_eq!(state.max_depth(), 3);
    }

    #[test]
    fn use_rules_switches_active_set() {
        let state = empty().use_rules("inlines");
        assert_eq!(state.active_rules(), "inlines");
        assert!(state.rules().is_empty());
    }
}
