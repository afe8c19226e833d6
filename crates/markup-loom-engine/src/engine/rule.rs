use std::collections::BTreeMap;
use std::sync::Arc;

use crate::models::{Block, Node};

use super::state::State;

/// Name of the rule set used for block-level content.
pub const BLOCKS: &str = "blocks";
/// Name of the rule set used for inline content.
pub const INLINES: &str = "inlines";

/// How a rule's inner content is parsed (and therefore rendered).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParseMode {
    /// Inner content is kept as literal text.
    #[default]
    Off,
    Block,
    Inline,
}

impl ParseMode {
    /// Rule set handling content parsed in this mode.
    pub fn rules(self) -> Option<&'static str> {
        match self {
            ParseMode::Off => None,
            ParseMode::Block => Some(BLOCKS),
            ParseMode::Inline => Some(INLINES),
        }
    }
}

/// Per-rule configuration surface consulted by the rule's own logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleOptions {
    pub parse: ParseMode,
    /// Render children through the serializer before calling [`Rule::render`].
    pub render_inner: bool,
}

impl Default for RuleOptions {
    fn default() -> Self {
        Self {
            parse: ParseMode::Off,
            render_inner: true,
        }
    }
}

impl RuleOptions {
    pub fn parse(mode: ParseMode) -> Self {
        Self {
            parse: mode,
            ..Self::default()
        }
    }

    /// Literal content: nothing parsed inside, nothing rendered recursively.
    pub fn raw() -> Self {
        Self {
            parse: ParseMode::Off,
            render_inner: false,
        }
    }
}

/// One unit of output from a parse match.
#[derive(Debug, Clone, PartialEq)]
pub enum Production {
    /// A finished node appended as-is.
    Node(Node),
    /// A block whose children are lexed from `inner` one level deeper.
    Nest {
        block: Block,
        inner: String,
        mode: ParseMode,
    },
    /// A non-void block whose end is found by the nested-block resolver.
    Open(Block),
}

/// Result of a successful parse attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct Match {
    /// Bytes consumed from the front of the remaining text.
    pub consumed: usize,
    pub productions: Vec<Production>,
}

impl Match {
    pub fn new(consumed: usize, productions: Vec<Production>) -> Self {
        Self {
            consumed,
            productions,
        }
    }

    /// Consumes text without producing anything.
    pub fn skip(consumed: usize) -> Self {
        Self::new(consumed, vec![])
    }

    pub fn node(consumed: usize, node: impl Into<Node>) -> Self {
        Self::new(consumed, vec![Production::Node(node.into())])
    }

    pub fn nest(consumed: usize, block: Block, inner: impl Into<String>, mode: ParseMode) -> Self {
        Self::new(
            consumed,
            vec![Production::Nest {
                block,
                inner: inner.into(),
                mode,
            }],
        )
    }

    pub fn open(consumed: usize, block: Block) -> Self {
        Self::new(consumed, vec![Production::Open(block)])
    }
}

/// A claimed node together with its rendered children, if any were rendered.
#[derive(Debug, Clone, Copy)]
pub struct Rendered<'a> {
    pub node: &'a Node,
    pub inner: Option<&'a str>,
}

impl Rendered<'_> {
    /// Rendered children, falling back to the node's raw text.
    pub fn inner_or_text(&self) -> String {
        match self.inner {
            Some(inner) => inner.to_string(),
            None => self.node.text(),
        }
    }
}

/// A grammar unit with optional parse and emit capabilities.
///
/// Both capabilities default to "never matches", so a rule only implements
/// the directions it supports. Parsing returns a [`Match`]; emitting is split
/// in two steps so that children can be rendered by the engine in between:
/// [`claim`](Rule::claim) reports how many nodes from the front of the
/// pending stack the rule takes, and [`render`](Rule::render) produces the
/// text once their inner content is available.
pub trait Rule: Send + Sync {
    fn name(&self) -> &str;

    fn options(&self) -> RuleOptions {
        RuleOptions::default()
    }

    fn parse(&self, _state: &State) -> Option<Match> {
        None
    }

    fn claim(&self, _state: &State) -> Option<usize> {
        None
    }

    /// `state` still holds the claimed nodes at the front of its stack.
    fn render(&self, _state: &State, _claimed: &[Rendered<'_>]) -> String {
        String::new()
    }

    /// Rule set used to render the children of a claimed block.
    fn inner_rules(&self, _block: &Block) -> Option<&'static str> {
        let options = self.options();
        if options.render_inner {
            options.parse.rules()
        } else {
            None
        }
    }
}

/// Claims one node when the front of the stack is a block of `node_type`.
pub fn claim_type(state: &State, node_type: &str) -> Option<usize> {
    match state.peek() {
        Some(Node::Block(b)) if b.node_type == node_type => Some(1),
        _ => None,
    }
}

/// Ordered rules keyed by rule-set name. Fixed once built.
#[derive(Clone, Default)]
pub struct RulesSet {
    sets: BTreeMap<String, Vec<Arc<dyn Rule>>>,
}

impl RulesSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or replaces) the ordered rules for `name`.
    pub fn with(mut self, name: impl Into<String>, rules: Vec<Arc<dyn Rule>>) -> Self {
        self.sets.insert(name.into(), rules);
        self
    }

    /// Rules of a set, empty when the set is unknown.
    pub fn get(&self, name: &str) -> &[Arc<dyn Rule>] {
        self.sets.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.sets.keys().map(String::as_str)
    }
}

impl std::fmt::Debug for RulesSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for (name, rules) in &self.sets {
            let names: Vec<&str> = rules.iter().map(|r| r.name()).collect();
            map.entry(name, &names);
        }
        map.finish()
    }
}
