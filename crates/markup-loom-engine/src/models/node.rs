use im::Vector;
use serde::Serialize;

use super::value::{Data, Value};

/// Whether a block sits in the block flow or inside a line of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Block,
    Inline,
}

/// An element of the document tree.
///
/// Nodes own their children outright and are never mutated in place:
/// every builder method returns a new value sharing untouched subtrees.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "object", rename_all = "lowercase")]
pub enum Node {
    Document(Document),
    Block(Block),
    Text(Text),
}

/// Root of a full transformation.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Document {
    pub nodes: Vector<Node>,
}

/// A typed node with a kind, data mapping, void flag and children.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Block {
    /// Type tag, either a standard type (see [`types`]) or a custom `x-<tag>`.
    #[serde(rename = "type")]
    pub node_type: String,
    pub kind: Kind,
    pub data: Data,
    /// Self-closing: no children of its own.
    pub is_void: bool,
    pub nodes: Vector<Node>,
}

/// A leaf holding raw string content.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Text {
    pub text: String,
}

/// Standard block and inline type tags.
pub mod types {
    pub const PARAGRAPH: &str = "paragraph";
    pub const UNSTYLED: &str = "unstyled";
    pub const BLOCKQUOTE: &str = "blockquote";
    pub const CODE_BLOCK: &str = "code_block";
    pub const HR: &str = "hr";
    pub const UL_ITEM: &str = "ul_item";
    pub const OL_ITEM: &str = "ol_item";
    pub const HEADINGS: [&str; 6] = [
        "heading_1",
        "heading_2",
        "heading_3",
        "heading_4",
        "heading_5",
        "heading_6",
    ];

    pub const BOLD: &str = "bold";
    pub const ITALIC: &str = "italic";
    pub const CODE: &str = "code";

    /// Prefix marking a custom (template tag) type.
    pub const CUSTOM_PREFIX: &str = "x-";

    pub fn is_list_item(node_type: &str) -> bool {
        node_type == UL_ITEM || node_type == OL_ITEM
    }

    /// Heading level (1-6) encoded in a heading type.
    pub fn heading_level(node_type: &str) -> Option<usize> {
        HEADINGS.iter().position(|h| *h == node_type).map(|i| i + 1)
    }
}

impl Node {
    pub fn text_node(text: impl Into<String>) -> Self {
        Node::Text(Text { text: text.into() })
    }

    /// Label used in diagnostics: `document`, `block`, `inline` or `text`.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Node::Document(_) => "document",
            Node::Block(b) => match b.kind {
                Kind::Block => "block",
                Kind::Inline => "inline",
            },
            Node::Text(_) => "text",
        }
    }

    pub fn node_type(&self) -> Option<&str> {
        match self {
            Node::Block(b) => Some(&b.node_type),
            _ => None,
        }
    }

    pub fn as_block(&self) -> Option<&Block> {
        match self {
            Node::Block(b) => Some(b),
            _ => None,
        }
    }

    /// True only for blocks of [`Kind::Block`].
    pub fn is_block_kind(&self) -> bool {
        matches!(self, Node::Block(b) if b.kind == Kind::Block)
    }

    pub fn children(&self) -> Option<&Vector<Node>> {
        match self {
            Node::Document(d) => Some(&d.nodes),
            Node::Block(b) => Some(&b.nodes),
            Node::Text(_) => None,
        }
    }

    /// Concatenated text of every descendant, in document order.
    pub fn text(&self) -> String {
        let mut out = String::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            match node {
                Node::Text(t) => out.push_str(&t.text),
                Node::Block(b) => stack.extend(b.nodes.iter().rev()),
                Node::Document(d) => stack.extend(d.nodes.iter().rev()),
            }
        }
        out
    }
}

impl From<Block> for Node {
    fn from(block: Block) -> Self {
        Node::Block(block)
    }
}

impl From<Text> for Node {
    fn from(text: Text) -> Self {
        Node::Text(text)
    }
}

impl Document {
    pub fn new<I: IntoIterator<Item = Node>>(nodes: I) -> Self {
        Self {
            nodes: nodes.into_iter().collect(),
        }
    }
}

impl Block {
    /// A non-void block of kind [`Kind::Block`] with no data and no children.
    pub fn new(node_type: impl Into<String>) -> Self {
        Self {
            node_type: node_type.into(),
            kind: Kind::Block,
            data: Data::new(),
            is_void: false,
            nodes: Vector::new(),
        }
    }

    /// Block of type `unstyled` wrapping a single text leaf.
    pub fn unstyled(text: impl Into<String>) -> Self {
        Self::new(types::UNSTYLED).with_text(text)
    }

    pub fn with_kind(mut self, kind: Kind) -> Self {
        self.kind = kind;
        self
    }

    pub fn as_inline(self) -> Self {
        self.with_kind(Kind::Inline)
    }

    /// Marks the block self-closing and drops its children.
    pub fn as_void(mut self) -> Self {
        self.is_void = true;
        self.nodes = Vector::new();
        self
    }

    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    pub fn with_all_data(mut self, data: Data) -> Self {
        self.data = data;
        self
    }

    pub fn with_nodes<I: IntoIterator<Item = Node>>(mut self, nodes: I) -> Self {
        self.nodes = nodes.into_iter().collect();
        self
    }

    pub fn with_text(self, text: impl Into<String>) -> Self {
        self.with_nodes([Node::text_node(text)])
    }

    /// Custom tag name for `x-<tag>` types.
    pub fn custom_tag(&self) -> Option<&str> {
        self.node_type.strip_prefix(types::CUSTOM_PREFIX)
    }

    pub fn text(&self) -> String {
        self.nodes.iter().map(Node::text).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_concatenates_descendants_in_order() {
        let node: Node = Block::new(types::PARAGRAPH)
            .with_nodes([
                Node::text_node("a"),
                Block::new(types::BOLD)
                    .as_inline()
                    .with_nodes([Node::text_node("b"), Node::text_node("c")])
                    .into(),
                Node::text_node("d"),
            ])
            .into();
        assert_eq!(node.text(), "abcd");
    }

    #[test]
    fn builders_leave_original_untouched() {
        let base = Block::new(types::PARAGRAPH).with_text("x");
        let changed = base.clone().with_data("k", "v").as_inline();
        assert!(base.data.is_empty());
        assert_eq!(base.kind, Kind::Block);
        assert_eq!(changed.kind, Kind::Inline);
        assert_eq!(changed.nodes, base.nodes);
    }

    #[test]
    fn void_blocks_have_no_children() {
        let hr = Block::new(types::HR).with_text("ignored").as_void();
        assert!(hr.is_void);
        assert!(hr.nodes.is_empty());
    }

    #[test]
    fn kind_names() {
        assert_eq!(Node::text_node("t").kind_name(), "text");
        assert_eq!(Node::from(Block::new("p")).kind_name(), "block");
        assert_eq!(Node::from(Block::new("b").as_inline()).kind_name(), "inline");
        assert_eq!(Node::Document(Document::default()).kind_name(), "document");
    }

    #[test]
    fn custom_tag_strips_prefix() {
        assert_eq!(Block::new("x-if").custom_tag(), Some("if"));
        assert_eq!(Block::new("paragraph").custom_tag(), None);
    }

    #[test]
    fn heading_levels() {
        assert_eq!(types::heading_level("heading_1"), Some(1));
        assert_eq!(types::heading_level("heading_6"), Some(6));
        assert_eq!(types::heading_level("paragraph"), None);
    }
}
