//! Templating tags.
//!
//! Parsing turns `{% tag … %}` into an `x-<tag>` block. Void tags and
//! closers become void nodes; any other tag is opened and handed to the
//! nested-block resolver, which collects its children up to the closer. A
//! tag alone on its line is block kind; anywhere else it is inline.

use crate::engine::{
    BLOCKS, CLOSER_DATA_PREFIX, INLINES, Match, ParseMode, Rendered, Rule, RuleOptions, State,
    is_closing_tag, props,
};
use crate::liquid;
use crate::models::{Block, Data, Kind, Node, types};

use super::super::utils::{blank_run, trim_trailing_lines};

pub struct CustomTag {
    parse: bool,
}

impl CustomTag {
    pub const OPEN: &'static str = "{%";
    pub const CLOSER_PREFIX: &'static str = "end";

    pub fn new() -> Self {
        Self { parse: true }
    }

    /// Emission only, for output dialects that pass tags through.
    pub fn emit_only() -> Self {
        Self { parse: false }
    }

    /// Whether `line` starts with a tag.
    pub fn sig(line: &str) -> bool {
        line.trim_start_matches(' ').starts_with(Self::OPEN)
    }
}

impl Default for CustomTag {
    fn default() -> Self {
        Self::new()
    }
}

fn custom_block(node: &Node) -> Option<&Block> {
    node.as_block().filter(|b| b.custom_tag().is_some())
}

fn closer_data(block: &Block) -> Data {
    block
        .data
        .iter()
        .filter_map(|(key, value)| {
            key.strip_prefix(CLOSER_DATA_PREFIX)
                .map(|key| (key.to_string(), value.clone()))
        })
        .collect()
}

fn is_unending(state: &State, block: &Block) -> bool {
    block
        .custom_tag()
        .is_some_and(|tag| state.has_tag(props::UNENDING_TAGS, tag))
}

impl Rule for CustomTag {
    fn name(&self) -> &str {
        "custom"
    }

    fn options(&self) -> RuleOptions {
        RuleOptions::parse(ParseMode::Block)
    }

    fn parse(&self, state: &State) -> Option<Match> {
        if !self.parse || !state.template_enabled() {
            return None;
        }
        let text = state.text();
        let (mut consumed, tag, data) = liquid::read_tag(text)?;
        let trailing = blank_run(&text[consumed..]);
        let kind = if state.active_rules() == BLOCKS && state.at_line_start() && trailing > 0 {
            consumed += trailing;
            Kind::Block
        } else {
            Kind::Inline
        };

        let block = Block::new(format!("{}{tag}", types::CUSTOM_PREFIX))
            .with_kind(kind)
            .with_all_data(data);
        if is_closing_tag(&tag) || state.has_tag(props::VOID_TAGS, &tag) {
            Some(Match::node(consumed, block.as_void()))
        } else {
            Some(Match::open(consumed, block))
        }
    }

    /// Takes a tag together with the unending branches chained after it
    /// (`if` followed by `elsif` and `else`), so one closer is written for all.
    fn claim(&self, state: &State) -> Option<usize> {
        let head = custom_block(state.peek()?)?;
        if head.is_void || is_unending(state, head) {
            return Some(1);
        }
        let chained = state
            .nodes()
            .iter()
            .skip(1)
            .map_while(custom_block)
            .take_while(|b| b.kind == head.kind && !b.is_void && is_unending(state, b))
            .count();
        Some(1 + chained)
    }

    fn render(&self, state: &State, claimed: &[Rendered<'_>]) -> String {
        let Some(head) = claimed.first().and_then(|r| custom_block(r.node)) else {
            return String::new();
        };
        let (split, end) = match head.kind {
            Kind::Block => ("\n", "\n\n"),
            Kind::Inline => ("", ""),
        };

        let mut out = String::new();
        for member in claimed {
            let Some(block) = custom_block(member.node) else {
                continue;
            };
            out.push_str(&liquid::stringify_tag(
                block.custom_tag().unwrap_or_default(),
                &block.data,
            ));
            if !block.is_void {
                out.push_str(split);
                out.push_str(trim_trailing_lines(&member.inner_or_text()));
                out.push_str(split);
            }
        }
        if !head.is_void && !is_unending(state, head) {
            let closer = format!(
                "{}{}",
                Self::CLOSER_PREFIX,
                head.custom_tag().unwrap_or_default()
            );
            // The closer that ended the chain left its data on the last branch.
            let last = claimed.last().and_then(|r| custom_block(r.node));
            let data = last.map(closer_data).unwrap_or_default();
            out.push_str(&liquid::stringify_tag(&closer, &data));
        }
        out.push_str(end);
        out
    }

    /// Children holding any block-kind node are emitted as blocks.
    fn inner_rules(&self, block: &Block) -> Option<&'static str> {
        if block.nodes.iter().any(Node::is_block_kind) {
            Some(BLOCKS)
        } else {
            Some(INLINES)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Production, RulesSet};
    use crate::models::Value;
    use std::sync::Arc;

    fn state(text: &str) -> State {
        let rules: Vec<Arc<dyn Rule>> = vec![Arc::new(CustomTag::new())];
        State::create(RulesSet::new().with(BLOCKS, rules))
            .with_tags(props::VOID_TAGS, ["include"])
            .with_text(text)
    }

    #[test]
    fn tag_alone_on_its_line_is_block_kind() {
        let m = CustomTag::new().parse(&state("{% if a %}\n\nA")).unwrap();
        assert_eq!(m.consumed, 12);
        let Production::Open(block) = &m.productions[0] else {
            panic!("expected an opened block");
        };
        assert_eq!(block.node_type, "x-if");
        assert_eq!(block.kind, Kind::Block);
        assert_eq!(block.data["args"], Value::symbols(["a"]));
    }

    #[test]
    fn tag_followed_by_text_is_inline() {
        let m = CustomTag::new().parse(&state("{% if a %}A")).unwrap();
        assert_eq!(m.consumed, 10);
        let Production::Open(block) = &m.productions[0] else {
            panic!("expected an opened block");
        };
        assert_eq!(block.kind, Kind::Inline);
    }

    #[test]
    fn closers_and_void_tags_are_pushed_directly() {
        for text in ["{% endif %}", "{% include \"a.md\" %}"] {
            let m = CustomTag::new().parse(&state(text)).unwrap();
            let Production::Node(node) = &m.productions[0] else {
                panic!("expected a node for {text}");
            };
            assert!(node.as_block().unwrap().is_void);
        }
    }

    #[test]
    fn disabled_templating_never_matches() {
        let disabled = state("{% if a %}").with_prop(props::TEMPLATE, Value::Bool(false));
        assert!(CustomTag::new().parse(&disabled).is_none());
        assert!(CustomTag::emit_only().parse(&state("{% if a %}")).is_none());
    }

    #[test]
    fn line_start_detection() {
        assert!(CustomTag::sig("{% endif %}"));
        assert!(!CustomTag::sig("a {% endif %}"));
    }
}
