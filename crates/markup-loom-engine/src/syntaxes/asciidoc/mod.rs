//! # AsciiDoc
//!
//! Emit-only rules writing the node tree produced by the Markdown rules as
//! AsciiDoc. Templating tags pass through unchanged.

use std::sync::Arc;

use crate::engine::{BLOCKS, INLINES, ParseMode, Rendered, Rule, RuleOptions, RulesSet, State};
use crate::models::{Node, Value, types};

use super::markdown::blocks::{CustomTag, SYNTAX, TextLeaf, Unstyled};
use super::markdown::utils::{split_lines, trim_trailing_lines};

type Render = fn(&State, &[Rendered<'_>]) -> String;

/// A rule that only emits: claims one node whose type passes `matches`.
struct Emitter {
    name: &'static str,
    matches: fn(&str) -> bool,
    options: RuleOptions,
    render: Render,
}

impl Rule for Emitter {
    fn name(&self) -> &str {
        self.name
    }

    fn options(&self) -> RuleOptions {
        self.options
    }

    fn claim(&self, state: &State) -> Option<usize> {
        let node_type = state.peek()?.node_type()?;
        (self.matches)(node_type).then_some(1)
    }

    fn render(&self, state: &State, claimed: &[Rendered<'_>]) -> String {
        (self.render)(state, claimed)
    }
}

fn inner(claimed: &[Rendered<'_>]) -> String {
    claimed
        .first()
        .map(Rendered::inner_or_text)
        .unwrap_or_default()
}

fn paragraph(_: &State, claimed: &[Rendered<'_>]) -> String {
    format!("{}\n\n", inner(claimed))
}

fn heading(state: &State, claimed: &[Rendered<'_>]) -> String {
    let level = state
        .peek()
        .and_then(Node::node_type)
        .and_then(types::heading_level)
        .unwrap_or(1);
    format!("{} {}\n\n", "=".repeat(level), inner(claimed))
}

fn code_block(_: &State, claimed: &[Rendered<'_>]) -> String {
    let Some(node) = claimed.first().map(|r| r.node) else {
        return String::new();
    };
    let mut out = String::new();
    let syntax = node
        .as_block()
        .and_then(|b| b.data.get(SYNTAX))
        .and_then(Value::as_str);
    if let Some(syntax) = syntax {
        out.push_str(&format!("[source,{syntax}]\n"));
    }
    let body = node.text();
    out.push_str("----\n");
    out.push_str(&body);
    if !body.is_empty() && !body.ends_with('\n') {
        out.push('\n');
    }
    out.push_str("----\n\n");
    out
}

fn block_quote(_: &State, claimed: &[Rendered<'_>]) -> String {
    format!("____\n{}\n____\n\n", trim_trailing_lines(&inner(claimed)))
}

fn horizontal_rule(_: &State, _: &[Rendered<'_>]) -> String {
    "'''\n\n".to_string()
}

fn list_item(marker: &str, node_type: &str, state: &State, claimed: &[Rendered<'_>]) -> String {
    let text = inner(claimed);
    let lines: Vec<&str> = split_lines(trim_trailing_lines(&text))
        .map(|line| if line.trim().is_empty() { "+" } else { line })
        .collect();
    let mut out = format!("{marker} {}\n", lines.join("\n"));
    if state.nodes().get(1).and_then(Node::node_type) != Some(node_type) {
        out.push('\n');
    }
    out
}

fn unordered_item(state: &State, claimed: &[Rendered<'_>]) -> String {
    list_item("*", types::UL_ITEM, state, claimed)
}

fn ordered_item(state: &State, claimed: &[Rendered<'_>]) -> String {
    list_item(".", types::OL_ITEM, state, claimed)
}

fn bold(_: &State, claimed: &[Rendered<'_>]) -> String {
    format!("*{}*", inner(claimed))
}

fn italic(_: &State, claimed: &[Rendered<'_>]) -> String {
    format!("_{}_", inner(claimed))
}

fn code(_: &State, claimed: &[Rendered<'_>]) -> String {
    format!("``{}``", inner(claimed))
}

fn emitter(
    name: &'static str,
    matches: fn(&str) -> bool,
    options: RuleOptions,
    render: Render,
) -> Arc<dyn Rule> {
    Arc::new(Emitter {
        name,
        matches,
        options,
        render,
    })
}

pub fn rules() -> RulesSet {
    let inline = RuleOptions::parse(ParseMode::Inline);
    let block = RuleOptions::parse(ParseMode::Block);
    let custom: Arc<dyn Rule> = Arc::new(CustomTag::emit_only());
    let text: Arc<dyn Rule> = Arc::new(TextLeaf);
    let unstyled: Arc<dyn Rule> = Arc::new(Unstyled);

    let blocks = vec![
        Arc::clone(&custom),
        emitter(
            "code",
            |t| t == types::CODE_BLOCK,
            RuleOptions::raw(),
            code_block,
        ),
        emitter(
            "blockquote",
            |t| t == types::BLOCKQUOTE,
            block,
            block_quote,
        ),
        emitter(
            "heading",
            |t| types::heading_level(t).is_some(),
            inline,
            heading,
        ),
        emitter(
            "hr",
            |t| t == types::HR,
            RuleOptions::default(),
            horizontal_rule,
        ),
        emitter("ul", |t| t == types::UL_ITEM, block, unordered_item),
        emitter("ol", |t| t == types::OL_ITEM, block, ordered_item),
        emitter("paragraph", |t| t == types::PARAGRAPH, inline, paragraph),
        Arc::clone(&unstyled),
        Arc::clone(&text),
    ];
    let inlines = vec![
        custom,
        emitter("code", |t| t == types::CODE, RuleOptions::raw(), code),
        emitter("bold", |t| t == types::BOLD, inline, bold),
        emitter("italic", |t| t == types::ITALIC, inline, italic),
        text,
        unstyled,
    ];

    RulesSet::new().with(BLOCKS, blocks).with(INLINES, inlines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::props;
    use crate::syntaxes::markdown;
    use pretty_assertions::assert_eq;

    fn to_asciidoc(markdown: &str) -> String {
        let nodes = markdown::state().deserialize(markdown).unwrap();
        State::create(rules())
            .with_tags(props::UNENDING_TAGS, props::DEFAULT_UNENDING_TAGS)
            .serialize(nodes)
            .unwrap()
    }

    #[test]
    fn converts_common_blocks() {
        let input = "# Title\n\nSome **bold** and `code`.\n\n* a\n* b\n\n```rust\nfn main() {}\n```\n";
        let expected = "= Title\n\nSome *bold* and ``code``.\n\n* a\n* b\n\n[source,rust]\n----\nfn main() {}\n----\n\n";
        assert_eq!(to_asciidoc(input), expected);
    }

    #[test]
    fn quotes_rules_and_ordered_lists() {
        let input = "> quoted\n\n---\n\n1. one\n2. two\n\n";
        let expected = "____\nquoted\n____\n\n'''\n\n. one\n. two\n\n";
        assert_eq!(to_asciidoc(input), expected);
    }

    #[test]
    fn templating_tags_pass_through() {
        assert_eq!(
            to_asciidoc("{% if a %}A{% else %}B{% endif %}"),
            "{% if a %}A{% else %}B{% endif %}"
        );
    }
}
