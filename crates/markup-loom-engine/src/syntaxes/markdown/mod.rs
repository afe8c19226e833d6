//! # Markdown
//!
//! Rule registry for Markdown with `{% … %}` templating tags.
//!
//! Blocks, in order: custom tag, blank lines, code, blockquote, heading,
//! horizontal rule, unordered list, ordered list, paragraph, then the
//! emit-only unstyled and text rules. Inlines: custom tag, code span, bold,
//! italic, text, unstyled.
pub mod blocks;
pub mod inlines;
pub mod utils;

use std::sync::Arc;

use crate::engine::{BLOCKS, INLINES, Rule, RulesSet, State, props};

use blocks::{
    Blank, BlockQuote, CodeBlock, CustomTag, Heading, HorizontalRule, List, Paragraph, TextLeaf,
    Unstyled,
};
use inlines::{Bold, CodeSpan, Italic};

pub fn rules() -> RulesSet {
    let custom: Arc<dyn Rule> = Arc::new(CustomTag::new());
    let text: Arc<dyn Rule> = Arc::new(TextLeaf);
    let unstyled: Arc<dyn Rule> = Arc::new(Unstyled);

    let blocks: Vec<Arc<dyn Rule>> = vec![
        Arc::clone(&custom),
        Arc::new(Blank),
        Arc::new(CodeBlock),
        Arc::new(BlockQuote),
        Arc::new(Heading),
        Arc::new(HorizontalRule),
        Arc::new(List::unordered()),
        Arc::new(List::ordered()),
        Arc::new(Paragraph),
        Arc::clone(&unstyled),
        Arc::clone(&text),
    ];
    let inlines: Vec<Arc<dyn Rule>> = vec![
        custom,
        Arc::new(CodeSpan),
        Arc::new(Bold),
        Arc::new(Italic),
        text,
        unstyled,
    ];

    RulesSet::new().with(BLOCKS, blocks).with(INLINES, inlines)
}

/// A state using the Markdown rules and the default tag sets.
pub fn state() -> State {
    State::create(rules())
        .with_tags(props::UNENDING_TAGS, props::DEFAULT_UNENDING_TAGS)
        .with_tags(props::VOID_TAGS, props::DEFAULT_VOID_TAGS)
}
