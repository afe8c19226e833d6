//! Text → nodes.
//!
//! Lexing runs on an explicit stack of frames, one per nesting level, so the
//! depth of the input never grows the native call stack. A frame repeatedly
//! asks its rule set for the first match against the remaining text; when
//! nothing matches, one character moves into the raw buffer and the next
//! position is tried.

use std::collections::VecDeque;

use im::Vector;

use crate::error::{Direction, Result, TransformError};
use crate::models::{Block, Kind, Node};

use super::nested::Resolver;
use super::rule::{Match, ParseMode, Production};
use super::state::State;

struct Frame {
    state: State,
    /// Unmatched characters waiting to become a text node.
    raw: String,
    /// Whether raw text at this level may be wrapped in an `unstyled` block.
    context: Kind,
    /// Productions of the last match not yet applied.
    queue: VecDeque<Production>,
    resolver: Resolver,
    /// Block that receives this frame's nodes as children (`None` at the root).
    parent: Option<Block>,
    /// Set after a match that consumed no text.
    stalled: bool,
}

enum Step {
    Continue,
    Descend(Frame),
    Finished,
}

impl Frame {
    fn new(state: State, context: Kind, parent: Option<Block>) -> Self {
        Self {
            state,
            raw: String::new(),
            context,
            queue: VecDeque::new(),
            resolver: Resolver::default(),
            parent,
            stalled: false,
        }
    }

    fn advance(&mut self) -> Result<Step> {
        if let Some(production) = self.queue.pop_front() {
            return Ok(match self.apply(production) {
                Some(child) => Step::Descend(child),
                None => Step::Continue,
            });
        }
        if self.state.text().is_empty() {
            return Ok(Step::Finished);
        }

        match first_match(&self.state)? {
            Some((rule, m)) => {
                if m.consumed == 0 {
                    if self.stalled {
                        return Err(TransformError::NoProgress {
                            rule,
                            direction: Direction::Deserialize,
                        });
                    }
                    self.stalled = true;
                } else {
                    self.stalled = false;
                }
                self.flush_raw();
                self.state = self.state.clone().skip(m.consumed);
                self.queue.extend(m.productions);
            }
            None => {
                self.stalled = false;
                if let Some(c) = self.state.text().chars().next() {
                    self.raw.push(c);
                    self.state = self.state.clone().skip(c.len_utf8());
                }
            }
        }
        Ok(Step::Continue)
    }

    fn apply(&mut self, production: Production) -> Option<Frame> {
        match production {
            Production::Node(node) => {
                self.append(node);
                None
            }
            Production::Open(block) => {
                self.state = self.resolver.open(self.state.clone(), block);
                None
            }
            Production::Nest { block, inner, mode } => {
                let Some(rules) = mode.rules() else {
                    self.append(block.with_text(inner).into());
                    return None;
                };
                // Open template scopes are tree levels too.
                let depth = self.state.depth() + self.resolver.depth();
                if depth >= self.state.max_depth() {
                    log::warn!(
                        "maximum depth {} reached, keeping {} content as text",
                        self.state.max_depth(),
                        block.node_type
                    );
                    self.append(block.with_text(inner).into());
                    return None;
                }
                let context = match mode {
                    ParseMode::Inline => Kind::Inline,
                    _ => Kind::Block,
                };
                let state = self
                    .state
                    .clone()
                    .use_rules(rules)
                    .down_by(self.resolver.depth() + 1)
                    .with_text(&inner)
                    .with_nodes(Vector::new());
                Some(Frame::new(state, context, Some(block)))
            }
        }
    }

    fn append(&mut self, node: Node) {
        self.state = self.resolver.push(self.state.clone(), node);
    }

    /// Emits pending raw text: an `unstyled` block in a block-level context
    /// among block siblings, a text leaf otherwise.
    fn flush_raw(&mut self) {
        if self.raw.is_empty() {
            return;
        }
        let raw = std::mem::take(&mut self.raw);
        let node = if self.context == Kind::Block && self.state.kind() == Kind::Block {
            Block::unstyled(raw).into()
        } else {
            Node::text_node(raw)
        };
        self.append(node);
    }

    fn finish(mut self) -> (Option<Block>, Vector<Node>) {
        self.flush_raw();
        let state = self.resolver.finish(self.state.clone());
        (self.parent, state.nodes().clone())
    }
}

/// First rule of the active set matching the remaining text.
fn first_match(state: &State) -> Result<Option<(String, Match)>> {
    let text = state.text();
    for rule in state.rules() {
        let Some(m) = rule.parse(state) else {
            continue;
        };
        if m.consumed == 0 && m.productions.is_empty() {
            return Err(TransformError::NoProgress {
                rule: rule.name().to_string(),
                direction: Direction::Deserialize,
            });
        }
        if m.consumed > text.len() || !text.is_char_boundary(m.consumed) {
            return Err(TransformError::Overrun {
                rule: rule.name().to_string(),
                consumed: m.consumed,
                available: text.len(),
            });
        }
        log::trace!(
            "{} matched {} bytes at depth {}",
            rule.name(),
            m.consumed,
            state.depth()
        );
        return Ok(Some((rule.name().to_string(), m)));
    }
    Ok(None)
}

fn with_children(block: Block, nodes: Vector<Node>) -> Block {
    if nodes.is_empty() {
        block.with_text("")
    } else {
        block.with_nodes(nodes)
    }
}

/// Lexes the state's text to completion and returns the produced nodes.
pub(crate) fn run(state: State) -> Result<Vector<Node>> {
    let mut stack = vec![Frame::new(state, Kind::Block, None)];
    while let Some(frame) = stack.last_mut() {
        match frame.advance()? {
            Step::Continue => {}
            Step::Descend(child) => stack.push(child),
            Step::Finished => {
                let Some(done) = stack.pop() else {
                    break;
                };
                let (parent, nodes) = done.finish();
                match (parent, stack.last_mut()) {
                    (Some(block), Some(outer)) => {
                        outer.append(with_children(block, nodes).into());
                    }
                    _ => return Ok(nodes),
                }
            }
        }
    }
    Ok(Vector::new())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::engine::rule::{BLOCKS, INLINES, Rule, RulesSet};
    use crate::engine::state::props;
    use crate::models::Value;
    use pretty_assertions::assert_eq;

    /// Matches a fixed word and produces a block of the same name.
    struct Word(&'static str);

    impl Rule for Word {
        fn name(&self) -> &str {
            self.0
        }

        fn parse(&self, state: &State) -> Option<Match> {
            state
                .text()
                .starts_with(self.0)
                .then(|| Match::node(self.0.len(), Block::new(self.0).as_inline()))
        }
    }

    /// Claims a match but reports no progress.
    struct Stuck;

    impl Rule for Stuck {
        fn name(&self) -> &str {
            "stuck"
        }

        fn parse(&self, _state: &State) -> Option<Match> {
            Some(Match::skip(0))
        }
    }

    /// Produces a node forever without consuming anything.
    struct Spinner;

    impl Rule for Spinner {
        fn name(&self) -> &str {
            "spinner"
        }

        fn parse(&self, _state: &State) -> Option<Match> {
            Some(Match::node(0, Node::text_node("")))
        }
    }

    /// Wraps `[...]` and lexes its content as inlines.
    struct Brackets;

    impl Rule for Brackets {
        fn name(&self) -> &str {
            "brackets"
        }

        fn parse(&self, state: &State) -> Option<Match> {
            let text = state.text().strip_prefix('[')?;
            let end = text.find(']')?;
            Some(Match::nest(
                end + 2,
                Block::new("brackets"),
                &text[..end],
                ParseMode::Inline,
            ))
        }
    }

    fn state_with(blocks: Vec<Arc<dyn Rule>>, inlines: Vec<Arc<dyn Rule>>) -> State {
        State::create(RulesSet::new().with(BLOCKS, blocks).with(INLINES, inlines))
    }

    #[test]
    fn unmatched_text_becomes_one_unstyled_block() {
        let nodes = state_with(vec![], vec![]).deserialize("plain words").unwrap();
        assert_eq!(
            nodes,
            Vector::unit(Node::from(Block::unstyled("plain words")))
        );
    }

    #[test]
    fn raw_text_is_flushed_before_the_next_match() {
        let state = state_with(vec![Arc::new(Word("ab"))], vec![]);
        let nodes = state.deserialize("xxab yy").unwrap();
        assert_eq!(
            nodes,
            Vector::from(vec![
                Node::from(Block::unstyled("xx")),
                Node::from(Block::new("ab").as_inline()),
                Node::from(Block::unstyled(" yy")),
            ])
        );
    }

    #[test]
    fn raw_text_among_inline_siblings_stays_text() {
        let state = state_with(vec![Arc::new(Word("a"))], vec![]);
        let nodes = state.deserialize("ab").unwrap();
        assert_eq!(
            nodes,
            Vector::from(vec![
                Node::from(Block::new("a").as_inline()),
                Node::text_node("b"),
            ])
        );
    }

    #[test]
    fn first_rule_in_order_wins() {
        let state = state_with(vec![Arc::new(Word("a")), Arc::new(Word("ab"))], vec![]);
        let nodes = state.deserialize("ab").unwrap();
        assert_eq!(nodes[0].node_type(), Some("a"));
    }

    #[test]
    fn rule_without_progress_is_fatal() {
        let state = state_with(vec![Arc::new(Stuck)], vec![]);
        let err = state.deserialize("anything").unwrap_err();
        assert_eq!(
            err,
            TransformError::NoProgress {
                rule: "stuck".into(),
                direction: Direction::Deserialize,
            }
        );
    }

    #[test]
    fn repeated_zero_width_matches_are_fatal() {
        let state = state_with(vec![Arc::new(Spinner)], vec![]);
        assert!(matches!(
            state.deserialize("x"),
            Err(TransformError::NoProgress { .. })
        ));
    }

    #[test]
    fn nested_content_is_lexed_one_level_deeper() {
        let state = state_with(vec![Arc::new(Brackets)], vec![Arc::new(Word("b"))]);
        let nodes = state.deserialize("[abc]").unwrap();
        let expected = Block::new("brackets").with_nodes([
            Node::text_node("a"),
            Block::new("b").as_inline().into(),
            Node::text_node("c"),
        ]);
        assert_eq!(nodes, Vector::unit(Node::from(expected)));
    }

    #[test]
    fn empty_nested_content_gets_default_text() {
        let state = state_with(vec![Arc::new(Brackets)], vec![]);
        let nodes = state.deserialize("[]").unwrap();
        assert_eq!(
            nodes,
            Vector::unit(Node::from(Block::new("brackets").with_text("")))
        );
    }

    #[test]
    fn max_depth_keeps_inner_text_literal() {
        let state = state_with(vec![Arc::new(Brackets)], vec![Arc::new(Word("b"))])
            .with_prop(props::MAX_DEPTH, Value::Number(1.0));
        let nodes = state.deserialize("[abc]").unwrap();
        assert_eq!(
            nodes,
            Vector::unit(Node::from(Block::new("brackets").with_text("abc")))
        );
    }

    #[test]
    fn empty_input_produces_no_nodes() {
        let nodes = state_with(vec![], vec![]).deserialize("").unwrap();
        assert!(nodes.is_empty());
    }

    #[test]
    fn multibyte_characters_backtrack_whole() {
        let nodes = state_with(vec![Arc::new(Word("b"))], vec![])
            .deserialize("éb")
            .unwrap();
        assert_eq!(nodes[0], Node::from(Block::unstyled("é")));
        assert_eq!(nodes[1].node_type(), Some("b"));
    }
}
