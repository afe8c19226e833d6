//! Nodes → text.
//!
//! Like lexing, serialization runs on an explicit stack of frames. The rule
//! claiming the front of a frame's pending stack has the children of each
//! claimed block rendered first, in a child frame one level deeper, and then
//! renders the whole group at once.

use std::sync::Arc;

use crate::error::{Direction, Result, TransformError};
use crate::models::Node;

use super::rule::{Rendered, Rule};
use super::state::State;

/// Nodes claimed by a rule, waiting for their inner renders.
struct Claimed {
    rule: Arc<dyn Rule>,
    /// State at claim time: the claimed nodes are still at the front.
    at: State,
    nodes: Vec<Node>,
    inner: Vec<Option<String>>,
}

impl Claimed {
    /// State for rendering the children of the `index`th claimed node, if the
    /// rule wants them rendered.
    fn child_state(&self, index: usize) -> Option<State> {
        let block = self.nodes.get(index)?.as_block()?;
        if block.is_void || block.nodes.is_empty() {
            return None;
        }
        let rules = self.rule.inner_rules(block)?;
        Some(
            self.at
                .clone()
                .use_rules(rules)
                .down()
                .with_nodes(block.nodes.clone()),
        )
    }
}

struct Frame {
    state: State,
    out: String,
    claimed: Option<Claimed>,
}

enum Step {
    Continue,
    Descend(State),
    Finished,
}

impl Frame {
    fn new(state: State) -> Self {
        Self {
            state,
            out: String::new(),
            claimed: None,
        }
    }

    fn advance(&mut self) -> Result<Step> {
        if let Some(claimed) = self.claimed.as_mut() {
            let index = claimed.inner.len();
            if index < claimed.nodes.len() {
                return Ok(match claimed.child_state(index) {
                    Some(state) => Step::Descend(state),
                    None => {
                        claimed.inner.push(None);
                        Step::Continue
                    }
                });
            }
        }

        if let Some(claimed) = self.claimed.take() {
            let rendered: Vec<Rendered<'_>> = claimed
                .nodes
                .iter()
                .zip(&claimed.inner)
                .map(|(node, inner)| Rendered {
                    node,
                    inner: inner.as_deref(),
                })
                .collect();
            let text = claimed.rule.render(&claimed.at, &rendered);
            self.out.push_str(&text);
            self.state = claimed.at.clone().shift_n(claimed.nodes.len());
            return Ok(Step::Continue);
        }

        if self.state.nodes().is_empty() {
            return Ok(Step::Finished);
        }

        let (rule, count) = claim(&self.state)?;
        let nodes = self.state.nodes().iter().take(count).cloned().collect();
        self.claimed = Some(Claimed {
            rule,
            at: self.state.clone(),
            nodes,
            inner: Vec::with_capacity(count),
        });
        Ok(Step::Continue)
    }

    /// Accepts the rendered children of the claimed node being processed.
    fn receive(&mut self, inner: String) {
        if let Some(claimed) = self.claimed.as_mut() {
            claimed.inner.push(Some(inner));
        }
    }
}

/// First rule of the active set claiming the front of the stack.
fn claim(state: &State) -> Result<(Arc<dyn Rule>, usize)> {
    for rule in state.rules() {
        match rule.claim(state) {
            None => continue,
            Some(0) => {
                return Err(TransformError::NoProgress {
                    rule: rule.name().to_string(),
                    direction: Direction::Serialize,
                });
            }
            Some(count) => {
                log::trace!(
                    "{} claimed {} node(s) at depth {}",
                    rule.name(),
                    count,
                    state.depth()
                );
                return Ok((Arc::clone(rule), count.min(state.nodes().len())));
            }
        }
    }

    let (kind, node_type) = match state.peek() {
        Some(node) => (node.kind_name(), node.node_type().unwrap_or_default()),
        None => ("none", ""),
    };
    Err(TransformError::UnknownNode {
        kind: kind.to_string(),
        node_type: node_type.to_string(),
    })
}

/// Emits every node of the state's stack and returns the text.
pub(crate) fn run(state: State) -> Result<String> {
    let mut stack = vec![Frame::new(state)];
    while let Some(frame) = stack.last_mut() {
        match frame.advance()? {
            Step::Continue => {}
            Step::Descend(state) => stack.push(Frame::new(state)),
            Step::Finished => {
                let Some(done) = stack.pop() else {
                    break;
                };
                match stack.last_mut() {
                    Some(outer) => outer.receive(done.out),
                    None => return Ok(done.out),
                }
            }
        }
    }
    Ok(String::new())
}

#[cfg(test)]
mod tests {
    use im::Vector;

    use super::*;
    use crate::engine::rule::{BLOCKS, INLINES, ParseMode, RuleOptions, RulesSet, claim_type};
    use crate::models::{Block, Node};
    use pretty_assertions::assert_eq;

    struct Texts;

    impl Rule for Texts {
        fn name(&self) -> &str {
            "text"
        }

        fn claim(&self, state: &State) -> Option<usize> {
            matches!(state.peek(), Some(Node::Text(_))).then_some(1)
        }

        fn render(&self, _state: &State, claimed: &[Rendered<'_>]) -> String {
            claimed[0].node.text()
        }
    }

    /// Wraps rendered inline children in brackets.
    struct Brackets;

    impl Rule for Brackets {
        fn name(&self) -> &str {
            "brackets"
        }

        fn options(&self) -> RuleOptions {
            RuleOptions::parse(ParseMode::Inline)
        }

        fn claim(&self, state: &State) -> Option<usize> {
            claim_type(state, "brackets")
        }

        fn render(&self, _state: &State, claimed: &[Rendered<'_>]) -> String {
            format!("[{}]", claimed[0].inner_or_text())
        }
    }

    /// Takes every consecutive `pair` block at once.
    struct Pairs;

    impl Rule for Pairs {
        fn name(&self) -> &str {
            "pairs"
        }

        fn options(&self) -> RuleOptions {
            RuleOptions::raw()
        }

        fn claim(&self, state: &State) -> Option<usize> {
            let n = state
                .nodes()
                .iter()
                .take_while(|n| n.node_type() == Some("pair"))
                .count();
            (n > 0).then_some(n)
        }

        fn render(&self, _state: &State, claimed: &[Rendered<'_>]) -> String {
            format!("<{}>", claimed.len())
        }
    }

    struct Lazy;

    impl Rule for Lazy {
        fn name(&self) -> &str {
            "lazy"
        }

        fn claim(&self, _state: &State) -> Option<usize> {
            Some(0)
        }
    }

    fn state() -> State {
        let rules: Vec<Arc<dyn Rule>> = vec![Arc::new(Brackets), Arc::new(Pairs), Arc::new(Texts)];
        State::create(RulesSet::new().with(BLOCKS, rules.clone()).with(INLINES, rules))
    }

    #[test]
    fn renders_children_before_parent() {
        let nodes = Vector::unit(Node::from(Block::new("brackets").with_nodes([
            Node::text_node("a"),
            Block::new("brackets").with_text("b").into(),
        ])));
        assert_eq!(state().serialize(nodes).unwrap(), "[a[b]]");
    }

    #[test]
    fn a_claim_can_take_several_nodes() {
        let nodes = Vector::from(vec![
            Node::from(Block::new("pair")),
            Node::from(Block::new("pair")),
            Node::text_node("!"),
        ]);
        assert_eq!(state().serialize(nodes).unwrap(), "<2>!");
    }

    #[test]
    fn unknown_node_is_fatal_and_named() {
        let nodes = Vector::unit(Node::from(Block::new("mystery")));
        let err = state().serialize(nodes).unwrap_err();
        assert_eq!(
            err,
            TransformError::UnknownNode {
                kind: "block".into(),
                node_type: "mystery".into(),
            }
        );
        assert_eq!(err.to_string(), "no rule matches node block#mystery");
    }

    #[test]
    fn claiming_nothing_is_fatal() {
        let rules: Vec<Arc<dyn Rule>> = vec![Arc::new(Lazy)];
        let state = State::create(RulesSet::new().with(BLOCKS, rules));
        let err = state
            .serialize(Vector::unit(Node::text_node("x")))
            .unwrap_err();
        assert_eq!(
            err,
            TransformError::NoProgress {
                rule: "lazy".into(),
                direction: Direction::Serialize,
            }
        );
    }

    #[test]
    fn empty_stack_serializes_to_empty_text() {
        assert_eq!(state().serialize(Vector::new()).unwrap(), "");
    }

    #[test]
    fn deep_trees_do_not_recurse_natively() {
        let mut node = Node::text_node("x");
        for _ in 0..1_000 {
            node = Block::new("brackets").with_nodes([node]).into();
        }
        let out = state().serialize(Vector::unit(node)).unwrap();
        assert_eq!(out.len(), 1 + 2 * 1_000);
    }
}
