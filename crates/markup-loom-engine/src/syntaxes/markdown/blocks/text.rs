use crate::engine::{Rendered, Rule, RuleOptions, State, claim_type};
use crate::models::{Node, types};

/// Emits text leaves as they are.
pub struct TextLeaf;

impl Rule for TextLeaf {
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

/// Emits raw text that no rule recognized, byte for byte.
pub struct Unstyled;

impl Rule for Unstyled {
    fn name(&self) -> &str {
        "unstyled"
    }

    fn options(&self) -> RuleOptions {
        RuleOptions::raw()
    }

    fn claim(&self, state: &State) -> Option<usize> {
        claim_type(state, types::UNSTYLED)
    }

    fn render(&self, _state: &State, claimed: &[Rendered<'_>]) -> String {
        claimed[0].node.text()
    }
}
