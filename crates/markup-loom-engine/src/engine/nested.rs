//! Nested-block resolution for blocks whose end is found by further parsing.
//!
//! A [`Resolver`] lives on one lexing level. Each open custom block is a
//! scope: its placeholder sits in the level's nodes and everything pushed
//! after it is a candidate child until a boundary arrives. Scopes therefore
//! move through two states only, awaiting-boundary and closed, and are
//! re-checked every time a node is pushed.

use im::Vector;

use crate::models::{Block, Node};

use super::state::{State, props};

const CLOSER_PREFIX: &str = "end";

/// Data of the closer that ended a scope is kept on the closed block under
/// this prefix (`end:<key>`), so the closer can be written back as it was.
pub const CLOSER_DATA_PREFIX: &str = "end:";

#[derive(Debug, Clone)]
struct Scope {
    /// Index of the placeholder in the level's nodes.
    start: usize,
    block: Block,
    /// Tag whose `end<head>` closer terminates this scope. Differs from the
    /// block's own tag when an unending tag continues a chain (`if … else`).
    head: String,
    unending: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Boundary {
    None,
    /// The scope's own closer: close and drop the marker.
    Own,
    /// Another closer ending an unending scope: close and re-examine the marker.
    Foreign,
}

impl Scope {
    fn boundary(&self, closer: &str) -> Boundary {
        if closer.strip_prefix(CLOSER_PREFIX) == Some(self.head.as_str()) {
            Boundary::Own
        } else if self.unending {
            Boundary::Foreign
        } else {
            Boundary::None
        }
    }
}

/// Whether a custom tag name is an explicit closer (`endif`, `endfor`, ...).
pub fn is_closing_tag(tag: &str) -> bool {
    tag.starts_with(CLOSER_PREFIX)
}

/// Closer tag of a node, if the node is a custom closing marker.
fn closing_tag(node: &Node) -> Option<&str> {
    node.as_block()
        .and_then(Block::custom_tag)
        .filter(|tag| is_closing_tag(tag))
}

#[derive(Debug, Default)]
pub(crate) struct Resolver {
    scopes: Vec<Scope>,
    /// Set once an opener was flattened at the depth limit.
    capped: bool,
}

impl Resolver {
    /// Number of scopes awaiting their boundary; each one is a tree level.
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Pushes the placeholder for `block` and starts awaiting its boundary.
    ///
    /// An unending opener first closes the innermost open scope and takes
    /// over its chain head. Past the maximum depth the opener is pushed as a
    /// void node instead, so the tree never grows deeper than the limit.
    pub fn open(&mut self, state: State, block: Block) -> State {
        let tag = block.custom_tag().unwrap_or_default().to_string();
        let unending = state.has_tag(props::UNENDING_TAGS, &tag);

        let mut state = state;
        let mut head = tag;
        if unending {
            if let Some(scope) = self.scopes.last() {
                head = scope.head.clone();
                state = self.close(state, None);
            }
        }

        if state.depth() + self.scopes.len() >= state.max_depth() {
            if !self.capped {
                log::warn!(
                    "maximum depth {} reached, keeping {} and later openers flat",
                    state.max_depth(),
                    block.node_type
                );
                self.capped = true;
            }
            return state.push(block.as_void().into());
        }

        let placeholder = Block {
            is_void: true,
            nodes: Vector::unit(Node::text_node("")),
            ..block.clone()
        };
        let state = state.push(placeholder.into());
        self.scopes.push(Scope {
            start: state.nodes().len() - 1,
            block,
            head,
            unending,
        });
        state
    }

    /// Pushes a node, closing scopes whose boundary it is.
    pub fn push(&mut self, state: State, node: Node) -> State {
        let mut state = state;
        let mut pending = Some(node);
        while let Some(node) = pending.take() {
            let boundary = match (closing_tag(&node), self.scopes.last()) {
                (Some(closer), Some(scope)) => scope.boundary(closer),
                _ => Boundary::None,
            };
            match boundary {
                Boundary::Own => state = self.close(state, Some(&node)),
                Boundary::Foreign => {
                    state = self.close(state, None);
                    pending = Some(node);
                }
                Boundary::None => state = state.push(node),
            }
        }
        state
    }

    /// Closes every scope still open, innermost first, with whatever
    /// children were collected.
    pub fn finish(&mut self, state: State) -> State {
        let mut state = state;
        while let Some(scope) = self.scopes.last() {
            log::debug!(
                "closing unterminated {} at end of input (depth {})",
                scope.block.node_type,
                state.depth()
            );
            state = self.close(state, None);
        }
        state
    }

    /// Turns the innermost placeholder and everything after it into one
    /// closed block, keeping the data of its own `closer` if there is one.
    fn close(&mut self, state: State, closer: Option<&Node>) -> State {
        let Some(mut scope) = self.scopes.pop() else {
            return state;
        };
        if let Some(closer) = closer.and_then(Node::as_block) {
            for (key, value) in &closer.data {
                scope
                    .block
                    .data
                    .insert(format!("{CLOSER_DATA_PREFIX}{key}"), value.clone());
            }
        }
        let mut before = state.nodes().clone();
        let at = (scope.start + 1).min(before.len());
        let children = before.split_off(at);
        before.pop_back();

        let block = if children.is_empty() {
            scope.block.with_text("")
        } else {
            scope.block.with_nodes(children)
        };
        before.push_back(Block { is_void: false, ..block }.into());
        state.with_nodes(before)
    }
}
