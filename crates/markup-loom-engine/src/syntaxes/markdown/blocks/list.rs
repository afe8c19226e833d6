//! List items.
//!
//! One match takes a whole homogeneous list, then splits it into one node
//! per item. Ordered and unordered bullets are told apart by the length of
//! the bullet token (`1.` is longer than `*`).

use std::sync::OnceLock;

use regex::Regex;

use crate::engine::{Match, ParseMode, Production, Rendered, Rule, RuleOptions, State, claim_type};
use crate::models::{Block, Node, types};

use super::super::utils::{indent_following, line_len, outdent_following, trim_trailing_lines};
use super::opens_block;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BulletSig {
    /// Spaces before the bullet.
    pub indent: usize,
    /// Length of the bullet token.
    pub marker: usize,
    /// Columns taken by indentation, bullet and the spacing after it.
    pub width: usize,
}

impl BulletSig {
    pub fn ordered(&self) -> bool {
        self.marker > 1
    }
}

pub struct ListBullet;

impl ListBullet {
    pub const UNORDERED: &'static str = "*";
    pub const ORDERED: &'static str = "1.";
    /// Indentation of continuation lines on output.
    pub const CONTINUATION: &'static str = "  ";

    pub fn sig(line: &str) -> Option<BulletSig> {
        let caps = bullet().captures(line)?;
        Some(BulletSig {
            indent: caps[1].len(),
            marker: caps[2].len(),
            width: caps[0].len(),
        })
    }
}

fn bullet() -> &'static Regex {
    static BULLET: OnceLock<Regex> = OnceLock::new();
    BULLET.get_or_init(|| {
        Regex::new(r"^( {0,3})([*+-]|\d{1,9}\.)[ \t]+").expect("Invalid list bullet regex")
    })
}

/// List item rule for one of the two list types.
pub struct List {
    ordered: bool,
}

impl List {
    pub fn unordered() -> Self {
        Self { ordered: false }
    }

    pub fn ordered() -> Self {
        Self { ordered: true }
    }

    fn node_type(&self) -> &'static str {
        if self.ordered {
            types::OL_ITEM
        } else {
            types::UL_ITEM
        }
    }

    fn bullet(&self) -> &'static str {
        if self.ordered {
            ListBullet::ORDERED
        } else {
            ListBullet::UNORDERED
        }
    }

    /// Splits the list at the front of `text` into item spans.
    ///
    /// Returns the end of the list (trailing blank lines included) and, per
    /// item, its start and bullet width.
    fn chunk(&self, text: &str, first: BulletSig) -> (usize, Vec<(usize, usize)>) {
        let mut items = vec![(0, first.width)];
        let mut pos = line_len(text);
        let mut blank = false;
        while pos < text.len() {
            let line = &text[pos..pos + line_len(&text[pos..])];
            if line.trim().is_empty() {
                blank = true;
            } else if let Some(sig) = ListBullet::sig(line).filter(|s| s.indent <= first.indent) {
                if sig.ordered() != self.ordered {
                    break;
                }
                items.push((pos, sig.width));
                blank = false;
            } else if line.starts_with([' ', '\t']) || (!blank && !opens_block(line)) {
                blank = false;
            } else {
                break;
            }
            pos += line.len();
        }
        (pos, items)
    }
}

/// Item text without its bullet, continuation lines de-indented by the
/// bullet width.
fn item_text(raw: &str, width: usize) -> String {
    let body = &raw[width.min(raw.len())..];
    let body = if body.contains("\n ") {
        outdent_following(body, width)
    } else {
        body.to_string()
    };
    trim_trailing_lines(&body).to_string()
}

impl Rule for List {
    fn name(&self) -> &str {
        if self.ordered { "ol" } else { "ul" }
    }

    fn options(&self) -> RuleOptions {
        RuleOptions::parse(ParseMode::Block)
    }

    fn parse(&self, state: &State) -> Option<Match> {
        if !state.at_line_start() {
            return None;
        }
        let text = state.text();
        let first = ListBullet::sig(text)?;
        if first.ordered() != self.ordered {
            return None;
        }

        let (end, items) = self.chunk(text, first);
        let productions = items
            .iter()
            .enumerate()
            .map(|(i, &(start, width))| {
                let stop = items.get(i + 1).map_or(end, |&(next, _)| next);
                Production::Nest {
                    block: Block::new(self.node_type()),
                    inner: item_text(&text[start..stop], width),
                    mode: ParseMode::Block,
                }
            })
            .collect();
        Some(Match::new(end, productions))
    }

    fn claim(&self, state: &State) -> Option<usize> {
        claim_type(state, self.node_type())
    }

    fn render(&self, state: &State, claimed: &[Rendered<'_>]) -> String {
        let inner = claimed[0].inner_or_text();
        let item = format!("{} {}", self.bullet(), trim_trailing_lines(&inner));
        let mut out = indent_following(&item, ListBullet::CONTINUATION);
        out.push('\n');

        let next = state.nodes().get(claimed.len()).and_then(Node::node_type);
        if next != Some(self.node_type()) {
            out.push('\n');
        }
        out
    }
}
