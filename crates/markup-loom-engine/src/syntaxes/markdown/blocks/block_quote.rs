use crate::engine::{Match, ParseMode, Rendered, Rule, RuleOptions, State, claim_type};
use crate::models::{Block, types};

use super::super::utils::{blank_run, split_lines, trim_trailing_lines};

/// Blockquote block type with owned delimiter constant.
///
/// A quote is a run of consecutive `>` lines; one level of prefix is
/// stripped and the rest is parsed again as blocks, so `>>` nests.
pub struct BlockQuote;

impl BlockQuote {
    /// The blockquote prefix character.
    pub const PREFIX: char = '>';

    /// Strips one blockquote prefix (and the space after it) from a line.
    ///
    /// Returns `None` when the line is not quoted.
    pub fn strip_prefix(line: &str) -> Option<&str> {
        let t = line.trim_start_matches(' ');
        if line.len() - t.len() > 3 {
            return None;
        }
        let rest = t.strip_prefix(Self::PREFIX)?;
        Some(rest.strip_prefix(' ').unwrap_or(rest))
    }
}

impl Rule for BlockQuote {
    fn name(&self) -> &str {
        "blockquote"
    }

    fn options(&self) -> RuleOptions {
        RuleOptions::parse(ParseMode::Block)
    }

    fn parse(&self, state: &State) -> Option<Match> {
        if !state.at_line_start() {
            return None;
        }
        let text = state.text();
        let mut consumed = 0;
        let mut inner = String::new();
        for line in text.split_inclusive('\n') {
            let Some(content) = Self::strip_prefix(line) else {
                break;
            };
            inner.push_str(content);
            consumed += line.len();
        }
        if consumed == 0 {
            return None;
        }
        consumed += blank_run(&text[consumed..]);
        let inner = trim_trailing_lines(&inner).to_string();
        Some(Match::nest(
            consumed,
            Block::new(types::BLOCKQUOTE),
            inner,
            ParseMode::Block,
        ))
    }

    fn claim(&self, state: &State) -> Option<usize> {
        claim_type(state, types::BLOCKQUOTE)
    }

    fn render(&self, _state: &State, claimed: &[Rendered<'_>]) -> String {
        let inner = claimed[0].inner_or_text();
        let lines: Vec<String> = split_lines(trim_trailing_lines(&inner))
            .map(|line| {
                if line.is_empty() {
                    Self::PREFIX.to_string()
                } else {
                    format!("{} {line}", Self::PREFIX)
                }
            })
            .collect();
        lines.join("\n") + "\n\n"
    }
}
