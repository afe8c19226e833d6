use crate::engine::{Match, ParseMode, Rendered, Rule, RuleOptions, State, claim_type};
use crate::models::{Block, Kind, types};

use super::super::utils::{blank_run, line_len, trim_trailing_lines};
use super::opens_block;

/// Paragraph block type (marker struct).
///
/// Paragraphs have no delimiters: they run until a blank line or a line
/// opening another block. Text that reaches the end of the input without
/// either is left to the raw fallback, so it comes back out untouched.
/// Inline parsing is applied to paragraph content.
pub struct Paragraph;

impl Paragraph {
    /// Length of the paragraph lines and of everything consumed with them.
    fn extent(text: &str) -> Option<(usize, usize)> {
        let first = line_len(text);
        if text[..first].trim().is_empty() {
            return None;
        }
        let mut pos = first;
        while pos < text.len() {
            let blanks = blank_run(&text[pos..]);
            if blanks > 0 {
                return Some((pos, pos + blanks));
            }
            let len = line_len(&text[pos..]);
            if opens_block(&text[pos..pos + len]) {
                return Some((pos, pos));
            }
            pos += len;
        }
        None
    }
}

impl Rule for Paragraph {
    fn name(&self) -> &str {
        "paragraph"
    }

    fn options(&self) -> RuleOptions {
        RuleOptions::parse(ParseMode::Inline)
    }

    fn parse(&self, state: &State) -> Option<Match> {
        if !state.at_line_start() || state.kind() == Kind::Inline {
            return None;
        }
        let text = state.text();
        let (end, consumed) = Self::extent(text)?;
        Some(Match::nest(
            consumed,
            Block::new(types::PARAGRAPH),
            trim_trailing_lines(&text[..end]),
            ParseMode::Inline,
        ))
    }

    fn claim(&self, state: &State) -> Option<usize> {
        claim_type(state, types::PARAGRAPH)
    }

    fn render(&self, _state: &State, claimed: &[Rendered<'_>]) -> String {
        format!("{}\n\n", claimed[0].inner_or_text())
    }
}
