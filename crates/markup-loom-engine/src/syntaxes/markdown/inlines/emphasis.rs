use std::sync::OnceLock;

use regex::Regex;

use crate::engine::{Match, ParseMode, Rendered, Rule, RuleOptions, State, claim_type};
use crate::models::{Block, types};

/// Strong emphasis, `**text**`.
pub struct Bold;

impl Bold {
    pub const DELIMITER: &'static str = "**";
}

/// Emphasis, `*text*`.
pub struct Italic;

impl Italic {
    pub const DELIMITER: &'static str = "*";
}

fn bold() -> &'static Regex {
    static BOLD: OnceLock<Regex> = OnceLock::new();
    BOLD.get_or_init(|| {
        Regex::new(r"(?s)^\*\*([^\s*](?:.*?[^\s])?)\*\*").expect("Invalid bold regex")
    })
}

fn italic() -> &'static Regex {
    static ITALIC: OnceLock<Regex> = OnceLock::new();
    ITALIC.get_or_init(|| {
        Regex::new(r"^\*([^\s*](?:[^*]*[^\s*])?)\*").expect("Invalid italic regex")
    })
}

fn nest_inline(re: &Regex, state: &State, node_type: &str) -> Option<Match> {
    let caps = re.captures(state.text())?;
    Some(Match::nest(
        caps[0].len(),
        Block::new(node_type).as_inline(),
        &caps[1],
        ParseMode::Inline,
    ))
}

impl Rule for Bold {
    fn name(&self) -> &str {
        "bold"
    }

    fn options(&self) -> RuleOptions {
        RuleOptions::parse(ParseMode::Inline)
    }

    fn parse(&self, state: &State) -> Option<Match> {
        nest_inline(bold(), state, types::BOLD)
    }

    fn claim(&self, state: &State) -> Option<usize> {
        claim_type(state, types::BOLD)
    }

    fn render(&self, _state: &State, claimed: &[Rendered<'_>]) -> String {
        let d = Self::DELIMITER;
        format!("{d}{}{d}", claimed[0].inner_or_text())
    }
}

impl Rule for Italic {
    fn name(&self) -> &str {
        "italic"
    }

    fn options(&self) -> RuleOptions {
        RuleOptions::parse(ParseMode::Inline)
    }

    fn parse(&self, state: &State) -> Option<Match> {
        nest_inline(italic(), state, types::ITALIC)
    }

    fn claim(&self, state: &State) -> Option<usize> {
        claim_type(state, types::ITALIC)
    }

    fn render(&self, _state: &State, claimed: &[Rendered<'_>]) -> String {
        let d = Self::DELIMITER;
        format!("{d}{}{d}", claimed[0].inner_or_text())
    }
}
