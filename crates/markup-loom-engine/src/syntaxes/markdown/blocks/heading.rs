use std::sync::OnceLock;

use regex::Regex;

use crate::engine::{Match, ParseMode, Rendered, Rule, RuleOptions, State, claim_type};
use crate::models::{Block, types};

/// ATX headings, `#` to `######`.
pub struct Heading;

impl Heading {
    pub const MARKER: char = '#';

    /// Level of the heading opened by `line`.
    pub fn sig(line: &str) -> Option<usize> {
        let caps = heading().captures(line)?;
        Some(caps[1].len())
    }
}

fn heading() -> &'static Regex {
    static HEADING: OnceLock<Regex> = OnceLock::new();
    HEADING.get_or_init(|| {
        Regex::new(r"^(#{1,6})[ \t]+([^\n]*?)[ \t]*(?:\n+|$)").expect("Invalid heading regex")
    })
}

fn heading_level(state: &State) -> Option<usize> {
    state
        .peek()
        .and_then(|n| n.as_block())
        .and_then(|b| types::heading_level(&b.node_type))
}

impl Rule for Heading {
    fn name(&self) -> &str {
        "heading"
    }

    fn options(&self) -> RuleOptions {
        RuleOptions::parse(ParseMode::Inline)
    }

    fn parse(&self, state: &State) -> Option<Match> {
        if !state.at_line_start() {
            return None;
        }
        let caps = heading().captures(state.text())?;
        let level = caps[1].len();
        Some(Match::nest(
            caps[0].len(),
            Block::new(types::HEADINGS[level - 1]),
            &caps[2],
            ParseMode::Inline,
        ))
    }

    fn claim(&self, state: &State) -> Option<usize> {
        heading_level(state).map(|_| 1)
    }

    fn render(&self, state: &State, claimed: &[Rendered<'_>]) -> String {
        let level = heading_level(state).unwrap_or(1);
        let marker = Self::MARKER.to_string().repeat(level);
        format!("{marker} {}\n\n", claimed[0].inner_or_text())
    }
}

/// Thematic break: three or more `*`, `-` or `_`.
pub struct HorizontalRule;

impl HorizontalRule {
    pub const OUTPUT: &'static str = "---";
}

fn rule_line() -> &'static Regex {
    static RULE_LINE: OnceLock<Regex> = OnceLock::new();
    RULE_LINE.get_or_init(|| {
        Regex::new(r"^ {0,3}(?:(?:\*[ \t]*){3,}|(?:-[ \t]*){3,}|(?:_[ \t]*){3,})(?:\n+|$)")
            .expect("Invalid horizontal rule regex")
    })
}

impl Rule for HorizontalRule {
    fn name(&self) -> &str {
        "hr"
    }

    fn parse(&self, state: &State) -> Option<Match> {
        if !state.at_line_start() {
            return None;
        }
        let found = rule_line().find(state.text())?;
        Some(Match::node(found.end(), Block::new(types::HR).as_void()))
    }

    fn claim(&self, state: &State) -> Option<usize> {
        claim_type(state, types::HR)
    }

    fn render(&self, _state: &State, _claimed: &[Rendered<'_>]) -> String {
        format!("{}\n\n", Self::OUTPUT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("# a", Some(1))]
    #[case("###### a", Some(6))]
    #[case("####### a", None)]
    #[case("#a", None)]
    #[case("C# a", None)]
    fn heading_levels(#[case] line: &str, #[case] level: Option<usize>) {
        assert_eq!(Heading::sig(line), level);
    }

    #[rstest]
    #[case("---", true)]
    #[case("* * *\n", true)]
    #[case("___\n\n", true)]
    #[case("--", false)]
    #[case("-- a", false)]
    fn rules(#[case] line: &str, #[case] matches: bool) {
        assert_eq!(rule_line().is_match(line), matches);
    }
}
