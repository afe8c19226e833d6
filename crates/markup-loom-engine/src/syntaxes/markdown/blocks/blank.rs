use crate::engine::{Match, Rule, State};
use crate::models::Kind;

use super::super::utils::blank_run;

/// Drops blank lines between blocks.
pub struct Blank;

impl Rule for Blank {
    fn name(&self) -> &str {
        "blank"
    }

    fn parse(&self, state: &State) -> Option<Match> {
        if !state.at_line_start() || state.kind() == Kind::Inline {
            return None;
        }
        let len = blank_run(state.text());
        (len > 0).then(|| Match::skip(len))
    }
}
