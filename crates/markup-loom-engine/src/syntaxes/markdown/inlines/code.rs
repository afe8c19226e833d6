use crate::engine::{Match, Rendered, Rule, RuleOptions, State, claim_type};
use crate::models::{Block, types};

/// Code span delimited by equal runs of backticks.
pub struct CodeSpan;

impl CodeSpan {
    pub const DELIMITER: char = '`';

    /// Content and total length of the span at the front of `text`.
    fn scan(text: &str) -> Option<(&str, usize)> {
        let run = run_len(text);
        if run == 0 {
            return None;
        }
        let rest = &text[run..];
        let mut i = 0;
        while let Some(offset) = rest[i..].find(Self::DELIMITER) {
            let start = i + offset;
            let len = run_len(&rest[start..]);
            if len == run {
                return Some((&rest[..start], run + start + len));
            }
            i = start + len;
        }
        None
    }
}

fn run_len(text: &str) -> usize {
    text.len() - text.trim_start_matches(CodeSpan::DELIMITER).len()
}

/// Strips one space on each side when both are present.
fn unpad(content: &str) -> &str {
    match content.strip_prefix(' ').and_then(|c| c.strip_suffix(' ')) {
        Some(inner) if !inner.trim().is_empty() => inner,
        _ => content,
    }
}

impl Rule for CodeSpan {
    fn name(&self) -> &str {
        "code"
    }

    fn options(&self) -> RuleOptions {
        RuleOptions::raw()
    }

    fn parse(&self, state: &State) -> Option<Match> {
        let (content, len) = Self::scan(state.text())?;
        let node = Block::new(types::CODE).as_inline().with_text(unpad(content));
        Some(Match::node(len, node))
    }

    fn claim(&self, state: &State) -> Option<usize> {
        claim_type(state, types::CODE)
    }

    fn render(&self, _state: &State, claimed: &[Rendered<'_>]) -> String {
        let text = claimed[0].node.text();
        let longest = text
            .split(|c| c != Self::DELIMITER)
            .map(str::len)
            .max()
            .unwrap_or(0);
        let delimiter = Self::DELIMITER.to_string().repeat(longest + 1);
        let padded = text.starts_with([Self::DELIMITER, ' ']) && text.ends_with([Self::DELIMITER, ' '])
            || text.starts_with(Self::DELIMITER)
            || text.ends_with(Self::DELIMITER);
        if padded {
            format!("{delimiter} {text} {delimiter}")
        } else {
            format!("{delimiter}{text}{delimiter}")
        }
    }
}
