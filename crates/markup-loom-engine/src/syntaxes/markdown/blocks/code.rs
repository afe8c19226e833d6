//! Fenced and indented code blocks.
//!
//! Both forms produce the same `code_block` node: the body as one text leaf
//! (ending with a line break) and the info string under the `syntax` key.

use std::sync::OnceLock;

use regex::Regex;

use crate::engine::{Match, Rendered, Rule, RuleOptions, State, claim_type};
use crate::models::{Block, Value, types};

use super::super::utils::{blank_run, line_len, split_lines, trim_trailing_lines};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FenceSig {
    pub delimiter: char,
    /// Length of the delimiter run; a closing fence must be at least as long.
    pub run: usize,
}

pub struct CodeFence;

impl CodeFence {
    pub const BACKTICKS: char = '`';
    pub const TILDES: char = '~';
    pub const MIN_RUN: usize = 3;
    pub const DEFAULT: &'static str = "```";

    /// Detects an opening fence, returning its signature and info string.
    pub fn sig(line: &str) -> Option<(FenceSig, &str)> {
        let t = strip_indent(line.trim_end_matches(['\r', '\n']))?;
        let delimiter = t.chars().next()?;
        if delimiter != Self::BACKTICKS && delimiter != Self::TILDES {
            return None;
        }
        let info = t.trim_start_matches(delimiter);
        let run = t.len() - info.len();
        if run < Self::MIN_RUN {
            return None;
        }
        let info = info.trim();
        if delimiter == Self::BACKTICKS && info.contains(Self::BACKTICKS) {
            return None;
        }
        Some((FenceSig { delimiter, run }, info))
    }

    /// Whether `line` closes a fence opened with `open`.
    pub fn closes(open: FenceSig, line: &str) -> bool {
        let Some(t) = strip_indent(line.trim_end_matches(['\r', '\n'])) else {
            return false;
        };
        let rest = t.trim_start_matches(open.delimiter);
        t.len() - rest.len() >= open.run && rest.trim().is_empty()
    }
}

/// Drops up to three leading spaces; more make the line indented code.
fn strip_indent(line: &str) -> Option<&str> {
    let t = line.trim_start_matches(' ');
    (line.len() - t.len() <= 3).then_some(t)
}

fn indented() -> &'static Regex {
    static INDENTED: OnceLock<Regex> = OnceLock::new();
    INDENTED.get_or_init(|| {
        Regex::new(r"^(?:(?: {4}|\t)[^\n]+(?:\n+|$))+").expect("Invalid indented code regex")
    })
}

fn indentation() -> &'static Regex {
    static INDENTATION: OnceLock<Regex> = OnceLock::new();
    INDENTATION.get_or_init(|| Regex::new(r"(?m)^(?: {4}|\t)").expect("Invalid indentation regex"))
}

/// Data key of the info string.
pub const SYNTAX: &str = "syntax";

/// Code block rule: fences first, then four-space or tab indentation.
pub struct CodeBlock;

impl CodeBlock {
    fn node(body: String, syntax: &str) -> Block {
        let block = Block::new(types::CODE_BLOCK).with_text(body);
        if syntax.is_empty() {
            block
        } else {
            block.with_data(SYNTAX, syntax)
        }
    }

    fn parse_fenced(text: &str) -> Option<Match> {
        let first = line_len(text);
        let (sig, syntax) = CodeFence::sig(&text[..first])?;

        let mut consumed = first;
        let mut body = String::new();
        let mut closed = false;
        for line in text[first..].split_inclusive('\n') {
            consumed += line.len();
            if CodeFence::closes(sig, line) {
                closed = true;
                break;
            }
            body.push_str(line);
        }
        if closed {
            consumed += blank_run(&text[consumed..]);
        }
        Some(Match::node(consumed, Self::node(body, syntax)))
    }

    fn parse_indented(text: &str) -> Option<Match> {
        let found = indented().find(text)?;
        let inner = indentation().replace_all(found.as_str(), "");
        let mut body = trim_trailing_lines(&inner).to_string();
        body.push('\n');
        Some(Match::node(found.end(), Self::node(body, "")))
    }
}

impl Rule for CodeBlock {
    fn name(&self) -> &str {
        "code"
    }

    fn options(&self) -> RuleOptions {
        RuleOptions::raw()
    }

    fn parse(&self, state: &State) -> Option<Match> {
        if !state.at_line_start() {
            return None;
        }
        let text = state.text();
        Self::parse_fenced(text).or_else(|| Self::parse_indented(text))
    }

    fn claim(&self, state: &State) -> Option<usize> {
        claim_type(state, types::CODE_BLOCK)
    }

    fn render(&self, _state: &State, claimed: &[Rendered<'_>]) -> String {
        let node = claimed[0].node;
        let body = node.text();
        let syntax = node
            .as_block()
            .and_then(|b| b.data.get(SYNTAX))
            .and_then(Value::as_str)
            .unwrap_or_default();

        // A body containing the fence itself would end the block early.
        if !body.contains(CodeFence::DEFAULT) {
            let mut out = format!("{}{syntax}\n{body}", CodeFence::DEFAULT);
            if !body.is_empty() && !body.ends_with('\n') {
                out.push('\n');
            }
            out.push_str(CodeFence::DEFAULT);
            out.push_str("\n\n");
            return out;
        }

        let lines: Vec<String> = split_lines(trim_trailing_lines(&body))
            .map(|line| {
                if line.trim().is_empty() {
                    String::new()
                } else {
                    format!("    {line}")
                }
            })
            .collect();
        lines.join("\n") + "\n\n"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn detect_backtick_fence() {
        let (sig, info) = CodeFence::sig("```rust\n").unwrap();
        assert_eq!(
            sig,
            FenceSig {
                delimiter: '`',
                run: 3
            }
        );
        assert_eq!(info, "rust");
    }

    #[test]
    fn detect_tilde_fence() {
        assert_eq!(CodeFence::sig("~~~~").unwrap().0.run, 4);
    }

    #[test]
    fn no_fence() {
        assert_eq!(CodeFence::sig("hello"), None);
        assert_eq!(CodeFence::sig("``"), None);
        assert_eq!(CodeFence::sig("    ```"), None);
        assert_eq!(CodeFence::sig("``` a`b"), None);
    }

    #[test]
    fn closes_matching_fence() {
        let (sig, _) = CodeFence::sig("````").unwrap();
        assert!(CodeFence::closes(sig, "`````\n"));
        assert!(!CodeFence::closes(sig, "```\n"));
        assert!(!CodeFence::closes(sig, "~~~~\n"));
        assert!(!CodeFence::closes(sig, "```` x\n"));
    }

    #[test]
    fn unterminated_fence_takes_the_rest() {
        let m = CodeBlock::parse_fenced("```\na\nb").unwrap();
        assert_eq!(m.consumed, 7);
    }

    #[test]
    fn indented_body_is_stripped_and_normalized() {
        let m = CodeBlock::parse_indented("    a\n\tb\n\n\nnext").unwrap();
        assert_eq!(m.consumed, 11);
        let expected = Match::node(11, CodeBlock::node("a\nb\n".into(), ""));
        assert_eq!(m, expected);
    }
}
