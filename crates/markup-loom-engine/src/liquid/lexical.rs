//! Regular expressions for the pieces of a templating tag.

use std::sync::OnceLock;

use regex::Regex;

pub const QUOTED: &str = r#"'(?:[^'\\]|\\.)*'|"(?:[^"\\]|\\.)*""#;
pub const NUMBER: &str = r"-?\d+\.?\d*|-?\.\d+";
pub const BOOL: &str = "true|false";
pub const IDENTIFIER: &str = r"[\w-]+";

/// `{% inner %}` at the start of the text. Groups: left `-` whitespace
/// control, inner text, right `-` whitespace control.
pub fn tag_block() -> &'static Regex {
    static TAG_BLOCK: OnceLock<Regex> = OnceLock::new();
    TAG_BLOCK.get_or_init(|| {
        Regex::new(r"^\{%(-?)\s*((?s:.*?))\s*(-?)%\}").expect("Invalid tag regex")
    })
}

/// Splits the inside of a tag into its name and the remaining properties.
pub fn tag_line() -> &'static Regex {
    static TAG_LINE: OnceLock<Regex> = OnceLock::new();
    TAG_LINE.get_or_init(|| {
        Regex::new(&format!(r"(?s)^\s*({IDENTIFIER})\s*(.*?)\s*$")).expect("Invalid tag line regex")
    })
}

/// One property: `key=value` (no spaces around `=`) or a positional token.
pub fn prop() -> &'static Regex {
    static PROP: OnceLock<Regex> = OnceLock::new();
    PROP.get_or_init(|| {
        Regex::new(&format!(
            r"\s*(?:({IDENTIFIER})=({QUOTED}|[^\s=]\S*)|({QUOTED}|\S+))"
        ))
        .expect("Invalid property regex")
    })
}

pub fn quoted_line() -> &'static Regex {
    static QUOTED_LINE: OnceLock<Regex> = OnceLock::new();
    QUOTED_LINE
        .get_or_init(|| Regex::new(&format!("^(?:{QUOTED})$")).expect("Invalid quoted regex"))
}

pub fn number_line() -> &'static Regex {
    static NUMBER_LINE: OnceLock<Regex> = OnceLock::new();
    NUMBER_LINE
        .get_or_init(|| Regex::new(&format!("^(?:{NUMBER})$")).expect("Invalid number regex"))
}

pub fn bool_line() -> &'static Regex {
    static BOOL_LINE: OnceLock<Regex> = OnceLock::new();
    BOOL_LINE.get_or_init(|| Regex::new(&format!("(?i)^(?:{BOOL})$")).expect("Invalid bool regex"))
}
