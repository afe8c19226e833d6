//! # Markdown Blocks
//!
//! Each block type is a marker struct owning its delimiters and implementing
//! [`Rule`](crate::engine::Rule). Parsers only match at the start of a line.
//!
//! - **`custom`**: `{% tag %}` templating tags, block or inline
//! - **`blank`**: skips blank lines between blocks
//! - **`code`**: fenced and indented code blocks
//! - **`block_quote`**: `> ` quoted blocks
//! - **`heading`**: `#` headings and horizontal rules
//! - **`list`**: ordered and unordered list items
//! - **`paragraph`**: terminated runs of text lines
//! - **`text`**: emit-only rules for raw text
pub mod blank;
pub mod block_quote;
pub mod code;
pub mod custom;
pub mod heading;
pub mod list;
pub mod paragraph;
pub mod text;

pub use blank::Blank;
pub use block_quote::BlockQuote;
pub use code::{CodeBlock, CodeFence, FenceSig, SYNTAX};
pub use custom::CustomTag;
pub use heading::{Heading, HorizontalRule};
pub use list::{BulletSig, List, ListBullet};
pub use paragraph::Paragraph;
pub use text::{TextLeaf, Unstyled};

/// Whether `line` opens a block that interrupts a paragraph.
pub fn opens_block(line: &str) -> bool {
    Heading::sig(line).is_some()
        || CodeFence::sig(line).is_some()
        || BlockQuote::strip_prefix(line).is_some()
        || CustomTag::sig(line)
        || ListBullet::sig(line).is_some()
}
