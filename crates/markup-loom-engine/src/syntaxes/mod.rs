//! Rule registries for concrete markup dialects.
//!
//! - **`markdown`**: parses and emits Markdown with templating tags
//! - **`asciidoc`**: emits AsciiDoc from the same node tree
pub mod asciidoc;
pub mod markdown;
