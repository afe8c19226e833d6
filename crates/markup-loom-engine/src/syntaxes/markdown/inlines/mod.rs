//! Inline rules applied to paragraph and heading content.
pub mod code;
pub mod emphasis;

pub use code::CodeSpan;
pub use emphasis::{Bold, Italic};
