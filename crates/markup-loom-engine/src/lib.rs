//! Rule-driven, bidirectional conversion between markup text and typed node
//! trees.
//!
//! A [`State`] carries a named [`RulesSet`]; `deserialize` lexes text into
//! [`Node`]s and `serialize` emits them back. Concrete dialects live in
//! [`syntaxes`].
pub mod engine;
pub mod error;
pub mod liquid;
pub mod models;
pub mod syntaxes;

// Re-export key types for easier usage
pub use engine::{
    BLOCKS, INLINES, Match, ParseMode, Production, Rendered, Rule, RuleOptions, RulesSet, State,
    props,
};
pub use error::{Direction, Result, TransformError};
pub use models::{Block, Data, Document, Kind, Node, Text, Value, types};
