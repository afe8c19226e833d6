//! # Transformation Engine
//!
//! Rule-driven conversion between text and node trees, in both directions.
//!
//! ## Modules
//!
//! - **`state`**: `State`, the immutable snapshot every step returns a new copy of
//! - **`rule`**: the `Rule` trait, `Match`/`Production` parse results and `RulesSet`
//! - **`lex`**: text → nodes, first-match-wins with one-character backtracking
//! - **`serialize`**: nodes → text, claim then render with children rendered first
//! - **`nested`**: pairs opening and closing template tags into container blocks
pub(crate) mod lex;
pub mod nested;
pub mod rule;
pub(crate) mod serialize;
pub mod state;

pub use nested::{CLOSER_DATA_PREFIX, is_closing_tag};
pub use rule::{
    BLOCKS, INLINES, Match, ParseMode, Production, Rendered, Rule, RuleOptions, RulesSet,
    claim_type,
};
pub use state::{State, props};
