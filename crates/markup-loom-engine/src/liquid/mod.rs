//! Templating-tag vocabulary: `{% name arg key=value %}`.
pub mod lexical;
mod tag;

pub use tag::{ARGS, SOURCE, TRIM_LEFT, TRIM_RIGHT, parse_tag, read_tag, stringify_tag};
