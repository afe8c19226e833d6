use std::fmt;

/// Direction of a transformation, used in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Deserialize,
    Serialize,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Deserialize => f.write_str("deserializing"),
            Direction::Serialize => f.write_str("serializing"),
        }
    }
}

/// Fatal transformation errors. Malformed input never produces one of these;
/// they signal a broken rule definition or an unregistered node type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransformError {
    #[error("rule `{rule}` matched without making progress while {direction}")]
    NoProgress { rule: String, direction: Direction },
    #[error("rule `{rule}` consumed {consumed} bytes but only {available} remain on a character boundary")]
    Overrun {
        rule: String,
        consumed: usize,
        available: usize,
    },
    #[error("no rule matches node {kind}#{node_type}")]
    UnknownNode { kind: String, node_type: String },
}

pub type Result<T> = std::result::Result<T, TransformError>;
