pub mod node;
pub mod value;

pub use node::{Block, Document, Kind, Node, Text, types};
pub use value::{Data, Value};
