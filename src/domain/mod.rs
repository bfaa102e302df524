//! Domain layer: the tree and its construction
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod error;
pub mod parser;

pub use arena::{format_value, NodeId, Payload, Tree, TreeIterator, TreeNode, DEFAULT_SEPARATOR};
pub use error::{DomainError, TreeResult};
pub use parser::{load_str, load_value, parse, payload_from_str};
