//! Application layer: loading trees and payloads from files
//!
//! This layer orchestrates domain logic and owns the I/O boundary.

pub mod error;
pub mod error_ext;
pub mod loader;

pub use error::{ApplicationError, ApplicationResult};
pub use error_ext::IoResultExt;
pub use loader::{load, load_payload, load_reader};
