//! Path-addressable hierarchy trees.
//!
//! A [`domain::Tree`] is loaded from a nested JSON mapping, its nodes are
//! addressed by dotted ids such as `rack1.sg1.cmp1`, and values are applied in
//! batches where unknown paths are skipped instead of failing the batch.
//!
//! ```
//! use racktree::domain::{load_str, Payload};
//!
//! let mut tree = load_str(r#"{"site": {"rack1": {"sg1": null}}}"#).unwrap();
//! let payload = Payload::from([
//!     ("rack1.sg1".to_string(), Some(10.0)),
//!     ("rack9".to_string(), Some(1.0)),
//! ]);
//! assert_eq!(tree.update(&payload), 1);
//! assert_eq!(tree.value("rack1.sg1").unwrap(), Some(10.0));
//! assert!(tree.get("rack9").unwrap_err().is_not_found());
//! ```

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod tree_traits;
pub mod util;
