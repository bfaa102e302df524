//! Reading trees and payloads from files.

use std::fs::{self, File};
use std::io::{BufReader, Read};
use std::path::Path;

use serde_json::Value;
use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::{self, DomainError, Payload, Tree};

/// Load the tree stored in a JSON file.
///
/// The document must be an object with exactly one key, the root name.
#[instrument(level = "debug")]
pub fn load(path: &Path) -> ApplicationResult<Tree> {
    let file = File::open(path).with_path_context("open tree file", path)?;
    let tree = load_reader(BufReader::new(file))?;
    debug!("{}: {} nodes, depth {}", path.display(), tree.len(), tree.depth());
    Ok(tree)
}

/// Load a tree from any reader, consuming it to the end.
pub fn load_reader<R: Read>(reader: R) -> ApplicationResult<Tree> {
    let value: Value = serde_json::from_reader(reader).map_err(|e| {
        if e.is_io() {
            ApplicationError::OperationFailed {
                context: "read tree source".to_string(),
                source: Box::new(e),
            }
        } else {
            ApplicationError::Domain(DomainError::MalformedInput(e.to_string()))
        }
    })?;
    Ok(domain::load_value(value)?)
}

/// Load a payload file: a JSON object of dotted path to number or null.
#[instrument(level = "debug")]
pub fn load_payload(path: &Path) -> ApplicationResult<Payload> {
    let content = fs::read_to_string(path).with_path_context("read payload file", path)?;
    let payload = domain::payload_from_str(&content)?;
    debug!("{}: {} payload entries", path.display(), payload.len());
    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_load_reader() {
        let tree = load_reader(Cursor::new(r#"{"site": {"rack1": null}}"#)).unwrap();
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn test_load_reader_malformed_is_domain_error() {
        let err = load_reader(Cursor::new("not json")).unwrap_err();
        assert!(matches!(
            err.domain(),
            Some(DomainError::MalformedInput(_))
        ));
    }

    #[test]
    fn test_load_missing_file_carries_path() {
        let err = load(Path::new("/nonexistent/racktree/tree.json")).unwrap_err();
        assert!(matches!(err, ApplicationError::OperationFailed { .. }));
        assert!(err.to_string().contains("/nonexistent/racktree/tree.json"));
    }
}
