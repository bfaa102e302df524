//! CLI-level errors (wraps application errors)

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Application(#[from] ApplicationError),

    #[error("invalid arguments: {0}")]
    InvalidArgs(String),
}

impl From<DomainError> for CliError {
    fn from(e: DomainError) -> Self {
        CliError::Application(ApplicationError::Domain(e))
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::InvalidArgs(_) => crate::exitcode::USAGE,
            CliError::Application(e) => match e {
                ApplicationError::Domain(DomainError::NotFound { .. }) => {
                    crate::exitcode::NOT_FOUND
                }
                ApplicationError::Domain(DomainError::ForeignNode(_)) => {
                    crate::exitcode::SOFTWARE
                }
                ApplicationError::Domain(_) => crate::exitcode::DATAERR,
                ApplicationError::Config { .. } => crate::exitcode::CONFIG,
                ApplicationError::OperationFailed { .. } => crate::exitcode::IOERR,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exitcode;

    #[test]
    fn test_exit_codes() {
        let not_found = CliError::from(DomainError::NotFound {
            path: "a.b".into(),
            segment: "b".into(),
        });
        assert_eq!(not_found.exit_code(), exitcode::NOT_FOUND);

        let malformed = CliError::from(DomainError::MalformedInput("x".into()));
        assert_eq!(malformed.exit_code(), exitcode::DATAERR);

        let usage = CliError::InvalidArgs("no tree file".into());
        assert_eq!(usage.exit_code(), exitcode::USAGE);
    }
}
