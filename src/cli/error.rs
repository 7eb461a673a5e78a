//! CLI-level errors (wraps infrastructure errors)

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;
use crate::exitcode;
use crate::infrastructure::InfraError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Infra(#[from] InfraError),

    #[error("invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("{0}")]
    Usage(String),
}

impl From<ApplicationError> for CliError {
    fn from(e: ApplicationError) -> Self {
        Self::Infra(e.into())
    }
}

impl From<DomainError> for CliError {
    fn from(e: DomainError) -> Self {
        Self::Infra(e.into())
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::InvalidArgs(_) | CliError::Usage(_) => exitcode::USAGE,
            CliError::Infra(InfraError::Io { .. }) => exitcode::IOERR,
            CliError::Infra(InfraError::Application(e)) => match e {
                ApplicationError::Domain(d) => domain_exit_code(d),
                ApplicationError::Config { .. } => exitcode::CONFIG,
                ApplicationError::OperationFailed { .. } => exitcode::IOERR,
            },
        }
    }
}

fn domain_exit_code(e: &DomainError) -> i32 {
    match e {
        e if e.is_not_found() => exitcode::NOINPUT,
        DomainError::CorruptHierarchy { .. } => exitcode::SOFTWARE,
        _ => exitcode::DATAERR,
    }
}
