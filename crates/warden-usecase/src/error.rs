//! Fatal manager errors
//!
//! Recoverable problems (authorization, validation) are reported inside a
//! `ResultExecute`. Anything here aborted the operation.

use thiserror::Error;
use warden_domain::RepositoryError;

#[derive(Debug, Error)]
pub enum ManagerError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("Manager for '{expected}' cannot handle entity of type '{actual}'")]
    EntityTypeMismatch { expected: String, actual: String },

    #[error("Cannot {operation} an entity that was never saved")]
    NotPersisted { operation: String },
}

pub type Result<T> = std::result::Result<T, ManagerError>;
