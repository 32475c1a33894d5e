//! Error types for Warden configuration and role resolution

use thiserror::Error;

/// Error thrown when a role is not found
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Role '{role_id}' not found. Available roles: {}", available_roles.join(", "))]
pub struct RoleNotFoundError {
    pub role_id: String,
    pub available_roles: Vec<String>,
}

/// General error type for the shared layer
#[derive(Debug, Error)]
pub enum SharedError {
    #[error(transparent)]
    RoleNotFound(#[from] RoleNotFoundError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, SharedError>;
