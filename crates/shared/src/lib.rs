//! # Warden Shared
//!
//! Common types used across all Warden packages: permission keys and
//! wildcard permission sets, role definitions, and configuration loading.

pub mod error;
pub mod permission;
pub mod role;
pub mod config;

// Re-exports
pub use error::*;
pub use permission::*;
pub use role::*;
pub use config::*;
