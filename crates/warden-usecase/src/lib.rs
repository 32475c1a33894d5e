//! # Warden Use Case Layer
//!
//! Application-specific business rules.
//! The [`EntityManager`] drives the authorize → validate → fill → persist
//! pipeline over the domain services and a repository port.

pub mod error;
pub mod manager;

#[cfg(test)]
mod fixtures;

pub use error::{ManagerError, Result};
pub use manager::EntityManager;

pub use warden_domain;
