//! # Warden Adapter Layer
//!
//! Implementations of the warden-domain ports (Hexagonal Architecture adapters).
//!
//! ## Structure
//!
//! - `repository/` - Persistence implementations

pub mod repository;

pub use repository::in_memory::{InMemoryRepository, InMemoryTransaction};
