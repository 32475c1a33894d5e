//! Persistence Adapters - Repository implementations
//!
//! These implement the repository traits from warden-domain.

pub mod in_memory;
