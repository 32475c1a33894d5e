//! Repository Traits - The "Ports" of Hexagonal Architecture
//!
//! These traits define HOW the manager wants to persist entities,
//! but NOT how it's actually done. That's the adapter's job.
//!
//! ```text
//! Domain Layer          │  Adapter Layer
//! ──────────────────────┼────────────────────────
//! trait Repository      │  InMemoryRepository
//!   fn get()            │  (sql, document stores, ...)
//!   fn save()           │
//!   fn begin()          │
//! ```

pub mod entity_repository;

pub use entity_repository::*;
