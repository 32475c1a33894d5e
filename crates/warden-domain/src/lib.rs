//! # Warden Domain Layer
//!
//! Entities, per-field attribute contracts, agents and the services that
//! authorize, validate and fill entities.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Domain Layer (This Crate)                     │
//! │  ┌─────────────────────────────────────────────────────────────┐│
//! │  │  model/     - Entity, Attribute, Agent, ParameterBag, ...   ││
//! │  │  repository/- Trait definitions (not implementations)       ││
//! │  │  service/   - Authorizer, Validator, fill, Serializer       ││
//! │  └─────────────────────────────────────────────────────────────┘│
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## The Golden Rule
//!
//! **No storage engine lives here.**
//!
//! The orchestration of these services lives in `warden-usecase`; concrete
//! repositories live in `warden-adapter`.

pub mod model;
pub mod repository;
pub mod service;

// Re-export commonly used types
pub use model::{
    agent::{Agent, AgentKind, Operation, UserAgent},
    attribute::{Attribute, AttributeKind},
    entity::{Entity, EntityId, Value, ID_ATTRIBUTE},
    error::{ErrorKind, ErrorRecord},
    parameter_bag::ParameterBag,
    registry::{AttributeRegistry, RegistryBuilder, RegistryError},
    result::ResultExecute,
};

pub use repository::entity_repository::{Query, Repository, RepositoryError, Transaction};

pub use service::{
    authorizer::Authorizer,
    filter::{IdentityFilter, ParameterFilter, ReferenceFilter},
    serializer::{Serialized, Serializer},
    validator::Validator,
};
