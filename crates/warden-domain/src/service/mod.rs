//! Domain Services - The stages of the entity pipeline
//!
//! ```text
//! ParameterBag ──filter──► Authorizer ──► Validator ──► fill ──► Repository
//!                                                        │
//!                              Serializer ◄── read path ─┘
//! ```

pub mod authorizer;
pub mod filler;
pub mod filter;
pub mod serializer;
pub mod validator;

pub use authorizer::Authorizer;
pub use filler::fill;
pub use filter::{IdentityFilter, ParameterFilter, ReferenceFilter};
pub use serializer::{Serialized, Serializer};
pub use validator::Validator;
