//! Parameter filters - Agent-scoped rewriting of operation input
//!
//! A filter runs before authorization and validation. The default keeps
//! the bag as it is; entity-specific filters resolve foreign-key style
//! input into verified references.

use std::sync::Arc;

use tracing::debug;

use crate::model::agent::Agent;
use crate::model::entity::{EntityId, Value};
use crate::model::parameter_bag::ParameterBag;
use crate::repository::{Repository, RepositoryError};

pub trait ParameterFilter: Send + Sync {
    fn filter(&self, parameters: ParameterBag, agent: &Agent) -> Result<ParameterBag, RepositoryError>;
}

/// Leaves the bag untouched
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityFilter;

impl ParameterFilter for IdentityFilter {
    fn filter(&self, parameters: ParameterBag, _agent: &Agent) -> Result<ParameterBag, RepositoryError> {
        Ok(parameters)
    }
}

/// Rewrites `source` (e.g. `author_id`) into `target` (e.g. `author`).
///
/// The target receives the id of the referenced entity when it exists,
/// null otherwise. The source key is removed.
pub struct ReferenceFilter {
    source: String,
    target: String,
    repository: Arc<dyn Repository>,
}

impl ReferenceFilter {
    pub fn new(source: impl Into<String>, target: impl Into<String>, repository: Arc<dyn Repository>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            repository,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn target(&self) -> &str {
        &self.target
    }
}

impl ParameterFilter for ReferenceFilter {
    fn filter(&self, mut parameters: ParameterBag, _agent: &Agent) -> Result<ParameterBag, RepositoryError> {
        let Some(raw) = parameters.remove(&self.source) else {
            return Ok(parameters);
        };

        let resolved = match EntityId::from_value(&raw) {
            Some(id) => self.repository.find_by_id(id)?.and_then(|entity| entity.id()),
            None => None,
        };
        debug!(
            source = %self.source,
            target = %self.target,
            referenced = self.repository.entity_type(),
            found = resolved.is_some(),
            "resolved reference"
        );

        parameters.set(self.target.clone(), resolved.map(Value::from).unwrap_or(Value::Null));
        Ok(parameters)
    }
}

impl core::fmt::Debug for ReferenceFilter {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ReferenceFilter")
            .field("source", &self.source)
            .field("target", &self.target)
            .field("repository", &self.repository.entity_type())
            .finish()
    }
}
