//! Validator - Required / valid / unique checks per attribute
//!
//! Every attribute is checked, in registry order; a failing field never
//! stops the others. Within one field the checks stop at the first
//! failure.

use std::sync::Arc;

use tracing::debug;

use crate::model::entity::Entity;
use crate::model::error::{ErrorKind, ErrorRecord};
use crate::model::parameter_bag::ParameterBag;
use crate::model::registry::AttributeRegistry;
use crate::repository::{Query, Repository, RepositoryError};

pub struct Validator {
    registry: Arc<AttributeRegistry>,
    repository: Arc<dyn Repository>,
}

impl Validator {
    pub fn new(registry: Arc<AttributeRegistry>, repository: Arc<dyn Repository>) -> Self {
        Self { registry, repository }
    }

    /// Collect the validation errors for one operation.
    ///
    /// Only the uniqueness lookup touches the repository; its failure is
    /// returned as `Err`.
    pub fn validate(
        &self,
        entity: &Entity,
        parameters: &ParameterBag,
        is_create: bool,
    ) -> Result<Vec<ErrorRecord>, RepositoryError> {
        let mut errors = Vec::new();

        for attribute in self.registry.iter() {
            let Some(value) = parameters.get(attribute.name()) else {
                if is_create && attribute.is_required() && !attribute.has_default() {
                    errors.push(attribute.error(ErrorKind::NotDefined, serde_json::Value::Null));
                }
                continue;
            };

            if !attribute.valid(entity, value) {
                errors.push(attribute.error(ErrorKind::NotValid, value.clone()));
                continue;
            }

            if attribute.is_unique() {
                let query = Query::new()
                    .where_eq(attribute.name(), value.clone())
                    .exclude_id(entity.id());
                if self.repository.exists(&query)? {
                    debug!(attribute = attribute.name(), "value already taken");
                    errors.push(attribute.error(ErrorKind::NotUnique, value.clone()));
                }
            }
        }

        Ok(errors)
    }
}

impl core::fmt::Debug for Validator {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Validator")
            .field("entity_type", &self.registry.entity_type())
            .finish()
    }
}
