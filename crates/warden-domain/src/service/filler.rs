//! Filler - Copies permitted input into an entity
//!
//! Only fillable attributes are written; non-fillable keys and keys the
//! agent may not fill are dropped without an error. On create, every
//! attribute still unset afterwards receives its default when it is not
//! null.

use tracing::debug;

use crate::model::agent::Agent;
use crate::model::entity::Entity;
use crate::model::parameter_bag::ParameterBag;
use crate::model::registry::AttributeRegistry;

/// Fill `entity` from `parameters`; returns the names written.
pub fn fill(
    registry: &AttributeRegistry,
    entity: &mut Entity,
    parameters: &ParameterBag,
    agent: Option<&Agent>,
) -> Vec<String> {
    let is_create = !entity.is_persisted();
    let mut written = Vec::new();

    for attribute in registry.iter() {
        if let Some(value) = parameters.get(attribute.name()) {
            let permitted = agent.map_or(true, |agent| agent.holds(attribute.permission_fill()));
            if attribute.is_fillable() && permitted {
                entity.set(attribute.name(), value.clone());
                written.push(attribute.name().to_string());
                continue;
            }
            debug!(attribute = attribute.name(), "skipping non-fillable attribute");
        }

        if is_create && !entity.has(attribute.name()) {
            let default = attribute.get_default(entity);
            if !default.is_null() {
                entity.set(attribute.name(), default);
                written.push(attribute.name().to_string());
            }
        }
    }

    written
}
