//! Serializer - Projects an entity onto a JSON map

use std::sync::Arc;

use serde_json::Map;

use crate::model::entity::{Entity, Value, ID_ATTRIBUTE};
use crate::model::error::ErrorRecord;
use crate::model::registry::AttributeRegistry;

/// Outcome of a guarded read
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct Serialized {
    pub attributes: Map<String, Value>,
    pub errors: Vec<ErrorRecord>,
}

impl Serialized {
    pub fn success(&self) -> bool {
        self.errors.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct Serializer {
    registry: Arc<AttributeRegistry>,
}

impl Serializer {
    pub fn new(registry: Arc<AttributeRegistry>) -> Self {
        Self { registry }
    }

    /// Names to project besides `id`: the selection restricted to registered
    /// attributes, or every attribute when nothing is selected.
    pub fn selection<'a>(&'a self, select: Option<&[&str]>) -> Vec<&'a str> {
        self.registry
            .iter()
            .map(|attribute| attribute.name())
            .filter(|name| *name != ID_ATTRIBUTE)
            .filter(|name| select.map_or(true, |select| select.iter().any(|s| s == name)))
            .collect()
    }

    /// `id` plus each named attribute; unset attributes serialize as null
    pub fn serialize(&self, entity: &Entity, attributes: &[&str]) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert(ID_ATTRIBUTE.to_string(), entity.get(ID_ATTRIBUTE).unwrap_or_default());
        for name in attributes {
            if *name == ID_ATTRIBUTE || !self.registry.contains(name) {
                continue;
            }
            map.insert(name.to_string(), entity.get(name).unwrap_or_default());
        }
        map
    }
}
