//! Entity - An opaque record identified by a unique id
//!
//! Entities carry no behaviour of their own beyond get/set by attribute
//! name. They are created by a Repository, mutated only by the
//! EntityManager's fill step, and destroyed through the Repository.

use serde::{Deserialize, Serialize};
use serde_json::Map;

/// Attribute values are plain JSON values
pub type Value = serde_json::Value;

/// Name of the identity attribute
pub const ID_ATTRIBUTE: &str = "id";

/// Unique identifier for a persisted Entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(u64);

impl EntityId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn get(&self) -> u64 {
        self.0
    }

    /// Interpret a JSON value as an id (numbers and numeric strings)
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_u64().map(Self),
            Value::String(s) => s.parse().ok().map(Self),
            _ => None,
        }
    }
}

impl From<EntityId> for Value {
    fn from(id: EntityId) -> Self {
        Value::from(id.0)
    }
}

impl core::fmt::Display for EntityId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A record of one entity type
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    id: Option<EntityId>,
    entity_type: String,
    attributes: Map<String, Value>,
}

impl Entity {
    /// Create a blank, not yet persisted entity
    pub fn new(entity_type: impl Into<String>) -> Self {
        Self {
            id: None,
            entity_type: entity_type.into(),
            attributes: Map::new(),
        }
    }

    /// Builder: start from initial attribute values
    pub fn with_attributes(mut self, attributes: Map<String, Value>) -> Self {
        for (name, value) in attributes {
            self.set(name, value);
        }
        self
    }

    pub fn id(&self) -> Option<EntityId> {
        self.id
    }

    /// Assigned by the repository on first save
    pub fn assign_id(&mut self, id: EntityId) {
        self.id = Some(id);
    }

    pub fn entity_type(&self) -> &str {
        &self.entity_type
    }

    /// Whether the repository has stored this entity yet
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// Read an attribute. `id` resolves to the identity.
    pub fn get(&self, name: &str) -> Option<Value> {
        if name == ID_ATTRIBUTE {
            return self.id.map(Value::from);
        }
        self.attributes.get(name).cloned()
    }

    /// Borrow an attribute value without cloning; `id` is not stored here
    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// Whether the attribute has been set
    pub fn has(&self, name: &str) -> bool {
        if name == ID_ATTRIBUTE {
            return self.id.is_some();
        }
        self.attributes.contains_key(name)
    }

    /// Write an attribute. Writes to `id` are ignored; the repository owns it.
    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        if name == ID_ATTRIBUTE {
            return;
        }
        self.attributes.insert(name, value);
    }

    pub fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }
}

impl PartialEq for Entity {
    fn eq(&self, other: &Self) -> bool {
        // Persisted entities compare by identity; blank ones by content
        match (self.id, other.id) {
            (Some(a), Some(b)) => a == b && self.entity_type == other.entity_type,
            _ => {
                self.entity_type == other.entity_type
                    && self.id == other.id
                    && self.attributes == other.attributes
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_blank_entity() {
        let entity = Entity::new("user");

        assert_eq!(entity.entity_type(), "user");
        assert!(!entity.is_persisted());
        assert_eq!(entity.get("id"), None);
        assert!(!entity.has("id"));
    }

    #[test]
    fn test_get_set() {
        let mut entity = Entity::new("user");
        entity.set("username", json!("alice"));

        assert_eq!(entity.get("username"), Some(json!("alice")));
        assert!(entity.has("username"));
        assert!(!entity.has("email"));
    }

    #[test]
    fn test_id_is_repository_owned() {
        let mut entity = Entity::new("user");
        entity.set("id", json!(99));
        assert_eq!(entity.get("id"), None);

        entity.assign_id(EntityId::new(7));
        assert_eq!(entity.get("id"), Some(json!(7)));
        assert!(entity.is_persisted());
    }

    #[test]
    fn test_with_attributes() {
        let mut initial = Map::new();
        initial.insert("title".to_string(), json!("hello"));
        initial.insert("id".to_string(), json!(1));

        let entity = Entity::new("article").with_attributes(initial);
        assert_eq!(entity.get("title"), Some(json!("hello")));
        assert_eq!(entity.id(), None);
    }

    #[test]
    fn test_entity_equality_by_identity() {
        let mut a = Entity::new("user");
        a.assign_id(EntityId::new(1));
        a.set("username", json!("a"));

        let mut b = Entity::new("user");
        b.assign_id(EntityId::new(1));
        b.set("username", json!("changed"));

        // Same ID = same entity (even if other fields differ)
        assert_eq!(a, b);
    }

    #[test]
    fn test_entity_id_from_value() {
        assert_eq!(EntityId::from_value(&json!(3)), Some(EntityId::new(3)));
        assert_eq!(EntityId::from_value(&json!("12")), Some(EntityId::new(12)));
        assert_eq!(EntityId::from_value(&json!("x")), None);
        assert_eq!(EntityId::from_value(&json!(null)), None);
        assert_eq!(EntityId::new(5).to_string(), "5");
    }
}
