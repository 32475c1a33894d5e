//! AttributeRegistry - The single source of truth for an entity type's fields
//!
//! Attributes are kept in declaration order. Every component that walks
//! the attributes (authorizer, validator, fill, serializer) iterates in
//! this order, which keeps error ordering reproducible.

use thiserror::Error;

use super::agent::Operation;
use super::attribute::Attribute;
use super::entity::{Entity, Value, ID_ATTRIBUTE};
use super::error::{ErrorKind, ErrorRecord};

/// Errors raised while building a registry
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Attribute '{name}' is already registered for '{entity_type}'")]
    DuplicateAttribute { entity_type: String, name: String },

    #[error("Owner attribute '{name}' is not registered for '{entity_type}'")]
    UnknownOwnerAttribute { entity_type: String, name: String },

    #[error("Entity type must not be empty")]
    EmptyEntityType,
}

/// Ordered collection of attributes owned by one entity type
#[derive(Debug, Clone)]
pub struct AttributeRegistry {
    entity_type: String,
    attributes: Vec<Attribute>,
    owner_attribute: Option<String>,
}

impl AttributeRegistry {
    /// Start building a registry for `entity_type`
    pub fn builder(entity_type: impl Into<String>) -> RegistryBuilder {
        RegistryBuilder {
            entity_type: entity_type.into(),
            attributes: Vec::new(),
            owner_attribute: None,
        }
    }

    pub fn entity_type(&self) -> &str {
        &self.entity_type
    }

    /// Upper-snake prefix of every code (`article` → `ARTICLE`)
    pub fn code_prefix(&self) -> String {
        self.entity_type.to_uppercase()
    }

    pub fn get(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name() == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Attributes in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &Attribute> {
        self.attributes.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.attributes.iter().map(|a| a.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Attribute whose value identifies the owning user, if any
    pub fn owner_attribute(&self) -> Option<&str> {
        self.owner_attribute.as_deref()
    }

    /// `{ENTITY}_NOT_AUTHORIZED`
    pub fn not_authorized_code(&self) -> String {
        format!("{}_{}", self.code_prefix(), ErrorKind::NotAuthorized.as_str())
    }

    /// Operation-level NOT_AUTHORIZED record
    pub fn not_authorized(&self, operation: Operation, entity: &Entity) -> ErrorRecord {
        ErrorRecord::new(
            ErrorKind::NotAuthorized,
            self.not_authorized_code(),
            self.entity_type.clone(),
            format!("You're not authorized to {} {}", operation, self.entity_type),
            entity.id().map(Value::from).unwrap_or(Value::Null),
        )
    }
}

/// Builder for [`AttributeRegistry`]
#[derive(Debug)]
pub struct RegistryBuilder {
    entity_type: String,
    attributes: Vec<Attribute>,
    owner_attribute: Option<String>,
}

impl RegistryBuilder {
    /// Append an attribute (declaration order is preserved)
    pub fn attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Declare which attribute holds the owner's id
    pub fn owned_by(mut self, attribute: impl Into<String>) -> Self {
        self.owner_attribute = Some(attribute.into());
        self
    }

    pub fn build(self) -> Result<AttributeRegistry, RegistryError> {
        if self.entity_type.trim().is_empty() {
            return Err(RegistryError::EmptyEntityType);
        }

        let mut attributes: Vec<Attribute> = Vec::with_capacity(self.attributes.len());
        for mut attribute in self.attributes {
            if attributes.iter().any(|a| a.name() == attribute.name()) {
                return Err(RegistryError::DuplicateAttribute {
                    entity_type: self.entity_type,
                    name: attribute.name().to_string(),
                });
            }
            attribute.bind(&self.entity_type);
            attributes.push(attribute);
        }

        if let Some(owner) = &self.owner_attribute {
            let known = owner == ID_ATTRIBUTE || attributes.iter().any(|a| a.name() == owner);
            if !known {
                return Err(RegistryError::UnknownOwnerAttribute {
                    entity_type: self.entity_type,
                    name: owner.clone(),
                });
            }
        }

        Ok(AttributeRegistry {
            entity_type: self.entity_type,
            attributes,
            owner_attribute: self.owner_attribute,
        })
    }
}
