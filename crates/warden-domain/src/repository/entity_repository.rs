//! Entity Repository - Abstract persistence for one entity type
//!
//! The repository instantiates blank entities, answers queries and
//! persists or deletes entities. Writes are expected to run inside a
//! [`Transaction`] obtained from [`Repository::begin`].

use std::collections::BTreeMap;

use serde_json::Map;
use thiserror::Error;

use crate::model::entity::{Entity, EntityId, Value, ID_ATTRIBUTE};
use crate::model::parameter_bag::ParameterBag;

/// Repository errors. These are fatal for the operation that hit them.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("{entity_type} not found: {id}")]
    NotFound { entity_type: String, id: String },

    #[error("Persistence error: {message}")]
    Persistence { message: String },

    #[error("Constraint violation on {entity_type}.{field}: {value}")]
    ConstraintViolation {
        entity_type: String,
        field: String,
        value: String,
    },

    #[error("Transaction error: {message}")]
    Transaction { message: String },
}

#[derive(Debug, Clone, PartialEq)]
enum Clause {
    Eq(String, Value),
    In(String, Vec<Value>),
}

/// Conjunction of simple lookup clauses
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    clauses: Vec<Clause>,
    exclude_id: Option<EntityId>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// One `field = value` clause per bag entry
    pub fn matching(parameters: &ParameterBag) -> Self {
        parameters
            .iter()
            .fold(Self::new(), |query, (field, value)| query.where_eq(field, value.clone()))
    }

    /// `field = value`
    pub fn where_eq(mut self, field: impl Into<String>, value: Value) -> Self {
        self.clauses.push(Clause::Eq(field.into(), value));
        self
    }

    /// `field ∈ values`
    pub fn where_in(mut self, field: impl Into<String>, values: Vec<Value>) -> Self {
        self.clauses.push(Clause::In(field.into(), values));
        self
    }

    /// `id != id`
    pub fn exclude_id(mut self, id: Option<EntityId>) -> Self {
        self.exclude_id = id;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty() && self.exclude_id.is_none()
    }

    /// Does the entity satisfy every clause? Missing attributes read as null.
    pub fn matches(&self, entity: &Entity) -> bool {
        if self.exclude_id.is_some() && entity.id() == self.exclude_id {
            return false;
        }
        self.clauses.iter().all(|clause| match clause {
            Clause::Eq(field, value) => field_value(entity, field) == *value,
            Clause::In(field, values) => values.contains(&field_value(entity, field)),
        })
    }
}

fn field_value(entity: &Entity, field: &str) -> Value {
    entity.get(field).unwrap_or(Value::Null)
}

/// Transaction handle. Exactly one of commit or rollback ends it.
pub trait Transaction {
    fn commit(self: Box<Self>) -> Result<(), RepositoryError>;

    fn rollback(self: Box<Self>) -> Result<(), RepositoryError>;
}

/// Entity Repository Trait
///
/// This is a PORT in hexagonal architecture.
/// Methods take `&self`; implementations use interior mutability so a
/// repository can be shared between managers and filters.
pub trait Repository: Send + Sync {
    /// Entity type this repository stores
    fn entity_type(&self) -> &str;

    /// Instantiate a blank, unsaved entity
    fn new_entity(&self, initial: Map<String, Value>) -> Entity {
        Entity::new(self.entity_type()).with_attributes(initial)
    }

    /// All entities matching the query
    fn get(&self, query: &Query) -> Result<Vec<Entity>, RepositoryError>;

    /// Persist an entity; assigns the id on first save
    fn save(&self, entity: &mut Entity) -> Result<(), RepositoryError>;

    /// Delete a persisted entity
    fn delete(&self, entity: &Entity) -> Result<(), RepositoryError>;

    /// Open a transaction
    fn begin(&self) -> Result<Box<dyn Transaction + '_>, RepositoryError>;

    /// Start an empty query
    fn query(&self) -> Query {
        Query::new()
    }

    fn find_by_id(&self, id: EntityId) -> Result<Option<Entity>, RepositoryError> {
        self.find_one_by(&self.query().where_eq(ID_ATTRIBUTE, Value::from(id)))
    }

    /// First entity matching the query
    fn find_one_by(&self, query: &Query) -> Result<Option<Entity>, RepositoryError> {
        Ok(self.get(query)?.into_iter().next())
    }

    /// Entities whose fields are each within the given value sets
    fn find_where_in(&self, criteria: &BTreeMap<String, Vec<Value>>) -> Result<Vec<Entity>, RepositoryError> {
        let query = criteria
            .iter()
            .fold(self.query(), |query, (field, values)| query.where_in(field.clone(), values.clone()));
        self.get(&query)
    }

    /// Is there any entity matching the query?
    fn exists(&self, query: &Query) -> Result<bool, RepositoryError> {
        Ok(self.find_one_by(query)?.is_some())
    }
}
