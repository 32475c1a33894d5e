//! EntityManager - Orchestrates authorize → validate → fill → persist
//!
//! ```text
//! create/update:
//!   ParameterBag ──filter──► Authorizer ──► Validator ──► ok? ──► edit
//!                                   (errors merged, in this order)  │
//!                                              begin ─ fill ─ save ─ commit
//! remove:
//!   Authorizer ──► ok? ──► begin ─ delete ─ commit
//! ```
//!
//! Authorization and validation never short-circuit each other. Only
//! `edit` and `delete` touch storage, each inside its own transaction.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use audit::{AuditLogger, AuditOutcome};
use serde_json::Map;
use tracing::{debug, info, warn};
use warden_domain::service::filler;
use warden_domain::{
    Agent, AttributeRegistry, Authorizer, Entity, EntityId, ErrorKind, IdentityFilter, Operation,
    ParameterBag, ParameterFilter, Query, Repository, ResultExecute, Serialized, Serializer,
    Transaction, Validator, Value,
};

use crate::error::{ManagerError, Result};

/// Manager for one entity type
pub struct EntityManager {
    registry: Arc<AttributeRegistry>,
    repository: Arc<dyn Repository>,
    authorizer: Authorizer,
    validator: Validator,
    serializer: Serializer,
    filter: Arc<dyn ParameterFilter>,
    agent: Option<Agent>,
    audit: Option<Arc<Mutex<AuditLogger>>>,
}

impl EntityManager {
    /// Manager without an agent: no filtering, no authorization
    pub fn new(registry: Arc<AttributeRegistry>, repository: Arc<dyn Repository>) -> Self {
        Self {
            authorizer: Authorizer::new(registry.clone()),
            validator: Validator::new(registry.clone(), repository.clone()),
            serializer: Serializer::new(registry.clone()),
            filter: Arc::new(IdentityFilter),
            agent: None,
            audit: None,
            registry,
            repository,
        }
    }

    /// Builder: act on behalf of `agent`
    pub fn with_agent(mut self, agent: Agent) -> Self {
        self.agent = Some(agent);
        self
    }

    /// Builder: rewrite input before authorization
    pub fn with_filter(mut self, filter: Arc<dyn ParameterFilter>) -> Self {
        self.filter = filter;
        self
    }

    /// Builder: replace the authorizer (e.g. one with restrictions)
    pub fn with_authorizer(mut self, authorizer: Authorizer) -> Self {
        self.authorizer = authorizer;
        self
    }

    /// Builder: record every mutation attempt
    pub fn with_audit(mut self, audit: Arc<Mutex<AuditLogger>>) -> Self {
        self.audit = Some(audit);
        self
    }

    pub fn set_agent(&mut self, agent: Agent) -> &mut Self {
        self.agent = Some(agent);
        self
    }

    pub fn agent(&self) -> Option<&Agent> {
        self.agent.as_ref()
    }

    pub fn registry(&self) -> &AttributeRegistry {
        &self.registry
    }

    pub fn repository(&self) -> &dyn Repository {
        self.repository.as_ref()
    }

    pub fn entity_type(&self) -> &str {
        self.registry.entity_type()
    }

    // ========== Read path ==========

    /// First entity matching every parameter. Not authorized.
    pub fn find(&self, parameters: &ParameterBag) -> Result<Option<Entity>> {
        Ok(self.repository.find_one_by(&Query::matching(parameters))?)
    }

    pub fn find_by_id(&self, id: EntityId) -> Result<Option<Entity>> {
        Ok(self.repository.find_by_id(id)?)
    }

    /// Entities whose fields fall within the given value sets. Not authorized.
    pub fn find_where_in(&self, criteria: &BTreeMap<String, Vec<Value>>) -> Result<Vec<Entity>> {
        Ok(self.repository.find_where_in(criteria)?)
    }

    /// Guarded projection of `entity`: `retrieve` at operation level, then
    /// `show` per attribute. Denied attributes are left out.
    pub fn serialize(&self, entity: &Entity, select: Option<&[&str]>) -> Serialized {
        let names = self.serializer.selection(select);

        let Some(agent) = &self.agent else {
            return Serialized {
                attributes: self.serializer.serialize(entity, &names),
                errors: Vec::new(),
            };
        };

        let errors = self.authorizer.retrieve(agent, entity, &ParameterBag::new());
        if !errors.is_empty() {
            return Serialized {
                attributes: Map::new(),
                errors,
            };
        }

        let denied = self.authorizer.show(agent, entity, &names);
        let allowed: Vec<&str> = names
            .into_iter()
            .filter(|name| denied.iter().all(|error| error.label() != *name))
            .collect();

        Serialized {
            attributes: self.serializer.serialize(entity, &allowed),
            errors: denied,
        }
    }

    // ========== Write path ==========

    /// Create a new entity from `parameters`
    pub fn create(&self, parameters: ParameterBag) -> Result<ResultExecute> {
        let entity = self.repository.new_entity(Map::new());
        self.mutate(Operation::Create, entity, parameters)
    }

    /// Update `entity` with `parameters`. The caller's copy is not modified;
    /// the updated entity is the result's resource.
    pub fn update(&self, entity: &Entity, parameters: ParameterBag) -> Result<ResultExecute> {
        self.check_type(entity)?;
        if !entity.is_persisted() {
            return Err(ManagerError::NotPersisted {
                operation: Operation::Update.to_string(),
            });
        }
        self.mutate(Operation::Update, entity.clone(), parameters)
    }

    fn mutate(&self, operation: Operation, entity: Entity, mut parameters: ParameterBag) -> Result<ResultExecute> {
        let mut result = ResultExecute::new();

        if let Some(agent) = &self.agent {
            parameters = parameters.filter_by_agent(agent, self.filter.as_ref())?;
            result.add_errors(self.authorizer.can(agent, operation, &entity, &parameters));
        }

        let is_create = operation == Operation::Create;
        result.add_errors(self.validator.validate(&entity, &parameters, is_create)?);

        if !result.success() {
            debug!(
                entity_type = self.entity_type(),
                operation = operation.as_str(),
                errors = ?result.codes(),
                "operation refused"
            );
            self.record(operation, &entity, &result);
            return Ok(result);
        }

        let result = self.edit(entity, &parameters)?;
        if let Some(entity) = result.resource() {
            self.record(operation, entity, &result);
        }
        Ok(result)
    }

    /// Fill and save inside a transaction. A failure rolls back and is
    /// returned unchanged.
    pub fn edit(&self, mut entity: Entity, parameters: &ParameterBag) -> Result<ResultExecute> {
        let transaction = self.repository.begin()?;

        let written = filler::fill(&self.registry, &mut entity, parameters, self.agent.as_ref());
        if let Err(err) = self.repository.save(&mut entity) {
            warn!(entity_type = self.entity_type(), error = %err, "save failed, rolling back");
            rollback(transaction);
            return Err(err.into());
        }
        transaction.commit()?;

        info!(
            entity_type = self.entity_type(),
            entity_id = ?entity.id().map(|id| id.get()),
            attributes = ?written,
            "entity saved"
        );

        let mut result = ResultExecute::new();
        result.add_resource(entity);
        Ok(result)
    }

    /// Remove `entity` if the agent may
    pub fn remove(&self, entity: &Entity) -> Result<ResultExecute> {
        self.check_type(entity)?;
        if !entity.is_persisted() {
            return Err(ManagerError::NotPersisted {
                operation: Operation::Remove.to_string(),
            });
        }

        let mut result = ResultExecute::new();
        if let Some(agent) = &self.agent {
            result.add_errors(self.authorizer.remove(agent, entity, &ParameterBag::new()));
        }

        if result.success() {
            self.delete(entity)?;
        }
        self.record(Operation::Remove, entity, &result);
        Ok(result)
    }

    fn delete(&self, entity: &Entity) -> Result<()> {
        let transaction = self.repository.begin()?;

        if let Err(err) = self.repository.delete(entity) {
            warn!(entity_type = self.entity_type(), error = %err, "delete failed, rolling back");
            rollback(transaction);
            return Err(err.into());
        }
        transaction.commit()?;

        info!(
            entity_type = self.entity_type(),
            entity_id = ?entity.id().map(|id| id.get()),
            "entity removed"
        );
        Ok(())
    }

    /// Return the entity matching `parameters`, or create it
    pub fn find_or_create(&self, parameters: ParameterBag) -> Result<ResultExecute> {
        match self.find(&parameters)? {
            Some(entity) => {
                let mut result = ResultExecute::new();
                result.add_resource(entity);
                Ok(result)
            }
            None => self.create(parameters),
        }
    }

    /// Update the entity matching `parameters`, or create it.
    ///
    /// The lookup uses `parameters`, not `criteria`.
    pub fn update_or_create(&self, criteria: &ParameterBag, parameters: ParameterBag) -> Result<ResultExecute> {
        debug!(
            entity_type = self.entity_type(),
            criteria = ?criteria.keys(),
            "update_or_create looks up by parameters"
        );
        match self.find(&parameters)? {
            Some(entity) => self.update(&entity, parameters),
            None => self.create(parameters),
        }
    }

    // ========== Helpers ==========

    fn check_type(&self, entity: &Entity) -> Result<()> {
        if entity.entity_type() != self.entity_type() {
            return Err(ManagerError::EntityTypeMismatch {
                expected: self.entity_type().to_string(),
                actual: entity.entity_type().to_string(),
            });
        }
        Ok(())
    }

    fn record(&self, operation: Operation, entity: &Entity, result: &ResultExecute) {
        let Some(audit) = &self.audit else {
            return;
        };
        let outcome = if result.success() {
            AuditOutcome::Granted
        } else if result.errors().iter().any(|e| e.kind() == ErrorKind::NotAuthorized) {
            AuditOutcome::Denied
        } else {
            AuditOutcome::Rejected
        };
        let agent = self
            .agent
            .as_ref()
            .map(Agent::describe)
            .unwrap_or_else(|| "none".to_string());
        let codes = result.codes().into_iter().map(str::to_string).collect();

        match audit.lock() {
            Ok(mut logger) => logger.log_operation(
                operation.as_str(),
                self.entity_type(),
                entity.id().map(|id| id.get()),
                &agent,
                outcome,
                codes,
            ),
            Err(_) => warn!("audit logger lock poisoned, entry dropped"),
        }
    }
}

fn rollback(transaction: Box<dyn Transaction + '_>) {
    if let Err(err) = transaction.rollback() {
        warn!(error = %err, "rollback failed");
    }
}

impl core::fmt::Debug for EntityManager {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EntityManager")
            .field("entity_type", &self.entity_type())
            .field("agent", &self.agent)
            .field("audited", &self.audit.is_some())
            .finish()
    }
}
