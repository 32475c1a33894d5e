//! Authorizer - Operation and attribute level permission checks
//!
//! Both layers contribute to the same error list: at most one
//! operation-level `{ENTITY}_NOT_AUTHORIZED` followed by one
//! `{ENTITY}_{ATTRIBUTE}_NOT_AUTHORIZED` per denied attribute, in
//! registry order.

use std::collections::HashSet;
use std::sync::Arc;

use shared::ownership_permission;
use tracing::debug;

use crate::model::agent::{Agent, AgentKind, Operation};
use crate::model::entity::Entity;
use crate::model::error::{ErrorKind, ErrorRecord};
use crate::model::parameter_bag::ParameterBag;
use crate::model::registry::AttributeRegistry;

#[derive(Debug, Clone)]
pub struct Authorizer {
    registry: Arc<AttributeRegistry>,
    restrictions: HashSet<(AgentKind, Operation)>,
}

impl Authorizer {
    pub fn new(registry: Arc<AttributeRegistry>) -> Self {
        Self {
            registry,
            restrictions: HashSet::new(),
        }
    }

    /// Deny `operation` to every agent of `kind`. System agents are exempt.
    pub fn restrict(mut self, kind: AgentKind, operation: Operation) -> Self {
        self.restrictions.insert((kind, operation));
        self
    }

    pub fn is_restricted(&self, kind: AgentKind, operation: Operation) -> bool {
        kind != AgentKind::System && self.restrictions.contains(&(kind, operation))
    }

    pub fn registry(&self) -> &AttributeRegistry {
        &self.registry
    }

    /// Operation-level decision
    pub fn permits(&self, agent: &Agent, operation: Operation, entity: &Entity) -> bool {
        if self.is_restricted(agent.kind(), operation) {
            return false;
        }
        match agent {
            Agent::System | Agent::Guest => true,
            Agent::User(_) => {
                agent.can(operation, entity)
                    || self.registry.owner_attribute().is_some_and(|owner| {
                        agent.holds(&ownership_permission(entity.entity_type(), operation.as_str()))
                            && agent.owns(entity, owner)
                    })
            }
        }
    }

    /// Operation check plus a fill check for every parameter present
    pub fn can(
        &self,
        agent: &Agent,
        operation: Operation,
        entity: &Entity,
        parameters: &ParameterBag,
    ) -> Vec<ErrorRecord> {
        let mut errors = Vec::new();

        if !self.permits(agent, operation, entity) {
            debug!(
                entity_type = self.registry.entity_type(),
                operation = operation.as_str(),
                agent = %agent.describe(),
                "operation denied"
            );
            errors.push(self.registry.not_authorized(operation, entity));
        }

        errors.extend(self.fill(agent, parameters));
        errors
    }

    pub fn create(&self, agent: &Agent, entity: &Entity, parameters: &ParameterBag) -> Vec<ErrorRecord> {
        self.can(agent, Operation::Create, entity, parameters)
    }

    pub fn update(&self, agent: &Agent, entity: &Entity, parameters: &ParameterBag) -> Vec<ErrorRecord> {
        self.can(agent, Operation::Update, entity, parameters)
    }

    pub fn retrieve(&self, agent: &Agent, entity: &Entity, parameters: &ParameterBag) -> Vec<ErrorRecord> {
        self.can(agent, Operation::Retrieve, entity, parameters)
    }

    pub fn remove(&self, agent: &Agent, entity: &Entity, parameters: &ParameterBag) -> Vec<ErrorRecord> {
        self.can(agent, Operation::Remove, entity, parameters)
    }

    /// Attribute-level `permissionFill` check for the keys present in
    /// `parameters`. Non-fillable attributes are never written, so they are
    /// not checked.
    pub fn fill(&self, agent: &Agent, parameters: &ParameterBag) -> Vec<ErrorRecord> {
        self.registry
            .iter()
            .filter(|attribute| attribute.is_fillable())
            .filter_map(|attribute| {
                let value = parameters.get(attribute.name())?;
                if agent.holds(attribute.permission_fill()) {
                    return None;
                }
                debug!(attribute = attribute.name(), "fill denied");
                Some(attribute.error(ErrorKind::NotAuthorized, value.clone()))
            })
            .collect()
    }

    /// Attribute-level `permissionShow` check for the requested attributes.
    /// Unknown names are ignored.
    pub fn show(&self, agent: &Agent, entity: &Entity, attributes: &[&str]) -> Vec<ErrorRecord> {
        self.registry
            .iter()
            .filter(|attribute| attributes.iter().any(|name| *name == attribute.name()))
            .filter(|attribute| !agent.holds(attribute.permission_show()))
            .map(|attribute| {
                let value = entity.get(attribute.name()).unwrap_or_default();
                attribute.error(ErrorKind::NotAuthorized, value)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::agent::UserAgent;
    use crate::model::attribute::Attribute;
    use crate::model::entity::EntityId;
    use serde_json::json;

    fn articles() -> Authorizer {
        let registry = AttributeRegistry::builder("article")
            .attribute(Attribute::id())
            .attribute(Attribute::text("title").required())
            .attribute(Attribute::text("description"))
            .attribute(Attribute::integer("author"))
            .owned_by("author")
            .build()
            .unwrap();
        Authorizer::new(Arc::new(registry))
    }

    fn article_by(author: u64) -> Entity {
        let mut entity = Entity::new("article");
        entity.assign_id(EntityId::new(1));
        entity.set("author", json!(author));
        entity
    }

    fn bag() -> ParameterBag {
        ParameterBag::new().with("title", "foo").with("description", "bar")
    }

    fn user(id: u64, permissions: &[&str]) -> Agent {
        let mut user = UserAgent::new(EntityId::new(id));
        for permission in permissions {
            user.add_permission(*permission);
        }
        Agent::user(user)
    }

    #[test]
    fn test_unprivileged_user_gets_operation_and_attribute_errors() {
        let authorizer = articles();
        let errors = authorizer.create(&user(1, &[]), &Entity::new("article"), &bag());

        let codes: Vec<&str> = errors.iter().map(|e| e.code()).collect();
        assert_eq!(
            codes,
            vec![
                "ARTICLE_NOT_AUTHORIZED",
                "ARTICLE_TITLE_NOT_AUTHORIZED",
                "ARTICLE_DESCRIPTION_NOT_AUTHORIZED"
            ]
        );
        assert_eq!(errors[1].value(), &json!("foo"));
    }

    #[test]
    fn test_wildcard_grants() {
        let authorizer = articles();
        let agent = user(1, &["article.create", "article.attributes.title.*", "article.attributes.description.*"]);

        assert!(authorizer.create(&agent, &Entity::new("article"), &bag()).is_empty());

        let admin = user(2, &["article.*"]);
        assert!(authorizer.create(&admin, &Entity::new("article"), &bag()).is_empty());
    }

    #[test]
    fn test_attribute_errors_only_for_present_keys() {
        let authorizer = articles();
        let agent = user(1, &["article.create"]);
        let errors = authorizer.create(&agent, &Entity::new("article"), &ParameterBag::new().with("title", "foo"));

        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code(), "ARTICLE_TITLE_NOT_AUTHORIZED");
    }

    #[test]
    fn test_unregistered_keys_are_ignored() {
        let authorizer = articles();
        let agent = user(1, &["article.create"]);
        let errors = authorizer.create(&agent, &Entity::new("article"), &ParameterBag::new().with("author_id", 3));
        assert!(errors.is_empty());
    }

    #[test]
    fn test_non_fillable_keys_are_not_checked() {
        let authorizer = articles();
        let agent = user(1, &["article.create", "article.attributes.title.fill"]);
        let bag = ParameterBag::new().with("id", 99).with("title", "foo");

        assert!(authorizer.fill(&agent, &bag).is_empty());
        assert!(authorizer.create(&agent, &Entity::new("article"), &bag).is_empty());
    }

    #[test]
    fn test_ownership_scoped_update() {
        let authorizer = articles();
        let agent = user(7, &["article.update.own"]);

        assert!(authorizer.permits(&agent, Operation::Update, &article_by(7)));
        assert!(!authorizer.permits(&agent, Operation::Update, &article_by(8)));
        assert!(!authorizer.permits(&agent, Operation::Remove, &article_by(7)));
    }

    #[test]
    fn test_ownership_needs_owner_attribute() {
        let registry = AttributeRegistry::builder("tag")
            .attribute(Attribute::text("name"))
            .build()
            .unwrap();
        let authorizer = Authorizer::new(Arc::new(registry));
        let agent = user(7, &["tag.update.own"]);

        let mut tag = Entity::new("tag");
        tag.set("author", json!(7));
        assert!(!authorizer.permits(&agent, Operation::Update, &tag));
    }

    #[test]
    fn test_system_and_guest() {
        let authorizer = articles().restrict(AgentKind::Guest, Operation::Remove);
        let entity = article_by(1);

        assert!(authorizer.permits(&Agent::System, Operation::Remove, &entity));
        assert!(authorizer.permits(&Agent::Guest, Operation::Create, &entity));
        assert!(!authorizer.permits(&Agent::Guest, Operation::Remove, &entity));
        assert!(authorizer.can(&Agent::Guest, Operation::Update, &entity, &bag()).is_empty());

        let errors = authorizer.remove(&Agent::Guest, &entity, &ParameterBag::new());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code(), "ARTICLE_NOT_AUTHORIZED");
    }

    #[test]
    fn test_system_cannot_be_restricted() {
        let authorizer = articles().restrict(AgentKind::System, Operation::Remove);
        assert!(!authorizer.is_restricted(AgentKind::System, Operation::Remove));
        assert!(authorizer.permits(&Agent::System, Operation::Remove, &article_by(1)));
    }

    #[test]
    fn test_show_per_attribute() {
        let authorizer = articles();
        let agent = user(1, &["article.retrieve", "article.attributes.title.show"]);
        let mut entity = article_by(1);
        entity.set("title", json!("foo"));
        entity.set("description", json!("bar"));

        assert!(authorizer.retrieve(&agent, &entity, &ParameterBag::new()).is_empty());

        let errors = authorizer.show(&agent, &entity, &["title", "description", "unknown"]);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code(), "ARTICLE_DESCRIPTION_NOT_AUTHORIZED");
        assert_eq!(errors[0].value(), &json!("bar"));
    }
}
