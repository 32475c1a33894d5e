//! Agent - The actor on whose behalf an operation is attempted
//!
//! A closed sum type: `System` and `Guest` are capability-transparent
//! stand-ins, `User` carries a permission set and an identity used for
//! ownership checks.

use shared::{operation_permission, PermissionSet};

use super::entity::{Entity, EntityId, Value, ID_ATTRIBUTE};

/// Operations an agent may attempt on an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Create,
    Update,
    Retrieve,
    Remove,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Retrieve => "retrieve",
            Operation::Remove => "remove",
        }
    }
}

impl core::fmt::Display for Operation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tag of an Agent variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgentKind {
    System,
    Guest,
    User,
}

/// An authenticated (or anonymous) user and its grants
#[derive(Debug, Clone, Default)]
pub struct UserAgent {
    id: Option<EntityId>,
    permissions: PermissionSet,
}

impl UserAgent {
    /// User with an identity and no permissions
    pub fn new(id: EntityId) -> Self {
        Self {
            id: Some(id),
            permissions: PermissionSet::new(),
        }
    }

    /// User without identity or permissions
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Builder: replace the permission set
    pub fn with_permissions(mut self, permissions: PermissionSet) -> Self {
        self.permissions = permissions;
        self
    }

    pub fn add_permission(&mut self, permission: impl Into<String>) {
        self.permissions.grant(permission);
    }

    pub fn id(&self) -> Option<EntityId> {
        self.id
    }

    pub fn permissions(&self) -> &PermissionSet {
        &self.permissions
    }
}

/// The acting agent
#[derive(Debug, Clone)]
pub enum Agent {
    System,
    Guest,
    User(UserAgent),
}

impl Agent {
    pub fn user(user: UserAgent) -> Self {
        Agent::User(user)
    }

    pub fn kind(&self) -> AgentKind {
        match self {
            Agent::System => AgentKind::System,
            Agent::Guest => AgentKind::Guest,
            Agent::User(_) => AgentKind::User,
        }
    }

    /// Identity used for ownership comparisons
    pub fn identity(&self) -> Option<EntityId> {
        match self {
            Agent::User(user) => user.id(),
            _ => None,
        }
    }

    /// Permission-set membership. System and Guest hold everything.
    pub fn holds(&self, permission: &str) -> bool {
        match self {
            Agent::System | Agent::Guest => true,
            Agent::User(user) => user.permissions().allows(permission),
        }
    }

    /// Can this agent perform `operation` on `entity`?
    pub fn can(&self, operation: Operation, entity: &Entity) -> bool {
        self.holds(&operation_permission(entity.entity_type(), operation.as_str()))
    }

    /// Does the entity's owner attribute point at this agent?
    pub fn owns(&self, entity: &Entity, owner_attribute: &str) -> bool {
        let Some(identity) = self.identity() else {
            return false;
        };
        let owner = if owner_attribute == ID_ATTRIBUTE {
            entity.id()
        } else {
            entity.attribute(owner_attribute).and_then(owner_id)
        };
        owner == Some(identity)
    }

    /// Short description for logs and audit entries
    pub fn describe(&self) -> String {
        match self {
            Agent::System => "system".to_string(),
            Agent::Guest => "guest".to_string(),
            Agent::User(user) => match user.id() {
                Some(id) => format!("user:{}", id),
                None => "user:anonymous".to_string(),
            },
        }
    }
}

// Owner attributes hold either a bare id or an embedded `{ "id": .. }` object
fn owner_id(value: &Value) -> Option<EntityId> {
    match value {
        Value::Object(map) => map.get(ID_ATTRIBUTE).and_then(EntityId::from_value),
        other => EntityId::from_value(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn article(author: Value) -> Entity {
        let mut entity = Entity::new("article");
        entity.assign_id(EntityId::new(10));
        entity.set("author", author);
        entity
    }

    #[test]
    fn test_system_and_guest_are_transparent() {
        let entity = Entity::new("article");

        assert!(Agent::System.can(Operation::Remove, &entity));
        assert!(Agent::Guest.can(Operation::Create, &entity));
        assert!(Agent::Guest.holds("article.attributes.title.fill"));
        assert_eq!(Agent::Guest.identity(), None);
    }

    #[test]
    fn test_user_permission_check() {
        let mut user = UserAgent::new(EntityId::new(1));
        user.add_permission("article.create");
        let agent = Agent::user(user);
        let entity = Entity::new("article");

        assert!(agent.can(Operation::Create, &entity));
        assert!(!agent.can(Operation::Update, &entity));
        assert_eq!(agent.kind(), AgentKind::User);
    }

    #[test]
    fn test_anonymous_user_holds_nothing() {
        let agent = Agent::user(UserAgent::anonymous());

        assert!(!agent.holds("article.create"));
        assert_eq!(agent.describe(), "user:anonymous");
    }

    #[test]
    fn test_ownership_by_reference() {
        let agent = Agent::user(UserAgent::new(EntityId::new(3)));

        assert!(agent.owns(&article(json!(3)), "author"));
        assert!(agent.owns(&article(json!({ "id": 3 })), "author"));
        assert!(!agent.owns(&article(json!(4)), "author"));
        assert!(!agent.owns(&article(Value::Null), "author"));
    }

    #[test]
    fn test_ownership_of_own_record() {
        let agent = Agent::user(UserAgent::new(EntityId::new(10)));
        let entity = article(Value::Null);

        assert!(agent.owns(&entity, "id"));
        assert!(!Agent::System.owns(&entity, "id"));
        assert!(!Agent::user(UserAgent::anonymous()).owns(&entity, "id"));
    }

    #[test]
    fn test_describe() {
        assert_eq!(Agent::System.describe(), "system");
        assert_eq!(Agent::user(UserAgent::new(EntityId::new(2))).describe(), "user:2");
        assert_eq!(Operation::Retrieve.to_string(), "retrieve");
    }
}
