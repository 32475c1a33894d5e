//! Role configuration types

use serde::{Deserialize, Serialize};

/// Role definition: a named bundle of permission grants
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    /// Unique role identifier (e.g., 'admin', 'editor', 'guest')
    pub id: String,

    /// Human-readable role name
    pub name: String,

    /// Role description
    #[serde(default)]
    pub description: String,

    /// Parent role ID to inherit permissions from
    #[serde(default)]
    pub inherits: Option<String>,

    /// Granted permission patterns (e.g., 'article.*', 'user.update.own')
    #[serde(default)]
    pub permissions: Vec<String>,
}

impl Role {
    /// Create a new role with minimal configuration
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            inherits: None,
            permissions: Vec::new(),
        }
    }

    /// Builder: set description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Builder: set permissions
    pub fn with_permissions<I, S>(mut self, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.permissions = permissions.into_iter().map(Into::into).collect();
        self
    }

    /// Builder: set inheritance
    pub fn inherits_from(mut self, parent: impl Into<String>) -> Self {
        self.inherits = Some(parent.into());
        self
    }

    /// Check if this role grants everything
    pub fn is_superuser(&self) -> bool {
        self.permissions.iter().any(|p| p == "*")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_creation() {
        let role = Role::new("admin", "Administrator")
            .with_description("Full system access")
            .with_permissions(["*"]);

        assert_eq!(role.id, "admin");
        assert!(role.is_superuser());
    }

    #[test]
    fn test_role_new_minimal() {
        let role = Role::new("test", "Test Role");

        assert_eq!(role.name, "Test Role");
        assert!(role.description.is_empty());
        assert!(role.permissions.is_empty());
        assert!(role.inherits.is_none());
        assert!(!role.is_superuser());
    }

    #[test]
    fn test_role_builder_chain() {
        let role = Role::new("editor", "Editor")
            .with_permissions(["article.create", "article.attributes.*"])
            .inherits_from("member");

        assert_eq!(role.permissions.len(), 2);
        assert_eq!(role.inherits, Some("member".to_string()));
    }

    #[test]
    fn test_role_deserialization() {
        let json = r#"{
            "id": "member",
            "name": "Member",
            "permissions": ["user.update.own", "user.attributes.*"]
        }"#;

        let role: Role = serde_json::from_str(json).unwrap();
        assert_eq!(role.id, "member");
        assert_eq!(role.permissions[0], "user.update.own");
        assert!(role.inherits.is_none());
    }

    #[test]
    fn test_role_serialization_uses_camel_case() {
        let role = Role::new("x", "X").inherits_from("y");
        let json = serde_json::to_string(&role).unwrap();
        assert!(json.contains("\"inherits\":\"y\""));
        assert!(json.contains("\"permissions\":[]"));
    }
}
