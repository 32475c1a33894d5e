//! Configuration types for Warden

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::{Role, SharedError};

/// Top-level configuration file (`warden.yaml` / `warden.json`)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WardenConfig {
    /// Role definitions
    #[serde(default)]
    pub roles: Vec<Role>,

    /// Role applied to agents without an explicit one
    #[serde(default = "default_role")]
    pub default_role: String,

    /// Maximum number of retained audit entries
    #[serde(default = "default_audit_capacity")]
    pub audit_capacity: usize,
}

fn default_role() -> String {
    "guest".to_string()
}

fn default_audit_capacity() -> usize {
    10_000
}

impl Default for WardenConfig {
    fn default() -> Self {
        Self {
            roles: Vec::new(),
            default_role: default_role(),
            audit_capacity: default_audit_capacity(),
        }
    }
}

impl WardenConfig {
    /// Load configuration from a JSON or YAML file, chosen by extension
    pub fn from_file(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml(&content),
            Some("json") => Self::from_json(&content),
            other => Err(SharedError::Config(format!(
                "Unsupported configuration format: {}",
                other.unwrap_or("<none>")
            ))),
        }
    }

    pub fn from_json(content: &str) -> crate::Result<Self> {
        let config: Self = serde_json::from_str(content)?;
        config.check()?;
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> crate::Result<Self> {
        let config: Self = serde_yaml::from_str(content)?;
        config.check()?;
        Ok(config)
    }

    /// Get role IDs in declaration order
    pub fn role_ids(&self) -> Vec<&str> {
        self.roles.iter().map(|r| r.id.as_str()).collect()
    }

    fn check(&self) -> crate::Result<()> {
        let mut seen = std::collections::HashSet::new();
        for role in &self.roles {
            if !seen.insert(role.id.as_str()) {
                return Err(SharedError::Config(format!("Duplicate role id '{}'", role.id)));
            }
        }
        if self.audit_capacity == 0 {
            return Err(SharedError::Config("auditCapacity must be greater than zero".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_config_parse_json() {
        let json = r#"{
            "roles": [
                { "id": "admin", "name": "Admin", "permissions": ["*"] },
                { "id": "editor", "name": "Editor", "inherits": "admin" }
            ],
            "defaultRole": "editor"
        }"#;

        let config = WardenConfig::from_json(json).unwrap();
        assert_eq!(config.role_ids(), vec!["admin", "editor"]);
        assert_eq!(config.default_role, "editor");
        assert_eq!(config.audit_capacity, 10_000);
    }

    #[test]
    fn test_config_defaults() {
        let config = WardenConfig::from_json("{}").unwrap();
        assert!(config.roles.is_empty());
        assert_eq!(config.default_role, "guest");
    }

    #[test]
    fn test_duplicate_roles_rejected() {
        let json = r#"{ "roles": [
            { "id": "a", "name": "A" },
            { "id": "a", "name": "Again" }
        ] }"#;

        let err = WardenConfig::from_json(json).unwrap_err();
        assert!(matches!(err, SharedError::Config(_)));
    }

    #[test]
    fn test_zero_audit_capacity_rejected() {
        let err = WardenConfig::from_json(r#"{ "auditCapacity": 0 }"#).unwrap_err();
        assert!(err.to_string().contains("auditCapacity"));
    }

    #[test]
    fn test_from_yaml_file() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(
            file,
            "roles:\n  - id: member\n    name: Member\n    permissions:\n      - user.update.own\nauditCapacity: 50"
        )
        .unwrap();

        let config = WardenConfig::from_file(file.path()).unwrap();
        assert_eq!(config.roles[0].permissions, vec!["user.update.own"]);
        assert_eq!(config.audit_capacity, 50);
    }

    #[test]
    fn test_from_json_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{ "defaultRole": "member" }}"#).unwrap();

        let config = WardenConfig::from_file(file.path()).unwrap();
        assert_eq!(config.default_role, "member");
    }

    #[test]
    fn test_unknown_extension_rejected() {
        let file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        let err = WardenConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, SharedError::Config(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = WardenConfig::from_file(Path::new("/nonexistent/warden.json")).unwrap_err();
        assert!(matches!(err, SharedError::Io(_)));
    }
}
