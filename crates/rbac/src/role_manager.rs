//! RoleManager - Role definitions and permission resolution

use shared::{PermissionSet, Role, RoleNotFoundError, WardenConfig};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// RoleManager handles role definitions and resolves the permissions a role grants
#[derive(Debug)]
pub struct RoleManager {
    /// All registered roles
    roles: HashMap<String, Role>,
    /// Default role ID
    default_role: String,
}

impl RoleManager {
    /// Create a new RoleManager
    pub fn new() -> Self {
        Self {
            roles: HashMap::new(),
            default_role: "guest".to_string(),
        }
    }

    /// Build a RoleManager from a configuration file's role section
    pub fn from_config(config: &WardenConfig) -> Self {
        let mut manager = Self::new();
        manager.load_from_config(config);
        manager
    }

    /// Register every role in the configuration and adopt its default role
    pub fn load_from_config(&mut self, config: &WardenConfig) {
        for role in &config.roles {
            self.register_role(role.clone());
        }
        self.default_role = config.default_role.clone();
        debug!(roles = config.roles.len(), default_role = %self.default_role, "loaded roles from config");
    }

    /// Register a role
    pub fn register_role(&mut self, role: Role) {
        self.roles.insert(role.id.clone(), role);
    }

    /// Get a role by ID
    pub fn get_role(&self, id: &str) -> Option<&Role> {
        self.roles.get(id)
    }

    /// Get all role IDs (sorted)
    pub fn get_role_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.roles.keys().map(|s| s.as_str()).collect();
        ids.sort();
        ids
    }

    /// Set the default role
    pub fn set_default_role(&mut self, role_id: impl Into<String>) {
        self.default_role = role_id.into();
    }

    /// Get the default role ID
    pub fn default_role(&self) -> &str {
        &self.default_role
    }

    /// Check if role exists
    pub fn has_role(&self, role_id: &str) -> bool {
        self.roles.contains_key(role_id)
    }

    /// Get the inheritance chain for a role, starting with the role itself
    pub fn get_inheritance_chain(&self, role_id: &str) -> Vec<String> {
        let mut chain = Vec::new();
        let mut visited = HashSet::new();
        self.collect_inheritance_chain(role_id, &mut chain, &mut visited);
        chain
    }

    fn collect_inheritance_chain(
        &self,
        role_id: &str,
        chain: &mut Vec<String>,
        visited: &mut HashSet<String>,
    ) {
        if visited.contains(role_id) {
            return; // Circular inheritance protection
        }
        visited.insert(role_id.to_string());
        chain.push(role_id.to_string());

        if let Some(role) = self.get_role(role_id) {
            if let Some(parent) = &role.inherits {
                self.collect_inheritance_chain(parent, chain, visited);
            }
        }
    }

    /// Get effective permissions for a role (including inherited)
    pub fn effective_permissions(&self, role_id: &str) -> Result<PermissionSet, RoleNotFoundError> {
        if !self.has_role(role_id) {
            return Err(RoleNotFoundError {
                role_id: role_id.to_string(),
                available_roles: self.get_role_ids().iter().map(|s| s.to_string()).collect(),
            });
        }

        let mut permissions = PermissionSet::new();
        for id in self.get_inheritance_chain(role_id) {
            if let Some(role) = self.get_role(&id) {
                for permission in &role.permissions {
                    permissions.grant(permission.clone());
                }
            }
        }
        Ok(permissions)
    }

    /// Effective permissions for several roles at once
    pub fn effective_permissions_for(&self, role_ids: &[&str]) -> Result<PermissionSet, RoleNotFoundError> {
        let mut permissions = PermissionSet::new();
        for role_id in role_ids {
            permissions.extend_from(&self.effective_permissions(role_id)?);
        }
        Ok(permissions)
    }

    /// Effective permissions of the default role; empty if it is not registered
    pub fn default_permissions(&self) -> PermissionSet {
        self.effective_permissions(&self.default_role).unwrap_or_default()
    }

    /// Check if a role (including inherited roles) grants a permission key
    pub fn role_allows(&self, role_id: &str, permission: &str) -> bool {
        self.effective_permissions(role_id)
            .map(|p| p.allows(permission))
            .unwrap_or(false)
    }
}

impl Default for RoleManager {
    fn default() -> Self {
        Self::new()
    }
}
