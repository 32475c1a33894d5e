//! Permission keys and wildcard permission sets
//!
//! Keys follow a dotted naming convention:
//!
//! - `{entity}.{operation}` - operation-level (`article.create`)
//! - `{entity}.{operation}.own` - operation-level, limited to owned records
//! - `{entity}.attributes.{attribute}.{fill|show}` - field-level
//!
//! Grants are glob patterns, so `article.*` or `article.attributes.title.*`
//! cover whole subtrees.

use serde::{Deserialize, Serialize};

/// Which side of an attribute a permission guards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeAccess {
    /// Writing the attribute from input
    Fill,
    /// Reading the attribute back out
    Show,
}

impl AttributeAccess {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttributeAccess::Fill => "fill",
            AttributeAccess::Show => "show",
        }
    }
}

/// `{entity}.{operation}`
pub fn operation_permission(entity_type: &str, operation: &str) -> String {
    format!("{}.{}", entity_type, operation)
}

/// `{entity}.{operation}.own`
pub fn ownership_permission(entity_type: &str, operation: &str) -> String {
    format!("{}.{}.own", entity_type, operation)
}

/// `{entity}.attributes.{attribute}.{fill|show}`
pub fn attribute_permission(entity_type: &str, attribute: &str, access: AttributeAccess) -> String {
    format!("{}.attributes.{}.{}", entity_type, attribute, access.as_str())
}

#[derive(Debug, Clone)]
enum Grant {
    Pattern(glob::Pattern),
    Exact(String),
}

impl Grant {
    fn parse(raw: &str) -> Self {
        match glob::Pattern::new(raw) {
            Ok(pattern) => Grant::Pattern(pattern),
            Err(_) => Grant::Exact(raw.to_string()),
        }
    }

    fn matches(&self, key: &str) -> bool {
        match self {
            Grant::Pattern(p) => p.matches(key),
            Grant::Exact(s) => s == key,
        }
    }
}

/// Set of granted permission patterns
#[derive(Debug, Clone, Default)]
pub struct PermissionSet {
    raw: Vec<String>,
    grants: Vec<Grant>,
}

impl PermissionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set that grants everything
    pub fn all() -> Self {
        Self::from_iter(["*"])
    }

    /// Add a grant. Duplicates are ignored.
    pub fn grant(&mut self, permission: impl Into<String>) {
        let permission = permission.into();
        if self.raw.contains(&permission) {
            return;
        }
        self.grants.push(Grant::parse(&permission));
        self.raw.push(permission);
    }

    /// Remove a grant (exact text match)
    pub fn revoke(&mut self, permission: &str) {
        if let Some(index) = self.raw.iter().position(|p| p == permission) {
            self.raw.remove(index);
            self.grants.remove(index);
        }
    }

    /// Check whether any grant covers the key
    pub fn allows(&self, key: &str) -> bool {
        self.grants.iter().any(|g| g.matches(key))
    }

    /// Merge another set into this one
    pub fn extend_from(&mut self, other: &PermissionSet) {
        for permission in &other.raw {
            self.grant(permission.clone());
        }
    }

    pub fn grants(&self) -> &[String] {
        &self.raw
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    pub fn len(&self) -> usize {
        self.raw.len()
    }
}

impl<S: Into<String>> FromIterator<S> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = PermissionSet::new();
        for permission in iter {
            set.grant(permission);
        }
        set
    }
}

impl Serialize for PermissionSet {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.raw.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for PermissionSet {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = Vec::<String>::deserialize(deserializer)?;
        Ok(raw.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_naming() {
        assert_eq!(operation_permission("article", "create"), "article.create");
        assert_eq!(ownership_permission("user", "update"), "user.update.own");
        assert_eq!(
            attribute_permission("article", "title", AttributeAccess::Fill),
            "article.attributes.title.fill"
        );
        assert_eq!(
            attribute_permission("article", "title", AttributeAccess::Show),
            "article.attributes.title.show"
        );
    }

    #[test]
    fn test_exact_grant() {
        let set: PermissionSet = ["article.create"].into_iter().collect();

        assert!(set.allows("article.create"));
        assert!(!set.allows("article.update"));
        assert!(!set.allows("article.create.own"));
    }

    #[test]
    fn test_wildcard_subtree() {
        let set: PermissionSet = ["article.attributes.title.*"].into_iter().collect();

        assert!(set.allows("article.attributes.title.fill"));
        assert!(set.allows("article.attributes.title.show"));
        assert!(!set.allows("article.attributes.description.fill"));
    }

    #[test]
    fn test_entity_wildcard_covers_everything_below() {
        let set: PermissionSet = ["foo.*"].into_iter().collect();

        assert!(set.allows("foo.create"));
        assert!(set.allows("foo.attributes.name.fill"));
        assert!(!set.allows("bar.create"));
    }

    #[test]
    fn test_all_grants_everything() {
        let set = PermissionSet::all();
        assert!(set.allows("anything.at.all"));
    }

    #[test]
    fn test_empty_set_denies() {
        let set = PermissionSet::new();
        assert!(set.is_empty());
        assert!(!set.allows("article.create"));
    }

    #[test]
    fn test_invalid_pattern_falls_back_to_literal() {
        let set: PermissionSet = ["weird.[key"].into_iter().collect();

        assert!(set.allows("weird.[key"));
        assert!(!set.allows("weird.k"));
    }

    #[test]
    fn test_grant_dedup_and_revoke() {
        let mut set = PermissionSet::new();
        set.grant("a.create");
        set.grant("a.create");
        assert_eq!(set.len(), 1);

        set.revoke("a.create");
        assert!(!set.allows("a.create"));
        assert!(set.is_empty());
    }

    #[test]
    fn test_serde_as_list() {
        let set: PermissionSet = ["a.*", "b.create"].into_iter().collect();
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, r#"["a.*","b.create"]"#);

        let back: PermissionSet = serde_json::from_str(&json).unwrap();
        assert!(back.allows("a.update"));
        assert!(back.allows("b.create"));
    }
}
