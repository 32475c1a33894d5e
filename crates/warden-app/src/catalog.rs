//! Entity types and built-in roles served by the binary

use shared::{Role, WardenConfig};
use warden_domain::{Attribute, AttributeRegistry, RegistryError};

/// Fields of a user record that are safe to echo back
pub const USER_FIELDS: &[&str] = &["username", "email", "created_at"];

pub fn user_registry() -> Result<AttributeRegistry, RegistryError> {
    AttributeRegistry::builder("user")
        .attribute(Attribute::id())
        .attribute(Attribute::text("username").required().length(3, 31))
        .attribute(Attribute::text("password").required().length(8, 255))
        .attribute(Attribute::email("email").required().unique())
        .attribute(Attribute::datetime("created_at").not_fillable())
        .owned_by("id")
        .build()
}

pub fn article_registry() -> Result<AttributeRegistry, RegistryError> {
    AttributeRegistry::builder("article")
        .attribute(Attribute::id())
        .attribute(Attribute::text("title").required().length(1, 255))
        .attribute(Attribute::text("description"))
        .attribute(Attribute::integer("author").required())
        .attribute(Attribute::datetime("published_at").not_fillable())
        .owned_by("author")
        .build()
}

/// Roles used when no configuration file is given.
///
/// `reader` is the default: it may look at articles and public user fields.
/// `member` may also write, update and remove its own articles.
pub fn default_config() -> WardenConfig {
    let reader = Role::new("reader", "Reader")
        .with_description("Read-only access to published content")
        .with_permissions([
            "article.retrieve",
            "article.attributes.*.show",
            "user.retrieve",
            "user.attributes.username.show",
        ]);

    let member = Role::new("member", "Member")
        .with_description("Writes and maintains its own articles")
        .inherits_from("reader")
        .with_permissions([
            "article.create",
            "article.update.own",
            "article.remove.own",
            "article.attributes.*",
            "user.update.own",
            "user.attributes.username.fill",
            "user.attributes.email.*",
            "user.attributes.password.fill",
        ]);

    let admin = Role::new("admin", "Administrator")
        .with_description("Full access")
        .with_permissions(["*"]);

    WardenConfig {
        roles: vec![reader, member, admin],
        default_role: "reader".to_string(),
        ..WardenConfig::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rbac::RoleManager;

    #[test]
    fn test_registries_build() {
        let users = user_registry().unwrap();
        assert_eq!(users.names(), vec!["id", "username", "password", "email", "created_at"]);
        assert_eq!(users.owner_attribute(), Some("id"));

        let articles = article_registry().unwrap();
        assert_eq!(articles.owner_attribute(), Some("author"));
        assert!(articles.contains("published_at"));
    }

    #[test]
    fn test_default_roles() {
        let roles = RoleManager::from_config(&default_config());
        assert_eq!(roles.default_role(), "reader");
        assert_eq!(roles.get_inheritance_chain("member"), vec!["member", "reader"]);

        assert!(roles.role_allows("member", "article.retrieve"));
        assert!(roles.role_allows("member", "article.attributes.title.fill"));
        assert!(!roles.role_allows("member", "article.update"));
        assert!(!roles.role_allows("reader", "article.create"));
        assert!(!roles.role_allows("member", "user.attributes.password.show"));
        assert!(roles.role_allows("admin", "user.attributes.password.show"));
    }
}
