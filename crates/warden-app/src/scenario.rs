//! Demo scenario: accounts are provisioned by the system, then two users
//! work on the same article under their role permissions.

use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Context};
use audit::AuditLogger;
use rbac::RoleManager;
use serde::Serialize;
use serde_json::{Map, Value};
use shared::{PermissionSet, WardenConfig};
use tracing::info;
use warden_adapter::InMemoryRepository;
use warden_domain::{
    Agent, AttributeRegistry, EntityId, ParameterBag, ParameterFilter, ReferenceFilter,
    ResultExecute, UserAgent,
};
use warden_usecase::EntityManager;

use crate::catalog;

/// One pipeline call and how it ended
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    pub action: String,
    pub agent: String,
    pub success: bool,
    pub codes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditSummary {
    pub total: usize,
    pub granted: usize,
    pub denied: usize,
    pub rejected: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub steps: Vec<Step>,
    pub summary: AuditSummary,
    pub audit: Value,
}

struct Recorder {
    steps: Vec<Step>,
}

impl Recorder {
    fn record(
        &mut self,
        action: &str,
        manager: &EntityManager,
        result: &ResultExecute,
        select: Option<&[&str]>,
    ) {
        self.steps.push(Step {
            action: action.to_string(),
            agent: describe(manager),
            success: result.success(),
            codes: result.codes().into_iter().map(str::to_string).collect(),
            resource: result
                .resource()
                .map(|entity| manager.serialize(entity, select).attributes),
        });
    }
}

fn describe(manager: &EntityManager) -> String {
    manager
        .agent()
        .map(Agent::describe)
        .unwrap_or_else(|| "none".to_string())
}

fn signup(username: &str, email: &str) -> ParameterBag {
    ParameterBag::new()
        .with("username", username)
        .with("email", email)
        .with("password", "correct horse battery")
}

fn user_agent(id: EntityId, permissions: PermissionSet) -> Agent {
    Agent::user(UserAgent::new(id).with_permissions(permissions))
}

/// Run the scenario; `author_role` is the role of the article's author.
/// The second user acts under the configured default role.
pub fn run(config: &WardenConfig, author_role: &str) -> anyhow::Result<Report> {
    let roles = RoleManager::from_config(config);
    let author_permissions = roles.effective_permissions(author_role)?;

    let audit = Arc::new(Mutex::new(AuditLogger::new(config.audit_capacity)));
    let users = Arc::new(InMemoryRepository::new("user").with_unique("email"));
    let articles = Arc::new(InMemoryRepository::new("article"));
    let user_registry: Arc<AttributeRegistry> =
        Arc::new(catalog::user_registry().context("invalid user registry")?);
    let article_registry: Arc<AttributeRegistry> =
        Arc::new(catalog::article_registry().context("invalid article registry")?);

    let mut recorder = Recorder { steps: Vec::new() };

    // Accounts
    let accounts = EntityManager::new(user_registry, users.clone())
        .with_agent(Agent::System)
        .with_audit(audit.clone());

    let mut provision = |username: &str, email: &str| -> anyhow::Result<EntityId> {
        let result = accounts.create(signup(username, email))?;
        recorder.record("create user", &accounts, &result, Some(catalog::USER_FIELDS));
        result
            .resource()
            .and_then(|user| user.id())
            .ok_or_else(|| anyhow!("could not provision {}: {}", username, result.codes().join(", ")))
    };
    let alice = provision("alice", "alice@warden.test")?;
    let bob = provision("bob", "bob@warden.test")?;

    let taken = accounts.create(signup("mallory", "alice@warden.test"))?;
    recorder.record("create user", &accounts, &taken, Some(catalog::USER_FIELDS));
    info!(users = users.len()?, "accounts provisioned");

    // Articles
    let filter: Arc<dyn ParameterFilter> =
        Arc::new(ReferenceFilter::new("author_id", "author", users.clone()));
    let manager = |agent: Agent| {
        EntityManager::new(article_registry.clone(), articles.clone())
            .with_agent(agent)
            .with_filter(filter.clone())
            .with_audit(audit.clone())
    };
    let author = manager(user_agent(alice, author_permissions));
    let reader = manager(user_agent(bob, roles.default_permissions()));

    let draft = ParameterBag::new()
        .with("title", "Hello")
        .with("description", "First post")
        .with("author_id", alice.get());
    let created = author.create(draft)?;
    recorder.record("create article", &author, &created, None);

    let untitled = author.create(ParameterBag::new().with("title", "").with("author_id", alice.get()))?;
    recorder.record("create article", &author, &untitled, None);

    if let Some(article) = created.into_resource() {
        let hijack = reader.update(&article, ParameterBag::new().with("title", "Hijacked"))?;
        recorder.record("update article", &reader, &hijack, None);

        let renamed = author.update(&article, ParameterBag::new().with("title", "Hello, world"))?;
        recorder.record("update article", &author, &renamed, None);
        let article = renamed.into_resource().unwrap_or(article);

        let shown = reader.serialize(&article, None);
        recorder.steps.push(Step {
            action: "serialize article".to_string(),
            agent: describe(&reader),
            success: shown.success(),
            codes: shown.errors.iter().map(|e| e.code().to_string()).collect(),
            resource: Some(shown.attributes),
        });

        let removed = author.remove(&article)?;
        recorder.record("remove article", &author, &removed, None);
    }

    let logger = audit
        .lock()
        .map_err(|_| anyhow!("audit logger lock poisoned"))?;
    let stats = logger.get_stats();

    Ok(Report {
        steps: recorder.steps,
        summary: AuditSummary {
            total: stats.total_entries,
            granted: stats.granted_count,
            denied: stats.denied_count,
            rejected: stats.rejected_count,
        },
        audit: logger.export_json(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcomes(report: &Report) -> Vec<(&str, bool)> {
        report
            .steps
            .iter()
            .map(|s| (s.action.as_str(), s.success))
            .collect()
    }

    #[test]
    fn test_member_scenario() {
        let report = run(&catalog::default_config(), "member").unwrap();

        assert_eq!(
            outcomes(&report),
            vec![
                ("create user", true),
                ("create user", true),
                ("create user", false),
                ("create article", true),
                ("create article", false),
                ("update article", false),
                ("update article", true),
                ("serialize article", true),
                ("remove article", true),
            ]
        );

        assert_eq!(report.steps[2].codes, vec!["USER_EMAIL_NOT_UNIQUE"]);
        assert_eq!(report.steps[4].codes, vec!["ARTICLE_TITLE_NOT_VALID"]);
        assert!(report.steps[5].codes.contains(&"ARTICLE_NOT_AUTHORIZED".to_string()));
    }

    #[test]
    fn test_user_resources_hide_password() {
        let report = run(&catalog::default_config(), "member").unwrap();
        let user = report.steps[0].resource.as_ref().unwrap();

        assert_eq!(user["username"], "alice");
        assert!(user.contains_key("id"));
        assert!(user.contains_key("created_at"));
        assert!(!user.contains_key("password"));
    }

    #[test]
    fn test_reader_sees_renamed_article() {
        let report = run(&catalog::default_config(), "member").unwrap();
        let shown = report.steps[7].resource.as_ref().unwrap();

        assert_eq!(shown["title"], "Hello, world");
        assert_eq!(shown["author"], 1);
    }

    #[test]
    fn test_audit_summary() {
        let report = run(&catalog::default_config(), "member").unwrap();

        assert_eq!(report.summary.total, 8);
        assert_eq!(report.summary.granted, 5);
        assert_eq!(report.summary.denied, 1);
        assert_eq!(report.summary.rejected, 2);
        assert_eq!(report.audit.as_array().unwrap().len(), 8);
    }

    #[test]
    fn test_reader_cannot_author() {
        let report = run(&catalog::default_config(), "reader").unwrap();
        let article = &report.steps[3];

        assert!(!article.success);
        assert_eq!(article.codes[0], "ARTICLE_NOT_AUTHORIZED");
        // nothing was created, so the article steps stop there
        assert_eq!(report.steps.len(), 5);
    }

    #[test]
    fn test_unknown_role() {
        let err = run(&catalog::default_config(), "ghost").unwrap_err();
        assert!(err.to_string().contains("Role 'ghost' not found"));
    }
}
