//! Test fixtures: `user` and `article` entity types

use std::sync::Arc;

use warden_adapter::InMemoryRepository;
use warden_domain::{
    Agent, Attribute, AttributeRegistry, EntityId, ParameterBag, ReferenceFilter, UserAgent,
};

use crate::EntityManager;

pub fn user_registry() -> Arc<AttributeRegistry> {
    Arc::new(
        AttributeRegistry::builder("user")
            .attribute(Attribute::id())
            .attribute(Attribute::text("username").required().length(3, 31))
            .attribute(Attribute::text("password").required().length(8, 255))
            .attribute(Attribute::email("email").required().unique())
            .attribute(Attribute::datetime("created_at").not_fillable())
            .owned_by("id")
            .build()
            .expect("user registry"),
    )
}

pub fn article_registry() -> Arc<AttributeRegistry> {
    Arc::new(
        AttributeRegistry::builder("article")
            .attribute(Attribute::id())
            .attribute(Attribute::text("title").required().length(1, 255))
            .attribute(Attribute::text("description"))
            .attribute(Attribute::integer("author").required())
            .owned_by("author")
            .build()
            .expect("article registry"),
    )
}

pub fn users() -> Arc<InMemoryRepository> {
    Arc::new(InMemoryRepository::new("user"))
}

pub fn articles() -> Arc<InMemoryRepository> {
    Arc::new(InMemoryRepository::new("article"))
}

pub fn user_manager(repository: &Arc<InMemoryRepository>) -> EntityManager {
    EntityManager::new(user_registry(), repository.clone())
}

pub fn article_manager(articles: &Arc<InMemoryRepository>, users: &Arc<InMemoryRepository>) -> EntityManager {
    let filter = ReferenceFilter::new("author_id", "author", users.clone());
    EntityManager::new(article_registry(), articles.clone()).with_filter(Arc::new(filter))
}

pub fn user_bag() -> ParameterBag {
    ParameterBag::new()
        .with("email", "test@test.net")
        .with("username", "test123")
        .with("password", "longenough")
}

pub fn user_agent(id: u64, permissions: &[&str]) -> Agent {
    let mut user = UserAgent::new(EntityId::new(id));
    for permission in permissions {
        user.add_permission(*permission);
    }
    Agent::user(user)
}
