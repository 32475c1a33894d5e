//! In-Memory Repository Implementation
//!
//! Simple in-memory implementation of the Repository port.
//! Useful for testing and development.
//!
//! A transaction belongs to the thread that began it. Writes made on that
//! thread go into the journal of its innermost open transaction, and a
//! rollback reverts only those writes. Committed work of other
//! transactions is never touched.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::thread::{self, ThreadId};

use tracing::{debug, warn};
use warden_domain::model::entity::{Entity, EntityId, Value};
use warden_domain::repository::{Query, Repository, RepositoryError, Transaction};

/// State of one id before a journaled write
#[derive(Debug)]
struct Undo {
    id: EntityId,
    previous: Option<Entity>,
}

#[derive(Debug)]
struct Journal {
    transaction: u64,
    thread: ThreadId,
    undo: Vec<Undo>,
}

#[derive(Debug, Default)]
struct Store {
    entities: BTreeMap<EntityId, Entity>,
    last_id: u64,
    last_transaction: u64,
    journals: Vec<Journal>,
}

impl Store {
    /// Remember `id`'s current state in the calling thread's innermost journal
    fn journal(&mut self, id: EntityId) {
        let current = thread::current().id();
        let previous = self.entities.get(&id).cloned();
        if let Some(journal) = self.journals.iter_mut().rev().find(|j| j.thread == current) {
            journal.undo.push(Undo { id, previous });
        }
    }

    fn close(&mut self, transaction: u64) -> Option<Journal> {
        let index = self.journals.iter().position(|j| j.transaction == transaction)?;
        Some(self.journals.remove(index))
    }

    fn revert(&mut self, journal: Journal) {
        for undo in journal.undo.into_iter().rev() {
            match undo.previous {
                Some(entity) => {
                    self.entities.insert(undo.id, entity);
                }
                None => {
                    self.entities.remove(&undo.id);
                    if self.last_id == undo.id.get() {
                        self.last_id -= 1;
                    }
                }
            }
        }
    }
}

/// In-memory Repository for one entity type
///
/// Thread-safe implementation using RwLock. Clones share the same store.
#[derive(Debug, Clone)]
pub struct InMemoryRepository {
    entity_type: String,
    store: Arc<RwLock<Store>>,
    unique: Vec<String>,
}

impl InMemoryRepository {
    pub fn new(entity_type: impl Into<String>) -> Self {
        Self {
            entity_type: entity_type.into(),
            store: Arc::new(RwLock::new(Store::default())),
            unique: Vec::new(),
        }
    }

    /// Enforce a storage-level unique constraint on `field`
    pub fn with_unique(mut self, field: impl Into<String>) -> Self {
        self.unique.push(field.into());
        self
    }

    /// Number of stored entities
    pub fn len(&self) -> Result<usize, RepositoryError> {
        Ok(self.read()?.entities.len())
    }

    pub fn is_empty(&self) -> Result<bool, RepositoryError> {
        Ok(self.len()? == 0)
    }

    /// Every stored entity, ordered by id
    pub fn all(&self) -> Result<Vec<Entity>, RepositoryError> {
        Ok(self.read()?.entities.values().cloned().collect())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Store>, RepositoryError> {
        self.store.read().map_err(|_| RepositoryError::Persistence {
            message: "Failed to acquire read lock".to_string(),
        })
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Store>, RepositoryError> {
        self.store.write().map_err(|_| RepositoryError::Persistence {
            message: "Failed to acquire write lock".to_string(),
        })
    }

    fn check_unique(&self, store: &Store, entity: &Entity) -> Result<(), RepositoryError> {
        for field in &self.unique {
            let Some(value) = entity.attribute(field).filter(|v| !v.is_null()) else {
                continue;
            };
            let taken = store
                .entities
                .values()
                .any(|other| other.id() != entity.id() && other.attribute(field) == Some(value));
            if taken {
                return Err(RepositoryError::ConstraintViolation {
                    entity_type: self.entity_type.clone(),
                    field: field.clone(),
                    value: display(value),
                });
            }
        }
        Ok(())
    }
}

fn display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl Repository for InMemoryRepository {
    fn entity_type(&self) -> &str {
        &self.entity_type
    }

    fn get(&self, query: &Query) -> Result<Vec<Entity>, RepositoryError> {
        let store = self.read()?;
        Ok(store
            .entities
            .values()
            .filter(|e| query.matches(e))
            .cloned()
            .collect())
    }

    fn save(&self, entity: &mut Entity) -> Result<(), RepositoryError> {
        let mut store = self.write()?;
        self.check_unique(&store, entity)?;

        let id = match entity.id() {
            Some(id) => id,
            None => {
                store.last_id += 1;
                let id = EntityId::new(store.last_id);
                entity.assign_id(id);
                id
            }
        };
        store.journal(id);
        store.entities.insert(id, entity.clone());
        debug!(entity_type = %self.entity_type, entity_id = %id, "stored entity");
        Ok(())
    }

    fn delete(&self, entity: &Entity) -> Result<(), RepositoryError> {
        let not_found = || RepositoryError::NotFound {
            entity_type: self.entity_type.clone(),
            id: entity.id().map(|id| id.to_string()).unwrap_or_else(|| "unsaved".to_string()),
        };
        let id = entity.id().ok_or_else(not_found)?;

        let mut store = self.write()?;
        if !store.entities.contains_key(&id) {
            return Err(not_found());
        }
        store.journal(id);
        store.entities.remove(&id);
        Ok(())
    }

    fn begin(&self) -> Result<Box<dyn Transaction + '_>, RepositoryError> {
        let mut store = self.write()?;
        store.last_transaction += 1;
        let transaction = store.last_transaction;
        store.journals.push(Journal {
            transaction,
            thread: thread::current().id(),
            undo: Vec::new(),
        });
        Ok(Box::new(InMemoryTransaction {
            store: &self.store,
            id: transaction,
            open: true,
        }))
    }
}

/// Journaled transaction over an [`InMemoryRepository`]
#[derive(Debug)]
pub struct InMemoryTransaction<'a> {
    store: &'a RwLock<Store>,
    id: u64,
    open: bool,
}

impl InMemoryTransaction<'_> {
    fn finish(&mut self, revert: bool) -> Result<(), RepositoryError> {
        if !self.open {
            return Ok(());
        }
        self.open = false;
        let mut store = self.store.write().map_err(|_| RepositoryError::Transaction {
            message: "Failed to acquire write lock to end transaction".to_string(),
        })?;
        if let Some(journal) = store.close(self.id) {
            if revert {
                debug!(transaction = self.id, writes = journal.undo.len(), "reverting transaction");
                store.revert(journal);
            }
        }
        Ok(())
    }
}

impl Transaction for InMemoryTransaction<'_> {
    fn commit(mut self: Box<Self>) -> Result<(), RepositoryError> {
        self.finish(false)
    }

    fn rollback(mut self: Box<Self>) -> Result<(), RepositoryError> {
        self.finish(true)
    }
}

impl Drop for InMemoryTransaction<'_> {
    fn drop(&mut self) {
        if let Err(err) = self.finish(true) {
            warn!(error = %err, "failed to roll back on drop");
        }
    }
}
