//! ParameterBag - Ordered, existence-tracked operation input
//!
//! Each key is in one of three states: absent, present with a value, or
//! explicitly removed. `exists` is the authority for "was this field
//! targeted by this operation", whatever the value is (null and `false`
//! count as present).

use std::collections::BTreeSet;

use serde_json::Map;

use super::agent::Agent;
use super::entity::Value;
use crate::repository::RepositoryError;
use crate::service::filter::ParameterFilter;

/// Input of one manager operation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterBag {
    entries: Vec<(String, Value)>,
    removed: BTreeSet<String>,
}

impl ParameterBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value; an existing key keeps its position
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        let key = key.into();
        let value = value.into();
        self.removed.remove(&key);
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
        self
    }

    /// Builder form of [`ParameterBag::set`]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn exists(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Remove a key and remember that it was removed
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        self.removed.insert(key.to_string());
        Some(self.entries.remove(index).1)
    }

    /// Builder form of [`ParameterBag::remove`]
    pub fn without(mut self, key: &str) -> Self {
        self.remove(key);
        self
    }

    /// Was the key present once and then removed?
    pub fn was_removed(&self, key: &str) -> bool {
        self.removed.contains(key)
    }

    /// All present entries in insertion order
    pub fn all(&self) -> &[(String, Value)] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> Vec<&str> {
        self.entries.iter().map(|(k, _)| k.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Present entries as a JSON object
    pub fn to_map(&self) -> Map<String, Value> {
        self.entries.iter().cloned().collect()
    }

    /// Let an entity-specific filter rewrite this bag for `agent`
    pub fn filter_by_agent(
        self,
        agent: &Agent,
        filter: &dyn ParameterFilter,
    ) -> Result<ParameterBag, RepositoryError> {
        filter.filter(self, agent)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for ParameterBag {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut bag = ParameterBag::new();
        for (key, value) in iter {
            bag.set(key, value);
        }
        bag
    }
}

impl From<Map<String, Value>> for ParameterBag {
    fn from(map: Map<String, Value>) -> Self {
        map.into_iter().collect()
    }
}
