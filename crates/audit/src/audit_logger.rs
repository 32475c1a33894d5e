//! AuditLogger - Audit trail for Warden entity operations

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Audit log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub timestamp: String,
    pub operation: String,
    pub entity_type: String,
    pub entity_id: Option<u64>,
    pub agent: String,
    pub outcome: AuditOutcome,
    pub codes: Vec<String>,
}

/// How an operation ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditOutcome {
    /// Authorized, valid and written
    Granted,
    /// At least one authorization error
    Denied,
    /// Authorized but invalid
    Rejected,
}

/// Audit logger
#[derive(Debug)]
pub struct AuditLogger {
    entries: VecDeque<AuditEntry>,
    max_entries: usize,
}

impl AuditLogger {
    /// Create a new AuditLogger
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(max_entries.min(1024)),
            max_entries,
        }
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// Log an audit entry
    pub fn log(&mut self, entry: AuditEntry) {
        if self.max_entries == 0 {
            return;
        }
        if self.entries.len() >= self.max_entries {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    /// Log one manager operation
    pub fn log_operation(
        &mut self,
        operation: &str,
        entity_type: &str,
        entity_id: Option<u64>,
        agent: &str,
        outcome: AuditOutcome,
        codes: Vec<String>,
    ) {
        self.log(AuditEntry {
            timestamp: chrono::Utc::now().to_rfc3339(),
            operation: operation.to_string(),
            entity_type: entity_type.to_string(),
            entity_id,
            agent: agent.to_string(),
            outcome,
            codes,
        });
    }

    /// Get recent entries, newest first
    pub fn get_recent(&self, limit: usize) -> Vec<&AuditEntry> {
        self.entries.iter().rev().take(limit).collect()
    }

    /// Get recent denied or rejected entries, newest first
    pub fn get_recent_failures(&self, limit: usize) -> Vec<&AuditEntry> {
        self.entries
            .iter()
            .rev()
            .filter(|e| e.outcome != AuditOutcome::Granted)
            .take(limit)
            .collect()
    }

    /// Get statistics
    pub fn get_stats(&self) -> AuditStats {
        let count = |outcome: AuditOutcome| self.entries.iter().filter(|e| e.outcome == outcome).count();

        AuditStats {
            total_entries: self.entries.len(),
            granted_count: count(AuditOutcome::Granted),
            denied_count: count(AuditOutcome::Denied),
            rejected_count: count(AuditOutcome::Rejected),
        }
    }

    /// Export as JSON
    pub fn export_json(&self) -> serde_json::Value {
        serde_json::to_value(self.entries.iter().collect::<Vec<_>>()).unwrap_or_default()
    }
}

/// Audit statistics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditStats {
    pub total_entries: usize,
    pub granted_count: usize,
    pub denied_count: usize,
    pub rejected_count: usize,
}

impl Default for AuditLogger {
    fn default() -> Self {
        Self::new(10000)
    }
}
