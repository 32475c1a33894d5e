//! # Warden Audit
//!
//! Bounded in-memory audit trail of entity mutations.

mod audit_logger;

pub use audit_logger::{AuditEntry, AuditLogger, AuditOutcome, AuditStats};
