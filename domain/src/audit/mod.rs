//! Append-only audit records

pub mod entry;

pub use entry::{AuditEntry, session_participants};
