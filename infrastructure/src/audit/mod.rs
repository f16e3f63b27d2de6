//! Audit infrastructure - append-only session records.
//!
//! Provides [`JsonlAuditLog`], a JSONL file writer that implements the
//! [`AuditLog`](council_application::AuditLog) port.

mod jsonl_log;

pub use jsonl_log::JsonlAuditLog;
