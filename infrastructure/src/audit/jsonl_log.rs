//! JSONL file writer for audit entries.
//!
//! Each [`AuditEntry`] is serialized as a single JSON line with an added
//! `timestamp` field (RFC 3339, milliseconds), appended to the file via a
//! buffered writer that is flushed after every entry.

use async_trait::async_trait;
use council_application::{AuditLog, StoreError};
use council_domain::AuditEntry;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

/// Append-only JSONL audit log.
///
/// Thread-safe via `Mutex<BufWriter<File>>`. Existing content is never
/// truncated or rewritten.
pub struct JsonlAuditLog {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl JsonlAuditLog {
    /// Open (or create) the log at `path` in append mode.
    ///
    /// Creates parent directories if they don't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            writer: Mutex::new(BufWriter::new(file)),
            path: path.to_path_buf(),
        })
    }

    /// Get the path to the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every entry back, oldest first.
    pub fn read_all(path: impl AsRef<Path>) -> Result<Vec<AuditEntry>, StoreError> {
        let reader = BufReader::new(File::open(path)?);
        let mut entries = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            entries.push(serde_json::from_str(&line)?);
        }
        Ok(entries)
    }

    fn record(entry: &AuditEntry) -> Result<String, StoreError> {
        let mut record = serde_json::to_value(entry)?;
        if let serde_json::Value::Object(map) = &mut record {
            let timestamp = i64::try_from(entry.recorded_at_ms)
                .ok()
                .and_then(chrono::DateTime::from_timestamp_millis)
                .unwrap_or_else(chrono::Utc::now);
            map.insert(
                "timestamp".to_string(),
                serde_json::Value::String(
                    timestamp.to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
                ),
            );
        }
        Ok(serde_json::to_string(&record)?)
    }
}

#[async_trait]
impl AuditLog for JsonlAuditLog {
    async fn append(&self, entry: &AuditEntry) -> Result<(), StoreError> {
        let line = Self::record(entry)?;
        let mut writer = self
            .writer
            .lock()
            .map_err(|_| StoreError::Other("audit writer lock poisoned".to_string()))?;
        writeln!(writer, "{}", line)?;
        writer.flush()?;
        debug!(session = %entry.session_id, turn = entry.turn, "Audit entry appended");
        Ok(())
    }
}

impl Drop for JsonlAuditLog {
    fn drop(&mut self) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writer.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use council_domain::{
        AgentReply, AgentResult, AgentSpec, CouncilSession, FinalVerdict, OrchestrationOutcome,
        QuorumFloor, QuorumStatus, Request, RosterSelector, SessionId, WeightRegistry, synthesize,
    };

    fn entry(session: &str, turn: u32) -> AuditEntry {
        let registry = WeightRegistry::from_specs([
            AgentSpec::new("a", 1.0).mandatory(),
            AgentSpec::new("b", 1.0),
            AgentSpec::new("c", 1.0),
            AgentSpec::new("d", 1.0),
        ]);
        let request = Request::new("ship it", session).unwrap();
        let roster = RosterSelector::default().select(&request, &[], &registry).unwrap();
        let results: Vec<AgentResult> = roster
            .ids()
            .map(|id| AgentResult::success(id.clone(), AgentReply::new(0.5), 5))
            .collect();
        let report = synthesize(&results, &registry);
        let outcome = OrchestrationOutcome {
            session_id: SessionId::new(session),
            turn,
            verdict: FinalVerdict::Fail,
            roster,
            results,
            synthesis_report: report,
            council_session: CouncilSession::skipped(),
            quorum: QuorumStatus::evaluate(QuorumFloor::default(), 4, 4, false),
            degraded: true,
            warnings: Vec::new(),
            registry_version: 0,
            audit_recorded: false,
            elapsed_ms: 12,
        };
        AuditEntry::from_outcome("ship it", &outcome, 1_700_000_000_123)
    }

    #[tokio::test]
    async fn test_appends_one_line_per_entry() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit").join("audit.jsonl");
        let log = JsonlAuditLog::open(&path).unwrap();

        log.append(&entry("s-1", 1)).await.unwrap();
        log.append(&entry("s-1", 2)).await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.trim().lines().collect();
        assert_eq!(lines.len(), 2);

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["session_id"], "s-1");
        assert_eq!(first["turn"], 1);
        assert_eq!(first["verdict"], "FAIL");
        assert_eq!(first["timestamp"], "2023-11-14T22:13:20.123Z");
    }

    #[tokio::test]
    async fn test_reopen_appends_instead_of_truncating() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.jsonl");

        JsonlAuditLog::open(&path)
            .unwrap()
            .append(&entry("s-1", 1))
            .await
            .unwrap();
        JsonlAuditLog::open(&path)
            .unwrap()
            .append(&entry("s-2", 1))
            .await
            .unwrap();

        let entries = JsonlAuditLog::read_all(&path).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].session_id.as_str(), "s-1");
        assert_eq!(entries[1].session_id.as_str(), "s-2");
        assert_eq!(entries[1].roster.len(), 4);
    }
}
