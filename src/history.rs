//! Persisted, newest-first log of symptom submissions.
//!
//! The whole log lives in a single storage slot under [`HISTORY_KEY`] as a
//! versioned envelope:
//!
//! ```json
//! { "version": 1, "records": [ { "id": "…", "createdAt": "…", "symptomText": "…", "tips": ["…"] } ] }
//! ```
//!
//! Every [`HistoryStore::append`] rewrites the slot in full (write-through).
//! Loading never fails: a missing slot, a storage error, invalid JSON, the
//! wrong shape, or a version from a newer build all produce an empty log
//! and a warning.
//!
//! A payload from a newer build is copied to [`backup_key`] before the
//! first write replaces it, so its records survive a downgrade.
//!
//! A bare JSON array of records (with `date`/`symptoms` field names) is the
//! pre-versioning layout and is read as version 0.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::SymptomRecord;
use crate::storage::Storage;

/// Storage slot name for the serialized log.
pub const HISTORY_KEY: &str = "symptomHistory";

/// Envelope version written by this build.
pub const SCHEMA_VERSION: u32 = 1;

/// Slot that preserves a payload written by a newer build.
pub fn backup_key(version: u32) -> String {
    format!("{}.v{}.bak", HISTORY_KEY, version)
}

#[derive(Serialize)]
struct EnvelopeRef<'a> {
    version: u32,
    records: &'a [SymptomRecord],
}

#[derive(Deserialize)]
struct Envelope {
    version: u32,
    records: Vec<SymptomRecord>,
}

/// Why a stored payload was discarded.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadIssue {
    InvalidJson(String),
    WrongShape(String),
    UnsupportedVersion(u32),
}

impl std::fmt::Display for LoadIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadIssue::InvalidJson(e) => write!(f, "invalid JSON: {}", e),
            LoadIssue::WrongShape(e) => write!(f, "unexpected shape: {}", e),
            LoadIssue::UnsupportedVersion(v) => write!(
                f,
                "schema version {} is newer than supported version {}",
                v, SCHEMA_VERSION
            ),
        }
    }
}

/// Decode a stored payload into records, newest-first.
///
/// Accepts the current envelope and the legacy bare array. Individual
/// records with empty text or no tips are dropped.
pub fn decode(payload: &str) -> std::result::Result<Vec<SymptomRecord>, LoadIssue> {
    let value: Value =
        serde_json::from_str(payload).map_err(|e| LoadIssue::InvalidJson(e.to_string()))?;

    let records: Vec<SymptomRecord> = match value {
        Value::Array(_) => {
            serde_json::from_value(value).map_err(|e| LoadIssue::WrongShape(e.to_string()))?
        }
        Value::Object(_) => {
            let envelope: Envelope =
                serde_json::from_value(value).map_err(|e| LoadIssue::WrongShape(e.to_string()))?;
            if envelope.version > SCHEMA_VERSION {
                return Err(LoadIssue::UnsupportedVersion(envelope.version));
            }
            envelope.records
        }
        other => {
            return Err(LoadIssue::WrongShape(format!(
                "expected array or object, found {}",
                json_kind(&other)
            )))
        }
    };

    let total = records.len();
    let valid: Vec<SymptomRecord> = records.into_iter().filter(|r| r.is_valid()).collect();
    if valid.len() < total {
        tracing::warn!(
            dropped = total - valid.len(),
            "skipped history records with empty symptom text or tips"
        );
    }
    Ok(valid)
}

/// Serialize records as a current-version envelope.
pub fn encode(records: &[SymptomRecord]) -> Result<String> {
    let envelope = EnvelopeRef {
        version: SCHEMA_VERSION,
        records,
    };
    serde_json::to_string(&envelope).context("Failed to serialize history")
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Append-only history log backed by a [`Storage`] slot.
pub struct HistoryStore<S: Storage> {
    storage: S,
    records: Vec<SymptomRecord>,
    /// Newer-version payload not yet copied to its backup slot.
    unsupported: Option<(u32, String)>,
}

impl<S: Storage> HistoryStore<S> {
    /// Read the log from storage, degrading to empty on any problem.
    pub fn load(storage: S) -> Self {
        let mut unsupported = None;
        let records = match storage.get(HISTORY_KEY) {
            Ok(Some(payload)) => match decode(&payload) {
                Ok(records) => {
                    tracing::debug!(count = records.len(), "history loaded");
                    records
                }
                Err(LoadIssue::UnsupportedVersion(version)) => {
                    tracing::warn!(
                        version,
                        backup = %backup_key(version),
                        "stored history is from a newer build; it will be backed up before the next write"
                    );
                    unsupported = Some((version, payload));
                    Vec::new()
                }
                Err(issue) => {
                    tracing::warn!(%issue, "discarding stored history");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!(error = %e, "could not read stored history; starting empty");
                Vec::new()
            }
        };

        Self {
            storage,
            records,
            unsupported,
        }
    }

    /// Prepend a record and persist the full log.
    ///
    /// The in-memory log keeps the record even if persisting fails; the
    /// error is returned so the caller can report it. The slot is never
    /// overwritten while a newer-version payload in it lacks a backup.
    pub fn append(&mut self, record: SymptomRecord) -> Result<()> {
        anyhow::ensure!(
            record.is_valid(),
            "refusing to store a record without symptom text or tips"
        );
        self.records.insert(0, record);
        self.back_up_unsupported()?;
        self.persist()
    }

    fn back_up_unsupported(&mut self) -> Result<()> {
        if let Some((version, payload)) = &self.unsupported {
            let key = backup_key(*version);
            self.storage
                .set(&key, payload)
                .with_context(|| format!("Failed to back up version {} history to {}", version, key))?;
            tracing::info!(backup = %key, "backed up newer-version history");
            self.unsupported = None;
        }
        Ok(())
    }

    fn persist(&self) -> Result<()> {
        let payload = encode(&self.records)?;
        self.storage
            .set(HISTORY_KEY, &payload)
            .context("Failed to persist history")
    }

    /// Look up a past entry so its tips can be shown again.
    pub fn select_for_replay(&self, id: &str) -> Option<&SymptomRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// All records, newest first.
    pub fn records(&self) -> &[SymptomRecord] {
        &self.records
    }

    pub fn latest(&self) -> Option<&SymptomRecord> {
        self.records.first()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use std::sync::Arc;

    fn record(text: &str) -> SymptomRecord {
        SymptomRecord::new(text, vec![format!("tip for {}", text)])
    }

    #[test]
    fn test_empty_storage_loads_empty() {
        let store = HistoryStore::load(MemoryStorage::new());
        assert!(store.is_empty());
    }

    #[test]
    fn test_append_prepends() {
        let mut store = HistoryStore::load(MemoryStorage::new());
        store.append(record("first")).unwrap();
        store.append(record("second")).unwrap();
        assert_eq!(store.records()[0].symptom_text, "second");
        assert_eq!(store.records()[1].symptom_text, "first");
        assert_eq!(store.latest().unwrap().symptom_text, "second");
    }

    #[test]
    fn test_append_then_reload_preserves_order() {
        let storage = Arc::new(MemoryStorage::new());
        let mut store = HistoryStore::load(storage.clone());
        let a = record("a");
        let b = record("b");
        store.append(a.clone()).unwrap();
        store.append(b.clone()).unwrap();

        let reloaded = HistoryStore::load(storage);
        assert_eq!(reloaded.records(), &[b, a]);
    }

    #[test]
    fn test_append_writes_versioned_envelope() {
        let storage = Arc::new(MemoryStorage::new());
        let mut store = HistoryStore::load(storage.clone());
        store.append(record("x")).unwrap();

        let raw = storage.get(HISTORY_KEY).unwrap().unwrap();
        let value: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["version"], 1);
        assert_eq!(value["records"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_malformed_payloads_load_empty() {
        for payload in [
            "not json",
            "{\"version\":1}",
            "\"a string\"",
            "42",
            "[{\"id\":1}]",
            "{\"version\":1,\"records\":{}}",
        ] {
            let store = HistoryStore::load(MemoryStorage::with_value(HISTORY_KEY, payload));
            assert!(store.is_empty(), "payload {:?} should load empty", payload);
        }
    }

    #[test]
    fn test_future_version_is_rejected() {
        let payload = r#"{"version":99,"records":[]}"#;
        assert_eq!(decode(payload), Err(LoadIssue::UnsupportedVersion(99)));
    }

    #[test]
    fn test_future_version_is_backed_up_before_overwrite() {
        let payload = r#"{"version":2,"records":[{"id":"a","createdAt":"2024-01-01T00:00:00Z","symptomText":"kept","tips":["t"]}]}"#;
        let storage = Arc::new(MemoryStorage::with_value(HISTORY_KEY, payload));
        let mut store = HistoryStore::load(storage.clone());
        assert!(store.is_empty());

        store.append(record("new")).unwrap();

        assert_eq!(
            storage.get(&backup_key(2)).unwrap().as_deref(),
            Some(payload)
        );
        let reloaded = HistoryStore::load(storage.clone());
        assert_eq!(reloaded.len(), 1);
        assert_eq!(reloaded.records()[0].symptom_text, "new");

        // Later writes leave the backup alone.
        let mut store = reloaded;
        store.append(record("newer")).unwrap();
        assert_eq!(
            storage.get(&backup_key(2)).unwrap().as_deref(),
            Some(payload)
        );
    }

    /// Reads succeed, but every write fails.
    struct ReadOnlyStorage(MemoryStorage);

    impl Storage for ReadOnlyStorage {
        fn get(&self, key: &str) -> Result<Option<String>> {
            self.0.get(key)
        }
        fn set(&self, _key: &str, _value: &str) -> Result<()> {
            anyhow::bail!("read-only")
        }
    }

    #[test]
    fn test_future_version_not_overwritten_when_backup_fails() {
        let payload = r#"{"version":3,"records":[]}"#;
        let storage = ReadOnlyStorage(MemoryStorage::with_value(HISTORY_KEY, payload));
        let mut store = HistoryStore::load(storage);

        let err = store.append(record("new")).unwrap_err();
        assert!(format!("{:#}", err).contains("back up"));
        assert_eq!(store.len(), 1);
        assert_eq!(
            store.storage.get(HISTORY_KEY).unwrap().as_deref(),
            Some(payload)
        );
    }

    #[test]
    fn test_legacy_array_is_migrated() {
        let payload = r#"[
            {"id":"1712000000000","date":"2024-04-01T10:00:00.000Z","symptoms":"fever","tips":["rest"]},
            {"id":"1711000000000","date":"2024-03-21T08:30:00.000Z","symptoms":"cough","tips":["tea"]}
        ]"#;
        let storage = Arc::new(MemoryStorage::with_value(HISTORY_KEY, payload));
        let mut store = HistoryStore::load(storage.clone());
        assert_eq!(store.len(), 2);
        assert_eq!(store.records()[0].symptom_text, "fever");

        // Next write upgrades the slot.
        store.append(record("headache")).unwrap();
        let raw = storage.get(HISTORY_KEY).unwrap().unwrap();
        assert!(raw.starts_with("{\"version\":1"));
        assert_eq!(HistoryStore::load(storage).len(), 3);
    }

    #[test]
    fn test_invalid_records_are_skipped() {
        let payload = r#"{"version":1,"records":[
            {"id":"a","createdAt":"2024-01-01T00:00:00Z","symptomText":"ok","tips":["t"]},
            {"id":"b","createdAt":"2024-01-01T00:00:00Z","symptomText":"no tips","tips":[]}
        ]}"#;
        let records = decode(payload).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "a");
    }

    #[test]
    fn test_select_for_replay() {
        let mut store = HistoryStore::load(MemoryStorage::new());
        let r = record("sore throat");
        let id = r.id.clone();
        store.append(r).unwrap();
        store.append(record("other")).unwrap();

        assert_eq!(
            store.select_for_replay(&id).unwrap().symptom_text,
            "sore throat"
        );
        assert!(store.select_for_replay("missing").is_none());
    }

    #[test]
    fn test_append_rejects_record_without_tips() {
        let mut store = HistoryStore::load(MemoryStorage::new());
        assert!(store.append(SymptomRecord::new("x", vec![])).is_err());
        assert!(store.is_empty());
    }

    struct FailingStorage;

    impl Storage for FailingStorage {
        fn get(&self, _key: &str) -> Result<Option<String>> {
            anyhow::bail!("disk on fire")
        }
        fn set(&self, _key: &str, _value: &str) -> Result<()> {
            anyhow::bail!("disk on fire")
        }
    }

    #[test]
    fn test_unreadable_storage_loads_empty_and_append_reports() {
        let mut store = HistoryStore::load(FailingStorage);
        assert!(store.is_empty());
        assert!(store.append(record("a")).is_err());
        assert_eq!(store.len(), 1);
    }
}
