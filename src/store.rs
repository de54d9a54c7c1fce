//! Persistence seam for mood entries.
//!
//! The journal only ever loads the full list and writes the full list back,
//! so a store is a single serialized blob per user.

use serde::Deserialize;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;

use crate::database::{Database, DatabaseError};
use crate::models::{MoodEntry, StoredEntry};

pub const STORE_KEY_PREFIX: &str = "moodEntries";

/// Blob key holding the entries of `user`
pub fn store_key(user: &str) -> String {
    format!("{}:{}", STORE_KEY_PREFIX, user)
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

pub trait MoodStore {
    /// All persisted entries in storage order; an absent blob is an empty list
    fn load(&self) -> Result<Vec<MoodEntry>, StoreError>;

    /// Replace the persisted list with `entries`
    fn save(&self, entries: &[MoodEntry]) -> Result<(), StoreError>;
}

/// A stored blob split into the entries this version understands and the raw
/// records it does not.
#[derive(Debug, Default)]
pub struct DecodedBlob {
    pub entries: Vec<MoodEntry>,
    pub unreadable: Vec<serde_json::Value>,
}

/// Decode a stored blob. Records with unknown moods, unknown activities or
/// missing fields are kept aside verbatim instead of failing the whole list.
pub fn decode_blob(blob: &str) -> Result<DecodedBlob, serde_json::Error> {
    let records: Vec<serde_json::Value> = serde_json::from_str(blob)?;
    let mut decoded = DecodedBlob::default();
    for record in records {
        match decode_record(&record) {
            Ok(entry) => decoded.entries.push(entry),
            Err(e) => {
                tracing::warn!("keeping unreadable mood entry as stored: {}", e);
                decoded.unreadable.push(record);
            }
        }
    }
    Ok(decoded)
}

fn decode_record(record: &serde_json::Value) -> Result<MoodEntry, String> {
    let stored = StoredEntry::deserialize(record).map_err(|e| e.to_string())?;
    MoodEntry::try_from(stored).map_err(|e| e.to_string())
}

/// Entries of a stored blob, without the records that could not be read
pub fn decode_entries(blob: &str) -> Result<Vec<MoodEntry>, serde_json::Error> {
    decode_blob(blob).map(|decoded| decoded.entries)
}

/// Encode `entries` followed by any raw records carried over from the old blob
pub fn encode_entries(
    entries: &[MoodEntry],
    unreadable: &[serde_json::Value],
) -> Result<String, serde_json::Error> {
    let mut records = entries
        .iter()
        .map(serde_json::to_value)
        .collect::<Result<Vec<_>, _>>()?;
    records.extend(unreadable.iter().cloned());
    serde_json::to_string(&records)
}

/// Key under which a blob that is not a JSON list is set aside before being replaced
pub fn unreadable_key(key: &str) -> String {
    format!("{}#unreadable", key)
}

/// SQLite-backed store, one blob per user
pub struct BlobStore {
    db: Database,
    key: String,
}

impl BlobStore {
    pub fn new(db: Database, user: &str) -> Self {
        Self {
            db,
            key: store_key(user),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    // Records in the current blob that a save must not drop. A blob that is
    // not a list at all is moved to its own key first.
    fn carried_over_records(&self) -> Result<Vec<serde_json::Value>, StoreError> {
        let Some(blob) = self.db.get_blob(&self.key)? else {
            return Ok(Vec::new());
        };
        match decode_blob(&blob) {
            Ok(decoded) => Ok(decoded.unreadable),
            Err(e) => {
                let backup = unreadable_key(&self.key);
                tracing::warn!(key = %backup, "moving unreadable mood blob aside: {}", e);
                self.db.put_blob(&backup, &blob)?;
                Ok(Vec::new())
            }
        }
    }
}

impl MoodStore for BlobStore {
    fn load(&self) -> Result<Vec<MoodEntry>, StoreError> {
        match self.db.get_blob(&self.key)? {
            Some(blob) => Ok(decode_entries(&blob)?),
            None => Ok(Vec::new()),
        }
    }

    fn save(&self, entries: &[MoodEntry]) -> Result<(), StoreError> {
        let unreadable = self.carried_over_records()?;
        let blob = encode_entries(entries, &unreadable)?;
        self.db.put_blob(&self.key, &blob)?;
        tracing::debug!(
            key = %self.key,
            count = entries.len(),
            kept_unreadable = unreadable.len(),
            "saved mood entries"
        );
        Ok(())
    }
}

/// Process-local store, mainly for tests. Writes can be made to fail on demand.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<Vec<MoodEntry>>,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries(entries: Vec<MoodEntry>) -> Self {
        Self {
            entries: Mutex::new(entries),
            fail_writes: AtomicBool::new(false),
        }
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

impl MoodStore for MemoryStore {
    fn load(&self) -> Result<Vec<MoodEntry>, StoreError> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))?;
        Ok(entries.clone())
    }

    fn save(&self, entries: &[MoodEntry]) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("writes disabled".to_string()));
        }
        let mut stored = self
            .entries
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))?;
        *stored = entries.to_vec();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journal::MoodJournal;
    use crate::models::{Activity, Mood};
    use crate::stats::compute_stats_at;

    fn sample() -> Vec<MoodEntry> {
        vec![
            MoodEntry::new("2".into(), Mood::Sad, Some("rain".into()), [Activity::Sleep], 2_000),
            MoodEntry::new("1".into(), Mood::Happy, None, [], 1_000),
        ]
    }

    #[test]
    fn store_keys_are_scoped_per_user() {
        assert_eq!(store_key("alice"), "moodEntries:alice");
        assert_ne!(store_key("alice"), store_key("bob"));
    }

    #[test]
    fn blob_store_starts_empty() {
        let store = BlobStore::new(Database::open_in_memory().expect("db"), "alice");
        assert!(store.load().expect("load").is_empty());
    }

    #[test]
    fn blob_store_keeps_storage_order() {
        let store = BlobStore::new(Database::open_in_memory().expect("db"), "alice");
        store.save(&sample()).expect("save");
        assert_eq!(store.load().expect("load"), sample());
    }

    #[test]
    fn corrupt_blob_is_a_serialization_error() {
        let store = BlobStore::new(Database::open_in_memory().expect("db"), "alice");
        store
            .database()
            .put_blob(store.key(), "{not json")
            .expect("write");
        assert!(matches!(store.load(), Err(StoreError::Serialization(_))));
    }

    #[test]
    fn decode_skips_unknown_moods() {
        let blob = r#"[
            {"id":"3","mood":"bored","note":"","date":"","timestamp":3000},
            {"id":"2","mood":"calm","note":"","date":"","timestamp":2000,"activities":["gardening"]},
            {"id":"1","mood":"happy","note":"ok","date":"","timestamp":1000,"activities":["work"],"insight":"x"}
        ]"#;
        let entries = decode_entries(blob).expect("decode");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id(), "1");
        assert_eq!(entries[0].insight(), Some("x"));
    }

    #[test]
    fn decode_keeps_unreadable_records_verbatim() {
        let blob = r#"[{"mood":"bored","note":"keep me"},{"id":"1","mood":"calm","note":"","date":"","timestamp":1000}]"#;
        let decoded = decode_blob(blob).expect("decode");
        assert_eq!(decoded.entries.len(), 1);
        assert_eq!(decoded.unreadable.len(), 1);
        assert_eq!(decoded.unreadable[0]["note"], "keep me");
    }

    #[test]
    fn submitting_keeps_unreadable_records_on_disk() {
        let store = BlobStore::new(Database::open_in_memory().expect("db"), "alice");
        store
            .database()
            .put_blob(
                store.key(),
                r#"[{"mood":"bored","note":"keep me"},{"id":"1","mood":"calm","note":"","date":"","timestamp":1000}]"#,
            )
            .expect("seed");

        let mut journal = MoodJournal::open(store);
        assert_eq!(journal.entries().len(), 1);
        journal.submit_entry(Mood::Happy, None, []).expect("submit");

        let blob = journal
            .store()
            .database()
            .get_blob(journal.store().key())
            .expect("read")
            .expect("blob present");
        assert!(blob.contains("keep me"));

        let decoded = decode_blob(&blob).expect("decode");
        assert_eq!(decoded.entries.len(), 2);
        assert_eq!(decoded.entries[0].mood(), Mood::Happy);
        assert_eq!(decoded.unreadable.len(), 1);
    }

    #[test]
    fn saving_over_a_corrupt_blob_moves_it_aside() {
        let store = BlobStore::new(Database::open_in_memory().expect("db"), "alice");
        store
            .database()
            .put_blob(store.key(), "{not json")
            .expect("write");

        store.save(&sample()).expect("save");
        assert_eq!(store.load().expect("load"), sample());
        let backup = store
            .database()
            .get_blob(&unreadable_key(store.key()))
            .expect("read");
        assert_eq!(backup.as_deref(), Some("{not json"));
    }

    #[test]
    fn extreme_stored_timestamps_are_harmless() {
        let blob = r#"[
            {"id":"1","mood":"calm","note":"","date":"","timestamp":-9223372036854775808},
            {"id":"2","mood":"sad","note":"","date":"","timestamp":9223372036854775807}
        ]"#;
        let entries = decode_entries(blob).expect("decode");
        assert_eq!(entries.len(), 2);
        let stats = compute_stats_at(&entries, 7, 1_750_000_000_000);
        assert_eq!(stats.total, 1);
        assert_eq!(stats.count(Mood::Sad), 1);
    }

    #[test]
    fn memory_store_write_failure() {
        let store = MemoryStore::with_entries(sample());
        store.set_fail_writes(true);
        assert!(matches!(store.save(&[]), Err(StoreError::Unavailable(_))));
        assert_eq!(store.load().expect("load").len(), 2);
    }
}
