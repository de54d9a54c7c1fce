use std::collections::BTreeSet;
use thiserror::Error;

use crate::models::{Activity, InvalidActivityError, InvalidMoodError, Mood, MoodEntry};
use crate::stats::{self, MoodStats};
use crate::store::{MoodStore, StoreError};
use crate::utils::now_millis;

#[derive(Debug, Error)]
pub enum JournalError {
    #[error(transparent)]
    InvalidMood(#[from] InvalidMoodError),
    #[error(transparent)]
    InvalidActivity(#[from] InvalidActivityError),
    #[error("Failed to save mood entries: {0}")]
    Store(#[from] StoreError),
}

type Clock = Box<dyn Fn() -> i64 + Send + Sync>;

/// The mood journal of a single user.
///
/// Holds the loaded entries in memory (newest submission first) and writes the
/// full list back through its [`MoodStore`] on every submission.
pub struct MoodJournal<S> {
    store: S,
    entries: Vec<MoodEntry>,
    clock: Clock,
}

impl<S: MoodStore> MoodJournal<S> {
    /// Load the journal from `store`. An unreadable store opens as empty.
    pub fn open(store: S) -> Self {
        let entries = match store.load() {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!("could not read mood entries, starting empty: {}", e);
                Vec::new()
            }
        };
        tracing::debug!(count = entries.len(), "opened mood journal");
        Self {
            store,
            entries,
            clock: Box::new(now_millis),
        }
    }

    /// Replace the time source used for timestamps and ids
    pub fn with_clock(mut self, clock: impl Fn() -> i64 + Send + Sync + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Log a new mood and persist the updated journal.
    ///
    /// If the store rejects the write the entry is not kept, and everything
    /// loaded earlier stays available.
    pub fn submit_entry(
        &mut self,
        mood: Mood,
        note: Option<String>,
        activities: impl IntoIterator<Item = Activity>,
    ) -> Result<MoodEntry, JournalError> {
        let timestamp = (self.clock)();
        let entry = MoodEntry::new(self.next_id(timestamp), mood, note, activities, timestamp);

        let mut updated = Vec::with_capacity(self.entries.len() + 1);
        updated.push(entry.clone());
        updated.extend(self.entries.iter().cloned());

        self.store.save(&updated)?;
        self.entries = updated;

        tracing::debug!(id = entry.id(), mood = %entry.mood(), "logged mood entry");
        Ok(entry)
    }

    /// Like [`submit_entry`](Self::submit_entry) but for unparsed input.
    /// Nothing is stored unless every value is recognised.
    pub fn submit_raw(
        &mut self,
        mood: &str,
        note: Option<String>,
        activities: &[String],
    ) -> Result<MoodEntry, JournalError> {
        let mood = mood.parse::<Mood>()?;
        let activities = activities
            .iter()
            .map(|raw| raw.parse::<Activity>())
            .collect::<Result<BTreeSet<_>, _>>()?;
        self.submit_entry(mood, note, activities)
    }

    /// Entries in storage order
    pub fn entries(&self) -> &[MoodEntry] {
        &self.entries
    }

    /// Entries sorted newest first
    pub fn history(&self) -> Vec<&MoodEntry> {
        stats::sorted_newest_first(&self.entries)
    }

    pub fn stats(&self, window_days: u32) -> MoodStats {
        stats::compute_stats_at(&self.entries, window_days, (self.clock)())
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // Millisecond timestamp, bumped past any id already in use.
    fn next_id(&self, timestamp: i64) -> String {
        let mut candidate = timestamp;
        loop {
            let id = candidate.to_string();
            if !self.entries.iter().any(|e| e.id() == id) {
                return id;
            }
            candidate += 1;
        }
    }
}
