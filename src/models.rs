use chrono::TimeZone;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::insight::compute_insight;

/// How the user feels at the moment an entry is logged.
///
/// Declaration order is the canonical order used for tie-breaking and for
/// every listing of moods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Happy,
    Excited,
    Energetic,
    Calm,
    Neutral,
    Tired,
    Anxious,
    Stressed,
    Sad,
}

impl Mood {
    pub const ALL: [Mood; 9] = [
        Mood::Happy,
        Mood::Excited,
        Mood::Energetic,
        Mood::Calm,
        Mood::Neutral,
        Mood::Tired,
        Mood::Anxious,
        Mood::Stressed,
        Mood::Sad,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Mood::Happy => "happy",
            Mood::Excited => "excited",
            Mood::Energetic => "energetic",
            Mood::Calm => "calm",
            Mood::Neutral => "neutral",
            Mood::Tired => "tired",
            Mood::Anxious => "anxious",
            Mood::Stressed => "stressed",
            Mood::Sad => "sad",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Mood::Happy => "Happy",
            Mood::Excited => "Excited",
            Mood::Energetic => "Energetic",
            Mood::Calm => "Calm",
            Mood::Neutral => "Neutral",
            Mood::Tired => "Tired",
            Mood::Anxious => "Anxious",
            Mood::Stressed => "Stressed",
            Mood::Sad => "Sad",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            Mood::Happy => "😊",
            Mood::Excited => "🤩",
            Mood::Energetic => "⚡",
            Mood::Calm => "😌",
            Mood::Neutral => "😐",
            Mood::Tired => "😴",
            Mood::Anxious => "😰",
            Mood::Stressed => "😤",
            Mood::Sad => "😢",
        }
    }

    /// Moods that keep a positivity streak alive
    pub fn is_positive_or_neutral(self) -> bool {
        matches!(
            self,
            Mood::Happy | Mood::Excited | Mood::Energetic | Mood::Calm | Mood::Neutral
        )
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid mood '{0}' (expected one of: happy, excited, energetic, calm, neutral, tired, anxious, stressed, sad)")]
pub struct InvalidMoodError(pub String);

impl FromStr for Mood {
    type Err = InvalidMoodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mood::ALL
            .into_iter()
            .find(|mood| mood.as_str() == s)
            .ok_or_else(|| InvalidMoodError(s.to_string()))
    }
}

/// Context tag attached to an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activity {
    Work,
    Family,
    Friends,
    Exercise,
    Sleep,
    Other,
}

impl Activity {
    pub const ALL: [Activity; 6] = [
        Activity::Work,
        Activity::Family,
        Activity::Friends,
        Activity::Exercise,
        Activity::Sleep,
        Activity::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Activity::Work => "work",
            Activity::Family => "family",
            Activity::Friends => "friends",
            Activity::Exercise => "exercise",
            Activity::Sleep => "sleep",
            Activity::Other => "other",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Activity::Work => "Work",
            Activity::Family => "Family",
            Activity::Friends => "Friends",
            Activity::Exercise => "Exercise",
            Activity::Sleep => "Sleep",
            Activity::Other => "Other",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Activity::Work => "💼",
            Activity::Family => "👨‍👩‍👧‍👦",
            Activity::Friends => "👥",
            Activity::Exercise => "🏃‍♀️",
            Activity::Sleep => "💤",
            Activity::Other => "📝",
        }
    }
}

impl fmt::Display for Activity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid activity '{0}' (expected one of: work, family, friends, exercise, sleep, other)")]
pub struct InvalidActivityError(pub String);

impl FromStr for Activity {
    type Err = InvalidActivityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Activity::ALL
            .into_iter()
            .find(|activity| activity.as_str() == s)
            .ok_or_else(|| InvalidActivityError(s.to_string()))
    }
}

/// A single logged mood.
///
/// Entries are never edited once created, so fields are only reachable
/// through getters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "StoredEntry", try_from = "StoredEntry")]
pub struct MoodEntry {
    id: String,
    mood: Mood,
    note: Option<String>,
    activities: BTreeSet<Activity>,
    timestamp: i64, // milliseconds since the Unix epoch
    insight: Option<String>,
}

impl MoodEntry {
    /// Build an entry and attach the insight for its mood.
    /// An empty note is stored as no note.
    pub fn new(
        id: String,
        mood: Mood,
        note: Option<String>,
        activities: impl IntoIterator<Item = Activity>,
        timestamp: i64,
    ) -> Self {
        Self {
            id,
            mood,
            note: note.filter(|n| !n.is_empty()),
            activities: activities.into_iter().collect(),
            timestamp,
            insight: Some(compute_insight(mood).to_string()),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn mood(&self) -> Mood {
        self.mood
    }

    pub fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }

    pub fn activities(&self) -> &BTreeSet<Activity> {
        &self.activities
    }

    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    /// Entries written by older versions may lack an insight
    pub fn insight(&self) -> Option<&str> {
        self.insight.as_deref()
    }

    /// Local calendar date of the entry, e.g. `3/7/2025`
    pub fn display_date(&self) -> String {
        format_display_date(self.timestamp)
    }
}

pub fn format_display_date(timestamp_ms: i64) -> String {
    chrono::Local
        .timestamp_millis_opt(timestamp_ms)
        .single()
        .map(|dt| dt.format("%-m/%-d/%Y").to_string())
        .unwrap_or_default()
}

/// On-disk shape of an entry. Mood and activities stay as raw strings here so
/// that one unrecognised record does not poison the whole blob.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct StoredEntry {
    pub id: String,
    pub mood: String,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub date: String,
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activities: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insight: Option<String>,
}

#[derive(Debug, Error)]
pub enum EntryDecodeError {
    #[error("entry {id}: {source}")]
    Mood { id: String, source: InvalidMoodError },
    #[error("entry {id}: {source}")]
    Activity { id: String, source: InvalidActivityError },
}

impl TryFrom<StoredEntry> for MoodEntry {
    type Error = EntryDecodeError;

    fn try_from(stored: StoredEntry) -> Result<Self, Self::Error> {
        let mood = stored.mood.parse::<Mood>().map_err(|source| EntryDecodeError::Mood {
            id: stored.id.clone(),
            source,
        })?;
        let activities = stored
            .activities
            .unwrap_or_default()
            .iter()
            .map(|raw| raw.parse::<Activity>())
            .collect::<Result<BTreeSet<_>, _>>()
            .map_err(|source| EntryDecodeError::Activity {
                id: stored.id.clone(),
                source,
            })?;

        Ok(MoodEntry {
            id: stored.id,
            mood,
            note: Some(stored.note).filter(|n| !n.is_empty()),
            activities,
            timestamp: stored.timestamp,
            insight: stored.insight,
        })
    }
}

impl From<MoodEntry> for StoredEntry {
    fn from(entry: MoodEntry) -> Self {
        StoredEntry {
            date: entry.display_date(),
            id: entry.id,
            mood: entry.mood.as_str().to_string(),
            note: entry.note.unwrap_or_default(),
            timestamp: entry.timestamp,
            activities: Some(
                entry
                    .activities
                    .iter()
                    .map(|a| a.as_str().to_string())
                    .collect(),
            ),
            insight: entry.insight,
        }
    }
}
