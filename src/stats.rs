use std::collections::BTreeMap;
use std::str::FromStr;
use thiserror::Error;

use crate::models::{Mood, MoodEntry};
use crate::utils::now_millis;

pub const MS_PER_DAY: i64 = 86_400_000;

/// Number of moods shown in the trends breakdown
pub const TOP_MOODS_LIMIT: usize = 5;

/// Trailing span used for aggregate statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    Week,
    Month,
    Days(u32),
}

impl Window {
    pub fn days(self) -> u32 {
        match self {
            Window::Week => 7,
            Window::Month => 30,
            Window::Days(days) => days,
        }
    }

    /// Human wording for the span, e.g. "this week"
    pub fn describe(self) -> String {
        match self {
            Window::Week => "this week".to_string(),
            Window::Month => "this month".to_string(),
            Window::Days(1) => "in the last day".to_string(),
            Window::Days(days) => format!("in the last {} days", days),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid window '{0}' (expected 'week', 'month' or a positive number of days)")]
pub struct InvalidWindowError(pub String);

impl FromStr for Window {
    type Err = InvalidWindowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "week" | "weekly" => Ok(Window::Week),
            "month" | "monthly" => Ok(Window::Month),
            other => match other.parse::<u32>() {
                Ok(days) if days > 0 => Ok(Window::Days(days)),
                _ => Err(InvalidWindowError(s.to_string())),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoodStats {
    /// Always holds all nine moods, zero-filled
    pub mood_counts: BTreeMap<Mood, usize>,
    pub total: usize,
    pub dominant: Mood,
    /// Counted over the full history, not just the window
    pub streak: usize,
}

impl MoodStats {
    pub fn count(&self, mood: Mood) -> usize {
        self.mood_counts.get(&mood).copied().unwrap_or(0)
    }

    /// Logged moods by descending count; equal counts keep canonical order
    pub fn top_moods(&self, limit: usize) -> Vec<(Mood, usize)> {
        let mut logged: Vec<(Mood, usize)> = self
            .mood_counts
            .iter()
            .filter(|(_, count)| **count > 0)
            .map(|(mood, count)| (*mood, *count))
            .collect();
        logged.sort_by(|a, b| b.1.cmp(&a.1));
        logged.truncate(limit);
        logged
    }

    /// Share of the window taken by `mood`, in whole percent
    pub fn percentage(&self, mood: Mood) -> u32 {
        if self.total == 0 {
            return 0;
        }
        ((self.count(mood) as f64 / self.total as f64) * 100.0).round() as u32
    }
}

/// Statistics over the entries logged in the last `window_days` days
pub fn compute_stats(entries: &[MoodEntry], window_days: u32) -> MoodStats {
    compute_stats_at(entries, window_days, now_millis())
}

/// Same as [`compute_stats`] with an explicit "now" in epoch milliseconds
pub fn compute_stats_at(entries: &[MoodEntry], window_days: u32, now_ms: i64) -> MoodStats {
    let window_ms = i64::from(window_days) * MS_PER_DAY;

    let mut mood_counts: BTreeMap<Mood, usize> = Mood::ALL.into_iter().map(|m| (m, 0)).collect();
    let mut total = 0;
    for entry in entries
        .iter()
        .filter(|e| now_ms.saturating_sub(e.timestamp()) < window_ms)
    {
        *mood_counts.entry(entry.mood()).or_insert(0) += 1;
        total += 1;
    }

    let dominant = if total == 0 {
        Mood::Neutral
    } else {
        dominant_mood(&mood_counts)
    };

    MoodStats {
        mood_counts,
        total,
        dominant,
        streak: positivity_streak(entries),
    }
}

// Strictly-greater scan in canonical order: the earliest mood wins a tie.
fn dominant_mood(counts: &BTreeMap<Mood, usize>) -> Mood {
    let mut best = Mood::ALL[0];
    let mut best_count = 0;
    for mood in Mood::ALL {
        let count = counts.get(&mood).copied().unwrap_or(0);
        if count > best_count {
            best = mood;
            best_count = count;
        }
    }
    best
}

/// Consecutive positive-or-neutral entries counting back from the newest
pub fn positivity_streak(entries: &[MoodEntry]) -> usize {
    sorted_newest_first(entries)
        .into_iter()
        .take_while(|e| e.mood().is_positive_or_neutral())
        .count()
}

/// Entries ordered by timestamp descending; equal timestamps keep input order
pub fn sorted_newest_first(entries: &[MoodEntry]) -> Vec<&MoodEntry> {
    let mut sorted: Vec<&MoodEntry> = entries.iter().collect();
    sorted.sort_by(|a, b| b.timestamp().cmp(&a.timestamp()));
    sorted
}
