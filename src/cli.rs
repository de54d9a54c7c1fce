use clap::{Parser, Subcommand};
use thiserror::Error;

use crate::completion::{self, CompletionClient, CompletionError, ReqwestCompletionClient};
use crate::config::Config;
use crate::database::{Database, DatabaseError};
use crate::insight::guided_prompt;
use crate::journal::{JournalError, MoodJournal};
use crate::models::{Activity, InvalidMoodError, Mood, MoodEntry};
use crate::stats::{MoodStats, TOP_MOODS_LIMIT, Window};
use crate::store::{BlobStore, MoodStore};
use crate::utils::truncate_chars;
use crate::wellness::calculate_bmi;

#[derive(Parser)]
#[command(name = "moodlog")]
#[command(about = "Mood journal with trends, streaks and coping tips")]
#[command(version)]
pub struct Cli {
    /// Custom config file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Use development mode (uses separate dev config/database)
    #[arg(long, global = true)]
    pub dev: bool,

    /// Journal owner; defaults to the `user` set in the config file
    #[arg(short, long, global = true)]
    pub user: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log how you feel right now
    Log {
        /// One of: happy, excited, energetic, calm, neutral, tired, anxious, stressed, sad
        mood: String,
        /// Free-text journal note
        #[arg(long)]
        note: Option<String>,
        /// Activity tag (work, family, friends, exercise, sleep, other); repeatable
        #[arg(short, long = "activity")]
        activities: Vec<String>,
    },
    /// Show past entries, newest first
    History {
        /// Only show this many entries
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Mood trends for a window (default if no subcommand)
    Stats {
        /// week, month or a number of days
        #[arg(long)]
        window: Option<String>,
    },
    /// Ask the assistant for coping strategies for a mood
    Tips {
        mood: String,
    },
    /// Ask the wellness assistant a question
    Chat {
        message: String,
    },
    /// Print a guided journaling prompt
    Prompt,
    /// List the moods and activity tags that can be logged
    Moods,
    /// Body-mass index from height and weight
    Bmi {
        #[arg(long)]
        height_cm: f64,
        #[arg(long)]
        weight_kg: f64,
    },
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] DatabaseError),
    #[error(transparent)]
    JournalError(#[from] JournalError),
    #[error(transparent)]
    InvalidMood(#[from] InvalidMoodError),
    #[error("Completion client error: {0}")]
    CompletionError(#[from] CompletionError),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Open the SQLite-backed journal for `user`
pub fn open_journal(config: &Config, user: &str) -> Result<MoodJournal<BlobStore>, CliError> {
    let db_path = config.get_database_path();
    let db = Database::new(db_path.to_str().ok_or_else(|| {
        CliError::InvalidInput("Database path contains invalid UTF-8".to_string())
    })?)?;
    Ok(MoodJournal::open(BlobStore::new(db, user)))
}

pub fn completion_client(config: &Config) -> Result<ReqwestCompletionClient, CliError> {
    Ok(ReqwestCompletionClient::new(
        &config.completion.base_url,
        config.completion.timeout(),
    )?)
}

/// Handle the log command
pub fn handle_log<S: MoodStore>(
    journal: &mut MoodJournal<S>,
    mood: String,
    note: Option<String>,
    activities: Vec<String>,
) -> Result<(), CliError> {
    let activities: Vec<String> = activities.iter().map(|a| normalize_input(a)).collect();
    let entry = journal.submit_raw(&normalize_input(&mood), note, &activities)?;
    println!("Mood logged successfully (ID: {})", entry.id());
    if let Some(insight) = entry.insight() {
        println!();
        println!("💡 {}", insight);
    }
    Ok(())
}

/// Handle the history command
pub fn handle_history<S: MoodStore>(journal: &MoodJournal<S>, limit: Option<usize>) {
    let history = journal.history();
    if history.is_empty() {
        println!("No mood entries yet. Log one with `moodlog log <mood>`.");
        return;
    }
    let shown = limit.unwrap_or(history.len());
    for entry in history.into_iter().take(shown) {
        println!("{}", render_entry(entry));
    }
}

/// Handle the stats command
pub fn handle_stats<S: MoodStore>(journal: &MoodJournal<S>, window: Window) {
    let stats = journal.stats(window.days());
    print!("{}", render_stats(&stats, window));
}

/// Handle the tips command. Interrupting with Ctrl-C drops the pending request.
pub async fn handle_tips(client: &dyn CompletionClient, mood: String) -> Result<(), CliError> {
    let mood = normalize_input(&mood).parse::<Mood>()?;
    println!("{} Coping tips for feeling {}:", mood.emoji(), mood);
    tokio::select! {
        tips = completion::request_coping_tips(client, mood) => println!("{}", tips),
        _ = tokio::signal::ctrl_c() => tracing::info!("coping tips request cancelled"),
    }
    Ok(())
}

/// Handle the chat command
pub async fn handle_chat(client: &dyn CompletionClient, message: String) -> Result<(), CliError> {
    if message.trim().is_empty() {
        return Err(CliError::InvalidInput("message is empty".to_string()));
    }
    tokio::select! {
        reply = completion::ask_assistant(client, &message) => println!("{}", reply),
        _ = tokio::signal::ctrl_c() => tracing::info!("assistant request cancelled"),
    }
    Ok(())
}

/// Handle the prompt command
pub fn handle_prompt() {
    println!("{}", guided_prompt(&mut rand::rng()));
}

/// Handle the moods command
pub fn handle_moods() {
    println!("Moods:");
    for mood in Mood::ALL {
        println!("  {} {:<10} {}", mood.emoji(), mood.as_str(), mood.label());
    }
    println!("Activities:");
    for activity in Activity::ALL {
        println!("  {} {:<10} {}", activity.icon(), activity.as_str(), activity.label());
    }
}

/// Handle the bmi command
pub fn handle_bmi(height_cm: f64, weight_kg: f64) -> Result<(), CliError> {
    let reading = calculate_bmi(height_cm, weight_kg).ok_or_else(|| {
        CliError::InvalidInput("height and weight must both be positive".to_string())
    })?;
    println!("BMI: {:.1} ({})", reading.value, reading.category);
    Ok(())
}

// Command-line values are matched against the lowercase mood and activity names
fn normalize_input(raw: &str) -> String {
    raw.trim().to_lowercase()
}

pub fn render_entry(entry: &MoodEntry) -> String {
    let mut line = format!(
        "{} {} {:<9}",
        entry.display_date(),
        entry.mood().emoji(),
        entry.mood().label()
    );
    if !entry.activities().is_empty() {
        let tags: Vec<&str> = entry.activities().iter().map(|a| a.label()).collect();
        line.push_str(&format!(" [{}]", tags.join(", ")));
    }
    if let Some(note) = entry.note() {
        line.push_str(&format!(" {}", truncate_chars(note, 60)));
    }
    line
}

pub fn render_stats(stats: &MoodStats, window: Window) -> String {
    let mut out = String::new();
    if stats.total == 0 {
        out.push_str(&format!("No mood entries {}.\n", window.describe()));
    } else {
        out.push_str(&format!("{} entries {}\n", stats.total, window.describe()));
        for (mood, count) in stats.top_moods(TOP_MOODS_LIMIT) {
            out.push_str(&format!(
                "  {} {:<9} {:>3} ({}%)\n",
                mood.emoji(),
                mood.label(),
                count,
                stats.percentage(mood)
            ));
        }
        out.push_str(&format!(
            "Most common: {} {}\n",
            stats.dominant.emoji(),
            stats.dominant.label()
        ));
    }
    if stats.streak > 0 {
        out.push_str(&format!("{} day positive streak! 🎉\n", stats.streak));
    }
    out
}
