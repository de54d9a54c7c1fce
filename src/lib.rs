pub mod cli;
pub mod completion;
pub mod config;
pub mod database;
pub mod insight;
pub mod journal;
pub mod models;
pub mod stats;
pub mod store;
pub mod utils;
pub mod wellness;

pub use completion::{CompletionClient, ReqwestCompletionClient, request_coping_tips};
pub use config::Config;
pub use database::Database;
pub use insight::compute_insight;
pub use journal::{JournalError, MoodJournal};
pub use models::{Activity, InvalidMoodError, Mood, MoodEntry};
pub use stats::{MoodStats, Window, compute_stats};
pub use store::{BlobStore, MemoryStore, MoodStore};
pub use utils::Profile;
