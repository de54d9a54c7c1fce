use clap::Parser;
use color_eyre::Result;
use moodlog::{
    Config, Profile, Window,
    cli::{self, Cli, Commands},
    utils::expand_path,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Set up error reporting with color-eyre
    color_eyre::install()?;

    // Log filter from MOODLOG_LOG, then RUST_LOG, default warn
    let log_env = std::env::var("MOODLOG_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| "warn".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_new(&log_env)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .compact()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(env_filter)
        .init();

    let cli = Cli::parse();

    // --dev flag enables dev mode, otherwise use prod
    let profile = if cli.dev { Profile::Dev } else { Profile::Prod };

    let config = match &cli.config {
        Some(path) => Config::load_from_path(&expand_path(path))?,
        None => Config::load_with_profile(profile)?,
    };
    let user = cli.user.clone().unwrap_or_else(|| config.user.clone());
    tracing::debug!(?profile, user = %user, "configuration loaded");

    match cli.command.unwrap_or(Commands::Stats { window: None }) {
        Commands::Log {
            mood,
            note,
            activities,
        } => {
            let mut journal = cli::open_journal(&config, &user)?;
            cli::handle_log(&mut journal, mood, note, activities)?;
        }
        Commands::History { limit } => {
            let journal = cli::open_journal(&config, &user)?;
            cli::handle_history(&journal, limit);
        }
        Commands::Stats { window } => {
            let window = match window {
                Some(raw) => raw.parse::<Window>()?,
                None => config.window()?,
            };
            let journal = cli::open_journal(&config, &user)?;
            cli::handle_stats(&journal, window);
        }
        Commands::Tips { mood } => {
            let client = cli::completion_client(&config)?;
            cli::handle_tips(&client, mood).await?;
        }
        Commands::Chat { message } => {
            let client = cli::completion_client(&config)?;
            cli::handle_chat(&client, message).await?;
        }
        Commands::Prompt => cli::handle_prompt(),
        Commands::Moods => cli::handle_moods(),
        Commands::Bmi {
            height_cm,
            weight_kg,
        } => cli::handle_bmi(height_cm, weight_kg)?,
    }

    Ok(())
}
