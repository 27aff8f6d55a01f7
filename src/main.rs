//! Pogovorim CLI entry point.
//!
//! Provides `start` (run the Telegram bot), `list` for the stored
//! participants, plus `profile` and `reset` for inspecting or resetting one
//! stored participant profile.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

use pogovorim::access::SystemClock;
use pogovorim::config::{load_config, runtime_paths, Config, RuntimePaths, StorageBackend};
use pogovorim::credentials::load_credentials;
use pogovorim::dialogue::{Dialogue, DialogueSettings};
use pogovorim::persona::RandomChooser;
use pogovorim::providers::openai::OpenAiCompatProvider;
use pogovorim::reply::{ReplyOrchestrator, ReplySettings};
use pogovorim::store::{JsonFileStore, MemoryStore, ProfileRepository, ProfileStore, SqliteStore};

/// Pogovorim, a Telegram chat companion.
#[derive(Parser)]
#[command(name = "pogovorim", version, about)]
struct Cli {
    /// Path to `config.toml` (default: `~/.pogovorim/config.toml`).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Subcommand to execute.
    #[command(subcommand)]
    command: Command,
}

/// Available CLI subcommands.
#[derive(Subcommand)]
enum Command {
    /// Run the Telegram bot.
    Start,
    /// List stored participants with their onboarding stage.
    List,
    /// Print one participant's stored profile as JSON.
    Profile {
        /// Participant identifier (Telegram user id).
        participant: String,
    },
    /// Reset one participant's profile, keeping trial, plan and addressing.
    Reset {
        /// Participant identifier (Telegram user id).
        participant: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _ = dotenvy::dotenv();

    let paths = match &cli.config {
        Some(path) => RuntimePaths::for_config_file(path),
        None => runtime_paths()?,
    };

    match cli.command {
        Command::Start => handle_start(&paths).await,
        Command::List => handle_list(&paths).await,
        Command::Profile { participant } => handle_profile(&paths, &participant).await,
        Command::Reset { participant } => handle_reset(&paths, &participant).await,
    }
}

/// Run the bot until Ctrl+C.
async fn handle_start(paths: &RuntimePaths) -> anyhow::Result<()> {
    let _logging_guard = pogovorim::logging::init_production(&paths.logs_dir)?;

    let config = load_config(&paths.config_toml)?;
    let credentials = load_credentials(&paths.env_file)?;

    let api_key = credentials
        .require(&config.provider.api_key_env)
        .context("provider API key is not set")?;
    let bot_token = credentials
        .require(&config.telegram.bot_token_env)
        .context("telegram bot token is not set")?;

    let provider = OpenAiCompatProvider::new(
        config.provider.endpoint.clone(),
        config.provider.model.clone(),
        api_key,
        Duration::from_secs(config.provider.timeout_secs),
    )
    .context("failed to build provider client")?;

    let store = open_store(&config, paths).await?;
    let replies = ReplyOrchestrator::new(
        Arc::new(provider),
        ReplySettings {
            temperature: config.provider.temperature,
            max_tokens: config.provider.max_tokens,
            history_limit: config.history.limit,
        },
    );
    let dialogue = Dialogue::new(
        ProfileRepository::new(store),
        replies,
        Box::new(RandomChooser),
        Arc::new(SystemClock),
        DialogueSettings {
            trial_days: config.trial.days,
        },
    );

    info!(
        config = %paths.config_toml.display(),
        model = %config.provider.model,
        backend = ?config.storage.backend,
        "pogovorim started"
    );

    pogovorim::telegram::run_telegram(&bot_token, Arc::new(dialogue)).await
}

/// Print every stored participant, one per line.
async fn handle_list(paths: &RuntimePaths) -> anyhow::Result<()> {
    pogovorim::logging::init_cli();
    let config = load_config(&paths.config_toml)?;
    let store = open_store(&config, paths).await?;

    let participants = store
        .participants()
        .await
        .context("failed to list stored profiles")?;
    for participant in participants {
        let stage = store
            .load(&participant)
            .await
            .with_context(|| format!("failed to load profile {participant}"))?
            .map_or("unknown", |profile| profile.stage.as_str());
        println!("{participant}\t{stage}");
    }
    Ok(())
}

/// Print a stored profile.
async fn handle_profile(paths: &RuntimePaths, participant: &str) -> anyhow::Result<()> {
    pogovorim::logging::init_cli();
    let config = load_config(&paths.config_toml)?;
    let store = open_store(&config, paths).await?;

    let profile = store
        .load(participant)
        .await
        .with_context(|| format!("failed to load profile {participant}"))?
        .ok_or_else(|| anyhow::anyhow!("no profile stored for {participant}"))?;

    println!("{}", serde_json::to_string_pretty(&profile)?);
    Ok(())
}

/// Reset a stored profile.
async fn handle_reset(paths: &RuntimePaths, participant: &str) -> anyhow::Result<()> {
    pogovorim::logging::init_cli();
    let config = load_config(&paths.config_toml)?;
    let repository = ProfileRepository::new(open_store(&config, paths).await?);

    let mut lease = repository
        .checkout(participant)
        .await
        .with_context(|| format!("failed to load profile {participant}"))?;
    lease.profile_mut().reset();
    lease
        .commit()
        .await
        .with_context(|| format!("failed to save profile {participant}"))?;

    println!("profile {participant} reset");
    Ok(())
}

/// Open the configured profile store.
async fn open_store(config: &Config, paths: &RuntimePaths) -> anyhow::Result<Arc<dyn ProfileStore>> {
    let path = config.storage.resolve_path(paths);
    let store: Arc<dyn ProfileStore> = match config.storage.backend {
        StorageBackend::Json => Arc::new(open_json(&path).await?),
        StorageBackend::Sqlite => Arc::new(
            SqliteStore::open(&path)
                .await
                .with_context(|| format!("failed to open {}", path.display()))?,
        ),
        StorageBackend::Memory => Arc::new(MemoryStore::default()),
    };
    info!(backend = ?config.storage.backend, path = %path.display(), "profile store opened");
    Ok(store)
}

async fn open_json(path: &Path) -> anyhow::Result<JsonFileStore> {
    JsonFileStore::open(path)
        .await
        .with_context(|| format!("failed to open {}", path.display()))
}
