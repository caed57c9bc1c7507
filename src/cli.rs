use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use tracing::info;

use crate::api::{self, AppState};
use crate::config::AppConfig;
use crate::db::initialize_db;
use crate::history::format_history;
use crate::llm::build_provider;
use crate::store::WorkoutStore;
use crate::suggestion::{SuggestionGenerator, HISTORY_LIMIT};

#[derive(Debug, Parser)]
#[command(name = "workout-tracker", version, about = "Workout log with model-generated training suggestions", long_about = None)]
pub struct Cli {
  /// Defaults to `serve`
  #[command(subcommand)]
  pub command: Option<Commands>,
}

#[derive(Debug, Subcommand, PartialEq)]
pub enum Commands {
  /// Start the HTTP API and frontend server
  Serve(ServeArgs),

  /// Print a workout suggestion for a fitness goal using the stored history
  Suggest {
    /// e.g. "build strength" or "run a faster 5k"
    goal: String,
  },

  /// Print the most recent workouts
  Recent {
    #[arg(short, long, default_value_t = HISTORY_LIMIT)]
    limit: u32,
  },

  /// Check that the model provider key is set and the database opens
  Check,
}

#[derive(Debug, Default, Args, PartialEq)]
pub struct ServeArgs {
  /// Override WORKOUT_TRACKER_HOST
  #[arg(long)]
  pub host: Option<String>,

  /// Override WORKOUT_TRACKER_PORT
  #[arg(short, long)]
  pub port: Option<u16>,

  /// Override WORKOUT_TRACKER_DB
  #[arg(long)]
  pub db: Option<PathBuf>,
}

impl ServeArgs {
  pub fn apply(self, config: &mut AppConfig) {
    if let Some(host) = self.host {
      config.server.host = host;
    }
    if let Some(port) = self.port {
      config.server.port = port;
    }
    if let Some(db) = self.db {
      config.database_path = db;
    }
  }
}

/// Run a parsed command against the loaded configuration
pub async fn execute(command: Option<Commands>, mut config: AppConfig) -> Result<(), Box<dyn Error>> {
  match command.unwrap_or_else(|| Commands::Serve(ServeArgs::default())) {
    Commands::Serve(args) => {
      args.apply(&mut config);
      serve(&config).await
    }
    Commands::Suggest { goal } => suggest(&config, &goal).await,
    Commands::Recent { limit } => recent(&config, limit).await,
    Commands::Check => check(&config).await,
  }
}

/// ---------------------------------------------------------------------------
/// Commands
/// ---------------------------------------------------------------------------

async fn serve(config: &AppConfig) -> Result<(), Box<dyn Error>> {
  let store = open_store(config).await?;
  let generator = build_generator(config, store.clone())?;

  if config.llm.api_key.is_none() {
    tracing::warn!(
      "{} is not set; suggestions will return an error message until it is",
      config.llm.provider.api_key_var()
    );
  }

  let state = AppState::new(store, generator, config.server.frontend_dir.clone());
  api::start_server(&config.server.host, config.server.port, Arc::new(state)).await
}

async fn suggest(config: &AppConfig, goal: &str) -> Result<(), Box<dyn Error>> {
  let store = open_store(config).await?;
  let generator = build_generator(config, store)?;

  let suggestion = generator.try_generate(goal).await?;
  println!("{}", suggestion.text);
  Ok(())
}

async fn recent(config: &AppConfig, limit: u32) -> Result<(), Box<dyn Error>> {
  let store = open_store(config).await?;
  let workouts = store.try_recent(limit).await?;
  println!("{}", format_history(&workouts));
  Ok(())
}

async fn check(config: &AppConfig) -> Result<(), Box<dyn Error>> {
  let mut ok = true;
  let key_var = config.llm.provider.api_key_var();

  println!("Provider: {} (model {})", config.llm.provider, config.llm.settings.model);

  if config.llm.api_key.is_some() {
    println!("[ok]      {} is set", key_var);
  } else {
    println!("[missing] {} is not set", key_var);
    ok = false;
  }

  match initialize_db(&config.database_path).await {
    Ok(pool) => {
      println!("[ok]      database ready at {}", config.database_path.display());
      pool.close().await;
    }
    Err(e) => {
      println!("[error]   database at {}: {}", config.database_path.display(), e);
      ok = false;
    }
  }

  if ok {
    Ok(())
  } else {
    Err("environment check failed".into())
  }
}

/// ---------------------------------------------------------------------------
/// Wiring
/// ---------------------------------------------------------------------------

async fn open_store(config: &AppConfig) -> Result<WorkoutStore, Box<dyn Error>> {
  let pool = initialize_db(&config.database_path).await?;
  Ok(WorkoutStore::new(pool))
}

/// Build the generator for the configured provider
pub fn build_generator(config: &AppConfig, store: WorkoutStore) -> Result<SuggestionGenerator, Box<dyn Error>> {
  let llm = &config.llm;
  let provider = build_provider(llm.provider, llm.api_key.clone(), llm.api_base.clone(), llm.timeout)?;

  info!(provider = %llm.provider, model = %llm.settings.model, "Model provider configured");

  Ok(SuggestionGenerator::new(store, provider, llm.settings.clone(), llm.timeout))
}
