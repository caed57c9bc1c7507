pub mod api;
pub mod cli;
pub mod config;
pub mod db;
pub mod history;
pub mod llm;
pub mod models;
pub mod prompts;
pub mod stats;
pub mod store;
pub mod suggestion;

#[cfg(test)]
mod test_utils;

use std::error::Error;

use tracing_subscriber::EnvFilter;

use cli::Cli;
use config::AppConfig;

/// Install the fmt subscriber, honouring `RUST_LOG` (default `info`)
pub fn init_tracing() {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
  tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}

pub async fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
  // Load environment variables from .env file
  dotenvy::dotenv().ok();

  let config = AppConfig::from_env()?;
  cli::execute(cli.command, config).await
}
