use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::fs;
use std::path::Path;
use tracing::info;

pub type DbPool = SqlitePool;

/// Open (creating if needed) the workout database at `path` and run migrations
pub async fn initialize_db(path: &Path) -> Result<DbPool, Box<dyn std::error::Error>> {
  if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
    fs::create_dir_all(parent)?;
  }

  info!("Initializing database at: {}", path.display());

  let options = SqliteConnectOptions::new()
    .filename(path)
    .create_if_missing(true);

  let pool = SqlitePoolOptions::new()
    .max_connections(5)
    .connect_with(options)
    .await?;

  sqlx::migrate!("./migrations").run(&pool).await?;

  info!("Database initialized successfully");

  Ok(pool)
}
