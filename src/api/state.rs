use std::path::PathBuf;

use crate::store::WorkoutStore;
use crate::suggestion::SuggestionGenerator;

/// Shared state handed to every handler behind an `Arc`
pub struct AppState {
  pub store: WorkoutStore,
  pub generator: SuggestionGenerator,
  /// Directory holding index.html, styles.css and script.js
  pub frontend_dir: PathBuf,
}

impl AppState {
  pub fn new(store: WorkoutStore, generator: SuggestionGenerator, frontend_dir: impl Into<PathBuf>) -> Self {
    Self {
      store,
      generator,
      frontend_dir: frontend_dir.into(),
    }
  }
}
