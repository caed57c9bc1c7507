//! Suggestion generation
//!
//! recent history -> formatted block -> goal template -> model call -> text
//!
//! `try_generate*` report failures as a `GenerationError`. `generate*` never
//! fail: an error becomes an apologetic explanation returned as the
//! suggestion text, so the caller always has something to show.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local, NaiveDate};
use thiserror::Error;
use tracing::{info, warn};

use crate::history::format_history;
use crate::llm::{CompletionProvider, LlmError, ModelSettings};
use crate::models::Workout;
use crate::prompts::{self, GoalCategory, PromptError, PromptVars, SYSTEM_PROMPT};
use crate::store::WorkoutStore;

/// How many recent workouts are given to the model
pub const HISTORY_LIMIT: u32 = 5;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// ---------------------------------------------------------------------------
/// Error Types
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GenerationError {
  #[error("could not reach the model provider: {0}")]
  Network(String),

  #[error("model provider authentication failed: {0}")]
  Auth(String),

  #[error("model provider error: {0}")]
  Provider(String),

  #[error("model provider timed out: {0}")]
  Timeout(String),

  #[error("internal error: {0}")]
  Internal(String),
}

impl GenerationError {
  pub fn kind(&self) -> &'static str {
    match self {
      Self::Network(_) => "network",
      Self::Auth(_) => "auth",
      Self::Provider(_) => "provider",
      Self::Timeout(_) => "timeout",
      Self::Internal(_) => "internal",
    }
  }
}

impl From<LlmError> for GenerationError {
  fn from(e: LlmError) -> Self {
    match e {
      LlmError::MissingApiKey => Self::Auth(LlmError::MissingApiKey.to_string()),
      LlmError::Auth(msg) => Self::Auth(msg),
      LlmError::Request(msg) => Self::Network(msg),
      LlmError::Timeout(msg) => Self::Timeout(msg),
      LlmError::Api(msg) | LlmError::Parse(msg) => Self::Provider(msg),
    }
  }
}

impl From<PromptError> for GenerationError {
  fn from(e: PromptError) -> Self {
    Self::Internal(e.to_string())
  }
}

/// Text returned in place of a suggestion when generation fails
pub fn apology(err: &GenerationError) -> String {
  format!(
    "I apologize, but I encountered an error while generating your workout suggestion. \
     Please make sure your model provider API key is properly configured. Error: {}",
    err
  )
}

/// ---------------------------------------------------------------------------
/// Generator
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Suggestion {
  /// The model's plan, or the apology text when generation failed
  pub text: String,
  pub fitness_goal: String,
  pub category: GoalCategory,
  /// Number of workouts included in the prompt
  pub history_count: usize,
  pub generated_at: DateTime<Local>,
  pub failure: Option<GenerationError>,
}

pub struct SuggestionGenerator {
  store: WorkoutStore,
  provider: Arc<dyn CompletionProvider>,
  settings: ModelSettings,
  timeout: Duration,
}

impl SuggestionGenerator {
  pub fn new(
    store: WorkoutStore,
    provider: Arc<dyn CompletionProvider>,
    settings: ModelSettings,
    timeout: Duration,
  ) -> Self {
    Self {
      store,
      provider,
      settings,
      timeout,
    }
  }

  /// Suggest a workout for `fitness_goal` from the most recent stored history
  pub async fn generate(&self, fitness_goal: &str) -> Suggestion {
    let history = self.store.recent(HISTORY_LIMIT).await;
    self.generate_with_history(fitness_goal, &history).await
  }

  /// Same as `generate`, with caller-supplied history instead of the store's
  pub async fn generate_with_history(&self, fitness_goal: &str, workouts: &[Workout]) -> Suggestion {
    match self.try_generate_with_history(fitness_goal, workouts).await {
      Ok(suggestion) => suggestion,
      Err(e) => {
        warn!(kind = e.kind(), "Error generating workout suggestion: {}", e);
        Suggestion {
          text: apology(&e),
          fitness_goal: fitness_goal.to_string(),
          category: prompts::categorize(fitness_goal),
          history_count: workouts.len(),
          generated_at: Local::now(),
          failure: Some(e),
        }
      }
    }
  }

  pub async fn try_generate(&self, fitness_goal: &str) -> Result<Suggestion, GenerationError> {
    let history = self.store.recent(HISTORY_LIMIT).await;
    self.try_generate_with_history(fitness_goal, &history).await
  }

  pub async fn try_generate_with_history(
    &self,
    fitness_goal: &str,
    workouts: &[Workout],
  ) -> Result<Suggestion, GenerationError> {
    let today = Local::now().date_naive();
    let (category, prompt) = build_prompt(fitness_goal, workouts, today)?;

    info!(
      provider = self.provider.name(),
      model = %self.settings.model,
      %category,
      history = workouts.len(),
      "Requesting workout suggestion"
    );

    let text = tokio::time::timeout(self.timeout, self.provider.complete(&prompt, &self.settings))
      .await
      .map_err(|_| GenerationError::Timeout(format!("no response after {:?}", self.timeout)))??;

    Ok(Suggestion {
      text,
      fitness_goal: fitness_goal.to_string(),
      category,
      history_count: workouts.len(),
      generated_at: Local::now(),
      failure: None,
    })
  }
}

/// Render the full prompt for a goal and history as of `today`
pub fn build_prompt(
  fitness_goal: &str,
  workouts: &[Workout],
  today: NaiveDate,
) -> Result<(GoalCategory, String), PromptError> {
  let template = prompts::select(fitness_goal);
  let workout_history = format_history(workouts);
  let current_date = today.to_string();

  let prompt = template.render(&PromptVars {
    system_prompt: SYSTEM_PROMPT,
    workout_history: &workout_history,
    fitness_goal,
    current_date: &current_date,
  })?;

  Ok((template.category, prompt))
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
