//! LLM integration for workout suggestions
//!
//! The model provider is a black-box text completion capability behind the
//! `CompletionProvider` trait. Two HTTP clients implement it: OpenAI chat
//! completions and the Anthropic messages API.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use url::Url;

/// ---------------------------------------------------------------------------
/// Configuration
/// ---------------------------------------------------------------------------

pub const OPENAI_API_BASE: &str = "https://api.openai.com/v1/";
pub const ANTHROPIC_API_BASE: &str = "https://api.anthropic.com/";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-sonnet-4-20250514";
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
  OpenAi,
  Anthropic,
}

impl ProviderKind {
  pub fn default_model(&self) -> &'static str {
    match self {
      Self::OpenAi => DEFAULT_OPENAI_MODEL,
      Self::Anthropic => DEFAULT_ANTHROPIC_MODEL,
    }
  }

  pub fn default_api_base(&self) -> &'static str {
    match self {
      Self::OpenAi => OPENAI_API_BASE,
      Self::Anthropic => ANTHROPIC_API_BASE,
    }
  }

  /// Environment variable holding this provider's credential
  pub fn api_key_var(&self) -> &'static str {
    match self {
      Self::OpenAi => "OPENAI_API_KEY",
      Self::Anthropic => "ANTHROPIC_API_KEY",
    }
  }
}

impl std::fmt::Display for ProviderKind {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::OpenAi => write!(f, "openai"),
      Self::Anthropic => write!(f, "anthropic"),
    }
  }
}

impl FromStr for ProviderKind {
  type Err = String;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_lowercase().as_str() {
      "openai" => Ok(Self::OpenAi),
      "anthropic" | "claude" => Ok(Self::Anthropic),
      other => Err(format!("Unknown LLM provider: {}", other)),
    }
  }
}

/// Fixed sampling parameters sent with every request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSettings {
  pub model: String,
  /// In `[0, 1]`
  pub temperature: f64,
}

impl ModelSettings {
  pub fn for_provider(kind: ProviderKind) -> Self {
    Self {
      model: kind.default_model().to_string(),
      temperature: DEFAULT_TEMPERATURE,
    }
  }
}

impl Default for ModelSettings {
  fn default() -> Self {
    Self::for_provider(ProviderKind::OpenAi)
  }
}

/// ---------------------------------------------------------------------------
/// Error Types
/// ---------------------------------------------------------------------------

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LlmError {
  #[error("API key not configured")]
  MissingApiKey,

  #[error("Authentication failed: {0}")]
  Auth(String),

  #[error("Request failed: {0}")]
  Request(String),

  #[error("Request timed out: {0}")]
  Timeout(String),

  #[error("API error: {0}")]
  Api(String),

  #[error("Parse error: {0}")]
  Parse(String),
}

impl From<reqwest::Error> for LlmError {
  fn from(e: reqwest::Error) -> Self {
    if e.is_timeout() {
      LlmError::Timeout(e.to_string())
    } else {
      LlmError::Request(e.to_string())
    }
  }
}

/// ---------------------------------------------------------------------------
/// Provider Trait
/// ---------------------------------------------------------------------------

#[async_trait]
pub trait CompletionProvider: Send + Sync {
  fn name(&self) -> &str;

  /// Send `prompt` as a single user message and return the model's text
  async fn complete(&self, prompt: &str, settings: &ModelSettings) -> Result<String, LlmError>;
}

/// Build the configured provider client
pub fn build_provider(
  kind: ProviderKind,
  api_key: Option<String>,
  api_base: Option<Url>,
  timeout: Duration,
) -> Result<Arc<dyn CompletionProvider>, LlmError> {
  let base = match api_base {
    Some(url) => url,
    None => Url::parse(kind.default_api_base()).map_err(|e| LlmError::Request(e.to_string()))?,
  };

  Ok(match kind {
    ProviderKind::OpenAi => Arc::new(OpenAiClient::new(api_key, base, timeout)?),
    ProviderKind::Anthropic => Arc::new(AnthropicClient::new(api_key, base, timeout)?),
  })
}

fn http_client(timeout: Duration) -> Result<Client, LlmError> {
  Client::builder()
    .timeout(timeout)
    .build()
    .map_err(|e| LlmError::Request(e.to_string()))
}

/// `Url::join` replaces the last path segment unless the base ends with '/'
fn endpoint(base: &Url, path: &str) -> Result<Url, LlmError> {
  let mut base = base.clone();
  if !base.path().ends_with('/') {
    let path_with_slash = format!("{}/", base.path());
    base.set_path(&path_with_slash);
  }
  base.join(path).map_err(|e| LlmError::Request(e.to_string()))
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
  error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
  message: String,
}

/// Turn a non-success response into the matching error
fn status_error(status: StatusCode, body: &str) -> LlmError {
  let message = serde_json::from_str::<ErrorResponse>(body)
    .map(|e| e.error.message)
    .unwrap_or_else(|_| body.to_string());

  if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
    LlmError::Auth(message)
  } else {
    LlmError::Api(format!("HTTP {}: {}", status, message))
  }
}

/// ---------------------------------------------------------------------------
/// OpenAI Chat Completions
/// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
  model: &'a str,
  temperature: f64,
  messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
  role: &'a str,
  content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
  choices: Vec<ChatChoice>,
  usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
  message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
  content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
  prompt_tokens: u32,
  completion_tokens: u32,
}

pub struct OpenAiClient {
  client: Client,
  api_key: Option<String>,
  base_url: Url,
}

impl OpenAiClient {
  pub fn new(api_key: Option<String>, base_url: Url, timeout: Duration) -> Result<Self, LlmError> {
    Ok(Self {
      client: http_client(timeout)?,
      api_key: api_key.filter(|k| !k.trim().is_empty()),
      base_url,
    })
  }
}

#[async_trait]
impl CompletionProvider for OpenAiClient {
  fn name(&self) -> &str {
    "openai"
  }

  async fn complete(&self, prompt: &str, settings: &ModelSettings) -> Result<String, LlmError> {
    let api_key = self.api_key.as_deref().ok_or(LlmError::MissingApiKey)?;

    let request = ChatRequest {
      model: &settings.model,
      temperature: settings.temperature,
      messages: vec![ChatMessage {
        role: "user",
        content: prompt,
      }],
    };

    let response = self
      .client
      .post(endpoint(&self.base_url, "chat/completions")?)
      .bearer_auth(api_key)
      .json(&request)
      .send()
      .await?;

    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
      return Err(status_error(status, &body));
    }

    let chat: ChatResponse = serde_json::from_str(&body).map_err(|e| LlmError::Parse(e.to_string()))?;

    if let Some(usage) = &chat.usage {
      debug!(
        input_tokens = usage.prompt_tokens,
        output_tokens = usage.completion_tokens,
        "OpenAI completion usage"
      );
    }

    chat
      .choices
      .into_iter()
      .next()
      .and_then(|c| c.message.content)
      .ok_or_else(|| LlmError::Parse("No text content in response".to_string()))
  }
}

/// ---------------------------------------------------------------------------
/// Anthropic Messages
/// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ClaudeRequest<'a> {
  model: &'a str,
  max_tokens: u32,
  temperature: f64,
  messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Deserialize)]
struct ClaudeResponse {
  content: Vec<ContentBlock>,
  usage: Option<ClaudeUsage>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
  #[serde(rename = "type")]
  content_type: String,
  text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ClaudeUsage {
  input_tokens: u32,
  output_tokens: u32,
}

pub struct AnthropicClient {
  client: Client,
  api_key: Option<String>,
  base_url: Url,
}

impl AnthropicClient {
  pub fn new(api_key: Option<String>, base_url: Url, timeout: Duration) -> Result<Self, LlmError> {
    Ok(Self {
      client: http_client(timeout)?,
      api_key: api_key.filter(|k| !k.trim().is_empty()),
      base_url,
    })
  }
}

#[async_trait]
impl CompletionProvider for AnthropicClient {
  fn name(&self) -> &str {
    "anthropic"
  }

  async fn complete(&self, prompt: &str, settings: &ModelSettings) -> Result<String, LlmError> {
    let api_key = self.api_key.as_deref().ok_or(LlmError::MissingApiKey)?;

    let request = ClaudeRequest {
      model: &settings.model,
      max_tokens: MAX_TOKENS,
      temperature: settings.temperature,
      messages: vec![ChatMessage {
        role: "user",
        content: prompt,
      }],
    };

    let response = self
      .client
      .post(endpoint(&self.base_url, "v1/messages")?)
      .header("x-api-key", api_key)
      .header("anthropic-version", ANTHROPIC_VERSION)
      .json(&request)
      .send()
      .await?;

    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
      return Err(status_error(status, &body));
    }

    let claude: ClaudeResponse = serde_json::from_str(&body).map_err(|e| LlmError::Parse(e.to_string()))?;

    if let Some(usage) = &claude.usage {
      debug!(
        input_tokens = usage.input_tokens,
        output_tokens = usage.output_tokens,
        "Anthropic completion usage"
      );
    }

    // Extract text from the first text content block
    claude
      .content
      .into_iter()
      .find(|c| c.content_type == "text")
      .and_then(|c| c.text)
      .ok_or_else(|| LlmError::Parse("No text content in response".to_string()))
  }
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
