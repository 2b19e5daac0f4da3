//! HTTP client for the LLM endpoint.

use std::time::Duration;

use dnc_core::{
  Error as CoreError,
  course::{CatalogCourse, CourseRecommendation},
  plan::{ActivityContent, NeedDigest, PlanDigest},
  service::Synthesizer,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{Error, Result, contract, prompt};

fn default_model() -> String { "us.deepseek.r1-v1:0".into() }
fn default_synthesis_prompt() -> String { prompt::SYNTHESIS.into() }
fn default_ranking_prompt() -> String { prompt::RANKING.into() }
fn default_timeout_secs() -> u64 { 120 }
fn default_max_rank_candidates() -> usize { 30 }

/// Connection settings for the LLM endpoint (`[llm]` in the server config).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
  pub url:                 String,
  pub auth_token:          String,
  #[serde(default = "default_model")]
  pub model:               String,
  #[serde(default = "default_synthesis_prompt")]
  pub synthesis_prompt:    String,
  #[serde(default = "default_ranking_prompt")]
  pub ranking_prompt:      String,
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs:        u64,
  /// Upper bound on courses sent in one ranking request.
  #[serde(default = "default_max_rank_candidates")]
  pub max_rank_candidates: usize,
}

impl LlmConfig {
  pub fn new(url: impl Into<String>, auth_token: impl Into<String>) -> Self {
    Self {
      url:                 url.into(),
      auth_token:          auth_token.into(),
      model:               default_model(),
      synthesis_prompt:    default_synthesis_prompt(),
      ranking_prompt:      default_ranking_prompt(),
      timeout_secs:        default_timeout_secs(),
      max_rank_candidates: default_max_rank_candidates(),
    }
  }
}

/// The endpoint wraps the model's markdown in a JSON envelope.
#[derive(Deserialize)]
struct Reply {
  response: Option<String>,
}

/// Async client for the LLM endpoint.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct LlmClient {
  client: reqwest::Client,
  config: LlmConfig,
}

impl LlmClient {
  pub fn new(config: LlmConfig) -> Result<Self> {
    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(config.timeout_secs))
      .build()?;
    Ok(Self { client, config })
  }

  pub fn config(&self) -> &LlmConfig { &self.config }

  /// Send `prompt` followed by each attachment as one user turn and return the
  /// markdown answer. One attempt; failures surface to the caller.
  pub async fn ask(&self, prompt: &str, attachments: &[String]) -> Result<String> {
    let content: Vec<_> = std::iter::once(prompt)
      .chain(attachments.iter().map(String::as_str))
      .map(|text| json!({ "text": text }))
      .collect();
    let payload = json!({
      "model": self.config.model,
      "conversation": [{ "content": content, "role": "user" }],
    });

    tracing::debug!(model = %self.config.model, attachments = attachments.len(), "sending llm request");
    let resp = self
      .client
      .post(&self.config.url)
      .bearer_auth(&self.config.auth_token)
      .header(reqwest::header::ACCEPT, "application/json")
      .json(&payload)
      .send()
      .await?;

    let status = resp.status();
    if !status.is_success() {
      let body = resp.text().await.unwrap_or_default();
      tracing::warn!(%status, "llm endpoint returned an error");
      return Err(Error::Status { status: status.as_u16(), body });
    }

    let reply: Reply = resp.json().await?;
    reply.response.ok_or(Error::MissingResponse)
  }
}

impl Synthesizer for LlmClient {
  type Error = Error;

  async fn synthesize(&self, needs: &[NeedDigest], plan: &[PlanDigest]) -> Result<Vec<ActivityContent>> {
    let attachments = [serde_json::to_string_pretty(needs)?, serde_json::to_string_pretty(plan)?];
    let markdown = self.ask(&self.config.synthesis_prompt, &attachments).await?;
    let activities = contract::parse_activities(&markdown).inspect_err(|e| {
      tracing::warn!(error = %e, "llm reply violates the synthesis contract");
    })?;
    tracing::info!(needs = needs.len(), proposed = activities.len(), "synthesis complete");
    Ok(activities)
  }

  async fn rank_courses(
    &self,
    activity: &PlanDigest,
    candidates: &[CatalogCourse],
  ) -> Result<Vec<CourseRecommendation>> {
    let max = self.config.max_rank_candidates;
    if candidates.len() > max {
      return Err(CoreError::TooManyCandidates { given: candidates.len(), max }.into());
    }
    if candidates.is_empty() {
      return Ok(Vec::new());
    }
    let attachments = [serde_json::to_string_pretty(activity)?, serde_json::to_string_pretty(candidates)?];
    let markdown = self.ask(&self.config.ranking_prompt, &attachments).await?;
    contract::parse_ranking(&markdown, candidates)
  }
}
