//! HTTP server assembly for the DNC service.
//!
//! Mounts the [`dnc_api`] router under `/api` behind HTTP Basic auth, with
//! request tracing on every route.

pub mod auth;
pub mod error;

pub use error::Error;

use std::{path::PathBuf, sync::Arc};

use axum::{Router, middleware, routing::get};
use dnc_api::{Services, api_router};
use dnc_catalog::LinkedInConfig;
use dnc_core::{
  intake::DEFAULT_MAX_NEEDS,
  service::{CourseCatalog, Synthesizer},
  store::PlanStore,
};
use dnc_synthesis::LlmConfig;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use auth::{AuthConfig, require_auth};

// ─── Configuration ────────────────────────────────────────────────────────────

fn default_true() -> bool { true }
fn default_max_needs() -> u32 { DEFAULT_MAX_NEEDS }

/// Runtime server configuration, deserialised from `config.toml` and
/// `DNC_*` environment variables.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:                     String,
  pub port:                     u16,
  pub store_path:               PathBuf,
  pub auth_username:            String,
  pub auth_password_hash:       String,
  /// Insert missing built-in lookup options at startup.
  #[serde(default = "default_true")]
  pub seed_lookups:             bool,
  #[serde(default = "default_max_needs")]
  pub max_needs_per_respondent: u32,
  pub llm:                      LlmConfig,
  pub linkedin:                 LinkedInConfig,
}

impl ServerConfig {
  pub fn auth(&self) -> AuthConfig {
    AuthConfig {
      username:      self.auth_username.clone(),
      password_hash: self.auth_password_hash.clone(),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the server's [`Router`]: `/api/*` requires credentials, `/health`
/// does not.
pub fn router<S, L, C>(services: Arc<Services<S, L, C>>, auth: Arc<AuthConfig>) -> Router
where
  S: PlanStore + 'static,
  L: Synthesizer + 'static,
  C: CourseCatalog + 'static,
{
  let api = api_router(services).layer(middleware::from_fn_with_state(auth, require_auth));
  Router::new()
    .route("/health", get(|| async { "ok" }))
    .nest("/api", api)
    .layer(TraceLayer::new_for_http())
}
