//! Client-credentials access token with an in-memory cache.

use std::time::{Duration, Instant};

use tokio::sync::Mutex;

use crate::{Error, Result, wire};

/// Refresh this long before the reported expiry.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

struct Cached {
  value:      String,
  expires_at: Instant,
}

pub struct TokenSource {
  token_url:     String,
  client_id:     String,
  client_secret: String,
  cached:        Mutex<Option<Cached>>,
}

impl TokenSource {
  pub fn new(token_url: String, client_id: String, client_secret: String) -> Self {
    Self { token_url, client_id, client_secret, cached: Mutex::new(None) }
  }

  /// A valid bearer token, fetching a new one when the cache is empty or
  /// about to expire. Concurrent callers wait for a single fetch.
  pub async fn get(&self, http: &reqwest::Client) -> Result<String> {
    let mut cached = self.cached.lock().await;
    if let Some(c) = cached.as_ref().filter(|c| Instant::now() < c.expires_at) {
      return Ok(c.value.clone());
    }

    tracing::debug!("requesting linkedin access token");
    let resp = http
      .post(&self.token_url)
      .form(&[
        ("grant_type", "client_credentials"),
        ("client_id", self.client_id.as_str()),
        ("client_secret", self.client_secret.as_str()),
      ])
      .send()
      .await?;
    let status = resp.status();
    if !status.is_success() {
      let body = resp.text().await.unwrap_or_default();
      return Err(Error::Status { status: status.as_u16(), body });
    }
    let token: wire::Token = resp.json().await?;

    *cached = token.expires_in.map(|secs| Cached {
      value:      token.access_token.clone(),
      expires_at: Instant::now() + Duration::from_secs(secs).saturating_sub(EXPIRY_MARGIN),
    });
    Ok(token.access_token)
  }

  /// Drop the cached token, e.g. after the API rejected it.
  pub async fn invalidate(&self) { *self.cached.lock().await = None; }
}
