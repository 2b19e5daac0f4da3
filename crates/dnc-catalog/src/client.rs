//! The LinkedIn Learning implementation of [`CourseCatalog`].

use std::{sync::Arc, time::Duration};

use dnc_core::{
  course::{CatalogCourse, CatalogSearch, CourseQuery, validate_urn},
  service::CourseCatalog,
};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::{Error, Result, token::TokenSource, wire};

const ASSET_FIELDS: &str = "urn,title,details";

fn default_token_url() -> String { "https://www.linkedin.com/oauth/v2/accessToken".into() }
fn default_api_url() -> String { "https://api.linkedin.com/v2".into() }
fn default_page_size() -> u32 { 100 }
fn default_max_results() -> u32 { 1000 }
fn default_timeout_secs() -> u64 { 30 }

/// Credentials and endpoints (`[linkedin]` in the server config).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkedInConfig {
  pub client_id:     String,
  pub client_secret: String,
  #[serde(default = "default_token_url")]
  pub token_url:     String,
  #[serde(default = "default_api_url")]
  pub api_url:       String,
  /// `count` sent with every page request.
  #[serde(default = "default_page_size")]
  pub page_size:     u32,
  /// Stop paging once this many results have been fetched.
  #[serde(default = "default_max_results")]
  pub max_results:   u32,
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs:  u64,
}

impl LinkedInConfig {
  pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
    Self {
      client_id:     client_id.into(),
      client_secret: client_secret.into(),
      token_url:     default_token_url(),
      api_url:       default_api_url(),
      page_size:     default_page_size(),
      max_results:   default_max_results(),
      timeout_secs:  default_timeout_secs(),
    }
  }
}

/// Async client for the LinkedIn Learning API.
///
/// Cheap to clone; clones share the token cache.
#[derive(Clone)]
pub struct LinkedInClient {
  http:   reqwest::Client,
  token:  Arc<TokenSource>,
  api:    reqwest::Url,
  config: LinkedInConfig,
}

impl LinkedInClient {
  pub fn new(config: LinkedInConfig) -> Result<Self> {
    let http = reqwest::Client::builder()
      .timeout(Duration::from_secs(config.timeout_secs))
      .build()?;
    let api = reqwest::Url::parse(&config.api_url)
      .map_err(|e| Error::ApiUrl { url: config.api_url.clone(), reason: e.to_string() })?;
    if api.cannot_be_a_base() {
      return Err(Error::ApiUrl { url: config.api_url.clone(), reason: "not a base url".into() });
    }
    let token = TokenSource::new(
      config.token_url.clone(),
      config.client_id.clone(),
      config.client_secret.clone(),
    );
    Ok(Self { http, token: Arc::new(token), api, config })
  }

  /// `api_url` with `segments` appended, each percent-encoded as one path
  /// segment.
  pub(crate) fn url(&self, segments: &[&str]) -> reqwest::Url {
    let mut url = self.api.clone();
    if let Ok(mut path) = url.path_segments_mut() {
      path.pop_if_empty().extend(segments);
    }
    url
  }

  /// GET `url` with a bearer token. A 401 drops the cached token so the next
  /// call fetches a fresh one.
  async fn get(&self, url: reqwest::Url, params: &[(&str, String)]) -> Result<reqwest::Response> {
    let token = self.token.get(&self.http).await?;
    let resp = self
      .http
      .get(url)
      .bearer_auth(token)
      .query(params)
      .send()
      .await?;
    if resp.status() == StatusCode::UNAUTHORIZED {
      self.token.invalidate().await;
    }
    Ok(resp)
  }

  async fn fetch_page(&self, base: &[(&str, String)], start: u32) -> Result<wire::Page> {
    let mut params = base.to_vec();
    params.push(("start", start.to_string()));
    params.push(("count", self.config.page_size.to_string()));

    let resp = self.get(self.url(&["learningAssets"]), &params).await?;
    let status = resp.status();
    if !status.is_success() {
      let body = resp.text().await.unwrap_or_default();
      return Err(Error::Status { status: status.as_u16(), body });
    }
    Ok(resp.json().await?)
  }
}

/// Finder parameters shared by every page of one search.
fn criteria(query: &CourseQuery) -> Vec<(&'static str, String)> {
  let mut params = vec![
    ("q", "criteria".to_owned()),
    ("assetFilteringCriteria.keyword", query.keywords.trim().to_owned()),
    ("assetFilteringCriteria.assetTypes[0]", query.asset_type.code().to_owned()),
    ("fields", ASSET_FIELDS.to_owned()),
  ];
  if query.spanish_only {
    params.push(("assetFilteringCriteria.locales[0].language", "es".to_owned()));
  }
  if let Some(level) = query.difficulty {
    params.push(("assetFilteringCriteria.difficultyLevels[0]", level.code().to_owned()));
  }
  params
}

impl CourseCatalog for LinkedInClient {
  type Error = Error;

  async fn search(&self, query: &CourseQuery) -> Result<CatalogSearch> {
    query.validate()?;
    let base = criteria(query);
    let page_size = self.config.page_size.max(1);

    let first = self.fetch_page(&base, 0).await?;
    let total = first.paging.total;
    if total == 0 {
      return Ok(CatalogSearch::default());
    }

    let wanted = total.min(u64::from(self.config.max_results));
    let pages = wanted.div_ceil(u64::from(page_size)) as u32;
    tracing::debug!(keywords = %query.keywords, total, pages, "fetching catalog pages");

    let mut elements = first.elements;
    for page in 1..pages {
      let next = self.fetch_page(&base, page * page_size).await?;
      elements.extend(next.elements);
    }

    let mut courses: Vec<CatalogCourse> = elements.into_iter().filter_map(wire::Element::into_course).collect();
    courses.truncate(wanted as usize);
    tracing::info!(keywords = %query.keywords, total, fetched = courses.len(), "catalog search complete");
    Ok(CatalogSearch { total, courses })
  }

  async fn lookup(&self, urn: &str) -> Result<Option<CatalogCourse>> {
    let urn = urn.trim();
    validate_urn(urn)?;

    let params = [("fields", ASSET_FIELDS.to_owned()), ("expandDepth", "2".to_owned())];
    let resp = self.get(self.url(&["learningAssets", urn]), &params).await?;
    match resp.status() {
      StatusCode::NOT_FOUND => return Ok(None),
      StatusCode::FORBIDDEN => return Err(Error::AccessDenied(urn.to_owned())),
      s if !s.is_success() => {
        let body = resp.text().await.unwrap_or_default();
        return Err(Error::Status { status: s.as_u16(), body });
      }
      _ => {}
    }
    let element: wire::Element = resp.json().await?;
    Ok(element.into_course())
  }
}
