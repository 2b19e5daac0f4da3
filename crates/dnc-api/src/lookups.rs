//! Handlers for the lookup vocabulary.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/lookups` | `{kind: {name: id}}` for every kind |
//! | `GET`    | `/lookups/{kind}` | Options ordered by name |
//! | `POST`   | `/lookups/{kind}` | Body: `{"name":"..."}`; 409 on duplicates |
//! | `PUT`    | `/lookups/{kind}` | Body: `{"old":"...","new":"..."}` |
//! | `DELETE` | `/lookups/{kind}/{name}` | 409 while referenced |
//! | `POST`   | `/admin/seed` | Insert missing built-in options |

use std::{collections::BTreeMap, sync::Arc};

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use dnc_core::{
  lookup::{LookupKind, LookupOption, OptionMap},
  store::PlanStore,
};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator as _;

use crate::error::ApiError;

// ─── Vocabulary ───────────────────────────────────────────────────────────────

/// `GET /lookups`
pub async fn vocabulary<S: PlanStore>(
  State(store): State<Arc<S>>,
) -> Result<Json<BTreeMap<&'static str, OptionMap>>, ApiError> {
  let mut out = BTreeMap::new();
  for kind in LookupKind::iter() {
    let map = store.option_map(kind).await.map_err(ApiError::store)?;
    out.insert(kind.into(), map);
  }
  Ok(Json(out))
}

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /lookups/{kind}`
pub async fn list<S: PlanStore>(
  State(store): State<Arc<S>>,
  Path(kind): Path<String>,
) -> Result<Json<Vec<LookupOption>>, ApiError> {
  let kind = LookupKind::parse(&kind)?;
  let options = store.list_options(kind).await.map_err(ApiError::store)?;
  Ok(Json(options))
}

// ─── Add ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AddBody {
  pub name: String,
}

/// `POST /lookups/{kind}`
pub async fn add<S: PlanStore>(
  State(store): State<Arc<S>>,
  Path(kind): Path<String>,
  Json(body): Json<AddBody>,
) -> Result<impl IntoResponse, ApiError> {
  let kind = LookupKind::parse(&kind)?;
  let option = store.add_option(kind, body.name).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(option)))
}

// ─── Rename ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RenameBody {
  pub old: String,
  pub new: String,
}

/// `PUT /lookups/{kind}`
pub async fn rename<S: PlanStore>(
  State(store): State<Arc<S>>,
  Path(kind): Path<String>,
  Json(body): Json<RenameBody>,
) -> Result<Json<LookupOption>, ApiError> {
  let kind = LookupKind::parse(&kind)?;
  let option = store
    .rename_option(kind, body.old, body.new)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(option))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /lookups/{kind}/{name}`
pub async fn delete<S: PlanStore>(
  State(store): State<Arc<S>>,
  Path((kind, name)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
  let kind = LookupKind::parse(&kind)?;
  store.delete_option(kind, name).await.map_err(ApiError::store)?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Seed ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct SeedReport {
  pub added: usize,
}

/// `POST /admin/seed`
pub async fn seed<S: PlanStore>(State(store): State<Arc<S>>) -> Result<Json<SeedReport>, ApiError> {
  let added = store.seed_defaults().await.map_err(ApiError::store)?;
  Ok(Json(SeedReport { added }))
}
