//! Handlers for respondents and raw needs.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/respondents` | One row per respondent and unit, with need counts |
//! | `POST` | `/respondents` | Body: `{"name":"...","email":"..."}` |
//! | `GET`  | `/needs` | Newest first |

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use dnc_core::{
  intake::{NewRespondent, RawNeed, RespondentSummary},
  store::PlanStore,
};

use crate::error::ApiError;

/// `GET /respondents`
pub async fn list_respondents<S: PlanStore>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<RespondentSummary>>, ApiError> {
  let rows = store.list_respondents().await.map_err(ApiError::store)?;
  Ok(Json(rows))
}

/// `POST /respondents`
pub async fn create_respondent<S: PlanStore>(
  State(store): State<Arc<S>>,
  Json(body): Json<NewRespondent>,
) -> Result<impl IntoResponse, ApiError> {
  body.validate()?;
  let respondent = store.create_respondent(body).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(respondent)))
}

/// `GET /needs`
pub async fn list_needs<S: PlanStore>(State(store): State<Arc<S>>) -> Result<Json<Vec<RawNeed>>, ApiError> {
  let needs = store.list_needs().await.map_err(ApiError::store)?;
  Ok(Json(needs))
}
