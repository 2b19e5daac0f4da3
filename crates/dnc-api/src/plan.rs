//! Handlers for the training matrix.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/plan` | Filters: see [`PlanParams`] |
//! | `POST`   | `/plan` | Body: [`NewPlanEntry`]; every field required |
//! | `GET`    | `/plan/{id}` | 404 if not found |
//! | `PUT`    | `/plan/{id}` | Body: [`NewPlanEntry`] |
//! | `DELETE` | `/plan/{id}` | Also drops the course link and validation flag |
//! | `PUT`    | `/plan/{id}/validation` | Body: `{"validated":true}` |
//! | `PUT`    | `/plan/{id}/course` | Body: `{"title":"..."}`; `null` clears |
//! | `POST`   | `/plan/{id}/course` | Body: [`CourseRef`] |
//! | `GET`    | `/catalog/candidates` | Virtual, externally sourced entries |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use dnc_core::{
  course::{CourseRef, LinkedInCourse},
  lookup::NAME_SEPARATOR,
  plan::{Association, NewPlanEntry, PlanEntry, PlanFilter},
  store::PlanStore,
};
use serde::Deserialize;

use crate::error::ApiError;

// ─── Filter ───────────────────────────────────────────────────────────────────

/// Query parameters for `GET /plan` and `GET /metrics/plan`.
///
/// Dimension filters are comma-separated option names.
#[derive(Debug, Deserialize, Default)]
pub struct PlanParams {
  pub origin:      Option<String>,
  pub gerencia:    Option<String>,
  pub subgerencia: Option<String>,
  pub area:        Option<String>,
  pub desafio:     Option<String>,
  pub audiencia:   Option<String>,
  pub modalidad:   Option<String>,
  pub fuente:      Option<String>,
  pub prioridad:   Option<String>,
  /// `with` or `without` a linked course.
  pub association: Option<Association>,
  pub validated:   Option<bool>,
}

fn names(list: Option<String>) -> Vec<String> {
  list
    .map(|s| {
      s.split(NAME_SEPARATOR)
        .map(|t| t.trim().to_owned())
        .filter(|t| !t.is_empty())
        .collect()
    })
    .unwrap_or_default()
}

impl From<PlanParams> for PlanFilter {
  fn from(p: PlanParams) -> Self {
    PlanFilter {
      origin:       p.origin.filter(|o| !o.trim().is_empty()),
      gerencias:    names(p.gerencia),
      subgerencias: names(p.subgerencia),
      areas:        names(p.area),
      desafios:     names(p.desafio),
      audiencias:   names(p.audiencia),
      modalidades:  names(p.modalidad),
      fuentes:      names(p.fuente),
      prioridades:  names(p.prioridad),
      association:  p.association,
      validated:    p.validated,
    }
  }
}

// ─── List / create ────────────────────────────────────────────────────────────

/// `GET /plan[?origin=...][&gerencia=a,b][&association=with][&validated=false]...`
pub async fn list<S: PlanStore>(
  State(store): State<Arc<S>>,
  Query(params): Query<PlanParams>,
) -> Result<Json<Vec<PlanEntry>>, ApiError> {
  let filter = PlanFilter::from(params);
  let entries = store.list_plan(&filter).await.map_err(ApiError::store)?;
  Ok(Json(entries))
}

/// `POST /plan`
pub async fn create<S: PlanStore>(
  State(store): State<Arc<S>>,
  Json(body): Json<NewPlanEntry>,
) -> Result<impl IntoResponse, ApiError> {
  body.validate()?;
  let entry = store.insert_plan_entry(body).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(entry)))
}

// ─── Single entry ─────────────────────────────────────────────────────────────

/// `GET /plan/{id}`
pub async fn get_one<S: PlanStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
) -> Result<Json<PlanEntry>, ApiError> {
  let entry = store
    .get_plan_entry(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("plan entry {id} not found")))?;
  Ok(Json(entry))
}

/// `PUT /plan/{id}`
pub async fn update<S: PlanStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
  Json(body): Json<NewPlanEntry>,
) -> Result<Json<PlanEntry>, ApiError> {
  body.validate()?;
  let entry = store.update_plan_entry(id, body).await.map_err(ApiError::store)?;
  Ok(Json(entry))
}

/// `DELETE /plan/{id}`
pub async fn delete<S: PlanStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
  store.delete_plan_entry(id).await.map_err(ApiError::store)?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Validation ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ValidationBody {
  pub validated: bool,
}

/// `PUT /plan/{id}/validation`
pub async fn set_validation<S: PlanStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
  Json(body): Json<ValidationBody>,
) -> Result<StatusCode, ApiError> {
  store
    .set_validation(id, body.validated)
    .await
    .map_err(ApiError::store)?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Course ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CourseTitleBody {
  #[serde(default)]
  pub title: Option<String>,
}

/// `PUT /plan/{id}/course` selects a stored course by title.
pub async fn set_course<S: PlanStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
  Json(body): Json<CourseTitleBody>,
) -> Result<Json<Option<LinkedInCourse>>, ApiError> {
  let course = store
    .set_plan_course_by_title(id, body.title)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(course))
}

/// `POST /plan/{id}/course` links a catalog course, replacing any other.
pub async fn associate_course<S: PlanStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
  Json(body): Json<CourseRef>,
) -> Result<Json<LinkedInCourse>, ApiError> {
  body.validate()?;
  let course = store.associate_course(id, body).await.map_err(ApiError::store)?;
  Ok(Json(course))
}

/// `GET /catalog/candidates`
pub async fn candidates<S: PlanStore>(State(store): State<Arc<S>>) -> Result<Json<Vec<PlanEntry>>, ApiError> {
  let entries = store.catalog_candidates().await.map_err(ApiError::store)?;
  Ok(Json(entries))
}
