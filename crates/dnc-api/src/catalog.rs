//! Handlers backed by the course catalog and the LLM.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/catalog/search` | Body: [`CourseQuery`] |
//! | `GET`  | `/catalog/courses/{urn}` | 404 if the catalog does not know the URN |
//! | `POST` | `/catalog/rank` | Body: `{"plan_id":1,"courses":[...]}` |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
};
use dnc_core::{
  course::{CatalogCourse, CatalogSearch, CourseQuery, CourseRecommendation},
  plan::PlanDigest,
  service::{CourseCatalog, Synthesizer},
  store::PlanStore,
};
use serde::Deserialize;

use crate::{Services, error::ApiError};

/// `POST /catalog/search`
pub async fn search<S, L, C>(
  State(services): State<Arc<Services<S, L, C>>>,
  Json(query): Json<CourseQuery>,
) -> Result<Json<CatalogSearch>, ApiError>
where
  S: PlanStore,
  L: Synthesizer,
  C: CourseCatalog,
{
  query.validate()?;
  let result = services.catalog.search(&query).await.map_err(ApiError::upstream)?;
  Ok(Json(result))
}

/// `GET /catalog/courses/{urn}`
pub async fn lookup<S, L, C>(
  State(services): State<Arc<Services<S, L, C>>>,
  Path(urn): Path<String>,
) -> Result<Json<CatalogCourse>, ApiError>
where
  S: PlanStore,
  L: Synthesizer,
  C: CourseCatalog,
{
  let course = services
    .catalog
    .lookup(&urn)
    .await
    .map_err(ApiError::upstream)?
    .ok_or_else(|| ApiError::NotFound(format!("course {urn} not found")))?;
  Ok(Json(course))
}

#[derive(Debug, Deserialize)]
pub struct RankBody {
  pub plan_id: i64,
  pub courses: Vec<CatalogCourse>,
}

/// `POST /catalog/rank`
pub async fn rank<S, L, C>(
  State(services): State<Arc<Services<S, L, C>>>,
  Json(body): Json<RankBody>,
) -> Result<Json<Vec<CourseRecommendation>>, ApiError>
where
  S: PlanStore,
  L: Synthesizer,
  C: CourseCatalog,
{
  let entry = services
    .store
    .get_plan_entry(body.plan_id)
    .await
    .map_err(ApiError::store)?
    .ok_or(dnc_core::Error::PlanEntryNotFound(body.plan_id))?;
  let activity = PlanDigest::from(&entry);
  let ranked = services
    .synthesizer
    .rank_courses(&activity, &body.courses)
    .await
    .map_err(ApiError::upstream)?;
  Ok(Json(ranked))
}
