//! Handlers for stored LinkedIn courses.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/courses` | Each course with the activities it is linked to |
//! | `POST` | `/courses` | Body: `{"course":{...},"plan_ids":[1,2]}`; all or nothing |

use std::sync::Arc;

use axum::{Json, extract::State};
use dnc_core::{
  course::{CourseRef, CourseSummary, LinkedInCourse},
  store::PlanStore,
};
use serde::Deserialize;

use crate::error::ApiError;

/// `GET /courses`
pub async fn list<S: PlanStore>(State(store): State<Arc<S>>) -> Result<Json<Vec<CourseSummary>>, ApiError> {
  let courses = store.list_courses().await.map_err(ApiError::store)?;
  Ok(Json(courses))
}

#[derive(Debug, Deserialize)]
pub struct AssociateBody {
  pub course:   CourseRef,
  pub plan_ids: Vec<i64>,
}

/// `POST /courses`
pub async fn associate<S: PlanStore>(
  State(store): State<Arc<S>>,
  Json(body): Json<AssociateBody>,
) -> Result<Json<LinkedInCourse>, ApiError> {
  body.course.validate()?;
  if body.plan_ids.is_empty() {
    return Err(ApiError::BadRequest("plan_ids must not be empty".into()));
  }
  let course = store
    .associate_course_many(body.course, body.plan_ids)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(course))
}
