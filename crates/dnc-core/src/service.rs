//! Traits for the two external services: the LLM used for synthesis and
//! re-ranking, and the LinkedIn Learning catalog.

use std::future::Future;

use crate::{
  DomainError,
  course::{CatalogCourse, CatalogSearch, CourseQuery, CourseRecommendation},
  plan::{ActivityContent, NeedDigest, PlanDigest},
};

/// Turns survey needs into proposed training activities.
pub trait Synthesizer: Send + Sync {
  type Error: std::error::Error + DomainError + Send + Sync + 'static;

  /// Propose activities for `needs`, given the current `plan` as context.
  ///
  /// One request, no retry. An empty result is valid.
  fn synthesize<'a>(
    &'a self,
    needs: &'a [NeedDigest],
    plan: &'a [PlanDigest],
  ) -> impl Future<Output = Result<Vec<ActivityContent>, Self::Error>> + Send + 'a;

  /// Order `candidates` by relevance to `activity`. Courses the model invents
  /// are dropped.
  fn rank_courses<'a>(
    &'a self,
    activity: &'a PlanDigest,
    candidates: &'a [CatalogCourse],
  ) -> impl Future<Output = Result<Vec<CourseRecommendation>, Self::Error>> + Send + 'a;
}

/// Read access to an external course catalog.
pub trait CourseCatalog: Send + Sync {
  type Error: std::error::Error + DomainError + Send + Sync + 'static;

  fn search<'a>(
    &'a self,
    query: &'a CourseQuery,
  ) -> impl Future<Output = Result<CatalogSearch, Self::Error>> + Send + 'a;

  /// Fetch one asset by URN. `None` if the catalog does not know it.
  fn lookup<'a>(
    &'a self,
    urn: &'a str,
  ) -> impl Future<Output = Result<Option<CatalogCourse>, Self::Error>> + Send + 'a;
}
