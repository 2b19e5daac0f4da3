//! JSON REST API for the DNC training-plan service.
//!
//! Exposes an axum [`Router`] backed by any [`PlanStore`], [`Synthesizer`] and
//! [`CourseCatalog`]. Auth, TLS, and transport concerns are the caller's
//! responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let services = Arc::new(Services::new(store, llm, linkedin));
//! .nest("/api", dnc_api::api_router(services))
//! ```

pub mod catalog;
pub mod courses;
pub mod error;
pub mod intake;
pub mod lookups;
pub mod metrics;
pub mod plan;
pub mod submissions;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post, put},
};
use dnc_core::{
  intake::DEFAULT_MAX_NEEDS,
  service::{CourseCatalog, Synthesizer},
  store::PlanStore,
};

pub use error::ApiError;

/// Everything the submission and catalog handlers need.
pub struct Services<S, L, C> {
  pub store:                    Arc<S>,
  pub synthesizer:              L,
  pub catalog:                  C,
  pub max_needs_per_respondent: u32,
}

impl<S, L, C> Services<S, L, C> {
  pub fn new(store: Arc<S>, synthesizer: L, catalog: C) -> Self {
    Self { store, synthesizer, catalog, max_needs_per_respondent: DEFAULT_MAX_NEEDS }
  }

  pub fn with_max_needs(mut self, limit: u32) -> Self {
    self.max_needs_per_respondent = limit;
    self
  }
}

/// Routes that only touch the store.
pub fn store_router<S>(store: Arc<S>) -> Router<()>
where
  S: PlanStore + 'static,
{
  Router::new()
    // Lookups
    .route("/lookups", get(lookups::vocabulary::<S>))
    .route(
      "/lookups/{kind}",
      get(lookups::list::<S>).post(lookups::add::<S>).put(lookups::rename::<S>),
    )
    .route("/lookups/{kind}/{name}", axum::routing::delete(lookups::delete::<S>))
    .route("/admin/seed", post(lookups::seed::<S>))
    // Intake
    .route(
      "/respondents",
      get(intake::list_respondents::<S>).post(intake::create_respondent::<S>),
    )
    .route("/needs", get(intake::list_needs::<S>))
    // Plan
    .route("/plan", get(plan::list::<S>).post(plan::create::<S>))
    .route(
      "/plan/{id}",
      get(plan::get_one::<S>).put(plan::update::<S>).delete(plan::delete::<S>),
    )
    .route("/plan/{id}/validation", put(plan::set_validation::<S>))
    .route(
      "/plan/{id}/course",
      put(plan::set_course::<S>).post(plan::associate_course::<S>),
    )
    .route("/catalog/candidates", get(plan::candidates::<S>))
    // Courses
    .route("/courses", get(courses::list::<S>).post(courses::associate::<S>))
    // Metrics
    .route("/metrics/summary", get(metrics::summary::<S>))
    .route("/metrics/plan", get(metrics::plan::<S>))
    .route("/metrics/breakdown/{kind}", get(metrics::breakdown::<S>))
    .route("/metrics/associations", get(metrics::associations::<S>))
    .route("/metrics/trend", get(metrics::trend::<S>))
    .with_state(store)
}

/// Build the full API router: the store routes plus submission, catalog
/// search and re-ranking.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S, L, C>(services: Arc<Services<S, L, C>>) -> Router<()>
where
  S: PlanStore + 'static,
  L: Synthesizer + 'static,
  C: CourseCatalog + 'static,
{
  let services_routes = Router::new()
    .route("/submissions", post(submissions::submit::<S, L, C>))
    .route("/catalog/search", post(catalog::search::<S, L, C>))
    .route("/catalog/courses/{urn}", get(catalog::lookup::<S, L, C>))
    .route("/catalog/rank", post(catalog::rank::<S, L, C>))
    .with_state(services.clone());

  store_router(services.store.clone()).merge(services_routes)
}
