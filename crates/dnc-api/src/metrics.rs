//! Reporting endpoints. Every handler accepts an optional `?origin=` filter.
//!
//! | Method | Path |
//! |--------|------|
//! | `GET`  | `/metrics/summary` |
//! | `GET`  | `/metrics/plan` (same filters as `GET /plan`) |
//! | `GET`  | `/metrics/breakdown/{kind}` |
//! | `GET`  | `/metrics/associations` |
//! | `GET`  | `/metrics/trend` |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
};
use dnc_core::{
  lookup::LookupKind,
  plan::PlanFilter,
  report::{AssociationUsage, CountRow, MonthlyTrend, PlanMetrics, SummaryMetrics},
  store::PlanStore,
};
use serde::Deserialize;

use crate::{error::ApiError, plan::PlanParams};

#[derive(Debug, Deserialize, Default)]
pub struct OriginParams {
  pub origin: Option<String>,
}

impl OriginParams {
  fn into_origin(self) -> Option<String> { self.origin.filter(|o| !o.trim().is_empty()) }
}

/// `GET /metrics/summary`
pub async fn summary<S: PlanStore>(
  State(store): State<Arc<S>>,
  Query(params): Query<OriginParams>,
) -> Result<Json<SummaryMetrics>, ApiError> {
  let metrics = store
    .summary_metrics(params.into_origin())
    .await
    .map_err(ApiError::store)?;
  Ok(Json(metrics))
}

/// `GET /metrics/plan`
pub async fn plan<S: PlanStore>(
  State(store): State<Arc<S>>,
  Query(params): Query<PlanParams>,
) -> Result<Json<PlanMetrics>, ApiError> {
  let filter = PlanFilter::from(params);
  let metrics = store.plan_metrics(&filter).await.map_err(ApiError::store)?;
  Ok(Json(metrics))
}

/// `GET /metrics/breakdown/{kind}`
pub async fn breakdown<S: PlanStore>(
  State(store): State<Arc<S>>,
  Path(kind): Path<String>,
  Query(params): Query<OriginParams>,
) -> Result<Json<Vec<CountRow>>, ApiError> {
  let kind = LookupKind::parse(&kind)?;
  let rows = store
    .breakdown(kind, params.into_origin())
    .await
    .map_err(ApiError::store)?;
  Ok(Json(rows))
}

/// `GET /metrics/associations`
pub async fn associations<S: PlanStore>(
  State(store): State<Arc<S>>,
  Query(params): Query<OriginParams>,
) -> Result<Json<AssociationUsage>, ApiError> {
  let usage = store
    .association_usage(params.into_origin())
    .await
    .map_err(ApiError::store)?;
  Ok(Json(usage))
}

/// `GET /metrics/trend`
pub async fn trend<S: PlanStore>(
  State(store): State<Arc<S>>,
  Query(params): Query<OriginParams>,
) -> Result<Json<Vec<MonthlyTrend>>, ApiError> {
  let rows = store
    .submission_trend(params.into_origin())
    .await
    .map_err(ApiError::store)?;
  Ok(Json(rows))
}
