//! Survey submission: record a need, then ask the LLM for plan entries.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/submissions` | Body: [`SubmissionBody`]; 201 even when synthesis fails |
//!
//! The respondent and need are stored in one transaction before synthesis
//! runs. A failed LLM call leaves the need in place and reports the
//! user-facing message in `synthesis_error`.

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use dnc_core::{
  intake::{NewNeed, RawNeed, Respondent, Submitter},
  lookup::ORIGIN_DNC,
  plan::{Classification, NewPlanEntry, PlanEntry},
  service::{CourseCatalog, Synthesizer},
  store::PlanStore,
};
use serde::{Deserialize, Serialize};

use crate::{Services, error::ApiError};

fn default_origin() -> String { ORIGIN_DNC.to_owned() }

#[derive(Debug, Deserialize)]
pub struct SubmissionBody {
  pub respondent:     Submitter,
  #[serde(default = "default_origin")]
  pub origin:         String,
  #[serde(flatten)]
  pub classification: Classification,
  pub cambios:        String,
  pub que_falta:      String,
  pub aprendizajes:   String,
  #[serde(default)]
  pub fuente_interna: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct Submission {
  pub respondent:      Respondent,
  pub need:            RawNeed,
  /// Plan entries created from the LLM's proposal.
  pub entries:         Vec<PlanEntry>,
  pub synthesis_error: Option<String>,
}

/// `POST /submissions`
pub async fn submit<S, L, C>(
  State(services): State<Arc<Services<S, L, C>>>,
  Json(body): Json<SubmissionBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: PlanStore,
  L: Synthesizer,
  C: CourseCatalog,
{
  let store = &services.store;
  let need = NewNeed {
    respondent_id:  0,
    origin:         body.origin,
    classification: body.classification,
    cambios:        body.cambios,
    que_falta:      body.que_falta,
    aprendizajes:   body.aprendizajes,
    fuente_interna: body.fuente_interna,
  };
  need.validate()?;

  let (respondent, need) = store
    .submit_need(body.respondent, need, services.max_needs_per_respondent)
    .await
    .map_err(ApiError::store)?;

  let snapshot = store.plan_snapshot().await.map_err(ApiError::store)?;
  let (entries, synthesis_error) = match services.synthesizer.synthesize(&[need.digest()], &snapshot).await {
    Ok(activities) => {
      let mut entries = Vec::with_capacity(activities.len());
      for content in activities {
        let input = NewPlanEntry {
          origin: need.origin.clone(),
          classification: need.classification.clone(),
          content,
          fuente_interna: need.fuente_interna.clone(),
        };
        entries.push(store.insert_plan_entry(input).await.map_err(ApiError::store)?);
      }
      tracing::info!(need = need.id, entries = entries.len(), "plan entries synthesised");
      (entries, None)
    }
    Err(e) => match ApiError::upstream(e) {
      ApiError::Upstream(message) => (Vec::new(), Some(message)),
      other => return Err(other),
    },
  };

  Ok((StatusCode::CREATED, Json(Submission { respondent, need, entries, synthesis_error })))
}
