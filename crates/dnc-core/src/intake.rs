//! Survey intake: respondents and the raw needs they submit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  plan::{Classification, NeedDigest},
};

/// Default cap on needs per respondent.
pub const DEFAULT_MAX_NEEDS: u32 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRespondent {
  pub name:  String,
  pub email: String,
}

impl NewRespondent {
  pub fn validate(&self) -> Result<()> {
    if self.name.trim().is_empty() {
      return Err(Error::EmptyField("name"));
    }
    if self.email.trim().is_empty() {
      return Err(Error::EmptyField("email"));
    }
    Ok(())
  }
}

/// Who is answering a survey: an existing respondent by id, or a new one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Submitter {
  Existing { id: i64 },
  New(NewRespondent),
}

/// The person who answered a survey.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Respondent {
  pub id:         i64,
  pub name:       String,
  pub email:      String,
  pub created_at: DateTime<Utc>,
}

/// One survey answer, as submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewNeed {
  pub respondent_id:  i64,
  pub origin:         String,
  #[serde(flatten)]
  pub classification: Classification,
  /// What changes are expected in the team.
  pub cambios:        String,
  /// What is missing today.
  pub que_falta:      String,
  /// Which learnings would close the gap.
  pub aprendizajes:   String,
  #[serde(default)]
  pub fuente_interna: Option<String>,
}

impl NewNeed {
  pub fn validate(&self) -> Result<()> {
    if self.origin.trim().is_empty() {
      return Err(Error::EmptyField("origin"));
    }
    self.classification.validate()?;
    for (name, value) in
      [("cambios", &self.cambios), ("que_falta", &self.que_falta), ("aprendizajes", &self.aprendizajes)]
    {
      if value.trim().is_empty() {
        return Err(Error::EmptyField(name));
      }
    }
    Ok(())
  }
}

/// A stored need with names resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawNeed {
  pub id:              i64,
  pub respondent_id:   i64,
  pub respondent_name: String,
  pub origin:          String,
  #[serde(flatten)]
  pub classification:  Classification,
  pub cambios:         String,
  pub que_falta:       String,
  pub aprendizajes:    String,
  pub fuente_interna:  Option<String>,
  pub created_at:      DateTime<Utc>,
}

impl RawNeed {
  pub fn digest(&self) -> NeedDigest {
    let c = &self.classification;
    NeedDigest {
      gerencia:     c.gerencia.clone(),
      subgerencia:  c.subgerencia.clone(),
      area:         c.area.clone(),
      desafio:      c.desafio.clone(),
      cambios:      self.cambios.clone(),
      que_falta:    self.que_falta.clone(),
      aprendizajes: self.aprendizajes.clone(),
      audiencia:    c.audiencia.clone(),
      modalidad:    c.modalidad.clone(),
      fuente:       c.fuente.clone(),
      prioridad:    c.prioridad.clone(),
    }
  }
}

/// One row of the respondents listing: a respondent together with the
/// organisational unit they answered for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RespondentSummary {
  pub id:          i64,
  pub name:        String,
  pub email:       String,
  pub gerencia:    Option<String>,
  pub subgerencia: Option<String>,
  pub area:        Option<String>,
  pub needs:       u64,
}
