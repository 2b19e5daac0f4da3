//! The training matrix: synthesised or manually added activities, each
//! classified along the lookup dimensions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  course::LinkedInCourse,
  lookup::{LookupKind, is_not_applicable},
};

// ─── Classification ──────────────────────────────────────────────────────────

/// Name-based classification shared by raw needs and plan entries.
///
/// Subgerencia and Área are optional; `None`, blank and `"N/A"` all mean "no
/// value".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
  pub gerencia:    String,
  #[serde(default)]
  pub subgerencia: Option<String>,
  #[serde(default)]
  pub area:        Option<String>,
  pub desafio:     String,
  pub audiencia:   String,
  pub modalidad:   String,
  pub fuente:      String,
  pub prioridad:   String,
}

impl Classification {
  /// Required dimensions must be non-blank.
  pub fn validate(&self) -> Result<()> {
    for (kind, value) in self.required() {
      if value.trim().is_empty() {
        return Err(Error::EmptyField(kind.label()));
      }
    }
    Ok(())
  }

  /// `(kind, name)` pairs for every required dimension.
  pub fn required(&self) -> [(LookupKind, &str); 6] {
    [
      (LookupKind::Gerencia, self.gerencia.as_str()),
      (LookupKind::Desafio, self.desafio.as_str()),
      (LookupKind::Audiencia, self.audiencia.as_str()),
      (LookupKind::Modalidad, self.modalidad.as_str()),
      (LookupKind::Fuente, self.fuente.as_str()),
      (LookupKind::Prioridad, self.prioridad.as_str()),
    ]
  }

  /// `(kind, name)` pairs for the optional dimensions that carry a value.
  pub fn optional(&self) -> impl Iterator<Item = (LookupKind, &str)> {
    [
      (LookupKind::Subgerencia, self.subgerencia.as_deref()),
      (LookupKind::Area, self.area.as_deref()),
    ]
    .into_iter()
    .filter_map(|(kind, v)| v.filter(|v| !is_not_applicable(v)).map(|v| (kind, v)))
  }
}

// ─── Activity content ────────────────────────────────────────────────────────

/// The five free-text fields describing a training activity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityContent {
  pub actividad_formativa:    String,
  pub objetivo_desempeno:     String,
  pub contenidos_especificos: String,
  pub skills:                 String,
  pub keywords:               String,
}

impl ActivityContent {
  /// Manual additions and edits require every field.
  pub fn validate(&self) -> Result<()> {
    let fields = [
      ("actividad_formativa", &self.actividad_formativa),
      ("objetivo_desempeno", &self.objetivo_desempeno),
      ("contenidos_especificos", &self.contenidos_especificos),
      ("skills", &self.skills),
      ("keywords", &self.keywords),
    ];
    match fields.into_iter().find(|(_, v)| v.trim().is_empty()) {
      Some((name, _)) => Err(Error::EmptyField(name)),
      None => Ok(()),
    }
  }
}

// ─── Plan entries ────────────────────────────────────────────────────────────

/// Input for [`PlanStore::insert_plan_entry`](crate::store::PlanStore::insert_plan_entry)
/// and `update_plan_entry`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPlanEntry {
  pub origin:         String,
  #[serde(flatten)]
  pub classification: Classification,
  #[serde(flatten)]
  pub content:        ActivityContent,
  #[serde(default)]
  pub fuente_interna: Option<String>,
}

impl NewPlanEntry {
  pub fn validate(&self) -> Result<()> {
    if self.origin.trim().is_empty() {
      return Err(Error::EmptyField("origin"));
    }
    self.classification.validate()?;
    self.content.validate()
  }
}

/// A stored matrix row with every reference resolved to its name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanEntry {
  pub id:              i64,
  pub origin:          String,
  #[serde(flatten)]
  pub classification:  Classification,
  #[serde(flatten)]
  pub content:         ActivityContent,
  pub fuente_interna:  Option<String>,
  pub linkedin_course: Option<LinkedInCourse>,
  pub validated:       bool,
  pub created_at:      DateTime<Utc>,
  pub last_updated:    Option<DateTime<Utc>>,
}

// ─── Filter ──────────────────────────────────────────────────────────────────

/// Course-association filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Association {
  With,
  Without,
}

/// Parameters for [`PlanStore::list_plan`](crate::store::PlanStore::list_plan).
///
/// Empty name sets do not filter. A non-empty set keeps rows whose option name
/// is in the set; names that match no option simply match no rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanFilter {
  pub origin:       Option<String>,
  pub gerencias:    Vec<String>,
  pub subgerencias: Vec<String>,
  pub areas:        Vec<String>,
  pub desafios:     Vec<String>,
  pub audiencias:   Vec<String>,
  pub modalidades:  Vec<String>,
  pub fuentes:      Vec<String>,
  pub prioridades:  Vec<String>,
  pub association:  Option<Association>,
  pub validated:    Option<bool>,
}

impl PlanFilter {
  /// Restrict to one origin.
  pub fn origin(origin: impl Into<String>) -> Self {
    Self { origin: Some(origin.into()), ..Self::default() }
  }

  /// Name sets paired with the dimension they constrain.
  pub fn name_sets(&self) -> [(LookupKind, &[String]); 8] {
    [
      (LookupKind::Gerencia, &self.gerencias),
      (LookupKind::Subgerencia, &self.subgerencias),
      (LookupKind::Area, &self.areas),
      (LookupKind::Desafio, &self.desafios),
      (LookupKind::Audiencia, &self.audiencias),
      (LookupKind::Modalidad, &self.modalidades),
      (LookupKind::Fuente, &self.fuentes),
      (LookupKind::Prioridad, &self.prioridades),
    ]
  }
}

// ─── LLM digests ─────────────────────────────────────────────────────────────

/// A plan row as sent to the LLM: names only, Spanish headings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanDigest {
  #[serde(rename = "Gerencia")]
  pub gerencia:               String,
  #[serde(rename = "Subgerencia")]
  pub subgerencia:            Option<String>,
  #[serde(rename = "Área")]
  pub area:                   Option<String>,
  #[serde(rename = "Desafío Estratégico")]
  pub desafio:                String,
  #[serde(rename = "Actividad formativa")]
  pub actividad_formativa:    String,
  #[serde(rename = "Objetivo de desempeño")]
  pub objetivo_desempeno:     String,
  #[serde(rename = "Contenidos específicos")]
  pub contenidos_especificos: String,
  #[serde(rename = "Skills")]
  pub skills:                 String,
  #[serde(rename = "Keywords")]
  pub keywords:               String,
  #[serde(rename = "Audiencia")]
  pub audiencia:              String,
  #[serde(rename = "Modalidad")]
  pub modalidad:              String,
  #[serde(rename = "Fuente")]
  pub fuente:                 String,
  #[serde(rename = "Prioridad")]
  pub prioridad:              String,
}

impl From<&PlanEntry> for PlanDigest {
  fn from(e: &PlanEntry) -> Self {
    let c = &e.classification;
    let a = &e.content;
    Self {
      gerencia:               c.gerencia.clone(),
      subgerencia:            c.subgerencia.clone(),
      area:                   c.area.clone(),
      desafio:                c.desafio.clone(),
      actividad_formativa:    a.actividad_formativa.clone(),
      objetivo_desempeno:     a.objetivo_desempeno.clone(),
      contenidos_especificos: a.contenidos_especificos.clone(),
      skills:                 a.skills.clone(),
      keywords:               a.keywords.clone(),
      audiencia:              c.audiencia.clone(),
      modalidad:              c.modalidad.clone(),
      fuente:                 c.fuente.clone(),
      prioridad:              c.prioridad.clone(),
    }
  }
}

/// A survey answer as sent to the LLM.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NeedDigest {
  #[serde(rename = "Gerencia")]
  pub gerencia:     String,
  #[serde(rename = "Subgerencia")]
  pub subgerencia:  Option<String>,
  #[serde(rename = "Área")]
  pub area:         Option<String>,
  #[serde(rename = "Desafío Estratégico")]
  pub desafio:      String,
  #[serde(rename = "Cambios")]
  pub cambios:      String,
  #[serde(rename = "Qué falta")]
  pub que_falta:    String,
  #[serde(rename = "Aprendizajes")]
  pub aprendizajes: String,
  #[serde(rename = "Audiencia")]
  pub audiencia:    String,
  #[serde(rename = "Modalidad")]
  pub modalidad:    String,
  #[serde(rename = "Fuente")]
  pub fuente:       String,
  #[serde(rename = "Prioridad")]
  pub prioridad:    String,
}
