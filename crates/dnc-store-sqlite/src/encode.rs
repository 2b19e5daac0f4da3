//! Encoding and decoding helpers between domain types and SQLite rows.
//!
//! All timestamps are stored as RFC 3339 strings, so `substr(created_at, 1, 7)`
//! yields the `YYYY-MM` month.

use chrono::{DateTime, Utc};
use dnc_core::{
  course::LinkedInCourse,
  intake::{RawNeed, Respondent},
  plan::{ActivityContent, Classification, PlanEntry},
};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read from a `final_matrix` row joined with its lookups, course
/// and validation flag. Column order matches [`crate::plan::PLAN_COLUMNS`].
pub struct RawPlanEntry {
  pub id:                     i64,
  pub origin:                 String,
  pub gerencia:               String,
  pub subgerencia:            Option<String>,
  pub area:                   Option<String>,
  pub desafio:                String,
  pub audiencia:              String,
  pub modalidad:              String,
  pub fuente:                 String,
  pub prioridad:              String,
  pub actividad_formativa:    String,
  pub objetivo_desempeno:     String,
  pub contenidos_especificos: String,
  pub skills:                 String,
  pub keywords:               String,
  pub fuente_interna:         Option<String>,
  pub course_id:              Option<i64>,
  pub course_urn:             Option<String>,
  pub course_title:           Option<String>,
  pub course_url:             Option<String>,
  pub validated:              bool,
  pub created_at:             String,
  pub last_updated:           Option<String>,
}

impl RawPlanEntry {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:                     row.get(0)?,
      origin:                 row.get(1)?,
      gerencia:               row.get(2)?,
      subgerencia:            row.get(3)?,
      area:                   row.get(4)?,
      desafio:                row.get(5)?,
      audiencia:              row.get(6)?,
      modalidad:              row.get(7)?,
      fuente:                 row.get(8)?,
      prioridad:              row.get(9)?,
      actividad_formativa:    row.get(10)?,
      objetivo_desempeno:     row.get(11)?,
      contenidos_especificos: row.get(12)?,
      skills:                 row.get(13)?,
      keywords:               row.get(14)?,
      fuente_interna:         row.get(15)?,
      course_id:              row.get(16)?,
      course_urn:             row.get(17)?,
      course_title:           row.get(18)?,
      course_url:             row.get(19)?,
      validated:              row.get(20)?,
      created_at:             row.get(21)?,
      last_updated:           row.get(22)?,
    })
  }

  pub fn into_plan_entry(self) -> Result<PlanEntry> {
    let linkedin_course = match (self.course_id, self.course_urn, self.course_title) {
      (Some(id), Some(urn), Some(title)) => {
        Some(LinkedInCourse { id, urn, title, url: self.course_url })
      }
      _ => None,
    };

    Ok(PlanEntry {
      id: self.id,
      origin: self.origin,
      classification: Classification {
        gerencia:    self.gerencia,
        subgerencia: self.subgerencia,
        area:        self.area,
        desafio:     self.desafio,
        audiencia:   self.audiencia,
        modalidad:   self.modalidad,
        fuente:      self.fuente,
        prioridad:   self.prioridad,
      },
      content: ActivityContent {
        actividad_formativa:    self.actividad_formativa,
        objetivo_desempeno:     self.objetivo_desempeno,
        contenidos_especificos: self.contenidos_especificos,
        skills:                 self.skills,
        keywords:               self.keywords,
      },
      fuente_interna: self.fuente_interna,
      linkedin_course,
      validated: self.validated,
      created_at: decode_dt(&self.created_at)?,
      last_updated: self.last_updated.as_deref().map(decode_dt).transpose()?,
    })
  }
}

/// Raw values read from a `raw_data_forms` row joined with its lookups.
pub struct RawNeedRow {
  pub id:              i64,
  pub respondent_id:   i64,
  pub respondent_name: String,
  pub origin:          String,
  pub gerencia:        String,
  pub subgerencia:     Option<String>,
  pub area:            Option<String>,
  pub desafio:         String,
  pub audiencia:       String,
  pub modalidad:       String,
  pub fuente:          String,
  pub prioridad:       String,
  pub cambios:         String,
  pub que_falta:       String,
  pub aprendizajes:    String,
  pub fuente_interna:  Option<String>,
  pub created_at:      String,
}

impl RawNeedRow {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:              row.get(0)?,
      respondent_id:   row.get(1)?,
      respondent_name: row.get(2)?,
      origin:          row.get(3)?,
      gerencia:        row.get(4)?,
      subgerencia:     row.get(5)?,
      area:            row.get(6)?,
      desafio:         row.get(7)?,
      audiencia:       row.get(8)?,
      modalidad:       row.get(9)?,
      fuente:          row.get(10)?,
      prioridad:       row.get(11)?,
      cambios:         row.get(12)?,
      que_falta:       row.get(13)?,
      aprendizajes:    row.get(14)?,
      fuente_interna:  row.get(15)?,
      created_at:      row.get(16)?,
    })
  }

  pub fn into_need(self) -> Result<RawNeed> {
    Ok(RawNeed {
      id:              self.id,
      respondent_id:   self.respondent_id,
      respondent_name: self.respondent_name,
      origin:          self.origin,
      classification:  Classification {
        gerencia:    self.gerencia,
        subgerencia: self.subgerencia,
        area:        self.area,
        desafio:     self.desafio,
        audiencia:   self.audiencia,
        modalidad:   self.modalidad,
        fuente:      self.fuente,
        prioridad:   self.prioridad,
      },
      cambios:         self.cambios,
      que_falta:       self.que_falta,
      aprendizajes:    self.aprendizajes,
      fuente_interna:  self.fuente_interna,
      created_at:      decode_dt(&self.created_at)?,
    })
  }
}

/// Raw values read from a `respondents` row.
pub struct RawRespondent {
  pub id:         i64,
  pub name:       String,
  pub email:      String,
  pub created_at: String,
}

impl RawRespondent {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:         row.get(0)?,
      name:       row.get(1)?,
      email:      row.get(2)?,
      created_at: row.get(3)?,
    })
  }

  pub fn into_respondent(self) -> Result<Respondent> {
    Ok(Respondent {
      id:         self.id,
      name:       self.name,
      email:      self.email,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// Empty or whitespace-only free text is stored as NULL.
pub fn encode_optional_text(s: Option<String>) -> Option<String> {
  s.map(|s| s.trim().to_owned()).filter(|s| !s.is_empty())
}
