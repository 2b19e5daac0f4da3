//! LinkedIn Learning courses: stored associations and catalog search types.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

const URN_PREFIX: &str = "urn:li:";

// ─── Stored courses ──────────────────────────────────────────────────────────

/// A course persisted in the store, unique by URN.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkedInCourse {
  pub id:    i64,
  pub urn:   String,
  pub title: String,
  pub url:   Option<String>,
}

/// A course as chosen from the catalog, before it is stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseRef {
  pub urn:   String,
  pub title: String,
  #[serde(default)]
  pub url:   Option<String>,
}

impl CourseRef {
  pub fn validate(&self) -> Result<()> {
    validate_urn(&self.urn)?;
    if self.title.trim().is_empty() {
      return Err(Error::EmptyField("title"));
    }
    Ok(())
  }
}

impl From<&CatalogCourse> for CourseRef {
  fn from(c: &CatalogCourse) -> Self {
    Self { urn: c.urn.clone(), title: c.title.clone(), url: c.url.clone() }
  }
}

/// A stored course and the activities it is associated with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseSummary {
  #[serde(flatten)]
  pub course:     LinkedInCourse,
  pub activities: Vec<String>,
}

impl CourseSummary {
  pub fn activity_count(&self) -> usize { self.activities.len() }
}

/// Catalog identifiers look like `urn:li:lyndaCourse:123`.
pub fn validate_urn(urn: &str) -> Result<()> {
  let well_formed = urn.starts_with(URN_PREFIX)
    && urn.len() > URN_PREFIX.len()
    && !urn.chars().any(|c| c.is_whitespace() || matches!(c, '/' | '\\' | '?' | '#' | '%'));
  if well_formed {
    Ok(())
  } else {
    Err(Error::InvalidUrn(urn.to_owned()))
  }
}

// ─── Catalog search ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssetType {
  #[default]
  Course,
  Video,
  LearningPath,
}

impl AssetType {
  pub fn code(self) -> &'static str {
    match self {
      Self::Course => "COURSE",
      Self::Video => "VIDEO",
      Self::LearningPath => "LEARNING_PATH",
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Difficulty {
  Beginner,
  Intermediate,
  Advanced,
}

/// Label used when the catalog reports no (or an unknown) level.
pub const UNKNOWN_LEVEL: &str = "Nivel no especificado";

impl Difficulty {
  pub fn code(self) -> &'static str {
    match self {
      Self::Beginner => "BEGINNER",
      Self::Intermediate => "INTERMEDIATE",
      Self::Advanced => "ADVANCED",
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      Self::Beginner => "Principiante",
      Self::Intermediate => "Intermedio",
      Self::Advanced => "Avanzado",
    }
  }

  pub fn from_code(code: &str) -> Option<Self> {
    match code {
      "BEGINNER" => Some(Self::Beginner),
      "INTERMEDIATE" => Some(Self::Intermediate),
      "ADVANCED" => Some(Self::Advanced),
      _ => None,
    }
  }
}

/// Spanish label for a catalog level code.
pub fn level_label(code: Option<&str>) -> &'static str {
  code.and_then(Difficulty::from_code).map_or(UNKNOWN_LEVEL, Difficulty::label)
}

fn default_true() -> bool { true }

/// Parameters for [`CourseCatalog::search`](crate::service::CourseCatalog::search).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseQuery {
  pub keywords:     String,
  #[serde(default)]
  pub asset_type:   AssetType,
  #[serde(default = "default_true")]
  pub spanish_only: bool,
  #[serde(default)]
  pub difficulty:   Option<Difficulty>,
}

impl CourseQuery {
  pub fn new(keywords: impl Into<String>) -> Self {
    Self {
      keywords:     keywords.into(),
      asset_type:   AssetType::default(),
      spanish_only: true,
      difficulty:   None,
    }
  }

  pub fn validate(&self) -> Result<()> {
    if self.keywords.trim().is_empty() {
      return Err(Error::EmptyField("keywords"));
    }
    Ok(())
  }
}

/// A catalog result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogCourse {
  pub urn:              String,
  pub title:            String,
  /// Spanish difficulty label.
  pub level:            String,
  pub duration_minutes: Option<u32>,
  pub description:      Option<String>,
  pub url:              Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogSearch {
  /// Total reported by the catalog, which may exceed `courses.len()`.
  pub total:   u64,
  pub courses: Vec<CatalogCourse>,
}

/// One re-ranked course with the LLM's stated reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseRecommendation {
  pub urn:    String,
  pub title:  String,
  pub reason: Option<String>,
}
