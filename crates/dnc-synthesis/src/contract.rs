//! The response contract: locate the fenced JSON block in the LLM's markdown
//! and turn it into domain values.
//!
//! ~~~text
//! Aquí tienes la propuesta:
//!
//! ```json
//! [{"Actividad formativa": "...", "Skills": ["a", "b"], ...}]
//! ```
//! ~~~

use std::{collections::HashSet, sync::LazyLock};

use dnc_core::{
  course::{CatalogCourse, CourseRecommendation},
  plan::ActivityContent,
};
use regex::Regex;
use serde_json::{Map, Value};

use crate::{Error, Result};

pub const KEY_ACTIVITY: &str = "Actividad formativa";
pub const KEY_OBJECTIVE: &str = "Objetivo de desempeño";
pub const KEY_CONTENTS: &str = "Contenidos específicos";
pub const KEY_SKILLS: &str = "Skills";
pub const KEY_KEYWORDS: &str = "Keywords";
pub const KEY_URN: &str = "URN";
pub const KEY_REASON: &str = "Motivo";

static JSON_BLOCK: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"(?s)```json[ \t]*\r?\n(.*?)\r?\n[ \t]*```").expect("static regex"));

/// The body of the single ```` ```json ```` block in `markdown`.
pub fn extract_json_block(markdown: &str) -> Result<&str> {
  let mut blocks = JSON_BLOCK
    .captures_iter(markdown)
    .filter_map(|c| c.get(1).map(|m| m.as_str()));
  match (blocks.next(), blocks.count()) {
    (None, _) => Err(Error::MissingJsonBlock),
    (Some(body), 0) => Ok(body),
    (Some(_), rest) => Err(Error::AmbiguousJsonBlock(rest + 1)),
  }
}

/// Render a JSON value as a plain field: arrays are joined with `", "`,
/// `null` becomes empty.
fn text(value: Option<&Value>) -> String {
  match value {
    None | Some(Value::Null) => String::new(),
    Some(Value::String(s)) => s.trim().to_owned(),
    Some(Value::Array(items)) => items
      .iter()
      .map(|v| text(Some(v)))
      .filter(|s| !s.is_empty())
      .collect::<Vec<_>>()
      .join(", "),
    Some(other) => other.to_string(),
  }
}

fn objects(block: &str) -> Result<Vec<Map<String, Value>>> { Ok(serde_json::from_str(block)?) }

/// Parse a synthesis reply into activities. Unknown keys are ignored; only
/// `Actividad formativa` is mandatory.
pub fn parse_activities(markdown: &str) -> Result<Vec<ActivityContent>> {
  objects(extract_json_block(markdown)?)?
    .into_iter()
    .enumerate()
    .map(|(index, obj)| {
      let actividad_formativa = text(obj.get(KEY_ACTIVITY));
      if actividad_formativa.is_empty() {
        return Err(Error::EmptyActivity { index });
      }
      Ok(ActivityContent {
        actividad_formativa,
        objetivo_desempeno: text(obj.get(KEY_OBJECTIVE)),
        contenidos_especificos: text(obj.get(KEY_CONTENTS)),
        skills: text(obj.get(KEY_SKILLS)),
        keywords: text(obj.get(KEY_KEYWORDS)),
      })
    })
    .collect()
}

/// Parse a ranking reply. URNs that are not among `candidates` are dropped,
/// as are repeats; the model's order is kept.
pub fn parse_ranking(markdown: &str, candidates: &[CatalogCourse]) -> Result<Vec<CourseRecommendation>> {
  let mut seen = HashSet::new();
  let ranked = objects(extract_json_block(markdown)?)?
    .into_iter()
    .filter_map(|obj| {
      let urn = text(obj.get(KEY_URN));
      let course = candidates.iter().find(|c| c.urn == urn)?;
      if !seen.insert(urn.clone()) {
        return None;
      }
      let reason = Some(text(obj.get(KEY_REASON))).filter(|r| !r.is_empty());
      Some(CourseRecommendation { urn, title: course.title.clone(), reason })
    })
    .collect();
  Ok(ranked)
}
