//! JSON shapes returned by the LinkedIn Learning API.

use dnc_core::course::{CatalogCourse, level_label};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct Page {
  #[serde(default)]
  pub paging:   Paging,
  #[serde(default)]
  pub elements: Vec<Element>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Paging {
  #[serde(default)]
  pub total: u64,
}

#[derive(Debug, Deserialize)]
pub struct Element {
  pub urn:     Option<String>,
  pub title:   Option<Localized>,
  #[serde(default)]
  pub details: Details,
}

#[derive(Debug, Deserialize)]
pub struct Localized {
  pub value: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Details {
  pub level:            Option<String>,
  pub time_to_complete: Option<TimeToComplete>,
  pub description:      Option<Localized>,
  pub urls:             Option<Urls>,
}

#[derive(Debug, Deserialize)]
pub struct TimeToComplete {
  /// Seconds.
  pub duration: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Urls {
  pub web_launch: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Token {
  pub access_token: String,
  /// Lifetime in seconds.
  pub expires_in:   Option<u64>,
}

fn localized(l: Option<Localized>) -> Option<String> {
  l.and_then(|l| l.value).map(|v| v.trim().to_owned()).filter(|v| !v.is_empty())
}

impl Element {
  /// Elements without a URN or title are unusable and yield `None`.
  pub fn into_course(self) -> Option<CatalogCourse> {
    let urn = self.urn.filter(|u| !u.is_empty())?;
    let title = localized(self.title)?;
    let d = self.details;
    let duration_minutes = d
      .time_to_complete
      .and_then(|t| t.duration)
      .map(|secs| (secs / 60.0).round().max(0.0) as u32);
    Some(CatalogCourse {
      urn,
      title,
      level: level_label(d.level.as_deref()).to_owned(),
      duration_minutes,
      description: localized(d.description),
      url: d.urls.and_then(|u| u.web_launch),
    })
  }
}
