//! Aggregate figures over needs and the plan.

use serde::{Deserialize, Serialize};

/// Validated vs. pending plan entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationStats {
  pub validated:  u64,
  pub pending:    u64,
  pub total:      u64,
  /// Share of validated entries, 0–100 with one decimal.
  pub percentage: f64,
}

impl ValidationStats {
  pub fn new(validated: u64, total: u64) -> Self {
    let percentage = if total == 0 {
      0.0
    } else {
      (validated as f64 * 1000.0 / total as f64).round() / 10.0
    };
    Self { validated, pending: total.saturating_sub(validated), total, percentage }
  }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanMetrics {
  pub activities:     u64,
  /// Distinct courses associated with the selected entries.
  pub linked_courses: u64,
  pub validation:     ValidationStats,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryMetrics {
  pub respondents:    u64,
  pub needs:          u64,
  pub activities:     u64,
  pub linked_courses: u64,
  pub validation:     ValidationStats,
}

/// One bar of a breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountRow {
  pub name:  String,
  pub count: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssociationUsage {
  pub with_course:    u64,
  pub without_course: u64,
}

/// Submissions in one calendar month (`YYYY-MM`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyTrend {
  pub month:       String,
  pub respondents: u64,
  pub needs:       u64,
}
