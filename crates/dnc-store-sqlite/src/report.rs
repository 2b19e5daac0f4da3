//! Synchronous aggregate queries.

use dnc_core::{
  lookup::LookupKind,
  plan::{Association, PlanFilter},
  report::{AssociationUsage, CountRow, MonthlyTrend, SummaryMetrics},
};
use rusqlite::{Connection, types::Value};

use crate::{
  Result,
  plan::{self, PLAN_JOINS, Where, alias},
};

fn origin_filter(origin: Option<&str>) -> PlanFilter {
  PlanFilter { origin: origin.map(str::to_owned), ..PlanFilter::default() }
}

/// Headline figures, optionally restricted to one origin.
///
/// With no origin, `linked_courses` counts every stored course, including
/// ones not (or no longer) linked to an entry.
pub fn summary(conn: &Connection, origin: Option<&str>) -> Result<SummaryMetrics> {
  let plan = plan::metrics(conn, &Where::from_filter(&origin_filter(origin)))?;

  let (respondents, needs): (i64, i64) = match origin {
    Some(o) => conn.query_row(
      "SELECT COUNT(DISTINCT n.submission_id), COUNT(*)
       FROM raw_data_forms n JOIN origins o ON o.id = n.origin_id
       WHERE o.name = ?1",
      [o.trim()],
      |r| Ok((r.get(0)?, r.get(1)?)),
    )?,
    None => conn.query_row(
      "SELECT (SELECT COUNT(*) FROM respondents), (SELECT COUNT(*) FROM raw_data_forms)",
      [],
      |r| Ok((r.get(0)?, r.get(1)?)),
    )?,
  };

  let linked_courses = match origin {
    Some(_) => plan.linked_courses,
    None => conn.query_row("SELECT COUNT(*) FROM linkedin_courses", [], |r| r.get::<_, i64>(0))? as u64,
  };

  Ok(SummaryMetrics {
    respondents: respondents as u64,
    needs: needs as u64,
    activities: plan.activities,
    linked_courses,
    validation: plan.validation,
  })
}

/// Plan entries per option of `kind`, largest first. Entries without a value
/// for an optional dimension are not counted.
pub fn breakdown(conn: &Connection, kind: LookupKind, origin: Option<&str>) -> Result<Vec<CountRow>> {
  let mut w = Where::from_filter(&origin_filter(origin));
  let col = format!("{}.name", alias(kind));
  w.push_cond(format!("{col} IS NOT NULL"));
  let sql = format!(
    "SELECT {col}, COUNT(*) AS n FROM {PLAN_JOINS} {}
     GROUP BY {col} ORDER BY n DESC, {col}",
    w.sql()
  );
  let mut stmt = conn.prepare(&sql)?;
  let rows = stmt
    .query_map(w.params(), |r| Ok(CountRow { name: r.get(0)?, count: r.get::<_, i64>(1)? as u64 }))?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(rows)
}

pub fn association_usage(conn: &Connection, origin: Option<&str>) -> Result<AssociationUsage> {
  let count = |association| -> Result<u64> {
    let filter = PlanFilter { association: Some(association), ..origin_filter(origin) };
    Ok(plan::metrics(conn, &Where::from_filter(&filter))?.activities)
  };
  Ok(AssociationUsage {
    with_course:    count(Association::With)?,
    without_course: count(Association::Without)?,
  })
}

/// Respondents and needs per `YYYY-MM`, oldest first.
pub fn submission_trend(conn: &Connection, origin: Option<&str>) -> Result<Vec<MonthlyTrend>> {
  let mut w = Where::default();
  if let Some(o) = origin {
    w.push("o.name = ?", Value::Text(o.trim().to_owned()));
  }
  let sql = format!(
    "SELECT substr(n.created_at, 1, 7) AS month, COUNT(DISTINCT n.submission_id), COUNT(*)
     FROM raw_data_forms n JOIN origins o ON o.id = n.origin_id
     {}
     GROUP BY month ORDER BY month",
    w.sql()
  );
  let mut stmt = conn.prepare(&sql)?;
  let rows = stmt
    .query_map(w.params(), |r| {
      Ok(MonthlyTrend {
        month:       r.get(0)?,
        respondents: r.get::<_, i64>(1)? as u64,
        needs:       r.get::<_, i64>(2)? as u64,
      })
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(rows)
}
