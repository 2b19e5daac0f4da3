//! The SQLite implementation of [`PlanStore`].

use std::path::Path;

use chrono::Utc;
use dnc_core::{
  Error as CoreError,
  course::{CourseRef, CourseSummary, LinkedInCourse},
  intake::{NewNeed, NewRespondent, RawNeed, Respondent, RespondentSummary, Submitter},
  lookup::{LookupKind, LookupOption, OptionMap},
  plan::{NewPlanEntry, PlanDigest, PlanEntry, PlanFilter},
  report::{AssociationUsage, CountRow, MonthlyTrend, PlanMetrics, SummaryMetrics},
  store::PlanStore,
};
use rusqlite::Connection;

use crate::{
  Result, intake, lookup,
  plan::{self, ORDER_BY_ACTIVITY, ORDER_BY_GERENCIA, Where},
  report,
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A DNC store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run `f` on the database thread, carrying domain errors back out.
  async fn with_conn<T, F>(&self, f: F) -> Result<T>
  where
    F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
    T: Send + 'static,
  {
    self.conn.call(move |conn| Ok(f(conn))).await?
  }
}

/// Row that was just written; absence means a concurrent delete.
fn written<T>(row: Option<T>) -> Result<T> { row.ok_or_else(|| rusqlite::Error::QueryReturnedNoRows.into()) }

// ─── PlanStore impl ──────────────────────────────────────────────────────────

impl PlanStore for SqliteStore {
  type Error = crate::Error;

  // ── Lookup vocabulary ─────────────────────────────────────────────────────

  async fn list_options(&self, kind: LookupKind) -> Result<Vec<LookupOption>> {
    self.with_conn(move |conn| lookup::list(conn, kind)).await
  }

  async fn option_map(&self, kind: LookupKind) -> Result<OptionMap> {
    self.with_conn(move |conn| lookup::map(conn, kind)).await
  }

  async fn ensure_option(&self, kind: LookupKind, name: String) -> Result<i64> {
    self.with_conn(move |conn| lookup::ensure(conn, kind, &name)).await
  }

  async fn add_option(&self, kind: LookupKind, name: String) -> Result<LookupOption> {
    let option = self.with_conn(move |conn| lookup::add(conn, kind, &name)).await?;
    tracing::info!(%kind, name = %option.name, id = option.id, "option added");
    Ok(option)
  }

  async fn rename_option(&self, kind: LookupKind, old: String, new: String) -> Result<LookupOption> {
    let option = self.with_conn(move |conn| lookup::rename(conn, kind, &old, &new)).await?;
    tracing::info!(%kind, name = %option.name, id = option.id, "option renamed");
    Ok(option)
  }

  async fn delete_option(&self, kind: LookupKind, name: String) -> Result<()> {
    tracing::info!(%kind, %name, "deleting option");
    self.with_conn(move |conn| lookup::delete(conn, kind, &name)).await
  }

  async fn seed_defaults(&self) -> Result<usize> {
    let added = self
      .with_conn(|conn| {
        let tx = conn.transaction()?;
        let added = lookup::seed(&tx)?;
        tx.commit()?;
        Ok(added)
      })
      .await?;
    tracing::debug!(added, "lookup tables seeded");
    Ok(added)
  }

  // ── Intake ────────────────────────────────────────────────────────────────

  async fn create_respondent(&self, input: NewRespondent) -> Result<Respondent> {
    let now = Utc::now();
    self.with_conn(move |conn| intake::create_respondent(conn, input, now)).await
  }

  async fn get_respondent(&self, id: i64) -> Result<Option<Respondent>> {
    self.with_conn(move |conn| intake::get_respondent(conn, id)).await
  }

  async fn count_needs(&self, respondent_id: i64) -> Result<u64> {
    self.with_conn(move |conn| intake::count_needs(conn, respondent_id)).await
  }

  async fn record_need(&self, input: NewNeed) -> Result<RawNeed> {
    let now = Utc::now();
    self
      .with_conn(move |conn| {
        let id = intake::record_need(conn, input, now)?;
        written(intake::get_need(conn, id)?)
      })
      .await
  }

  async fn submit_need(&self, submitter: Submitter, input: NewNeed, limit: u32) -> Result<(Respondent, RawNeed)> {
    let now = Utc::now();
    let (respondent, need) = self
      .with_conn(move |conn| {
        let (respondent, id) = intake::submit_need(conn, submitter, input, limit, now)?;
        Ok((respondent, written(intake::get_need(conn, id)?)?))
      })
      .await?;
    tracing::info!(need = need.id, respondent = respondent.id, "need submitted");
    Ok((respondent, need))
  }

  async fn list_needs(&self) -> Result<Vec<RawNeed>> { self.with_conn(|conn| intake::list_needs(conn)).await }

  async fn list_respondents(&self) -> Result<Vec<RespondentSummary>> {
    self.with_conn(|conn| intake::list_respondents(conn)).await
  }

  // ── Plan ──────────────────────────────────────────────────────────────────

  async fn insert_plan_entry(&self, input: NewPlanEntry) -> Result<PlanEntry> {
    let now = Utc::now();
    let entry = self
      .with_conn(move |conn| {
        let id = plan::insert(conn, input, now)?;
        written(plan::get(conn, id)?)
      })
      .await?;
    tracing::debug!(id = entry.id, "plan entry inserted");
    Ok(entry)
  }

  async fn update_plan_entry(&self, id: i64, input: NewPlanEntry) -> Result<PlanEntry> {
    let now = Utc::now();
    self
      .with_conn(move |conn| {
        plan::update(conn, id, input, now)?;
        written(plan::get(conn, id)?)
      })
      .await
  }

  async fn get_plan_entry(&self, id: i64) -> Result<Option<PlanEntry>> {
    self.with_conn(move |conn| plan::get(conn, id)).await
  }

  async fn delete_plan_entry(&self, id: i64) -> Result<()> {
    self.with_conn(move |conn| plan::delete(conn, id)).await?;
    tracing::info!(id, "plan entry deleted");
    Ok(())
  }

  async fn list_plan(&self, filter: &PlanFilter) -> Result<Vec<PlanEntry>> {
    let w = Where::from_filter(filter);
    self.with_conn(move |conn| plan::select(conn, &w, ORDER_BY_GERENCIA)).await
  }

  async fn catalog_candidates(&self) -> Result<Vec<PlanEntry>> {
    let filter = PlanFilter {
      modalidades: vec!["Virtual".into()],
      fuentes: vec!["Externa".into()],
      ..PlanFilter::default()
    };
    let w = Where::from_filter(&filter);
    self.with_conn(move |conn| plan::select(conn, &w, ORDER_BY_ACTIVITY)).await
  }

  async fn set_validation(&self, id: i64, validated: bool) -> Result<()> {
    let now = Utc::now();
    self.with_conn(move |conn| plan::set_validation(conn, id, validated, now)).await
  }

  async fn plan_snapshot(&self) -> Result<Vec<PlanDigest>> {
    let entries = self.list_plan(&PlanFilter::default()).await?;
    Ok(entries.iter().map(PlanDigest::from).collect())
  }

  // ── Courses ───────────────────────────────────────────────────────────────

  async fn associate_course(&self, plan_id: i64, course: CourseRef) -> Result<LinkedInCourse> {
    self.associate_course_many(course, vec![plan_id]).await
  }

  async fn associate_course_many(&self, course: CourseRef, plan_ids: Vec<i64>) -> Result<LinkedInCourse> {
    let stored = self
      .with_conn(move |conn| {
        let tx = conn.transaction()?;
        for &id in &plan_ids {
          plan::require(&tx, id)?;
        }
        let stored = plan::upsert_course(&tx, &course)?;
        for &id in &plan_ids {
          plan::link(&tx, id, stored.id)?;
        }
        tx.commit()?;
        Ok(stored)
      })
      .await?;
    tracing::info!(urn = %stored.urn, "course associated");
    Ok(stored)
  }

  async fn set_plan_course_by_title(&self, plan_id: i64, title: Option<String>) -> Result<Option<LinkedInCourse>> {
    self
      .with_conn(move |conn| {
        let tx = conn.transaction()?;
        plan::require(&tx, plan_id)?;
        plan::unlink(&tx, plan_id)?;
        let course = match title.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
          Some(t) => {
            let course =
              plan::course_by_title(&tx, t)?.ok_or_else(|| CoreError::CourseNotFound(t.to_owned()))?;
            plan::link(&tx, plan_id, course.id)?;
            Some(course)
          }
          None => None,
        };
        tx.commit()?;
        Ok(course)
      })
      .await
  }

  async fn list_courses(&self) -> Result<Vec<CourseSummary>> {
    let rows = self.with_conn(|conn| plan::courses(conn)).await?;

    let mut out: Vec<CourseSummary> = Vec::new();
    for (course, activity) in rows {
      match out.last_mut() {
        Some(last) if last.course.id == course.id => last.activities.extend(activity),
        _ => out.push(CourseSummary { course, activities: activity.into_iter().collect() }),
      }
    }
    Ok(out)
  }

  // ── Reporting ─────────────────────────────────────────────────────────────

  async fn plan_metrics(&self, filter: &PlanFilter) -> Result<PlanMetrics> {
    let w = Where::from_filter(filter);
    self.with_conn(move |conn| plan::metrics(conn, &w)).await
  }

  async fn summary_metrics(&self, origin: Option<String>) -> Result<SummaryMetrics> {
    self.with_conn(move |conn| report::summary(conn, origin.as_deref())).await
  }

  async fn breakdown(&self, kind: LookupKind, origin: Option<String>) -> Result<Vec<CountRow>> {
    self.with_conn(move |conn| report::breakdown(conn, kind, origin.as_deref())).await
  }

  async fn association_usage(&self, origin: Option<String>) -> Result<AssociationUsage> {
    self.with_conn(move |conn| report::association_usage(conn, origin.as_deref())).await
  }

  async fn submission_trend(&self, origin: Option<String>) -> Result<Vec<MonthlyTrend>> {
    self.with_conn(move |conn| report::submission_trend(conn, origin.as_deref())).await
  }
}
