//! The `PlanStore` trait.
//!
//! Implemented by storage backends (e.g. `dnc-store-sqlite`). The REST layer
//! depends on this abstraction, not on any concrete backend.

use std::future::Future;

use crate::{
  DomainError,
  course::{CourseRef, CourseSummary, LinkedInCourse},
  intake::{NewNeed, NewRespondent, RawNeed, Respondent, RespondentSummary, Submitter},
  lookup::{LookupKind, LookupOption, OptionMap},
  plan::{NewPlanEntry, PlanDigest, PlanEntry, PlanFilter},
  report::{AssociationUsage, CountRow, MonthlyTrend, PlanMetrics, SummaryMetrics},
};

/// Abstraction over a DNC store backend.
///
/// Facts (needs, plan entries) reference lookup options by id; every method
/// here speaks names and the backend reconciles them.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait PlanStore: Send + Sync {
  type Error: std::error::Error + DomainError + Send + Sync + 'static;

  // ── Lookup vocabulary ─────────────────────────────────────────────────

  /// All options of `kind`, ordered by name.
  fn list_options(
    &self,
    kind: LookupKind,
  ) -> impl Future<Output = Result<Vec<LookupOption>, Self::Error>> + Send + '_;

  /// `name → id` map for `kind`.
  fn option_map(
    &self,
    kind: LookupKind,
  ) -> impl Future<Output = Result<OptionMap, Self::Error>> + Send + '_;

  /// Return the id of `name`, inserting it first if absent.
  fn ensure_option(
    &self,
    kind: LookupKind,
    name: String,
  ) -> impl Future<Output = Result<i64, Self::Error>> + Send + '_;

  /// Add a new option. Fails if an option with the same name (ignoring case)
  /// exists.
  fn add_option(
    &self,
    kind: LookupKind,
    name: String,
  ) -> impl Future<Output = Result<LookupOption, Self::Error>> + Send + '_;

  /// Rename `old` to `new`. References follow automatically.
  fn rename_option(
    &self,
    kind: LookupKind,
    old: String,
    new: String,
  ) -> impl Future<Output = Result<LookupOption, Self::Error>> + Send + '_;

  /// Delete an option no fact references.
  fn delete_option(
    &self,
    kind: LookupKind,
    name: String,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Insert every built-in option that is missing. Returns how many were
  /// added.
  fn seed_defaults(&self) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  // ── Intake ────────────────────────────────────────────────────────────

  fn create_respondent(
    &self,
    input: NewRespondent,
  ) -> impl Future<Output = Result<Respondent, Self::Error>> + Send + '_;

  fn get_respondent(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Respondent>, Self::Error>> + Send + '_;

  /// Number of needs a respondent has submitted.
  fn count_needs(
    &self,
    respondent_id: i64,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  fn record_need(
    &self,
    input: NewNeed,
  ) -> impl Future<Output = Result<RawNeed, Self::Error>> + Send + '_;

  /// Record a survey answer atomically: resolve or create the respondent,
  /// refuse once they hold `limit` needs, then store the need. Nothing is
  /// written when any step fails. `input.respondent_id` is ignored.
  fn submit_need(
    &self,
    submitter: Submitter,
    input: NewNeed,
    limit: u32,
  ) -> impl Future<Output = Result<(Respondent, RawNeed), Self::Error>> + Send + '_;

  /// All needs, newest first.
  fn list_needs(&self) -> impl Future<Output = Result<Vec<RawNeed>, Self::Error>> + Send + '_;

  fn list_respondents(
    &self,
  ) -> impl Future<Output = Result<Vec<RespondentSummary>, Self::Error>> + Send + '_;

  // ── Plan ──────────────────────────────────────────────────────────────

  fn insert_plan_entry(
    &self,
    input: NewPlanEntry,
  ) -> impl Future<Output = Result<PlanEntry, Self::Error>> + Send + '_;

  /// Replace every editable field and stamp `last_updated`.
  fn update_plan_entry(
    &self,
    id: i64,
    input: NewPlanEntry,
  ) -> impl Future<Output = Result<PlanEntry, Self::Error>> + Send + '_;

  fn get_plan_entry(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<PlanEntry>, Self::Error>> + Send + '_;

  /// Delete an entry together with its course association and validation
  /// flag.
  fn delete_plan_entry(&self, id: i64) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Entries matching `filter`, ordered by gerencia name then id.
  fn list_plan<'a>(
    &'a self,
    filter: &'a PlanFilter,
  ) -> impl Future<Output = Result<Vec<PlanEntry>, Self::Error>> + Send + 'a;

  /// Virtual, externally sourced entries: the ones worth a catalog search.
  fn catalog_candidates(
    &self,
  ) -> impl Future<Output = Result<Vec<PlanEntry>, Self::Error>> + Send + '_;

  fn set_validation(
    &self,
    id: i64,
    validated: bool,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// The whole plan in the shape the LLM receives.
  fn plan_snapshot(
    &self,
  ) -> impl Future<Output = Result<Vec<PlanDigest>, Self::Error>> + Send + '_;

  // ── Courses ───────────────────────────────────────────────────────────

  /// Store `course` (by URN) and make it the only course of `plan_id`.
  fn associate_course(
    &self,
    plan_id: i64,
    course: CourseRef,
  ) -> impl Future<Output = Result<LinkedInCourse, Self::Error>> + Send + '_;

  /// [`associate_course`](Self::associate_course) for several entries at once.
  fn associate_course_many(
    &self,
    course: CourseRef,
    plan_ids: Vec<i64>,
  ) -> impl Future<Output = Result<LinkedInCourse, Self::Error>> + Send + '_;

  /// Clear the entry's course, then associate the stored course titled
  /// `title` if one is given.
  fn set_plan_course_by_title(
    &self,
    plan_id: i64,
    title: Option<String>,
  ) -> impl Future<Output = Result<Option<LinkedInCourse>, Self::Error>> + Send + '_;

  fn list_courses(
    &self,
  ) -> impl Future<Output = Result<Vec<CourseSummary>, Self::Error>> + Send + '_;

  // ── Reporting ─────────────────────────────────────────────────────────

  fn plan_metrics<'a>(
    &'a self,
    filter: &'a PlanFilter,
  ) -> impl Future<Output = Result<PlanMetrics, Self::Error>> + Send + 'a;

  fn summary_metrics(
    &self,
    origin: Option<String>,
  ) -> impl Future<Output = Result<SummaryMetrics, Self::Error>> + Send + '_;

  /// Plan entries per option of `kind`, largest first.
  fn breakdown(
    &self,
    kind: LookupKind,
    origin: Option<String>,
  ) -> impl Future<Output = Result<Vec<CountRow>, Self::Error>> + Send + '_;

  fn association_usage(
    &self,
    origin: Option<String>,
  ) -> impl Future<Output = Result<AssociationUsage, Self::Error>> + Send + '_;

  /// Respondents and needs per month, oldest first.
  fn submission_trend(
    &self,
    origin: Option<String>,
  ) -> impl Future<Output = Result<Vec<MonthlyTrend>, Self::Error>> + Send + '_;
}
