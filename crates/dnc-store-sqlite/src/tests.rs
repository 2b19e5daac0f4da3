//! Integration tests for `SqliteStore` against an in-memory database.

use dnc_core::{
  Error as CoreError,
  course::CourseRef,
  intake::{NewNeed, NewRespondent, Submitter},
  lookup::LookupKind,
  plan::{ActivityContent, Association, Classification, NewPlanEntry, PlanFilter},
  store::PlanStore,
};

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  let s = SqliteStore::open_in_memory()
    .await
    .expect("in-memory store");
  s.seed_defaults().await.expect("seed");
  s
}

fn core(err: Error) -> CoreError {
  match err {
    Error::Core(e) => e,
    other => panic!("expected a domain error, got {other:?}"),
  }
}

fn classification(gerencia: &str, modalidad: &str, fuente: &str) -> Classification {
  Classification {
    gerencia:    gerencia.into(),
    subgerencia: Some("Infraestructura".into()),
    area:        None,
    desafio:     "Reducir costos".into(),
    audiencia:   "Analistas".into(),
    modalidad:   modalidad.into(),
    fuente:      fuente.into(),
    prioridad:   "Alta".into(),
  }
}

fn entry(activity: &str, gerencia: &str) -> NewPlanEntry {
  NewPlanEntry {
    origin:         "SGD".into(),
    classification: classification(gerencia, "Virtual", "Externa"),
    content:        ActivityContent {
      actividad_formativa:    activity.into(),
      objetivo_desempeno:     "Mejorar el desempeño".into(),
      contenidos_especificos: "Módulos 1 a 3".into(),
      skills:                 "Análisis".into(),
      keywords:               "datos".into(),
    },
    fuente_interna: None,
  }
}

fn course(n: u32) -> CourseRef {
  CourseRef {
    urn:   format!("urn:li:lyndaCourse:{n}"),
    title: format!("Curso {n}"),
    url:   Some(format!("https://www.linkedin.com/learning/curso-{n}")),
  }
}

async fn respondent(s: &SqliteStore, name: &str) -> i64 {
  s.create_respondent(NewRespondent { name: name.into(), email: format!("{name}@example.com") })
    .await
    .unwrap()
    .id
}

fn need(respondent_id: i64, gerencia: &str) -> NewNeed {
  NewNeed {
    respondent_id,
    origin: "DNC".into(),
    classification: classification(gerencia, "Presencial", "Interna"),
    cambios: "Nuevo ERP".into(),
    que_falta: "Conocimiento del sistema".into(),
    aprendizajes: "Uso del ERP".into(),
    fuente_interna: Some("Equipo TI".into()),
  }
}

// ─── Lookup vocabulary ───────────────────────────────────────────────────────

#[tokio::test]
async fn seeding_is_idempotent() {
  let s = store().await;
  assert_eq!(s.seed_defaults().await.unwrap(), 0);

  let modalidades = s.list_options(LookupKind::Modalidad).await.unwrap();
  let names: Vec<_> = modalidades.iter().map(|o| o.name.as_str()).collect();
  assert_eq!(names, ["Híbrido", "Presencial", "Virtual"]);
}

#[tokio::test]
async fn ensure_option_upserts_by_name() {
  let s = store().await;
  let a = s.ensure_option(LookupKind::Audiencia, "Practicantes".into()).await.unwrap();
  let b = s.ensure_option(LookupKind::Audiencia, " Practicantes ".into()).await.unwrap();
  assert_eq!(a, b);

  let map = s.option_map(LookupKind::Audiencia).await.unwrap();
  assert_eq!(map.get("Practicantes"), Some(&a));
}

#[tokio::test]
async fn add_option_rejects_case_insensitive_duplicates() {
  let s = store().await;
  let added = s.add_option(LookupKind::Area, "  Ciberseguridad ".into()).await.unwrap();
  assert_eq!(added.name, "Ciberseguridad");

  let err = core(s.add_option(LookupKind::Area, "ALMACÉN".into()).await.unwrap_err());
  assert!(matches!(err, CoreError::DuplicateOption { kind: LookupKind::Area, ref name } if name == "Almacén"));

  let err = core(s.add_option(LookupKind::Area, "   ".into()).await.unwrap_err());
  assert!(matches!(err, CoreError::EmptyField(_)));
}

#[tokio::test]
async fn rename_validates_and_follows_references() {
  let s = store().await;
  let e = s.insert_plan_entry(entry("Power BI", "Gerencia TI")).await.unwrap();

  let err = core(
    s.rename_option(LookupKind::Gerencia, "Gerencia TI".into(), "Gerencia TI".into())
      .await
      .unwrap_err(),
  );
  assert!(matches!(err, CoreError::UnchangedOption { .. }));

  let err = core(
    s.rename_option(LookupKind::Gerencia, "Gerencia TI".into(), "gerencia ventas".into())
      .await
      .unwrap_err(),
  );
  assert!(matches!(err, CoreError::DuplicateOption { .. }));

  let err = core(
    s.rename_option(LookupKind::Gerencia, "Gerencia Legal".into(), "Legal".into())
      .await
      .unwrap_err(),
  );
  assert!(err.is_not_found());

  s.rename_option(LookupKind::Gerencia, "Gerencia TI".into(), "Gerencia Tecnología".into())
    .await
    .unwrap();
  let fetched = s.get_plan_entry(e.id).await.unwrap().unwrap();
  assert_eq!(fetched.classification.gerencia, "Gerencia Tecnología");
}

#[tokio::test]
async fn rename_may_change_case_of_same_option() {
  let s = store().await;
  let renamed = s
    .rename_option(LookupKind::Prioridad, "Alta".into(), "ALTA".into())
    .await
    .unwrap();
  assert_eq!(renamed.name, "ALTA");
}

#[tokio::test]
async fn delete_refuses_referenced_options() {
  let s = store().await;
  s.insert_plan_entry(entry("Power BI", "Gerencia TI")).await.unwrap();

  let err = core(s.delete_option(LookupKind::Gerencia, "Gerencia TI".into()).await.unwrap_err());
  assert!(matches!(err, CoreError::OptionInUse { .. }));
  assert!(err.is_conflict());

  s.delete_option(LookupKind::Gerencia, "Gerencia Finanzas".into()).await.unwrap();
  let map = s.option_map(LookupKind::Gerencia).await.unwrap();
  assert!(!map.contains_key("Gerencia Finanzas"));
  assert!(map.contains_key("Gerencia TI"));

  let err = core(s.delete_option(LookupKind::Gerencia, "Gerencia Finanzas".into()).await.unwrap_err());
  assert!(err.is_not_found());
}

#[tokio::test]
async fn delete_counts_raw_needs_as_references() {
  let s = store().await;
  let r = respondent(&s, "ana").await;
  s.record_need(need(r, "Gerencia Operaciones")).await.unwrap();

  let err = core(
    s.delete_option(LookupKind::Gerencia, "Gerencia Operaciones".into())
      .await
      .unwrap_err(),
  );
  assert!(matches!(err, CoreError::OptionInUse { .. }));
}

#[tokio::test]
async fn origins_are_protected() {
  let s = store().await;
  let err = core(s.delete_option(LookupKind::Origen, "SGD".into()).await.unwrap_err());
  assert!(matches!(err, CoreError::ProtectedOption { .. }));

  let err = core(
    s.rename_option(LookupKind::Origen, "DNC".into(), "Encuesta".into())
      .await
      .unwrap_err(),
  );
  assert!(matches!(err, CoreError::ProtectedOption { kind: LookupKind::Origen, ref name } if name == "DNC"));
  assert!(err.is_conflict());
  assert!(s.option_map(LookupKind::Origen).await.unwrap().contains_key("DNC"));
}

#[tokio::test]
async fn names_with_commas_are_rejected() {
  let s = store().await;
  let err = core(s.add_option(LookupKind::Area, "Ventas, Marketing".into()).await.unwrap_err());
  assert!(matches!(err, CoreError::SeparatorInName(_)));

  let err = core(s.ensure_option(LookupKind::Area, "Ventas,Marketing".into()).await.unwrap_err());
  assert!(matches!(err, CoreError::SeparatorInName(_)));

  let err = core(
    s.rename_option(LookupKind::Gerencia, "Gerencia TI".into(), "TI, Datos".into())
      .await
      .unwrap_err(),
  );
  assert!(matches!(err, CoreError::SeparatorInName(_)));
}

#[tokio::test]
async fn unknown_names_are_rejected_and_not_applicable_is_null() {
  let s = store().await;
  let mut e = entry("Power BI", "Gerencia TI");
  e.classification.modalidad = "Telepatía".into();
  let err = core(s.insert_plan_entry(e).await.unwrap_err());
  assert!(matches!(err, CoreError::UnknownOption { kind: LookupKind::Modalidad, .. }));

  let mut e = entry("Power BI", "Gerencia TI");
  e.classification.subgerencia = Some("N/A".into());
  e.classification.area = Some("".into());
  let stored = s.insert_plan_entry(e).await.unwrap();
  assert_eq!(stored.classification.subgerencia, None);
  assert_eq!(stored.classification.area, None);
}

// ─── Intake ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn needs_resolve_names_and_count_per_respondent() {
  let s = store().await;
  let ana = respondent(&s, "ana").await;
  let luis = respondent(&s, "luis").await;

  let first = s.record_need(need(ana, "Gerencia TI")).await.unwrap();
  assert_eq!(first.respondent_name, "ana");
  assert_eq!(first.classification.subgerencia.as_deref(), Some("Infraestructura"));
  assert_eq!(first.fuente_interna.as_deref(), Some("Equipo TI"));
  s.record_need(need(ana, "Gerencia TI")).await.unwrap();
  s.record_need(need(luis, "Gerencia Ventas")).await.unwrap();

  assert_eq!(s.count_needs(ana).await.unwrap(), 2);
  assert_eq!(s.count_needs(luis).await.unwrap(), 1);

  let needs = s.list_needs().await.unwrap();
  assert_eq!(needs.len(), 3);
  assert_eq!(needs[0].respondent_name, "luis");
}

#[tokio::test]
async fn need_for_missing_respondent_fails() {
  let s = store().await;
  let err = core(s.record_need(need(42, "Gerencia TI")).await.unwrap_err());
  assert!(matches!(err, CoreError::RespondentNotFound(42)));
}

#[tokio::test]
async fn submit_need_creates_respondent_and_enforces_limit() {
  let s = store().await;
  let new = Submitter::New(NewRespondent { name: "ana".into(), email: "ana@example.com".into() });
  let (ana, first) = s.submit_need(new, need(0, "Gerencia TI"), 2).await.unwrap();
  assert_eq!(first.respondent_id, ana.id);
  assert_eq!(first.respondent_name, "ana");

  s.submit_need(Submitter::Existing { id: ana.id }, need(0, "Gerencia TI"), 2)
    .await
    .unwrap();
  let err = core(
    s.submit_need(Submitter::Existing { id: ana.id }, need(0, "Gerencia TI"), 2)
      .await
      .unwrap_err(),
  );
  assert!(matches!(err, CoreError::NeedLimitReached { limit: 2, .. }));
  assert_eq!(s.count_needs(ana.id).await.unwrap(), 2);

  let err = core(
    s.submit_need(Submitter::Existing { id: 42 }, need(0, "Gerencia TI"), 2)
      .await
      .unwrap_err(),
  );
  assert!(matches!(err, CoreError::RespondentNotFound(42)));
}

#[tokio::test]
async fn failed_submission_leaves_no_respondent() {
  let s = store().await;
  let mut bad = need(0, "Gerencia TI");
  bad.classification.audiencia = "Marcianos".into();
  let new = Submitter::New(NewRespondent { name: "ana".into(), email: "ana@example.com".into() });

  let err = core(s.submit_need(new, bad, 5).await.unwrap_err());
  assert!(matches!(err, CoreError::UnknownOption { kind: LookupKind::Audiencia, .. }));
  assert!(s.list_respondents().await.unwrap().is_empty());
  assert!(s.list_needs().await.unwrap().is_empty());
}

#[tokio::test]
async fn respondent_summaries_group_by_unit() {
  let s = store().await;
  let ana = respondent(&s, "ana").await;
  let _idle = respondent(&s, "pedro").await;
  s.record_need(need(ana, "Gerencia TI")).await.unwrap();
  s.record_need(need(ana, "Gerencia TI")).await.unwrap();
  s.record_need(need(ana, "Gerencia Ventas")).await.unwrap();

  let rows = s.list_respondents().await.unwrap();
  assert_eq!(rows.len(), 3);
  let ti = rows
    .iter()
    .find(|r| r.gerencia.as_deref() == Some("Gerencia TI"))
    .unwrap();
  assert_eq!(ti.needs, 2);
  let idle = rows.iter().find(|r| r.name == "pedro").unwrap();
  assert_eq!(idle.needs, 0);
  assert_eq!(idle.gerencia, None);
}

// ─── Plan ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn list_plan_orders_by_gerencia_and_filters() {
  let s = store().await;
  s.insert_plan_entry(entry("Negociación", "Gerencia Ventas")).await.unwrap();
  s.insert_plan_entry(entry("Redes", "Gerencia TI")).await.unwrap();
  let mut presencial = entry("Liderazgo", "Gerencia General");
  presencial.classification.modalidad = "Presencial".into();
  s.insert_plan_entry(presencial).await.unwrap();

  let all = s.list_plan(&PlanFilter::default()).await.unwrap();
  let gerencias: Vec<_> = all.iter().map(|e| e.classification.gerencia.as_str()).collect();
  assert_eq!(gerencias, ["Gerencia General", "Gerencia TI", "Gerencia Ventas"]);

  let filter = PlanFilter {
    modalidades: vec!["Virtual".into()],
    gerencias: vec!["Gerencia TI".into(), "Gerencia Ventas".into()],
    ..PlanFilter::default()
  };
  assert_eq!(s.list_plan(&filter).await.unwrap().len(), 2);

  let unknown = PlanFilter { gerencias: vec!["Gerencia Marte".into()], ..PlanFilter::default() };
  assert!(s.list_plan(&unknown).await.unwrap().is_empty());

  assert_eq!(s.list_plan(&PlanFilter::origin("DNC")).await.unwrap().len(), 0);
  assert_eq!(s.list_plan(&PlanFilter::origin("SGD")).await.unwrap().len(), 3);
}

#[tokio::test]
async fn update_replaces_fields_and_stamps_last_updated() {
  let s = store().await;
  let e = s.insert_plan_entry(entry("Redes", "Gerencia TI")).await.unwrap();
  assert!(e.last_updated.is_none());

  let mut edit = entry("Redes avanzadas", "Gerencia Operaciones");
  edit.fuente_interna = Some("Proveedor X".into());
  let updated = s.update_plan_entry(e.id, edit).await.unwrap();
  assert_eq!(updated.content.actividad_formativa, "Redes avanzadas");
  assert_eq!(updated.classification.gerencia, "Gerencia Operaciones");
  assert_eq!(updated.fuente_interna.as_deref(), Some("Proveedor X"));
  assert!(updated.last_updated.is_some());

  let err = core(s.update_plan_entry(999, entry("x", "Gerencia TI")).await.unwrap_err());
  assert!(matches!(err, CoreError::PlanEntryNotFound(999)));
}

#[tokio::test]
async fn synthesised_entries_need_only_an_activity() {
  let s = store().await;
  let mut e = entry("Excel", "Gerencia TI");
  e.content.skills = String::new();
  e.content.keywords = String::new();
  s.insert_plan_entry(e).await.unwrap();

  let mut e = entry(" ", "Gerencia TI");
  e.content.skills = String::new();
  let err = core(s.insert_plan_entry(e).await.unwrap_err());
  assert!(matches!(err, CoreError::EmptyField("actividad_formativa")));
}

#[tokio::test]
async fn delete_plan_entry_removes_dependents() {
  let s = store().await;
  let e = s.insert_plan_entry(entry("Redes", "Gerencia TI")).await.unwrap();
  s.associate_course(e.id, course(1)).await.unwrap();
  s.set_validation(e.id, true).await.unwrap();

  s.delete_plan_entry(e.id).await.unwrap();
  assert!(s.get_plan_entry(e.id).await.unwrap().is_none());

  let courses = s.list_courses().await.unwrap();
  assert_eq!(courses.len(), 1);
  assert!(courses[0].activities.is_empty());

  let err = core(s.delete_plan_entry(e.id).await.unwrap_err());
  assert!(err.is_not_found());
}

#[tokio::test]
async fn validation_flags_toggle() {
  let s = store().await;
  let e = s.insert_plan_entry(entry("Redes", "Gerencia TI")).await.unwrap();
  assert!(!e.validated);

  s.set_validation(e.id, true).await.unwrap();
  assert!(s.get_plan_entry(e.id).await.unwrap().unwrap().validated);
  let validated = PlanFilter { validated: Some(true), ..PlanFilter::default() };
  assert_eq!(s.list_plan(&validated).await.unwrap().len(), 1);

  s.set_validation(e.id, false).await.unwrap();
  assert_eq!(s.list_plan(&validated).await.unwrap().len(), 0);
}

#[tokio::test]
async fn catalog_candidates_are_virtual_external_by_activity() {
  let s = store().await;
  s.insert_plan_entry(entry("Python", "Gerencia TI")).await.unwrap();
  s.insert_plan_entry(entry("Excel", "Gerencia Finanzas")).await.unwrap();
  let mut internal = entry("Inducción", "Gerencia General");
  internal.classification.fuente = "Interna".into();
  s.insert_plan_entry(internal).await.unwrap();

  let candidates = s.catalog_candidates().await.unwrap();
  let names: Vec<_> = candidates.iter().map(|e| e.content.actividad_formativa.as_str()).collect();
  assert_eq!(names, ["Excel", "Python"]);
}

#[tokio::test]
async fn snapshot_uses_names() {
  let s = store().await;
  s.insert_plan_entry(entry("Python", "Gerencia TI")).await.unwrap();
  let snapshot = s.plan_snapshot().await.unwrap();
  assert_eq!(snapshot.len(), 1);
  assert_eq!(snapshot[0].gerencia, "Gerencia TI");
  assert_eq!(snapshot[0].actividad_formativa, "Python");
}

// ─── Courses ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn associating_replaces_previous_course() {
  let s = store().await;
  let e = s.insert_plan_entry(entry("Python", "Gerencia TI")).await.unwrap();

  s.associate_course(e.id, course(1)).await.unwrap();
  s.associate_course(e.id, course(2)).await.unwrap();

  let fetched = s.get_plan_entry(e.id).await.unwrap().unwrap();
  assert_eq!(fetched.linkedin_course.unwrap().urn, "urn:li:lyndaCourse:2");

  let with = PlanFilter { association: Some(Association::With), ..PlanFilter::default() };
  assert_eq!(s.list_plan(&with).await.unwrap().len(), 1);
}

#[tokio::test]
async fn course_upsert_is_keyed_by_urn() {
  let s = store().await;
  let a = s.insert_plan_entry(entry("Python", "Gerencia TI")).await.unwrap();
  let b = s.insert_plan_entry(entry("SQL", "Gerencia TI")).await.unwrap();

  let first = s.associate_course(a.id, course(7)).await.unwrap();
  let mut renamed = course(7);
  renamed.title = "Curso 7 (2024)".into();
  renamed.url = None;
  let second = s.associate_course(b.id, renamed).await.unwrap();
  assert_eq!(first.id, second.id);
  assert_eq!(second.title, "Curso 7 (2024)");
  assert!(second.url.is_some());

  let courses = s.list_courses().await.unwrap();
  assert_eq!(courses.len(), 1);
  assert_eq!(courses[0].activity_count(), 2);
}

#[tokio::test]
async fn associate_many_is_all_or_nothing() {
  let s = store().await;
  let a = s.insert_plan_entry(entry("Python", "Gerencia TI")).await.unwrap();

  let err = core(s.associate_course_many(course(3), vec![a.id, 999]).await.unwrap_err());
  assert!(matches!(err, CoreError::PlanEntryNotFound(999)));
  assert!(s.list_courses().await.unwrap().is_empty());

  let b = s.insert_plan_entry(entry("SQL", "Gerencia TI")).await.unwrap();
  s.associate_course_many(course(3), vec![a.id, b.id]).await.unwrap();
  let courses = s.list_courses().await.unwrap();
  assert_eq!(courses[0].activities, ["Python", "SQL"]);
}

#[tokio::test]
async fn set_course_by_title() {
  let s = store().await;
  let a = s.insert_plan_entry(entry("Python", "Gerencia TI")).await.unwrap();
  let b = s.insert_plan_entry(entry("SQL", "Gerencia TI")).await.unwrap();
  s.associate_course(a.id, course(1)).await.unwrap();

  let set = s.set_plan_course_by_title(b.id, Some("Curso 1".into())).await.unwrap();
  assert_eq!(set.unwrap().urn, "urn:li:lyndaCourse:1");

  let err = core(
    s.set_plan_course_by_title(b.id, Some("Curso inexistente".into()))
      .await
      .unwrap_err(),
  );
  assert!(matches!(err, CoreError::CourseNotFound(_)));

  assert!(s.set_plan_course_by_title(a.id, None).await.unwrap().is_none());
  assert!(s.get_plan_entry(a.id).await.unwrap().unwrap().linkedin_course.is_none());
}

#[tokio::test]
async fn invalid_urn_is_rejected() {
  let s = store().await;
  let a = s.insert_plan_entry(entry("Python", "Gerencia TI")).await.unwrap();
  let bad = CourseRef { urn: "lyndaCourse:1".into(), title: "x".into(), url: None };
  let err = core(s.associate_course(a.id, bad).await.unwrap_err());
  assert!(matches!(err, CoreError::InvalidUrn(_)));
}

// ─── Reporting ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn metrics_and_breakdowns() {
  let s = store().await;
  let a = s.insert_plan_entry(entry("Python", "Gerencia TI")).await.unwrap();
  let b = s.insert_plan_entry(entry("SQL", "Gerencia TI")).await.unwrap();
  s.insert_plan_entry(entry("Ventas 101", "Gerencia Ventas")).await.unwrap();
  s.associate_course_many(course(1), vec![a.id, b.id]).await.unwrap();
  s.set_validation(a.id, true).await.unwrap();

  let m = s.plan_metrics(&PlanFilter::default()).await.unwrap();
  assert_eq!(m.activities, 3);
  assert_eq!(m.linked_courses, 1);
  assert_eq!(m.validation.validated, 1);
  assert_eq!(m.validation.pending, 2);
  assert_eq!(m.validation.percentage, 33.3);

  let rows = s.breakdown(LookupKind::Gerencia, None).await.unwrap();
  assert_eq!(rows[0].name, "Gerencia TI");
  assert_eq!(rows[0].count, 2);
  assert_eq!(rows[1].count, 1);

  assert!(s.breakdown(LookupKind::Area, None).await.unwrap().is_empty());

  let usage = s.association_usage(None).await.unwrap();
  assert_eq!((usage.with_course, usage.without_course), (2, 1));
}

#[tokio::test]
async fn summary_and_trend_respect_origin() {
  let s = store().await;
  let ana = respondent(&s, "ana").await;
  let _idle = respondent(&s, "pedro").await;
  s.record_need(need(ana, "Gerencia TI")).await.unwrap();
  s.record_need(need(ana, "Gerencia TI")).await.unwrap();
  s.insert_plan_entry(entry("Python", "Gerencia TI")).await.unwrap();

  let all = s.summary_metrics(None).await.unwrap();
  assert_eq!((all.respondents, all.needs, all.activities), (2, 2, 1));

  let dnc = s.summary_metrics(Some("DNC".into())).await.unwrap();
  assert_eq!((dnc.respondents, dnc.needs, dnc.activities), (1, 2, 0));

  let trend = s.submission_trend(None).await.unwrap();
  assert_eq!(trend.len(), 1);
  assert_eq!(trend[0].month.len(), 7);
  assert_eq!((trend[0].respondents, trend[0].needs), (1, 2));
  assert!(s.submission_trend(Some("SGD".into())).await.unwrap().is_empty());
}
