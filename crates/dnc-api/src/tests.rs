//! Router tests against an in-memory store with stand-ins for the LLM and
//! the course catalog.

use std::sync::Arc;

use axum::{
  Router,
  body::Body,
  http::{Request, StatusCode, header},
};
use dnc_core::{
  DomainError, Error as CoreError,
  course::{CatalogCourse, CatalogSearch, CourseQuery, CourseRecommendation},
  plan::{ActivityContent, NeedDigest, PlanDigest},
  service::{CourseCatalog, Synthesizer},
  store::PlanStore,
};
use dnc_store_sqlite::SqliteStore;
use serde_json::{Value, json};
use tower::ServiceExt as _;

use crate::{Services, api_router};

// ─── Stand-ins ───────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
#[error("llm unavailable")]
struct Down;

impl DomainError for Down {
  fn domain(&self) -> Option<&CoreError> { None }

  fn public_message(&self) -> Option<String> { Some("Error de IA al obtener recomendaciones.".into()) }
}

struct FakeLlm {
  fail: bool,
}

impl Synthesizer for FakeLlm {
  type Error = Down;

  async fn synthesize(&self, needs: &[NeedDigest], _plan: &[PlanDigest]) -> Result<Vec<ActivityContent>, Down> {
    if self.fail {
      return Err(Down);
    }
    let need = &needs[0];
    Ok(vec![
      ActivityContent {
        actividad_formativa:    format!("Taller: {}", need.aprendizajes),
        objetivo_desempeno:     "Aplicar lo aprendido".into(),
        contenidos_especificos: "Módulo 1".into(),
        skills:                 "Análisis".into(),
        keywords:               "datos".into(),
      },
      ActivityContent { actividad_formativa: "Mentoría".into(), ..ActivityContent::default() },
    ])
  }

  async fn rank_courses(
    &self,
    activity: &PlanDigest,
    candidates: &[CatalogCourse],
  ) -> Result<Vec<CourseRecommendation>, Down> {
    if self.fail {
      return Err(Down);
    }
    Ok(
      candidates
        .iter()
        .rev()
        .map(|c| CourseRecommendation {
          urn:    c.urn.clone(),
          title:  c.title.clone(),
          reason: Some(activity.actividad_formativa.clone()),
        })
        .collect(),
    )
  }
}

struct FakeCatalog;

fn catalog_course(n: u32) -> CatalogCourse {
  CatalogCourse {
    urn:              format!("urn:li:lyndaCourse:{n}"),
    title:            format!("Curso {n}"),
    level:            "Principiante".into(),
    duration_minutes: Some(45),
    description:      None,
    url:              None,
  }
}

impl CourseCatalog for FakeCatalog {
  type Error = CoreError;

  async fn search(&self, query: &CourseQuery) -> Result<CatalogSearch, CoreError> {
    query.validate()?;
    Ok(CatalogSearch { total: 2, courses: vec![catalog_course(1), catalog_course(2)] })
  }

  async fn lookup(&self, urn: &str) -> Result<Option<CatalogCourse>, CoreError> {
    dnc_core::course::validate_urn(urn)?;
    Ok((urn == "urn:li:lyndaCourse:1").then(|| catalog_course(1)))
  }
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

async fn app_with(fail: bool, max_needs: u32) -> Router {
  let store = SqliteStore::open_in_memory().await.unwrap();
  store.seed_defaults().await.unwrap();
  let services = Services::new(Arc::new(store), FakeLlm { fail }, FakeCatalog).with_max_needs(max_needs);
  api_router(Arc::new(services))
}

async fn app() -> Router { app_with(false, 5).await }

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
  let builder = Request::builder().method(method).uri(uri);
  let req = match body {
    Some(v) => builder
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from(v.to_string()))
      .unwrap(),
    None => builder.body(Body::empty()).unwrap(),
  };
  let resp = app.clone().oneshot(req).await.unwrap();
  let status = resp.status();
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
  (status, value)
}

fn plan_body(activity: &str) -> Value {
  json!({
    "origin": "SGD",
    "gerencia": "Gerencia TI",
    "subgerencia": "Infraestructura",
    "area": "N/A",
    "desafio": "Reducir costos",
    "audiencia": "Técnicos",
    "modalidad": "Virtual",
    "fuente": "Externa",
    "prioridad": "Alta",
    "actividad_formativa": activity,
    "objetivo_desempeno": "Operar la red",
    "contenidos_especificos": "VLAN, routing",
    "skills": "Redes",
    "keywords": "cisco"
  })
}

fn submission(respondent: Value) -> Value {
  json!({
    "respondent": respondent,
    "gerencia": "Gerencia Finanzas",
    "subgerencia": "Contabilidad",
    "desafio": "Mejorar la eficiencia operativa",
    "audiencia": "Analistas",
    "modalidad": "Presencial",
    "fuente": "Interna",
    "prioridad": "Media",
    "cambios": "Nuevo ERP",
    "que_falta": "Conocer el módulo contable",
    "aprendizajes": "ERP contable"
  })
}

fn new_respondent() -> Value { json!({ "name": "Ana Pérez", "email": "ana@example.com" }) }

// ─── Lookups ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn lookup_add_rename_delete() {
  let app = app().await;

  let (status, body) = send(&app, "POST", "/lookups/modalidad", Some(json!({ "name": " Blended " }))).await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(body["name"], "Blended");

  let (status, _) = send(&app, "POST", "/lookups/modalidad", Some(json!({ "name": "VIRTUAL" }))).await;
  assert_eq!(status, StatusCode::CONFLICT);

  let (status, body) = send(
    &app,
    "PUT",
    "/lookups/modalidad",
    Some(json!({ "old": "Blended", "new": "Mixta" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["name"], "Mixta");

  let (_, body) = send(&app, "GET", "/lookups/modalidad", None).await;
  let names: Vec<_> = body.as_array().unwrap().iter().map(|o| o["name"].as_str().unwrap()).collect();
  assert!(names.contains(&"Mixta"));
  assert!(!names.contains(&"Blended"));

  let (status, _) = send(&app, "DELETE", "/lookups/modalidad/Mixta", None).await;
  assert_eq!(status, StatusCode::NO_CONTENT);
  let (status, _) = send(&app, "DELETE", "/lookups/modalidad/Mixta", None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn lookup_guards() {
  let app = app().await;
  send(&app, "POST", "/plan", Some(plan_body("CCNA"))).await;

  let (status, body) = send(&app, "DELETE", "/lookups/modalidad/Virtual", None).await;
  assert_eq!(status, StatusCode::CONFLICT);
  assert!(body["error"].as_str().unwrap().contains("in use"));

  let (status, _) = send(&app, "DELETE", "/lookups/origen/SGD", None).await;
  assert_eq!(status, StatusCode::CONFLICT);

  let (status, body) =
    send(&app, "PUT", "/lookups/origen", Some(json!({ "old": "DNC", "new": "Encuesta" }))).await;
  assert_eq!(status, StatusCode::CONFLICT);
  assert!(body["error"].as_str().unwrap().contains("protected"));
  let (_, body) = send(&app, "GET", "/lookups", None).await;
  assert!(body["origen"]["DNC"].is_i64());

  let (status, _) = send(&app, "GET", "/lookups/colores", None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);

  let (status, _) = send(&app, "POST", "/lookups/area", Some(json!({ "name": "  " }))).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn option_names_cannot_hold_the_filter_separator() {
  let app = app().await;

  let (status, body) = send(&app, "POST", "/lookups/area", Some(json!({ "name": "A, B" }))).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].as_str().unwrap().contains("commas"));

  let (status, _) = send(
    &app,
    "PUT",
    "/lookups/gerencia",
    Some(json!({ "old": "Gerencia TI", "new": "Gerencia TI, Datos" })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);

  let (_, body) = send(&app, "GET", "/lookups/area", None).await;
  assert!(body.as_array().unwrap().iter().all(|o| !o["name"].as_str().unwrap().contains(',')));
}

#[tokio::test]
async fn vocabulary_and_seed() {
  let app = app().await;

  let (_, body) = send(&app, "GET", "/lookups", None).await;
  assert!(body["gerencia"]["Gerencia TI"].is_i64());
  assert!(body["origen"]["DNC"].is_i64());

  let (status, body) = send(&app, "POST", "/admin/seed", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["added"], 0);
}

// ─── Plan ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn manual_entries_need_every_field() {
  let app = app().await;
  let mut body = plan_body("CCNA");
  body["objetivo_desempeno"] = json!(" ");
  let (status, body) = send(&app, "POST", "/plan", Some(body)).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].as_str().unwrap().contains("objetivo_desempeno"));

  let mut body = plan_body("CCNA");
  body["gerencia"] = json!("Gerencia Marte");
  let (status, _) = send(&app, "POST", "/plan", Some(body)).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn plan_crud_and_filters() {
  let app = app().await;
  let (status, created) = send(&app, "POST", "/plan", Some(plan_body("CCNA"))).await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(created["area"], Value::Null);
  assert_eq!(created["validated"], false);
  let id = created["id"].as_i64().unwrap();

  let mut other = plan_body("Excel avanzado");
  other["gerencia"] = json!("Gerencia Ventas");
  send(&app, "POST", "/plan", Some(other)).await;

  let (_, rows) = send(&app, "GET", "/plan?gerencia=Gerencia%20TI,Gerencia%20General", None).await;
  assert_eq!(rows.as_array().unwrap().len(), 1);
  assert_eq!(rows[0]["actividad_formativa"], "CCNA");

  let (_, rows) = send(&app, "GET", "/plan?origin=DNC", None).await;
  assert!(rows.as_array().unwrap().is_empty());

  let mut edit = plan_body("CCNA 200-301");
  edit["prioridad"] = json!("Baja");
  let (status, updated) = send(&app, "PUT", &format!("/plan/{id}"), Some(edit)).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(updated["prioridad"], "Baja");
  assert!(updated["last_updated"].is_string());

  let (status, _) = send(
    &app,
    "PUT",
    &format!("/plan/{id}/validation"),
    Some(json!({ "validated": true })),
  )
  .await;
  assert_eq!(status, StatusCode::NO_CONTENT);
  let (_, rows) = send(&app, "GET", "/plan?validated=true", None).await;
  assert_eq!(rows.as_array().unwrap().len(), 1);
  assert_eq!(rows[0]["id"], id);

  let (status, _) = send(&app, "DELETE", &format!("/plan/{id}"), None).await;
  assert_eq!(status, StatusCode::NO_CONTENT);
  let (status, _) = send(&app, "GET", &format!("/plan/{id}"), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  let (status, _) = send(&app, "PUT", "/plan/999/validation", Some(json!({ "validated": true }))).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn course_links() {
  let app = app().await;
  let (_, a) = send(&app, "POST", "/plan", Some(plan_body("CCNA"))).await;
  let (_, b) = send(&app, "POST", "/plan", Some(plan_body("Linux"))).await;
  let (a, b) = (a["id"].as_i64().unwrap(), b["id"].as_i64().unwrap());

  let course = json!({ "urn": "urn:li:lyndaCourse:1", "title": "Curso 1" });
  let (status, stored) = send(&app, "POST", &format!("/plan/{a}/course"), Some(course.clone())).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(stored["urn"], "urn:li:lyndaCourse:1");

  let (_, rows) = send(&app, "GET", "/plan?association=without", None).await;
  assert_eq!(rows.as_array().unwrap().len(), 1);
  assert_eq!(rows[0]["id"], b);

  let (status, _) = send(&app, "POST", "/courses", Some(json!({ "course": course, "plan_ids": [b, 999] }))).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  let (status, _) = send(&app, "POST", "/courses", Some(json!({ "course": course, "plan_ids": [] }))).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  let (status, _) = send(&app, "POST", "/courses", Some(json!({ "course": course, "plan_ids": [b] }))).await;
  assert_eq!(status, StatusCode::OK);

  let (_, courses) = send(&app, "GET", "/courses", None).await;
  assert_eq!(courses.as_array().unwrap().len(), 1);
  assert_eq!(courses[0]["activities"].as_array().unwrap().len(), 2);

  let (status, cleared) = send(&app, "PUT", &format!("/plan/{a}/course"), Some(json!({ "title": null }))).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(cleared, Value::Null);
  let (status, _) = send(&app, "PUT", &format!("/plan/{a}/course"), Some(json!({ "title": "Curso 9" }))).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  let (status, relinked) = send(&app, "PUT", &format!("/plan/{a}/course"), Some(json!({ "title": "Curso 1" }))).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(relinked["title"], "Curso 1");

  let (status, _) = send(
    &app,
    "POST",
    &format!("/plan/{a}/course"),
    Some(json!({ "urn": "lyndaCourse:1", "title": "Curso 1" })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn catalog_candidates_are_virtual_and_external() {
  let app = app().await;
  send(&app, "POST", "/plan", Some(plan_body("Zabbix"))).await;
  let mut onsite = plan_body("Cableado");
  onsite["modalidad"] = json!("Presencial");
  send(&app, "POST", "/plan", Some(onsite)).await;
  send(&app, "POST", "/plan", Some(plan_body("Ansible"))).await;

  let (_, rows) = send(&app, "GET", "/catalog/candidates", None).await;
  let names: Vec<_> = rows
    .as_array()
    .unwrap()
    .iter()
    .map(|r| r["actividad_formativa"].as_str().unwrap())
    .collect();
  assert_eq!(names, ["Ansible", "Zabbix"]);
}

// ─── Submissions ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn submission_records_need_and_synthesises_entries() {
  let app = app().await;
  let (status, body) = send(&app, "POST", "/submissions", Some(submission(new_respondent()))).await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(body["respondent"]["name"], "Ana Pérez");
  assert_eq!(body["need"]["origin"], "DNC");
  assert_eq!(body["synthesis_error"], Value::Null);

  let entries = body["entries"].as_array().unwrap();
  assert_eq!(entries.len(), 2);
  assert_eq!(entries[0]["actividad_formativa"], "Taller: ERP contable");
  assert_eq!(entries[0]["gerencia"], "Gerencia Finanzas");
  assert_eq!(entries[0]["origin"], "DNC");
  assert_eq!(entries[1]["objetivo_desempeno"], "");

  let (_, rows) = send(&app, "GET", "/plan?origin=DNC", None).await;
  assert_eq!(rows.as_array().unwrap().len(), 2);

  let (_, respondents) = send(&app, "GET", "/respondents", None).await;
  assert_eq!(respondents[0]["needs"], 1);
  assert_eq!(respondents[0]["gerencia"], "Gerencia Finanzas");
}

#[tokio::test]
async fn failed_synthesis_keeps_the_need() {
  let app = app_with(true, 5).await;
  let (status, body) = send(&app, "POST", "/submissions", Some(submission(new_respondent()))).await;
  assert_eq!(status, StatusCode::CREATED);
  assert!(body["entries"].as_array().unwrap().is_empty());
  assert!(body["synthesis_error"].as_str().unwrap().starts_with("Error de IA"));

  let (_, needs) = send(&app, "GET", "/needs", None).await;
  assert_eq!(needs.as_array().unwrap().len(), 1);
  assert_eq!(needs[0]["que_falta"], "Conocer el módulo contable");
}

#[tokio::test]
async fn need_limit_per_respondent() {
  let app = app_with(false, 1).await;
  let (_, first) = send(&app, "POST", "/submissions", Some(submission(new_respondent()))).await;
  let id = first["respondent"]["id"].as_i64().unwrap();

  let (status, body) = send(&app, "POST", "/submissions", Some(submission(json!({ "id": id })))).await;
  assert_eq!(status, StatusCode::CONFLICT);
  assert!(body["error"].as_str().unwrap().contains("1 needs"));

  let (status, _) = send(&app, "POST", "/submissions", Some(submission(json!({ "id": 999 })))).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invalid_submission_records_no_need() {
  let app = app().await;
  let mut body = submission(new_respondent());
  body["cambios"] = json!("");
  let (status, _) = send(&app, "POST", "/submissions", Some(body)).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);

  let mut body = submission(new_respondent());
  body["audiencia"] = json!("Marcianos");
  let (status, _) = send(&app, "POST", "/submissions", Some(body)).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);

  let (_, needs) = send(&app, "GET", "/needs", None).await;
  assert!(needs.as_array().unwrap().is_empty());
  let (_, respondents) = send(&app, "GET", "/respondents", None).await;
  assert!(respondents.as_array().unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_submissions_respect_the_need_limit() {
  let app = app_with(false, 1).await;
  let (status, respondent) = send(&app, "POST", "/respondents", Some(new_respondent())).await;
  assert_eq!(status, StatusCode::CREATED);
  let id = respondent["id"].as_i64().unwrap();

  let tasks: Vec<_> = (0..8)
    .map(|_| {
      let app = app.clone();
      tokio::spawn(async move { send(&app, "POST", "/submissions", Some(submission(json!({ "id": id })))).await.0 })
    })
    .collect();
  let mut statuses = Vec::with_capacity(tasks.len());
  for task in tasks {
    statuses.push(task.await.unwrap());
  }

  assert_eq!(statuses.iter().filter(|s| **s == StatusCode::CREATED).count(), 1);
  assert!(statuses.iter().all(|s| *s == StatusCode::CREATED || *s == StatusCode::CONFLICT));
  let (_, needs) = send(&app, "GET", "/needs", None).await;
  assert_eq!(needs.as_array().unwrap().len(), 1);
}

// ─── Catalog ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn catalog_search_and_lookup() {
  let app = app().await;
  let (status, body) = send(&app, "POST", "/catalog/search", Some(json!({ "keywords": "excel" }))).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["total"], 2);

  let (status, _) = send(&app, "POST", "/catalog/search", Some(json!({ "keywords": " " }))).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);

  let (status, body) = send(&app, "GET", "/catalog/courses/urn:li:lyndaCourse:1", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["title"], "Curso 1");

  let (status, _) = send(&app, "GET", "/catalog/courses/urn:li:lyndaCourse:5", None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  let (status, _) = send(&app, "GET", "/catalog/courses/curso-5", None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn rank_uses_the_plan_entry() {
  let app = app().await;
  let (_, entry) = send(&app, "POST", "/plan", Some(plan_body("CCNA"))).await;
  let courses = json!([catalog_course(1), catalog_course(2)]);

  let (status, body) = send(
    &app,
    "POST",
    "/catalog/rank",
    Some(json!({ "plan_id": entry["id"], "courses": courses })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body[0]["urn"], "urn:li:lyndaCourse:2");
  assert_eq!(body[0]["reason"], "CCNA");

  let (status, _) = send(&app, "POST", "/catalog/rank", Some(json!({ "plan_id": 999, "courses": courses }))).await;
  assert_eq!(status, StatusCode::NOT_FOUND);

  let app = app_with(true, 5).await;
  let (_, entry) = send(&app, "POST", "/plan", Some(plan_body("CCNA"))).await;
  let (status, body) = send(
    &app,
    "POST",
    "/catalog/rank",
    Some(json!({ "plan_id": entry["id"], "courses": courses })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_GATEWAY);
  assert!(body["error"].as_str().unwrap().starts_with("Error de IA"));
}

// ─── Metrics ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn metrics_endpoints() {
  let app = app().await;
  send(&app, "POST", "/submissions", Some(submission(new_respondent()))).await;
  let (_, entry) = send(&app, "POST", "/plan", Some(plan_body("CCNA"))).await;
  send(
    &app,
    "PUT",
    &format!("/plan/{}/validation", entry["id"]),
    Some(json!({ "validated": true })),
  )
  .await;

  let (_, summary) = send(&app, "GET", "/metrics/summary", None).await;
  assert_eq!(summary["respondents"], 1);
  assert_eq!(summary["needs"], 1);
  assert_eq!(summary["activities"], 3);
  assert_eq!(summary["validation"]["validated"], 1);

  let (_, plan) = send(&app, "GET", "/metrics/plan?origin=DNC", None).await;
  assert_eq!(plan["activities"], 2);
  assert_eq!(plan["validation"]["percentage"], 0.0);

  let (_, rows) = send(&app, "GET", "/metrics/breakdown/modalidad", None).await;
  assert_eq!(rows[0]["name"], "Presencial");
  assert_eq!(rows[0]["count"], 2);

  let (_, usage) = send(&app, "GET", "/metrics/associations?origin=SGD", None).await;
  assert_eq!(usage["without_course"], 1);

  let (_, trend) = send(&app, "GET", "/metrics/trend", None).await;
  assert_eq!(trend.as_array().unwrap().len(), 1);
  assert_eq!(trend[0]["needs"], 1);

  let (status, _) = send(&app, "GET", "/metrics/breakdown/colores", None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}
