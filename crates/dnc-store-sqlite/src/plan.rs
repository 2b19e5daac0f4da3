//! Synchronous queries over the training matrix and its course associations.

use chrono::{DateTime, Utc};
use dnc_core::{
  Error as CoreError,
  course::{CourseRef, LinkedInCourse},
  lookup::LookupKind,
  plan::{Association, NewPlanEntry, PlanEntry, PlanFilter},
  report::{PlanMetrics, ValidationStats},
};
use rusqlite::{Connection, OptionalExtension as _, types::Value};

use crate::{
  Result,
  encode::{RawPlanEntry, encode_dt, encode_optional_text},
  lookup::{ResolvedClassification, resolve},
};

/// Select list decoded by [`RawPlanEntry::from_row`].
pub const PLAN_COLUMNS: &str = "
  fm.id, o.name, g.name, sg.name, a.name, d.name, au.name, m.name, f.name, p.name,
  fm.actividad_formativa, fm.objetivo_desempeno, fm.contenidos_especificos,
  fm.skills, fm.keywords, fm.fuente_interna,
  lc.id, lc.linkedin_urn, lc.linkedin_course, lc.linkedin_url,
  COALESCE(vm.validated, 0), fm.created_at, fm.last_updated";

/// `final_matrix` joined with every lookup, its course and its validation
/// flag. Each entry yields exactly one row.
pub const PLAN_JOINS: &str = "
  final_matrix fm
  JOIN origins          o  ON o.id  = fm.origin_id
  JOIN gerencias        g  ON g.id  = fm.gerencia_id
  LEFT JOIN subgerencias sg ON sg.id = fm.subgerencia_id
  LEFT JOIN areas        a  ON a.id  = fm.area_id
  JOIN desafios         d  ON d.id  = fm.desafio_id
  JOIN audiencias       au ON au.id = fm.audiencia_id
  JOIN modalidades      m  ON m.id  = fm.modalidad_id
  JOIN fuentes          f  ON f.id  = fm.fuente_id
  JOIN prioridades      p  ON p.id  = fm.prioridad_id
  LEFT JOIN matrix_linkedin_courses mlc ON mlc.matrix_id = fm.id
  LEFT JOIN linkedin_courses        lc  ON lc.id = mlc.course_id
  LEFT JOIN validated_matrix        vm  ON vm.matrix_id = fm.id";

pub const ORDER_BY_GERENCIA: &str = "g.name, fm.id";
pub const ORDER_BY_ACTIVITY: &str = "fm.actividad_formativa, fm.id";

/// Alias of each lookup table inside [`PLAN_JOINS`].
pub fn alias(kind: LookupKind) -> &'static str {
  match kind {
    LookupKind::Gerencia => "g",
    LookupKind::Subgerencia => "sg",
    LookupKind::Area => "a",
    LookupKind::Desafio => "d",
    LookupKind::Audiencia => "au",
    LookupKind::Modalidad => "m",
    LookupKind::Fuente => "f",
    LookupKind::Prioridad => "p",
    LookupKind::Origen => "o",
  }
}

// ─── WHERE builder ───────────────────────────────────────────────────────────

/// A conjunction of conditions with positional parameters.
#[derive(Default)]
pub struct Where {
  conds:  Vec<String>,
  params: Vec<Value>,
}

impl Where {
  pub fn from_filter(filter: &PlanFilter) -> Self {
    let mut w = Self::default();
    if let Some(origin) = &filter.origin {
      w.push("o.name = ?", Value::Text(origin.trim().to_owned()));
    }
    for (kind, names) in filter.name_sets() {
      w.push_in(&format!("{}.name", alias(kind)), names);
    }
    match filter.association {
      Some(Association::With) => w.push_cond("mlc.matrix_id IS NOT NULL"),
      Some(Association::Without) => w.push_cond("mlc.matrix_id IS NULL"),
      None => {}
    }
    if let Some(validated) = filter.validated {
      w.push("COALESCE(vm.validated, 0) = ?", Value::Integer(validated.into()));
    }
    w
  }

  /// A condition without parameters.
  pub fn push_cond(&mut self, cond: impl Into<String>) { self.conds.push(cond.into()); }

  pub fn push(&mut self, cond: &str, value: Value) {
    self.conds.push(cond.to_owned());
    self.params.push(value);
  }

  /// `column IN (...)`; an empty set adds nothing.
  pub fn push_in(&mut self, column: &str, names: &[String]) {
    if names.is_empty() {
      return;
    }
    let marks = vec!["?"; names.len()].join(", ");
    self.conds.push(format!("{column} IN ({marks})"));
    self.params.extend(names.iter().map(|n| Value::Text(n.trim().to_owned())));
  }

  pub fn sql(&self) -> String {
    if self.conds.is_empty() {
      String::new()
    } else {
      format!("WHERE {}", self.conds.join(" AND "))
    }
  }

  pub fn params(&self) -> rusqlite::ParamsFromIter<std::slice::Iter<'_, Value>> {
    rusqlite::params_from_iter(self.params.iter())
  }
}

// ─── Reads ───────────────────────────────────────────────────────────────────

pub fn select(conn: &Connection, w: &Where, order: &str) -> Result<Vec<PlanEntry>> {
  let sql = format!("SELECT {PLAN_COLUMNS} FROM {PLAN_JOINS} {} ORDER BY {order}", w.sql());
  let mut stmt = conn.prepare(&sql)?;
  let raws = stmt
    .query_map(w.params(), RawPlanEntry::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  raws.into_iter().map(RawPlanEntry::into_plan_entry).collect()
}

pub fn get(conn: &Connection, id: i64) -> Result<Option<PlanEntry>> {
  let mut w = Where::default();
  w.push("fm.id = ?", Value::Integer(id));
  Ok(select(conn, &w, ORDER_BY_GERENCIA)?.into_iter().next())
}

pub fn exists(conn: &Connection, id: i64) -> Result<bool> {
  let found = conn
    .query_row("SELECT 1 FROM final_matrix WHERE id = ?1", [id], |_| Ok(()))
    .optional()?;
  Ok(found.is_some())
}

pub fn require(conn: &Connection, id: i64) -> Result<()> {
  if exists(conn, id)? { Ok(()) } else { Err(CoreError::PlanEntryNotFound(id).into()) }
}

pub fn metrics(conn: &Connection, w: &Where) -> Result<PlanMetrics> {
  let sql = format!(
    "SELECT COUNT(*), COUNT(DISTINCT mlc.course_id), COALESCE(SUM(COALESCE(vm.validated, 0)), 0)
     FROM {PLAN_JOINS} {}",
    w.sql()
  );
  let (total, linked, validated): (i64, i64, i64) =
    conn.query_row(&sql, w.params(), |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)))?;
  Ok(PlanMetrics {
    activities:     total as u64,
    linked_courses: linked as u64,
    validation:     ValidationStats::new(validated as u64, total as u64),
  })
}

// ─── Writes ──────────────────────────────────────────────────────────────────

/// Resolved foreign keys plus the text columns of a plan entry.
struct Resolved {
  origin: i64,
  class:  ResolvedClassification,
  input:  NewPlanEntry,
}

impl Resolved {
  /// Synthesised entries may leave everything but the activity name blank.
  fn resolve(conn: &Connection, input: NewPlanEntry) -> Result<Self> {
    if input.content.actividad_formativa.trim().is_empty() {
      return Err(CoreError::EmptyField("actividad_formativa").into());
    }
    let origin = resolve(conn, LookupKind::Origen, &input.origin)?;
    let class = ResolvedClassification::resolve(conn, &input.classification)?;
    Ok(Self { origin, class, input })
  }
}

pub fn insert(conn: &Connection, input: NewPlanEntry, now: DateTime<Utc>) -> Result<i64> {
  let Resolved { origin, class, input } = Resolved::resolve(conn, input)?;
  let c = input.content;
  conn.execute(
    "INSERT INTO final_matrix (
       origin_id, gerencia_id, subgerencia_id, area_id, desafio_id,
       audiencia_id, modalidad_id, fuente_id, prioridad_id,
       actividad_formativa, objetivo_desempeno, contenidos_especificos,
       skills, keywords, fuente_interna, created_at
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
    rusqlite::params![
      origin,
      class.gerencia,
      class.subgerencia,
      class.area,
      class.desafio,
      class.audiencia,
      class.modalidad,
      class.fuente,
      class.prioridad,
      c.actividad_formativa.trim(),
      c.objetivo_desempeno.trim(),
      c.contenidos_especificos.trim(),
      c.skills.trim(),
      c.keywords.trim(),
      encode_optional_text(input.fuente_interna),
      encode_dt(now),
    ],
  )?;
  Ok(conn.last_insert_rowid())
}

pub fn update(conn: &Connection, id: i64, input: NewPlanEntry, now: DateTime<Utc>) -> Result<()> {
  require(conn, id)?;
  let Resolved { origin, class, input } = Resolved::resolve(conn, input)?;
  let c = input.content;
  conn.execute(
    "UPDATE final_matrix SET
       origin_id = ?1, gerencia_id = ?2, subgerencia_id = ?3, area_id = ?4,
       desafio_id = ?5, audiencia_id = ?6, modalidad_id = ?7, fuente_id = ?8,
       prioridad_id = ?9, actividad_formativa = ?10, objetivo_desempeno = ?11,
       contenidos_especificos = ?12, skills = ?13, keywords = ?14,
       fuente_interna = ?15, last_updated = ?16
     WHERE id = ?17",
    rusqlite::params![
      origin,
      class.gerencia,
      class.subgerencia,
      class.area,
      class.desafio,
      class.audiencia,
      class.modalidad,
      class.fuente,
      class.prioridad,
      c.actividad_formativa.trim(),
      c.objetivo_desempeno.trim(),
      c.contenidos_especificos.trim(),
      c.skills.trim(),
      c.keywords.trim(),
      encode_optional_text(input.fuente_interna),
      encode_dt(now),
      id,
    ],
  )?;
  Ok(())
}

/// Remove an entry and everything hanging off it, atomically.
pub fn delete(conn: &mut Connection, id: i64) -> Result<()> {
  let tx = conn.transaction()?;
  require(&tx, id)?;
  tx.execute("DELETE FROM matrix_linkedin_courses WHERE matrix_id = ?1", [id])?;
  tx.execute("DELETE FROM validated_matrix WHERE matrix_id = ?1", [id])?;
  tx.execute("DELETE FROM final_matrix WHERE id = ?1", [id])?;
  tx.commit()?;
  Ok(())
}

pub fn set_validation(conn: &Connection, id: i64, validated: bool, now: DateTime<Utc>) -> Result<()> {
  require(conn, id)?;
  let at = validated.then(|| encode_dt(now));
  conn.execute(
    "INSERT INTO validated_matrix (matrix_id, validated, validated_at) VALUES (?1, ?2, ?3)
     ON CONFLICT(matrix_id) DO UPDATE
       SET validated = excluded.validated, validated_at = excluded.validated_at",
    rusqlite::params![id, validated, at],
  )?;
  Ok(())
}

// ─── Courses ─────────────────────────────────────────────────────────────────

/// Insert or refresh a course keyed by URN.
pub fn upsert_course(conn: &Connection, course: &CourseRef) -> Result<LinkedInCourse> {
  course.validate()?;
  conn.execute(
    "INSERT INTO linkedin_courses (linkedin_urn, linkedin_course, linkedin_url) VALUES (?1, ?2, ?3)
     ON CONFLICT(linkedin_urn) DO UPDATE
       SET linkedin_course = excluded.linkedin_course,
           linkedin_url    = COALESCE(excluded.linkedin_url, linkedin_courses.linkedin_url)",
    rusqlite::params![course.urn.trim(), course.title.trim(), encode_optional_text(course.url.clone())],
  )?;
  let stored = conn.query_row(
    "SELECT id, linkedin_urn, linkedin_course, linkedin_url FROM linkedin_courses
     WHERE linkedin_urn = ?1",
    [course.urn.trim()],
    course_from_row,
  )?;
  Ok(stored)
}

pub fn course_by_title(conn: &Connection, title: &str) -> Result<Option<LinkedInCourse>> {
  let found = conn
    .query_row(
      "SELECT id, linkedin_urn, linkedin_course, linkedin_url FROM linkedin_courses
       WHERE linkedin_course = ?1 ORDER BY id LIMIT 1",
      [title.trim()],
      course_from_row,
    )
    .optional()?;
  Ok(found)
}

fn course_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<LinkedInCourse> {
  Ok(LinkedInCourse { id: row.get(0)?, urn: row.get(1)?, title: row.get(2)?, url: row.get(3)? })
}

/// Make `course_id` the only course of `plan_id`.
pub fn link(conn: &Connection, plan_id: i64, course_id: i64) -> Result<()> {
  unlink(conn, plan_id)?;
  conn.execute(
    "INSERT INTO matrix_linkedin_courses (matrix_id, course_id) VALUES (?1, ?2)",
    [plan_id, course_id],
  )?;
  Ok(())
}

pub fn unlink(conn: &Connection, plan_id: i64) -> Result<()> {
  conn.execute("DELETE FROM matrix_linkedin_courses WHERE matrix_id = ?1", [plan_id])?;
  Ok(())
}

/// Every stored course with the titles of the activities it is linked to,
/// ordered by course title.
pub fn courses(conn: &Connection) -> Result<Vec<(LinkedInCourse, Option<String>)>> {
  let mut stmt = conn.prepare(
    "SELECT lc.id, lc.linkedin_urn, lc.linkedin_course, lc.linkedin_url, fm.actividad_formativa
     FROM linkedin_courses lc
     LEFT JOIN matrix_linkedin_courses mlc ON mlc.course_id = lc.id
     LEFT JOIN final_matrix fm ON fm.id = mlc.matrix_id
     ORDER BY lc.linkedin_course, lc.id, fm.id",
  )?;
  let rows = stmt
    .query_map([], |row| Ok((course_from_row(row)?, row.get(4)?)))?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(rows)
}
