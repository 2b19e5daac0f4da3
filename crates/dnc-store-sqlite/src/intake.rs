//! Synchronous queries over respondents and raw needs.

use chrono::{DateTime, Utc};
use dnc_core::{
  Error as CoreError,
  intake::{NewNeed, NewRespondent, RawNeed, Respondent, RespondentSummary, Submitter},
  lookup::LookupKind,
};
use rusqlite::{Connection, OptionalExtension as _, TransactionBehavior};

use crate::{
  Result,
  encode::{RawNeedRow, RawRespondent, encode_dt, encode_optional_text},
  lookup::{ResolvedClassification, resolve},
};

const NEED_SELECT: &str = "
  SELECT n.id, n.submission_id, r.nombre, o.name,
         g.name, sg.name, a.name, d.name, au.name, m.name, f.name, p.name,
         n.cambios, n.que_falta, n.aprendizajes, n.fuente_interna, n.created_at
  FROM raw_data_forms n
  JOIN respondents      r  ON r.id  = n.submission_id
  JOIN origins          o  ON o.id  = n.origin_id
  JOIN gerencias        g  ON g.id  = n.gerencia_id
  LEFT JOIN subgerencias sg ON sg.id = n.subgerencia_id
  LEFT JOIN areas        a  ON a.id  = n.area_id
  JOIN desafios         d  ON d.id  = n.desafio_id
  JOIN audiencias       au ON au.id = n.audiencia_id
  JOIN modalidades      m  ON m.id  = n.modalidad_id
  JOIN fuentes          f  ON f.id  = n.fuente_id
  JOIN prioridades      p  ON p.id  = n.prioridad_id";

pub fn create_respondent(conn: &Connection, input: NewRespondent, now: DateTime<Utc>) -> Result<Respondent> {
  input.validate()?;
  let name = input.name.trim().to_owned();
  let email = input.email.trim().to_owned();
  conn.execute(
    "INSERT INTO respondents (nombre, email, created_at) VALUES (?1, ?2, ?3)",
    rusqlite::params![name, email, encode_dt(now)],
  )?;
  Ok(Respondent { id: conn.last_insert_rowid(), name, email, created_at: now })
}

pub fn get_respondent(conn: &Connection, id: i64) -> Result<Option<Respondent>> {
  let raw = conn
    .query_row(
      "SELECT id, nombre, email, created_at FROM respondents WHERE id = ?1",
      [id],
      RawRespondent::from_row,
    )
    .optional()?;
  raw.map(RawRespondent::into_respondent).transpose()
}

pub fn count_needs(conn: &Connection, respondent_id: i64) -> Result<u64> {
  let n: i64 = conn.query_row(
    "SELECT COUNT(*) FROM raw_data_forms WHERE submission_id = ?1",
    [respondent_id],
    |r| r.get(0),
  )?;
  Ok(n as u64)
}

pub fn record_need(conn: &Connection, input: NewNeed, now: DateTime<Utc>) -> Result<i64> {
  input.validate()?;
  if get_respondent(conn, input.respondent_id)?.is_none() {
    return Err(CoreError::RespondentNotFound(input.respondent_id).into());
  }
  let origin = resolve(conn, LookupKind::Origen, &input.origin)?;
  let class = ResolvedClassification::resolve(conn, &input.classification)?;

  conn.execute(
    "INSERT INTO raw_data_forms (
       submission_id, origin_id, gerencia_id, subgerencia_id, area_id,
       desafio_id, audiencia_id, modalidad_id, fuente_id, prioridad_id,
       cambios, que_falta, aprendizajes, fuente_interna, created_at
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
    rusqlite::params![
      input.respondent_id,
      origin,
      class.gerencia,
      class.subgerencia,
      class.area,
      class.desafio,
      class.audiencia,
      class.modalidad,
      class.fuente,
      class.prioridad,
      input.cambios.trim(),
      input.que_falta.trim(),
      input.aprendizajes.trim(),
      encode_optional_text(input.fuente_interna),
      encode_dt(now),
    ],
  )?;
  Ok(conn.last_insert_rowid())
}

/// Resolve or create the respondent, enforce `limit` and insert the need in
/// one write transaction. Returns the respondent and the new need's id.
pub fn submit_need(
  conn: &mut Connection,
  submitter: Submitter,
  mut input: NewNeed,
  limit: u32,
  now: DateTime<Utc>,
) -> Result<(Respondent, i64)> {
  let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
  let respondent = match submitter {
    Submitter::Existing { id } => get_respondent(&tx, id)?.ok_or(CoreError::RespondentNotFound(id))?,
    Submitter::New(new) => create_respondent(&tx, new, now)?,
  };
  if count_needs(&tx, respondent.id)? >= u64::from(limit) {
    return Err(CoreError::NeedLimitReached { respondent_id: respondent.id, limit }.into());
  }
  input.respondent_id = respondent.id;
  let id = record_need(&tx, input, now)?;
  tx.commit()?;
  Ok((respondent, id))
}

pub fn get_need(conn: &Connection, id: i64) -> Result<Option<RawNeed>> {
  let sql = format!("{NEED_SELECT} WHERE n.id = ?1");
  let raw = conn.query_row(&sql, [id], RawNeedRow::from_row).optional()?;
  raw.map(RawNeedRow::into_need).transpose()
}

/// Newest first.
pub fn list_needs(conn: &Connection) -> Result<Vec<RawNeed>> {
  let sql = format!("{NEED_SELECT} ORDER BY n.created_at DESC, n.id DESC");
  let mut stmt = conn.prepare(&sql)?;
  let raws = stmt
    .query_map([], RawNeedRow::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  raws.into_iter().map(RawNeedRow::into_need).collect()
}

/// One row per respondent and organisational unit they answered for;
/// respondents without needs appear once with no unit.
pub fn list_respondents(conn: &Connection) -> Result<Vec<RespondentSummary>> {
  let mut stmt = conn.prepare(
    "SELECT r.id, r.nombre, r.email, g.name, sg.name, a.name, COUNT(n.id)
     FROM respondents r
     LEFT JOIN raw_data_forms n ON n.submission_id = r.id
     LEFT JOIN gerencias    g  ON g.id  = n.gerencia_id
     LEFT JOIN subgerencias sg ON sg.id = n.subgerencia_id
     LEFT JOIN areas        a  ON a.id  = n.area_id
     GROUP BY r.id, n.gerencia_id, n.subgerencia_id, n.area_id
     ORDER BY r.id, g.name, sg.name, a.name",
  )?;
  let rows = stmt
    .query_map([], |row| {
      Ok(RespondentSummary {
        id:          row.get(0)?,
        name:        row.get(1)?,
        email:       row.get(2)?,
        gerencia:    row.get(3)?,
        subgerencia: row.get(4)?,
        area:        row.get(5)?,
        needs:       row.get::<_, i64>(6)? as u64,
      })
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(rows)
}
