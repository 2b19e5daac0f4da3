//! Synchronous name↔id reconciliation over the lookup tables.
//!
//! Table and column names come from [`LookupKind`] and are never user input,
//! so they are interpolated into the SQL; option names are always bound.

use dnc_core::{
  Error as CoreError,
  lookup::{LookupKind, LookupOption, OptionMap, is_not_applicable, normalize_name, same_name},
  plan::Classification,
};
use rusqlite::{Connection, OptionalExtension as _};
use strum::IntoEnumIterator as _;

use crate::Result;

pub fn list(conn: &Connection, kind: LookupKind) -> Result<Vec<LookupOption>> {
  let sql = format!("SELECT id, name FROM {} ORDER BY name, id", kind.table());
  let mut stmt = conn.prepare(&sql)?;
  let rows = stmt
    .query_map([], |row| Ok(LookupOption { id: row.get(0)?, name: row.get(1)? }))?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(rows)
}

pub fn map(conn: &Connection, kind: LookupKind) -> Result<OptionMap> {
  Ok(list(conn, kind)?.into_iter().map(|o| (o.name, o.id)).collect())
}

/// Exact (trimmed) name lookup.
pub fn find(conn: &Connection, kind: LookupKind, name: &str) -> Result<Option<LookupOption>> {
  let sql = format!("SELECT id, name FROM {} WHERE name = ?1", kind.table());
  let found = conn
    .query_row(&sql, [name.trim()], |row| Ok(LookupOption { id: row.get(0)?, name: row.get(1)? }))
    .optional()?;
  Ok(found)
}

/// Case-insensitive lookup. Done in Rust because SQLite's `lower()` only
/// folds ASCII and the vocabulary is Spanish.
fn find_similar(conn: &Connection, kind: LookupKind, name: &str) -> Result<Option<LookupOption>> {
  Ok(list(conn, kind)?.into_iter().find(|o| same_name(&o.name, name)))
}

/// Insert `name` if absent; return its id either way.
pub fn ensure(conn: &Connection, kind: LookupKind, name: &str) -> Result<i64> {
  let name = normalize_name(name)?;
  let table = kind.table();
  conn.execute(&format!("INSERT OR IGNORE INTO {table} (name) VALUES (?1)"), [&name])?;
  let id = conn.query_row(&format!("SELECT id FROM {table} WHERE name = ?1"), [&name], |r| r.get(0))?;
  Ok(id)
}

pub fn add(conn: &Connection, kind: LookupKind, name: &str) -> Result<LookupOption> {
  let name = normalize_name(name)?;
  if let Some(existing) = find_similar(conn, kind, &name)? {
    return Err(CoreError::DuplicateOption { kind, name: existing.name }.into());
  }
  conn.execute(&format!("INSERT INTO {} (name) VALUES (?1)", kind.table()), [&name])?;
  Ok(LookupOption { id: conn.last_insert_rowid(), name })
}

pub fn rename(conn: &Connection, kind: LookupKind, old: &str, new: &str) -> Result<LookupOption> {
  if kind.is_protected() {
    return Err(CoreError::ProtectedOption { kind, name: old.trim().to_owned() }.into());
  }
  let new = normalize_name(new)?;
  let current = find(conn, kind, old)?
    .ok_or_else(|| CoreError::OptionNotFound { kind, name: old.trim().to_owned() })?;

  if current.name == new {
    return Err(CoreError::UnchangedOption { kind, name: new }.into());
  }
  let clash = list(conn, kind)?
    .into_iter()
    .any(|o| o.id != current.id && same_name(&o.name, &new));
  if clash {
    return Err(CoreError::DuplicateOption { kind, name: new }.into());
  }

  conn.execute(
    &format!("UPDATE {} SET name = ?1 WHERE id = ?2", kind.table()),
    rusqlite::params![new, current.id],
  )?;
  Ok(LookupOption { id: current.id, name: new })
}

/// Number of needs and plan entries referencing option `id`.
pub fn references(conn: &Connection, kind: LookupKind, id: i64) -> Result<i64> {
  let col = kind.column();
  let sql = format!(
    "SELECT (SELECT COUNT(*) FROM final_matrix   WHERE {col} = ?1)
          + (SELECT COUNT(*) FROM raw_data_forms WHERE {col} = ?1)"
  );
  Ok(conn.query_row(&sql, [id], |r| r.get(0))?)
}

pub fn delete(conn: &Connection, kind: LookupKind, name: &str) -> Result<()> {
  if kind.is_protected() {
    return Err(CoreError::ProtectedOption { kind, name: name.trim().to_owned() }.into());
  }
  let option = find(conn, kind, name)?
    .ok_or_else(|| CoreError::OptionNotFound { kind, name: name.trim().to_owned() })?;

  let refs = references(conn, kind, option.id)?;
  if refs > 0 {
    tracing::debug!(%kind, name = %option.name, refs, "refusing to delete referenced option");
    return Err(CoreError::OptionInUse { kind, name: option.name }.into());
  }

  conn.execute(&format!("DELETE FROM {} WHERE id = ?1", kind.table()), [option.id])?;
  Ok(())
}

/// Insert every missing built-in option. Returns the number inserted.
pub fn seed(conn: &Connection) -> Result<usize> {
  let mut added = 0;
  for kind in LookupKind::iter() {
    let sql = format!("INSERT OR IGNORE INTO {} (name) VALUES (?1)", kind.table());
    let mut stmt = conn.prepare(&sql)?;
    for name in kind.defaults() {
      added += stmt.execute([name])?;
    }
  }
  Ok(added)
}

// ─── Resolution ──────────────────────────────────────────────────────────────

/// Id of a required dimension; unknown names are an error.
pub fn resolve(conn: &Connection, kind: LookupKind, name: &str) -> Result<i64> {
  match find(conn, kind, name)? {
    Some(o) => Ok(o.id),
    None => Err(CoreError::UnknownOption { kind, name: name.trim().to_owned() }.into()),
  }
}

/// Id of an optional dimension; blank and `"N/A"` resolve to `None`.
pub fn resolve_optional(conn: &Connection, kind: LookupKind, name: Option<&str>) -> Result<Option<i64>> {
  match name {
    Some(n) if !is_not_applicable(n) => resolve(conn, kind, n).map(Some),
    _ => Ok(None),
  }
}

/// Integer keys for a [`Classification`].
pub struct ResolvedClassification {
  pub gerencia:    i64,
  pub subgerencia: Option<i64>,
  pub area:        Option<i64>,
  pub desafio:     i64,
  pub audiencia:   i64,
  pub modalidad:   i64,
  pub fuente:      i64,
  pub prioridad:   i64,
}

impl ResolvedClassification {
  pub fn resolve(conn: &Connection, c: &Classification) -> Result<Self> {
    c.validate()?;
    Ok(Self {
      gerencia:    resolve(conn, LookupKind::Gerencia, &c.gerencia)?,
      subgerencia: resolve_optional(conn, LookupKind::Subgerencia, c.subgerencia.as_deref())?,
      area:        resolve_optional(conn, LookupKind::Area, c.area.as_deref())?,
      desafio:     resolve(conn, LookupKind::Desafio, &c.desafio)?,
      audiencia:   resolve(conn, LookupKind::Audiencia, &c.audiencia)?,
      modalidad:   resolve(conn, LookupKind::Modalidad, &c.modalidad)?,
      fuente:      resolve(conn, LookupKind::Fuente, &c.fuente)?,
      prioridad:   resolve(conn, LookupKind::Prioridad, &c.prioridad)?,
    })
  }
}
