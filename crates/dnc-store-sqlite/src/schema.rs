//! SQL schema for the DNC SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Lookup vocabulary: one table per dimension, unique names.
CREATE TABLE IF NOT EXISTS gerencias (
    id   INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE
);
CREATE TABLE IF NOT EXISTS subgerencias (
    id   INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE
);
CREATE TABLE IF NOT EXISTS areas (
    id   INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE
);
CREATE TABLE IF NOT EXISTS desafios (
    id   INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE
);
CREATE TABLE IF NOT EXISTS audiencias (
    id   INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE
);
CREATE TABLE IF NOT EXISTS modalidades (
    id   INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE
);
CREATE TABLE IF NOT EXISTS fuentes (
    id   INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE
);
CREATE TABLE IF NOT EXISTS prioridades (
    id   INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE
);
CREATE TABLE IF NOT EXISTS origins (
    id   INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS respondents (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    nombre     TEXT NOT NULL,
    email      TEXT NOT NULL,
    created_at TEXT NOT NULL    -- RFC 3339 UTC
);

-- One row per survey answer.
CREATE TABLE IF NOT EXISTS raw_data_forms (
    id             INTEGER PRIMARY KEY AUTOINCREMENT,
    submission_id  INTEGER NOT NULL REFERENCES respondents(id),
    origin_id      INTEGER NOT NULL REFERENCES origins(id),
    gerencia_id    INTEGER NOT NULL REFERENCES gerencias(id),
    subgerencia_id INTEGER          REFERENCES subgerencias(id),
    area_id        INTEGER          REFERENCES areas(id),
    desafio_id     INTEGER NOT NULL REFERENCES desafios(id),
    audiencia_id   INTEGER NOT NULL REFERENCES audiencias(id),
    modalidad_id   INTEGER NOT NULL REFERENCES modalidades(id),
    fuente_id      INTEGER NOT NULL REFERENCES fuentes(id),
    prioridad_id   INTEGER NOT NULL REFERENCES prioridades(id),
    cambios        TEXT NOT NULL,
    que_falta      TEXT NOT NULL,
    aprendizajes   TEXT NOT NULL,
    fuente_interna TEXT,
    created_at     TEXT NOT NULL
);

-- The training plan.
CREATE TABLE IF NOT EXISTS final_matrix (
    id                     INTEGER PRIMARY KEY AUTOINCREMENT,
    origin_id              INTEGER NOT NULL REFERENCES origins(id),
    gerencia_id            INTEGER NOT NULL REFERENCES gerencias(id),
    subgerencia_id         INTEGER          REFERENCES subgerencias(id),
    area_id                INTEGER          REFERENCES areas(id),
    desafio_id             INTEGER NOT NULL REFERENCES desafios(id),
    audiencia_id           INTEGER NOT NULL REFERENCES audiencias(id),
    modalidad_id           INTEGER NOT NULL REFERENCES modalidades(id),
    fuente_id              INTEGER NOT NULL REFERENCES fuentes(id),
    prioridad_id           INTEGER NOT NULL REFERENCES prioridades(id),
    actividad_formativa    TEXT NOT NULL,
    objetivo_desempeno     TEXT NOT NULL DEFAULT '',
    contenidos_especificos TEXT NOT NULL DEFAULT '',
    skills                 TEXT NOT NULL DEFAULT '',
    keywords               TEXT NOT NULL DEFAULT '',
    fuente_interna         TEXT,
    created_at             TEXT NOT NULL,
    last_updated           TEXT
);

CREATE TABLE IF NOT EXISTS linkedin_courses (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    linkedin_urn    TEXT NOT NULL UNIQUE,
    linkedin_course TEXT NOT NULL,
    linkedin_url    TEXT
);

-- At most one course per plan entry.
CREATE TABLE IF NOT EXISTS matrix_linkedin_courses (
    matrix_id INTEGER PRIMARY KEY REFERENCES final_matrix(id),
    course_id INTEGER NOT NULL    REFERENCES linkedin_courses(id)
);

CREATE TABLE IF NOT EXISTS validated_matrix (
    matrix_id    INTEGER PRIMARY KEY REFERENCES final_matrix(id),
    validated    INTEGER NOT NULL DEFAULT 0,
    validated_at TEXT
);

CREATE INDEX IF NOT EXISTS raw_submission_idx ON raw_data_forms(submission_id);
CREATE INDEX IF NOT EXISTS raw_created_idx    ON raw_data_forms(created_at);
CREATE INDEX IF NOT EXISTS matrix_course_idx  ON matrix_linkedin_courses(course_id);

PRAGMA user_version = 1;
";
