//! The lookup vocabulary: small tables mapping option names to integer keys.
//!
//! Forms and LLM replies speak in names ("Gerencia Ventas", "Virtual"); fact
//! tables store integer keys. Every dimension below owns one table of unique
//! names. Renames are free because facts hold ids; deletes are refused while
//! an option is referenced.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::{Error, Result};

/// Placeholder accepted for optional dimensions meaning "no value".
pub const NOT_APPLICABLE: &str = "N/A";

/// Origin assigned to plan entries synthesised from a survey.
pub const ORIGIN_DNC: &str = "DNC";

/// One enumerable attribute of a need or plan entry.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumIter,
  EnumString,
  IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LookupKind {
  Gerencia,
  Subgerencia,
  Area,
  Desafio,
  Audiencia,
  Modalidad,
  Fuente,
  Prioridad,
  Origen,
}

impl LookupKind {
  /// Parse a path segment such as `"gerencia"`.
  pub fn parse(s: &str) -> Result<Self> {
    s.parse().map_err(|_| Error::UnknownLookupKind(s.to_owned()))
  }

  /// Name of the table holding this dimension's options.
  pub fn table(self) -> &'static str {
    match self {
      Self::Gerencia => "gerencias",
      Self::Subgerencia => "subgerencias",
      Self::Area => "areas",
      Self::Desafio => "desafios",
      Self::Audiencia => "audiencias",
      Self::Modalidad => "modalidades",
      Self::Fuente => "fuentes",
      Self::Prioridad => "prioridades",
      Self::Origen => "origins",
    }
  }

  /// Foreign-key column referencing this dimension in fact tables.
  pub fn column(self) -> &'static str {
    match self {
      Self::Gerencia => "gerencia_id",
      Self::Subgerencia => "subgerencia_id",
      Self::Area => "area_id",
      Self::Desafio => "desafio_id",
      Self::Audiencia => "audiencia_id",
      Self::Modalidad => "modalidad_id",
      Self::Fuente => "fuente_id",
      Self::Prioridad => "prioridad_id",
      Self::Origen => "origin_id",
    }
  }

  /// Human-readable column heading.
  pub fn label(self) -> &'static str {
    match self {
      Self::Gerencia => "Gerencia",
      Self::Subgerencia => "Subgerencia",
      Self::Area => "Área",
      Self::Desafio => "Desafío Estratégico",
      Self::Audiencia => "Audiencia",
      Self::Modalidad => "Modalidad",
      Self::Fuente => "Fuente",
      Self::Prioridad => "Prioridad",
      Self::Origen => "Origen",
    }
  }

  /// Subgerencia and Área may be left empty on needs and plan entries.
  pub fn is_optional(self) -> bool { matches!(self, Self::Subgerencia | Self::Area) }

  /// Origins drive the intake pipeline and are never renamed or deleted.
  pub fn is_protected(self) -> bool { matches!(self, Self::Origen) }

  /// Built-in options used to seed an empty store.
  pub fn defaults(self) -> &'static [&'static str] {
    match self {
      Self::Gerencia => &[
        "Gerencia General",
        "Gerencia Ventas",
        "Gerencia Operaciones",
        "Gerencia Recursos Humanos",
        "Gerencia Finanzas",
        "Gerencia TI",
      ],
      Self::Subgerencia => &[
        "Oficina Ejecutiva",
        "Ventas Nacionales",
        "Ventas Internacionales",
        "Producción",
        "Mantenimiento",
        "Logística",
        "Reclutamiento",
        "Capacitación",
        "Contabilidad",
        "Presupuesto",
        "Infraestructura",
        "Desarrollo de Software",
      ],
      Self::Area => &[
        "Estrategia",
        "Planificación",
        "Retail",
        "B2B",
        "Exportaciones",
        "Importaciones",
        "Manufactura",
        "Control de Calidad",
        "Almacén",
        "Distribución",
        "Contratación",
        "Incorporación",
        "Desarrollo de Empleados",
        "Programas de Liderazgo",
        "Cuentas por Pagar",
        "Cuentas por Cobrar",
        "Proyecciones",
        "Reportes",
        "Red",
        "Hardware",
        "Desarrollo Web",
        "Desarrollo de Apps",
      ],
      Self::Desafio => &[
        "Crecer al doble en 10 años",
        "Lograr una rentabilidad mayor al 10%",
        "Mejorar la eficiencia operativa",
        "Aumentar la satisfacción del cliente",
        "Reducir costos",
        "Mejorar la comunicación interna",
      ],
      Self::Audiencia => &[
        "Gerente",
        "Subgerentes",
        "Jefaturas",
        "Profesionales",
        "Técnicos",
        "Administrativos",
        "Analistas",
        "Asistentes",
        "Equipo de Proyecto",
        "Todos los equipos",
      ],
      Self::Modalidad => &["Presencial", "Virtual", "Híbrido"],
      Self::Fuente => &["Externa", "Interna"],
      Self::Prioridad => &["Alta", "Media", "Baja"],
      Self::Origen => &[ORIGIN_DNC, "SGD"],
    }
  }
}

/// A single option row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupOption {
  pub id:   i64,
  pub name: String,
}

/// `name → id` view of one lookup table.
pub type OptionMap = BTreeMap<String, i64>;

/// Separator of multi-valued filter parameters; never part of a name.
pub const NAME_SEPARATOR: char = ',';

/// Trim an option name, rejecting blank input and the filter separator.
pub fn normalize_name(name: &str) -> Result<String> {
  let trimmed = name.trim();
  if trimmed.is_empty() {
    return Err(Error::EmptyField("option name"));
  }
  if trimmed.contains(NAME_SEPARATOR) {
    return Err(Error::SeparatorInName(trimmed.to_owned()));
  }
  Ok(trimmed.to_owned())
}

/// `true` if `name` means "no value" for an optional dimension.
pub fn is_not_applicable(name: &str) -> bool {
  let trimmed = name.trim();
  trimmed.is_empty() || trimmed.eq_ignore_ascii_case(NOT_APPLICABLE)
}

/// Case-insensitive name equality, including non-ASCII letters.
pub fn same_name(a: &str, b: &str) -> bool { a.trim().to_lowercase() == b.trim().to_lowercase() }
