//! Error types for `dnc-core`.

use thiserror::Error;

use crate::lookup::LookupKind;

/// Domain-level failures. Backends wrap these in their own error types so the
/// REST layer can classify them via [`DomainError`].
#[derive(Debug, Error)]
pub enum Error {
  #[error("{0} must not be empty")]
  EmptyField(&'static str),

  #[error("option names must not contain commas: {0:?}")]
  SeparatorInName(String),

  #[error("unknown lookup kind: {0:?}")]
  UnknownLookupKind(String),

  #[error("unknown {kind} option: {name:?}")]
  UnknownOption { kind: LookupKind, name: String },

  #[error("{kind} option {name:?} already exists")]
  DuplicateOption { kind: LookupKind, name: String },

  #[error("{kind} option {name:?} is unchanged")]
  UnchangedOption { kind: LookupKind, name: String },

  #[error("{kind} option {name:?} is in use and cannot be deleted")]
  OptionInUse { kind: LookupKind, name: String },

  #[error("{kind} option {name:?} is protected and cannot be renamed or deleted")]
  ProtectedOption { kind: LookupKind, name: String },

  #[error("{kind} option not found: {name:?}")]
  OptionNotFound { kind: LookupKind, name: String },

  #[error("respondent not found: {0}")]
  RespondentNotFound(i64),

  #[error("plan entry not found: {0}")]
  PlanEntryNotFound(i64),

  #[error("linkedin course not found: {0:?}")]
  CourseNotFound(String),

  #[error("respondent {respondent_id} already submitted {limit} needs")]
  NeedLimitReached { respondent_id: i64, limit: u32 },

  #[error("not a LinkedIn URN (expected `urn:li:...`): {0:?}")]
  InvalidUrn(String),

  #[error("too many courses to rank: {given} (max {max})")]
  TooManyCandidates { given: usize, max: usize },
}

impl Error {
  /// `true` for failures that mean "the referenced thing does not exist".
  pub fn is_not_found(&self) -> bool {
    matches!(
      self,
      Self::OptionNotFound { .. }
        | Self::RespondentNotFound(_)
        | Self::PlanEntryNotFound(_)
        | Self::CourseNotFound(_)
    )
  }

  /// `true` for failures caused by the current state of the data rather than
  /// by the request itself.
  pub fn is_conflict(&self) -> bool {
    matches!(
      self,
      Self::DuplicateOption { .. }
        | Self::OptionInUse { .. }
        | Self::ProtectedOption { .. }
        | Self::NeedLimitReached { .. }
    )
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Implemented by backend error types that may carry a domain [`Error`].
pub trait DomainError {
  fn domain(&self) -> Option<&Error>;

  /// Text meant for the end user, when the error has one.
  fn public_message(&self) -> Option<String> { None }
}

impl DomainError for Error {
  fn domain(&self) -> Option<&Error> { Some(self) }
}

impl DomainError for std::convert::Infallible {
  fn domain(&self) -> Option<&Error> { match *self {} }
}
