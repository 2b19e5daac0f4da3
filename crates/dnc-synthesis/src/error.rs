//! Error type for `dnc-synthesis`.

use dnc_core::DomainError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error(transparent)]
  Core(#[from] dnc_core::Error),

  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("llm endpoint returned {status}: {body}")]
  Status { status: u16, body: String },

  #[error("llm reply has no `response` field")]
  MissingResponse,

  #[error("llm reply contains no ```json block")]
  MissingJsonBlock,

  #[error("llm reply contains {0} ```json blocks, expected exactly one")]
  AmbiguousJsonBlock(usize),

  #[error("llm json block is malformed: {0}")]
  Json(#[from] serde_json::Error),

  #[error("activity {index} has no `Actividad formativa`")]
  EmptyActivity { index: usize },
}

impl Error {
  /// Message suitable for showing to the person who triggered the request.
  pub fn user_message(&self) -> &'static str {
    match self {
      Self::Http(_) | Self::Status { .. } => {
        "Error de IA al obtener recomendaciones. Por favor inténtalo nuevamente."
      }
      _ => "Se ha generado un error al procesar la respuesta de IA. Por favor inténtalo nuevamente.",
    }
  }
}

impl DomainError for Error {
  fn domain(&self) -> Option<&dnc_core::Error> {
    match self {
      Self::Core(e) => Some(e),
      _ => None,
    }
  }

  fn public_message(&self) -> Option<String> { Some(Error::user_message(self).to_owned()) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
