//! Error type for `dnc-catalog`.

use dnc_core::DomainError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error(transparent)]
  Core(#[from] dnc_core::Error),

  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("catalog returned {status}: {body}")]
  Status { status: u16, body: String },

  #[error("access denied to {0}")]
  AccessDenied(String),

  #[error("invalid catalog api_url {url:?}: {reason}")]
  ApiUrl { url: String, reason: String },
}

impl Error {
  /// Message suitable for showing to the person who triggered the request.
  pub fn user_message(&self) -> String {
    match self {
      Self::Core(dnc_core::Error::InvalidUrn(_)) => {
        "Por favor, ingresa un URN válido (urn:li:...).".into()
      }
      Self::AccessDenied(urn) => {
        format!("Acceso denegado. El curso puede no estar disponible: {urn}")
      }
      other => format!("Error de API: {other}"),
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

  fn public_message(&self) -> Option<String> { Some(Error::user_message(self)) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
