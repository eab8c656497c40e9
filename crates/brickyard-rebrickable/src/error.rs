//! Error type for `brickyard-rebrickable`.

use brickyard_core::remote::ApiError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("credentials rejected (HTTP {0})")]
  Unauthorized(u16),

  #[error("HTTP {status} from {url}: {body}")]
  Remote { url: String, status: u16, body: String },

  #[error("gave up on {url} after {attempts} attempts: {last}")]
  RetriesExhausted { url: String, attempts: u32, last: String },

  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("malformed response from {url}: {reason}")]
  Decode { url: String, reason: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl From<Error> for ApiError {
  fn from(e: Error) -> Self {
    match e {
      Error::NotFound(url) => ApiError::Remote { status: 404, body: url },
      Error::Unauthorized(status) => ApiError::Unauthorized { status },
      Error::Remote { status, body, .. } => ApiError::Remote { status, body },
      Error::RetriesExhausted { attempts, last, .. } => {
        ApiError::RetriesExhausted { attempts, last }
      }
      Error::Http(e) => ApiError::Transport(e.to_string()),
      Error::Decode { url, reason } => ApiError::Decode(format!("{url}: {reason}")),
    }
  }
}
