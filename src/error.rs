use axum::response::{IntoResponse, Response};
use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum Error {
  #[error("invalid url {0}: {1}")]
  InvalidUrl(String, url::ParseError),

  #[error("missing video id in {0}")]
  MissingVideoId(String),

  #[error("site alias {0} resolves to another alias")]
  AliasCycle(String),

  #[error("video api returned {status}: {message}")]
  VideoApi { status: StatusCode, message: String },

  #[error("extraction failed: {0}")]
  Extraction(String),

  #[error("url #{index} ({url}): {source}")]
  Batch {
    index: usize,
    url: String,
    #[source]
    source: Box<Error>,
  },

  #[error("config error: {0}")]
  Config(String),

  #[error(transparent)]
  Http(#[from] reqwest::Error),

  #[error(transparent)]
  Json(#[from] serde_json::Error),

  #[error(transparent)]
  IO(#[from] std::io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
  pub fn status(&self) -> StatusCode {
    match self {
      Error::InvalidUrl(..) | Error::MissingVideoId(_) => {
        StatusCode::BAD_REQUEST
      }
      Error::VideoApi { .. } | Error::Http(_) => StatusCode::BAD_GATEWAY,
      Error::Batch { source, .. } => source.status(),
      _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    (self.status(), self.to_string()).into_response()
  }
}
