//! Error taxonomy shared by the service operations, and its HTTP mapping.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

use crate::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum TrainerError {
  #[error("{entity} not found: {id}")]
  NotFound { entity: &'static str, id: String },

  #[error("This test is already completed.")]
  AlreadyCompleted,

  #[error("You have reached maximum attempts for today.")]
  AttemptsExhausted,

  #[error("Validation failed: {0}")]
  Validation(String),

  #[error("Document store unavailable: {0}")]
  StoreUnavailable(#[from] StoreError),
}

pub type TrainerResult<T> = Result<T, TrainerError>;

impl TrainerError {
  pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
    TrainerError::NotFound { entity, id: id.into() }
  }

  pub fn code(&self) -> &'static str {
    match self {
      TrainerError::NotFound { .. } => "NOT_FOUND",
      TrainerError::AlreadyCompleted => "ALREADY_COMPLETED",
      TrainerError::AttemptsExhausted => "ATTEMPTS_EXHAUSTED",
      TrainerError::Validation(_) => "VALIDATION_ERROR",
      TrainerError::StoreUnavailable(_) => "STORE_UNAVAILABLE",
    }
  }

  pub fn status(&self) -> StatusCode {
    match self {
      TrainerError::NotFound { .. } => StatusCode::NOT_FOUND,
      TrainerError::AlreadyCompleted => StatusCode::CONFLICT,
      TrainerError::AttemptsExhausted => StatusCode::TOO_MANY_REQUESTS,
      TrainerError::Validation(_) => StatusCode::BAD_REQUEST,
      TrainerError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
  }
}

/// Malformed or incomplete request bodies are validation failures, not 422s.
impl From<JsonRejection> for TrainerError {
  fn from(rejection: JsonRejection) -> Self {
    TrainerError::Validation(rejection.body_text())
  }
}

impl IntoResponse for TrainerError {
  fn into_response(self) -> Response {
    let message = match &self {
      TrainerError::StoreUnavailable(e) => {
        error!(target: "trainer", error = %e, "Document store call failed");
        "Document store unavailable, please retry.".to_string()
      }
      other => other.to_string(),
    };
    let body = json!({ "error": message, "code": self.code() });
    (self.status(), Json(body)).into_response()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn maps_variants_to_statuses() {
    assert_eq!(TrainerError::not_found("user", "u1").status(), StatusCode::NOT_FOUND);
    assert_eq!(TrainerError::AlreadyCompleted.status(), StatusCode::CONFLICT);
    assert_eq!(TrainerError::AttemptsExhausted.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(TrainerError::Validation("x".into()).code(), "VALIDATION_ERROR");
    let store = TrainerError::from(StoreError::InvalidKey("../x".into()));
    assert_eq!(store.status(), StatusCode::SERVICE_UNAVAILABLE);
  }

  #[test]
  fn messages_are_user_facing() {
    assert_eq!(TrainerError::AlreadyCompleted.to_string(), "This test is already completed.");
    assert_eq!(TrainerError::AttemptsExhausted.to_string(), "You have reached maximum attempts for today.");
    assert_eq!(TrainerError::not_found("module", "7").to_string(), "module not found: 7");
  }
}
