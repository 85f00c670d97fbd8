use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::email::MailError;
use crate::llm_client::LlmError;
use crate::roadmap::pdf::RenderError;

pub const DELIVERY_FAILED_MESSAGE: &str = "Failed to send email. Please try again.";
pub const UNEXPECTED_ERROR_MESSAGE: &str = "An unexpected error occurred.";

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    /// The LLM provider call failed or returned a non-success status.
    #[error("Provider error: {0}")]
    Provider(String),

    /// The provider answered, but its content could not be decoded into the expected shape.
    #[error("Prompt parse error: {0}")]
    PromptParse(String),

    #[error("Render error: {0}")]
    Render(String),

    #[error("Delivery error: {0}")]
    Delivery(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Rewrites the client-visible message of the LLM-facing variants.
    /// Other variants pass through untouched.
    pub fn map_message(self, f: impl FnOnce(String) -> String) -> Self {
        match self {
            AppError::Provider(msg) => AppError::Provider(f(msg)),
            AppError::PromptParse(msg) => AppError::PromptParse(f(msg)),
            other => other,
        }
    }
}

impl From<LlmError> for AppError {
    fn from(e: LlmError) -> Self {
        if e.is_provider_failure() {
            AppError::Provider(e.to_string())
        } else {
            AppError::PromptParse(e.to_string())
        }
    }
}

impl From<MailError> for AppError {
    fn from(e: MailError) -> Self {
        AppError::Delivery(e.to_string())
    }
}

impl From<RenderError> for AppError {
    fn from(e: RenderError) -> Self {
        AppError::Render(e.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Provider(msg) => {
                tracing::error!("Provider error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "PROVIDER_ERROR",
                    msg.clone(),
                )
            }
            AppError::PromptParse(msg) => {
                tracing::error!("Prompt parse error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "PROMPT_PARSE_ERROR",
                    msg.clone(),
                )
            }
            AppError::Render(msg) => {
                tracing::error!("Render error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "RENDER_ERROR",
                    UNEXPECTED_ERROR_MESSAGE.to_string(),
                )
            }
            // Transport details stay in the log; clients only see the generic message.
            AppError::Delivery(msg) => {
                tracing::error!("Delivery error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DELIVERY_ERROR",
                    DELIVERY_FAILED_MESSAGE.to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    UNEXPECTED_ERROR_MESSAGE.to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_maps_to_bad_request() {
        let response = AppError::Validation("topic cannot be empty".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_every_other_kind_maps_to_server_error() {
        let errors = vec![
            AppError::Provider("status 401".to_string()),
            AppError::PromptParse("not json".to_string()),
            AppError::Render("out of memory".to_string()),
            AppError::Delivery("connection refused".to_string()),
            AppError::Internal(anyhow::anyhow!("boom")),
        ];
        for error in errors {
            assert_eq!(
                error.into_response().status(),
                StatusCode::INTERNAL_SERVER_ERROR
            );
        }
    }

    #[test]
    fn test_llm_error_kinds_split_into_provider_and_parse() {
        let provider: AppError = LlmError::Api {
            status: 503,
            message: "overloaded".to_string(),
        }
        .into();
        assert!(matches!(provider, AppError::Provider(_)));

        let parse: AppError = LlmError::EmptyChoices.into();
        assert!(matches!(parse, AppError::PromptParse(_)));
    }

    #[test]
    fn test_map_message_only_touches_llm_variants() {
        let mapped = AppError::PromptParse("bad json".to_string())
            .map_message(|m| format!("Failed to fetch skills: {m}"));
        assert_eq!(
            mapped.to_string(),
            "Prompt parse error: Failed to fetch skills: bad json"
        );

        let untouched = AppError::Validation("x".to_string()).map_message(|_| "y".to_string());
        assert_eq!(untouched.to_string(), "Validation error: x");
    }
}
