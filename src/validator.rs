//! JSON body extraction with `validator` rules applied.
//!
//! Malformed bodies are rejected with 400, rule violations with 422.

use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

use dashgate_core::AppError;

/// Flattens field errors into one message, using each rule's message when set.
fn format_errors(errors: &ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| {
                error
                    .message
                    .as_ref()
                    .map(|msg| msg.to_string())
                    .unwrap_or_else(|| format!("{} is invalid", field))
            })
        })
        .collect();

    // Nested DTOs (e.g. slide lists) only surface through `errors()`.
    if messages.is_empty() && !errors.is_empty() {
        messages.push(errors.to_string());
    }

    messages.sort();
    messages.join(", ")
}

fn rejection_message(rejection: &JsonRejection) -> String {
    if matches!(rejection, JsonRejection::MissingJsonContentType(_)) {
        return "Missing 'Content-Type: application/json' header".to_string();
    }

    let body = rejection.body_text();

    if let Some(field) = body
        .split("missing field `")
        .nth(1)
        .and_then(|s| s.split('`').next())
    {
        return format!("{} is required", field);
    }

    if body.contains("invalid type") || body.contains("unknown variant") {
        return "Invalid field type in request".to_string();
    }

    "Invalid request body".to_string()
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::bad_request(anyhow::anyhow!(rejection_message(&rejection))))?;

        value
            .validate()
            .map_err(|errors| AppError::unprocessable(anyhow::anyhow!(format_errors(&errors))))?;

        Ok(ValidatedJson(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::StatusCode;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, Validate)]
    struct Probe {
        #[validate(length(min = 3, message = "Name must be at least 3 characters"))]
        name: String,
        #[validate(range(min = 1))]
        count: i32,
    }

    async fn extract(body: &str, content_type: Option<&str>) -> Result<Probe, AppError> {
        let mut builder = Request::builder().method("POST").uri("/");
        if let Some(content_type) = content_type {
            builder = builder.header("content-type", content_type);
        }
        let req = builder.body(Body::from(body.to_string())).unwrap();
        ValidatedJson::<Probe>::from_request(req, &()).await.map(|v| v.0)
    }

    #[tokio::test]
    async fn test_valid_body() {
        let probe = extract(r#"{"name": "abc", "count": 2}"#, Some("application/json"))
            .await
            .unwrap();
        assert_eq!(probe.name, "abc");
        assert_eq!(probe.count, 2);
    }

    #[tokio::test]
    async fn test_missing_field_is_bad_request() {
        let err = extract(r#"{"name": "abc"}"#, Some("application/json"))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.error.to_string(), "count is required");
    }

    #[tokio::test]
    async fn test_missing_content_type_is_bad_request() {
        let err = extract(r#"{"name": "abc", "count": 2}"#, None).await.unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_rule_violation_is_unprocessable() {
        let err = extract(r#"{"name": "a", "count": 0}"#, Some("application/json"))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
        let message = err.error.to_string();
        assert!(message.contains("Name must be at least 3 characters"));
        assert!(message.contains("count is invalid"));
    }
}
