use reqwest::StatusCode;
use thiserror::Error;

use dashgate_core::AppError;

#[derive(Debug, Error)]
pub enum PowerBiError {
    #[error("Power BI request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx from the Power BI API.
    #[error("Power BI responded with {status}: {body}")]
    Upstream { status: u16, body: String },

    /// Non-2xx from the Entra ID token endpoint.
    #[error("Power BI token request rejected with {status}: {body}")]
    TokenRejected { status: u16, body: String },

    #[error("Invalid response from Power BI: {0}")]
    InvalidResponse(String),

    #[error("Token response did not contain an access_token")]
    MissingAccessToken,

    #[error("Power BI client credentials are incomplete")]
    IncompleteCredentials,

    #[error("Invalid Power BI identifier: {0:?}")]
    InvalidIdentifier(String),
}

impl PowerBiError {
    /// HTTP status to report to our own caller. A rejected client credential
    /// grant is a gateway failure, never the caller's own 401 or 403.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Upstream { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            Self::Http(e) if e.is_timeout() => StatusCode::GATEWAY_TIMEOUT,
            Self::Http(_)
            | Self::TokenRejected { .. }
            | Self::InvalidResponse(_)
            | Self::MissingAccessToken => StatusCode::BAD_GATEWAY,
            Self::IncompleteCredentials => StatusCode::INTERNAL_SERVER_ERROR,
            Self::InvalidIdentifier(_) => StatusCode::BAD_REQUEST,
        }
    }

    pub fn into_app_error(self) -> AppError {
        match self {
            err @ Self::TokenRejected { .. } => AppError::bad_gateway(err.to_string()),
            err => AppError::new(err.status_code(), err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_status_is_preserved() {
        let err = PowerBiError::Upstream {
            status: 403,
            body: "{}".to_string(),
        };
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(err.into_app_error().status, StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_invalid_upstream_status_maps_to_bad_gateway() {
        let err = PowerBiError::Upstream {
            status: 1000,
            body: String::new(),
        };
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_token_rejection_is_bad_gateway() {
        for status in [401, 403] {
            let err = PowerBiError::TokenRejected {
                status,
                body: "{\"error\":\"invalid_client\"}".to_string(),
            };
            assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);

            let app_error = err.into_app_error();
            assert_eq!(app_error.status, StatusCode::BAD_GATEWAY);
            assert!(app_error.error.to_string().contains("invalid_client"));
        }
    }

    #[test]
    fn test_other_statuses() {
        assert_eq!(
            PowerBiError::MissingAccessToken.status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            PowerBiError::IncompleteCredentials.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
