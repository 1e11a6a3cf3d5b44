//! エラー型定義 (greeter-slack)

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::verify::VerifyError;

/// greeter-slack のエラー型
#[derive(Error, Debug)]
pub enum SlackError {
    #[error("Slack API error: {0}")]
    ApiError(String),

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("Slack token not configured")]
    TokenNotConfigured,

    #[error("Server error: {0}")]
    Server(String),
}

/// Result 型エイリアス
pub type Result<T> = std::result::Result<T, SlackError>;

/// Per-request failure of the events webhook
///
/// Every variant terminates the request with its status code and never
/// affects other requests.
#[derive(Error, Debug)]
pub enum WebhookError {
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl WebhookError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<VerifyError> for WebhookError {
    fn from(e: VerifyError) -> Self {
        match e {
            VerifyError::MissingTimestamp | VerifyError::InvalidTimestamp(_) => {
                Self::BadRequest(e.to_string())
            }
            VerifyError::Mac(_) => Self::Internal(e.to_string()),
            VerifyError::ExpiredTimestamp | VerifyError::Mismatch => {
                Self::Unauthorized(e.to_string())
            }
        }
    }
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), "Rejecting event request: {}", self);
        } else {
            tracing::warn!(status = status.as_u16(), "Rejecting event request: {}", self);
        }
        status.into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_error_mapping() {
        let cases = [
            (VerifyError::MissingTimestamp, StatusCode::BAD_REQUEST),
            (VerifyError::InvalidTimestamp("abc".into()), StatusCode::BAD_REQUEST),
            (VerifyError::Mac("bad key".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (VerifyError::ExpiredTimestamp, StatusCode::UNAUTHORIZED),
            (VerifyError::Mismatch, StatusCode::UNAUTHORIZED),
        ];

        for (err, expected) in cases {
            assert_eq!(WebhookError::from(err).status_code(), expected);
        }
    }

    #[test]
    fn test_into_response_status() {
        let response = WebhookError::Internal("boom".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
