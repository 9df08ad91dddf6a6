use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::models::Notification;
use crate::services::StoreQueryError;

const FALLBACK_FAILURE_MESSAGE: &str = "Unknown store error";

/// Uniform success/failure wrapper returned by the notifications endpoint.
///
/// Exactly one of `data` and `message` is populated, selected by `success`.
#[derive(Debug, Clone, Serialize)]
pub struct ResultEnvelope {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Vec<Notification>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

impl ResultEnvelope {
    pub fn success(data: Vec<Notification>) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    /// An empty message is replaced so clients always get some text.
    pub fn failure(message: impl Into<String>) -> Self {
        let message = message.into();
        let message = if message.trim().is_empty() {
            FALLBACK_FAILURE_MESSAGE.to_string()
        } else {
            message
        };

        Self {
            success: false,
            data: None,
            message: Some(message),
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn data(&self) -> Option<&[Notification]> {
        self.data.as_deref()
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn status_code(&self) -> StatusCode {
        if self.success {
            StatusCode::OK
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl From<Result<Vec<Notification>, StoreQueryError>> for ResultEnvelope {
    fn from(result: Result<Vec<Notification>, StoreQueryError>) -> Self {
        match result {
            Ok(data) => Self::success(data),
            Err(err) => Self::failure(err.to_string()),
        }
    }
}

impl IntoResponse for ResultEnvelope {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self)).into_response()
    }
}
