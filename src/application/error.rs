use std::error::Error as StdError;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use hottake_api_types::ErrorBody;

use crate::application::feed::FeedError;
use crate::application::repos::RepoError;
use crate::application::takes::TakeError;
use crate::domain::error::DomainError;
use crate::infra::error::InfraError;

/// Diagnostic payload attached to error responses so the response-logging
/// middleware can emit the full source chain without leaking it to clients.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub source: &'static str,
    pub status: StatusCode,
    pub messages: Vec<String>,
}

impl ErrorReport {
    pub fn from_error(source: &'static str, status: StatusCode, error: &dyn StdError) -> Self {
        let mut messages = Vec::new();
        messages.push(error.to_string());
        let mut current = error.source();
        while let Some(inner) = current {
            messages.push(inner.to_string());
            current = inner.source();
        }
        Self {
            source,
            status,
            messages,
        }
    }

    pub fn from_message(
        source: &'static str,
        status: StatusCode,
        message: impl Into<String>,
    ) -> Self {
        Self {
            source,
            status,
            messages: vec![message.into()],
        }
    }

    pub fn attach(self, response: &mut Response) {
        response.extensions_mut().insert(self);
    }
}

/// HTTP-facing error: a status plus the `{message}` JSON body every error
/// response carries. The client-visible message is chosen at construction;
/// the raw detail travels only in the attached [`ErrorReport`].
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    report: ErrorReport,
}

impl ApiError {
    pub fn new(
        source: &'static str,
        status: StatusCode,
        message: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        let message = message.into();
        let report = ErrorReport::from_message(source, status, detail);
        Self {
            status,
            message,
            report,
        }
    }

    pub fn from_error(
        source: &'static str,
        status: StatusCode,
        message: impl Into<String>,
        error: &dyn StdError,
    ) -> Self {
        Self {
            status,
            message: message.into(),
            report: ErrorReport::from_error(source, status, error),
        }
    }

    pub fn bad_request(source: &'static str, message: impl Into<String>) -> Self {
        let message = message.into();
        Self::new(source, StatusCode::BAD_REQUEST, message.clone(), message)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            message: self.message,
        };
        let mut response = (self.status, Json(body)).into_response();
        self.report.attach(&mut response);
        response
    }
}

fn repo_error_to_api(source: &'static str, err: RepoError) -> ApiError {
    match &err {
        RepoError::NotFound => {
            // 400 rather than 404, preserved for wire compatibility.
            ApiError::from_error(source, StatusCode::BAD_REQUEST, "Post not found", &err)
        }
        RepoError::InvalidInput { .. } => ApiError::from_error(
            source,
            StatusCode::BAD_REQUEST,
            "Invalid arguments provided",
            &err,
        ),
        RepoError::NotReady | RepoError::Timeout => ApiError::from_error(
            source,
            StatusCode::SERVICE_UNAVAILABLE,
            "Service temporarily unavailable",
            &err,
        ),
        RepoError::Persistence(_) => ApiError::from_error(
            source,
            StatusCode::INTERNAL_SERVER_ERROR,
            "Unexpected error occurred",
            &err,
        ),
    }
}

impl From<FeedError> for ApiError {
    fn from(error: FeedError) -> Self {
        const SOURCE: &str = "application::feed";
        match error {
            FeedError::UnknownSort(err) => ApiError::bad_request(SOURCE, err.to_string()),
            FeedError::Repo(err) => repo_error_to_api(SOURCE, err),
        }
    }
}

impl From<TakeError> for ApiError {
    fn from(error: TakeError) -> Self {
        const SOURCE: &str = "application::takes";
        match error {
            TakeError::Domain(DomainError::Validation { message }) => {
                ApiError::bad_request(SOURCE, message)
            }
            TakeError::Domain(err @ DomainError::NotFound { .. }) => {
                ApiError::from_error(SOURCE, StatusCode::BAD_REQUEST, "Post not found", &err)
            }
            TakeError::InvalidId => ApiError::bad_request(SOURCE, "Invalid arguments provided"),
            TakeError::NotFound => ApiError::bad_request(SOURCE, "Post not found"),
            TakeError::Repo(err) => repo_error_to_api(SOURCE, err),
        }
    }
}

/// Process-level failures surfaced by the bootstrap path.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }
}
