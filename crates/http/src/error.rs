//! Error handling for the bookshelf HTTP layer

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use uuid::Uuid;

use crate::negotiate::Negotiation;
use crate::translate::ErrorTranslator;

/// Application error types that map to HTTP responses
#[derive(Error, Debug)]
pub enum AppError {
    /// No route template fits the request. Transport level.
    #[error("route not matched")]
    RouteNotMatched,

    /// The route matched but the addressed entity does not exist.
    #[error("{resource} not found")]
    ResourceNotFound { resource: &'static str },

    #[error("validation error: {message}")]
    Validation {
        details: Vec<serde_json::Value>,
        message: String,
    },

    /// An error that carries its own HTTP status.
    #[error("{message}")]
    Http { status: StatusCode, message: String },

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Create a domain-level not found error for `resource`
    pub fn not_found(resource: &'static str) -> Self {
        Self::ResourceNotFound { resource }
    }

    /// Create a validation error
    pub fn validation(details: Vec<serde_json::Value>, message: impl Into<String>) -> Self {
        Self::Validation {
            details,
            message: message.into(),
        }
    }

    /// Create an error with an explicit status
    pub fn with_status(status: StatusCode, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
        }
    }

    /// Create a forbidden error
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::with_status(StatusCode::FORBIDDEN, message)
    }

    /// Flatten the error into the data the translator renders from
    pub fn report(&self) -> ErrorReport {
        let (kind, status, message, details) = match self {
            AppError::RouteNotMatched => (
                ErrorKind::RouteNotMatched,
                Some(StatusCode::NOT_FOUND),
                "Not Found".to_string(),
                Vec::new(),
            ),
            AppError::ResourceNotFound { resource } => (
                ErrorKind::ResourceNotFound,
                Some(StatusCode::NOT_FOUND),
                format!("{resource} not found"),
                Vec::new(),
            ),
            AppError::Validation { details, message } => (
                ErrorKind::Validation,
                Some(StatusCode::UNPROCESSABLE_ENTITY),
                message.clone(),
                details.clone(),
            ),
            AppError::Http { status, message } => {
                (ErrorKind::Http, Some(*status), message.clone(), Vec::new())
            }
            AppError::Internal(e) => (ErrorKind::Internal, None, e.to_string(), Vec::new()),
        };

        let detail = match self {
            AppError::Internal(e) => format!("{e:#}"),
            other => other.to_string(),
        };

        ErrorReport {
            kind,
            status,
            message,
            details,
            detail,
            trace_id: Uuid::now_v7().to_string(),
        }
    }
}

/// Which branch of the translation policy an error falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    RouteNotMatched,
    ResourceNotFound,
    Validation,
    Http,
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::RouteNotMatched => "route_not_matched",
            ErrorKind::ResourceNotFound => "resource_not_found",
            ErrorKind::Validation => "validation_error",
            ErrorKind::Http => "http_error",
            ErrorKind::Internal => "internal_error",
        }
    }
}

/// Rendering input carried by error responses in their extensions.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub kind: ErrorKind,
    /// Explicit status, `None` when the error does not carry one.
    pub status: Option<StatusCode>,
    pub message: String,
    pub details: Vec<serde_json::Value>,
    /// Full error chain, only rendered in debug mode.
    pub detail: String,
    pub trace_id: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let report = self.report();

        match report.kind {
            ErrorKind::Internal => tracing::error!(
                trace_id = %report.trace_id,
                error_code = report.kind.as_str(),
                error = %report.detail,
                "request error"
            ),
            ErrorKind::Validation | ErrorKind::Http => tracing::warn!(
                trace_id = %report.trace_id,
                error_code = report.kind.as_str(),
                status_code = ?report.status.map(|s| s.as_u16()),
                "request error"
            ),
            ErrorKind::RouteNotMatched | ErrorKind::ResourceNotFound => tracing::debug!(
                trace_id = %report.trace_id,
                error_code = report.kind.as_str(),
                message = %report.message,
                "not found"
            ),
        }

        // Provisional rendering; the translation middleware re-renders it once
        // the negotiated representation is known.
        let mut response = ErrorTranslator::default().translate(&report, Negotiation::default());
        response.extensions_mut().insert(report);
        response
    }
}
