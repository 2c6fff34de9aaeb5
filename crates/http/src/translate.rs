//! Error-to-response translation.
//!
//! The translator is the single place where error bodies are shaped. It is a
//! pure function of the [`ErrorReport`], the request's [`Negotiation`] and the
//! debug flag it was constructed with.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::error::{ErrorKind, ErrorReport};
use crate::negotiate::Negotiation;

/// Message used when an error has nothing printable to say.
pub const FALLBACK_MESSAGE: &str = "Whoops, looks like something went wrong.";

#[derive(Debug, Clone, Copy, Default)]
pub struct ErrorTranslator {
    debug: bool,
}

impl ErrorTranslator {
    pub fn new(debug: bool) -> Self {
        Self { debug }
    }

    pub fn translate(&self, report: &ErrorReport, negotiation: Negotiation) -> Response {
        match report.kind {
            // Raised deliberately by handlers: always the short JSON shape.
            ErrorKind::ResourceNotFound => (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": { "message": report.message } })),
            )
                .into_response(),
            ErrorKind::RouteNotMatched => {
                let status = StatusCode::NOT_FOUND;
                let message = reason(status);
                if negotiation.wants_json {
                    (
                        status,
                        Json(json!({ "error": { "message": message, "status": status.as_u16() } })),
                    )
                        .into_response()
                } else {
                    (status, Html(html_page(status, message, None))).into_response()
                }
            }
            ErrorKind::Validation | ErrorKind::Http | ErrorKind::Internal => {
                self.uncaught(report, negotiation)
            }
        }
    }

    fn uncaught(&self, report: &ErrorReport, negotiation: Negotiation) -> Response {
        let message = if report.message.trim().is_empty() {
            FALLBACK_MESSAGE
        } else {
            report.message.as_str()
        };

        if negotiation.wants_json {
            let status = report.status.unwrap_or(StatusCode::BAD_REQUEST);
            let mut error = json!({ "message": message, "status": status.as_u16() });
            if !report.details.is_empty() {
                error["details"] = json!(report.details);
            }
            if self.debug {
                error["debug"] = json!({
                    "kind": report.kind.as_str(),
                    "detail": report.detail,
                    "trace_id": report.trace_id,
                });
            }
            (status, Json(json!({ "error": error }))).into_response()
        } else {
            let status = report.status.unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            let detail = self.debug.then_some(report.detail.as_str());
            (status, Html(html_page(status, message, detail))).into_response()
        }
    }
}

fn reason(status: StatusCode) -> &'static str {
    status.canonical_reason().unwrap_or("Error")
}

fn html_page(status: StatusCode, message: &str, detail: Option<&str>) -> String {
    let debug = detail
        .map(|d| format!("\n<pre>{}</pre>", escape_html(d)))
        .unwrap_or_default();

    format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>{code} {reason}</title></head>\n<body>\n<h1>{reason}</h1>\n<p>{message}</p>{debug}\n</body>\n</html>\n",
        code = status.as_u16(),
        reason = reason(status),
        message = escape_html(message),
    )
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}
