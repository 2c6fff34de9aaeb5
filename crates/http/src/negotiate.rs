//! Content negotiation and the error-translation middleware.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::error::ErrorReport;
use crate::translate::ErrorTranslator;

/// Representation preference of the client, decided once per request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Negotiation {
    pub wants_json: bool,
}

impl Negotiation {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let accept = headers
            .get_all(header::ACCEPT)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .collect::<Vec<_>>()
            .join(",");

        let wants_json = preferred_media_type(&accept)
            .map(|media| media.contains("/json") || media.contains("+json"))
            .unwrap_or(false);

        Self { wants_json }
    }
}

/// Highest-quality media range of an `Accept` value, lowercased.
///
/// Ranges keep their header order when qualities tie; `q=0` ranges are dropped.
fn preferred_media_type(accept: &str) -> Option<String> {
    let mut ranges: Vec<(String, f32)> = accept
        .split(',')
        .filter_map(|range| {
            let mut parts = range.split(';');
            let media = parts.next()?.trim().to_ascii_lowercase();
            if media.is_empty() {
                return None;
            }
            let quality = parts
                .filter_map(|param| {
                    let (key, value) = param.split_once('=')?;
                    (key.trim() == "q").then(|| value.trim().parse::<f32>().ok())?
                })
                .next()
                .unwrap_or(1.0);
            Some((media, quality))
        })
        .filter(|(_, quality)| *quality > 0.0)
        .collect();

    ranges.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranges.into_iter().next().map(|(media, _)| media)
}

/// Middleware: negotiate once, then re-render any error response through the translator.
pub async fn translate_errors(
    State(translator): State<ErrorTranslator>,
    request: Request,
    next: Next,
) -> Response {
    let negotiation = Negotiation::from_headers(request.headers());

    let response = next.run(request).await;

    match response.extensions().get::<ErrorReport>() {
        Some(report) => translator.translate(report, negotiation),
        None => response,
    }
}
