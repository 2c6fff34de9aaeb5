//! Typed extractors shared by resource handlers.

use std::str::FromStr;

use axum::{
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::{header, request::Parts, HeaderMap},
    Form, Json,
};
use serde::de::DeserializeOwned;

use crate::error::AppError;

/// A single path parameter constrained to a digit sequence.
///
/// A segment with anything but ASCII digits (or one that does not fit `T`)
/// means the route does not match, so the handler never runs and the client
/// gets the generic 404.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Numeric<T>(pub T);

impl<S, T> FromRequestParts<S> for Numeric<T>
where
    S: Send + Sync,
    T: FromStr + Send,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::RouteNotMatched)?;

        parse_digits(&raw)
            .map(Numeric)
            .ok_or(AppError::RouteNotMatched)
    }
}

pub fn parse_digits<T: FromStr>(raw: &str) -> Option<T> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

/// Request body accepted as JSON or as an urlencoded form.
///
/// An empty body yields `T::default()`; unknown fields are left to `T`'s
/// serde attributes.
#[derive(Debug, Clone, Default)]
pub struct Payload<T>(pub T);

fn is_form(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.starts_with("application/x-www-form-urlencoded"))
        .unwrap_or(false)
}

impl<S, T> FromRequest<S> for Payload<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Default + Send,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if is_form(req.headers()) {
            let Form(value) = Form::<T>::from_request(req, state)
                .await
                .map_err(|rejection| AppError::with_status(rejection.status(), rejection.body_text()))?;
            return Ok(Payload(value));
        }

        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| AppError::with_status(rejection.status(), rejection.body_text()))?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Payload(T::default()));
        }

        let Json(value) = Json::<T>::from_bytes(&bytes)
            .map_err(|rejection| AppError::with_status(rejection.status(), rejection.body_text()))?;
        Ok(Payload(value))
    }
}
