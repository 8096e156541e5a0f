//! `Authorization: Bearer <token>` extraction.

use axum::http::{HeaderMap, header};

use crate::error::GateError;

const SCHEME: &str = "bearer";

/// Returns the raw token carried by the `Authorization` header.
///
/// - Missing or empty header: [`GateError::MissingAuthorization`].
/// - Anything other than exactly `<scheme> <token>` split on a single space,
///   or a scheme other than `Bearer` (any case): [`GateError::MalformedAuthorization`].
///
/// The token is returned verbatim; its shape is the verifier's business.
pub fn extract_bearer(headers: &HeaderMap) -> Result<&str, GateError> {
    let value = match headers.get(header::AUTHORIZATION) {
        Some(v) if !v.is_empty() => v,
        _ => return Err(GateError::MissingAuthorization),
    };

    // Non-visible-ASCII header bytes cannot carry a bearer token.
    let value = value
        .to_str()
        .map_err(|_| GateError::MalformedAuthorization)?;

    let mut parts = value.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(token), None) if scheme.eq_ignore_ascii_case(SCHEME) => Ok(token),
        _ => Err(GateError::MalformedAuthorization),
    }
}
