/*
 * Responsibility
 * - Errors raised while deciding whether a request may pass the gate
 * - IntoResponse: every rejection is the same bare 401
 */
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::services::auth::verifier::VerifyError;

#[derive(Debug, Error)]
pub enum GateError {
    #[error("no authorization header")]
    MissingAuthorization,

    #[error("authorization header format must be Bearer {{token}}")]
    MalformedAuthorization,

    #[error("token verification failed: {0}")]
    TokenVerification(#[from] VerifyError),
}

impl IntoResponse for GateError {
    fn into_response(self) -> Response {
        // Callers must not be able to tell the three causes apart.
        let status = StatusCode::UNAUTHORIZED;
        let reason = status.canonical_reason().unwrap_or("Unauthorized");

        (status, reason).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::auth::keys::KeyError;
    use axum::http::header;
    use http_body_util::BodyExt;

    async fn parts(err: GateError) -> (StatusCode, Option<String>, String) {
        let response = err.into_response();
        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .map(|v| v.to_str().unwrap().to_string());
        let bytes = response.into_body().collect().await.unwrap().to_bytes();

        (status, content_type, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn every_variant_is_the_same_401() {
        let errors = [
            GateError::MissingAuthorization,
            GateError::MalformedAuthorization,
            GateError::TokenVerification(VerifyError::Key(KeyError::Unavailable(
                "no key".into(),
            ))),
        ];

        for err in errors {
            let (status, content_type, body) = parts(err).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED);
            assert_eq!(body, "Unauthorized");
            assert_eq!(content_type.as_deref(), Some("text/plain; charset=utf-8"));
        }
    }

    #[test]
    fn messages_keep_the_cause() {
        assert_eq!(
            GateError::MissingAuthorization.to_string(),
            "no authorization header"
        );
        assert_eq!(
            GateError::MalformedAuthorization.to_string(),
            "authorization header format must be Bearer {token}"
        );
    }
}
