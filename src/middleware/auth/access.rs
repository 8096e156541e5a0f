//! Bearer-token gate in front of the application routes.
//!
//! Per request:
//! 1. exempt `(path, method)` → forward untouched, the header is never read
//! 2. extract `Authorization: Bearer <token>` → reject on failure
//! 3. verify the token with the configured verifier + key resolver → reject on failure
//! 4. forward the original request (decoded claims are not attached)
//!
//! Every rejection is logged once through the injected [`AuthLogger`] and
//! answered with the same 401.

use std::sync::Arc;

use axum::{
    Router,
    extract::{OriginalUri, Request, State},
    http::{HeaderMap, Method},
    middleware::{self, Next},
    response::Response,
};

use crate::error::GateError;
use crate::services::auth::{
    bearer::extract_bearer,
    exemption::ExemptionTable,
    keys::KeyResolver,
    log::{AuthLogger, TracingLogger},
    verifier::{JwtVerifier, TokenVerifier},
};

/// Why a request was let through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Exempt,
    Authenticated,
}

/// The gate's immutable configuration.
///
/// Cloning is cheap; every clone shares the same table, resolver, verifier
/// and logger, none of which can be mutated after construction.
#[derive(Clone)]
pub struct AuthGate {
    keys: Arc<dyn KeyResolver>,
    exemptions: Arc<ExemptionTable>,
    verifier: Arc<dyn TokenVerifier>,
    logger: Arc<dyn AuthLogger>,
}

impl std::fmt::Debug for AuthGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print key material
        f.debug_struct("AuthGate")
            .field("exemptions", &self.exemptions)
            .finish_non_exhaustive()
    }
}

impl AuthGate {
    /// Gate verifying JWTs with [`JwtVerifier`] defaults and logging via `tracing`.
    pub fn new(keys: impl KeyResolver + 'static, exemptions: ExemptionTable) -> Self {
        Self {
            keys: Arc::new(keys),
            exemptions: Arc::new(exemptions),
            verifier: Arc::new(JwtVerifier::default()),
            logger: Arc::new(TracingLogger),
        }
    }

    pub fn with_verifier(mut self, verifier: impl TokenVerifier + 'static) -> Self {
        self.verifier = Arc::new(verifier);
        self
    }

    pub fn with_logger(mut self, logger: impl AuthLogger + 'static) -> Self {
        self.logger = Arc::new(logger);
        self
    }

    pub fn exemptions(&self) -> &ExemptionTable {
        &self.exemptions
    }

    /// Admit/reject decision without side effects.
    pub fn check(
        &self,
        method: &Method,
        path: &str,
        headers: &HeaderMap,
    ) -> Result<Decision, GateError> {
        if self.exemptions.is_exempt(path, method) {
            return Ok(Decision::Exempt);
        }

        let token = extract_bearer(headers)?;
        self.verifier.verify(token, self.keys.as_ref())?;

        Ok(Decision::Authenticated)
    }

    /// [`check`](Self::check), logging the rejection reason when there is one.
    pub fn authorize(
        &self,
        method: &Method,
        path: &str,
        headers: &HeaderMap,
    ) -> Result<Decision, GateError> {
        self.check(method, path, headers).inspect_err(|err| {
            self.logger.rejected(method, path, err);
        })
    }
}

/// Puts `gate` in front of every route (and the fallback) of `router`.
///
/// Example:
/// ```ignore
/// let gate = AuthGate::new(StaticKey::hmac(secret, Algorithm::HS256), exemptions);
/// let app = middleware::auth::access::apply(api_routes(), gate);
/// ```
pub fn apply<S>(router: Router<S>, gate: AuthGate) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(middleware::from_fn_with_state(gate, handle))
}

/// The gate as an axum middleware function, for callers wiring
/// `from_fn_with_state` themselves.
pub async fn handle(
    State(gate): State<AuthGate>,
    req: Request,
    next: Next,
) -> Result<Response, GateError> {
    // Nested routers see a stripped uri; exemptions are written against the full path.
    let path = match req.extensions().get::<OriginalUri>() {
        Some(OriginalUri(uri)) => uri.path(),
        None => req.uri().path(),
    };

    let decision = gate.authorize(req.method(), path, req.headers())?;
    tracing::debug!(?decision, "request admitted by auth gate");

    Ok(next.run(req).await)
}
