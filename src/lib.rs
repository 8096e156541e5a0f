//! Bearer-token gate for axum routers.
//!
//! ```ignore
//! use axum::http::Method;
//! use jsonwebtoken::Algorithm;
//! use jwt_gate::{AuthGate, ExemptionTable, StaticKey};
//!
//! let exemptions = ExemptionTable::new().allow("/health", [Method::GET]);
//! let gate = AuthGate::new(StaticKey::hmac(b"secret", Algorithm::HS256), exemptions);
//! let app = jwt_gate::middleware::auth::apply(routes, gate);
//! ```
pub mod error;
pub mod middleware;
pub mod services;

pub use error::GateError;
pub use middleware::auth::{AuthGate, Decision};
pub use services::auth::{
    AuthLogger, Claims, ExemptionError, ExemptionTable, JwtVerifier, KeyError, KeyResolver,
    StaticKey, TokenVerifier, TracingLogger, VerifyError, extract_bearer,
};
