pub mod bearer;
pub mod exemption;
pub mod keys;
pub mod log;
pub mod verifier;

pub use bearer::extract_bearer;
pub use exemption::{ExemptionError, ExemptionTable};
pub use keys::{KeyError, KeyResolver, StaticKey};
pub use log::{AuthLogger, TracingLogger};
pub use verifier::{Claims, JwtVerifier, TokenVerifier, VerifyError};
