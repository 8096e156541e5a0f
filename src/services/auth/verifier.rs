//! Token verification behind a narrow trait.
//!
//! The gate only needs a yes/no (plus a reason for the log line), so
//! verifiers collapse signature, expiry, claim and algorithm failures into a
//! single [`VerifyError`].

use std::collections::HashMap;

use jsonwebtoken::{Algorithm, AlgorithmFamily, Validation};

use crate::services::auth::keys::{KeyError, KeyResolver};

/// Decoded token payload. The gate does not consume it.
pub type Claims = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    #[error(transparent)]
    Key(#[from] KeyError),

    #[error("jwt verification failed: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
}

pub trait TokenVerifier: Send + Sync {
    fn verify(&self, token: &str, keys: &dyn KeyResolver) -> Result<Claims, VerifyError>;
}

/// `jsonwebtoken`-backed verifier.
///
/// Defaults:
/// - `exp` / `nbf` are checked when present but not required
/// - no leeway
/// - no issuer or audience pin
///
/// The `Validation`s are built up front, one per algorithm, and only differ
/// in `algorithms`; verifying a token never allocates a new one.
#[derive(Debug, Clone)]
pub struct JwtVerifier {
    validations: HashMap<Algorithm, Validation>,
}

impl Default for JwtVerifier {
    fn default() -> Self {
        let families = [
            AlgorithmFamily::Hmac,
            AlgorithmFamily::Rsa,
            AlgorithmFamily::Ec,
            AlgorithmFamily::Ed,
        ];

        let validations = families
            .iter()
            .flat_map(|family| family.algorithms())
            .map(|&alg| {
                let mut validation = Validation::new(alg);
                validation.leeway = 0;
                validation.validate_exp = true;
                validation.validate_nbf = true;
                validation.validate_aud = false;
                validation.required_spec_claims.clear();
                (alg, validation)
            })
            .collect();

        Self { validations }
    }
}

impl JwtVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clock skew tolerated on `exp` / `nbf`.
    pub fn with_leeway(self, seconds: u64) -> Self {
        self.configure(|v| v.leeway = seconds)
    }

    /// Registered claims that must be present, e.g. `["exp"]`.
    pub fn require_claims<I, S>(self, claims: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let claims: Vec<String> = claims.into_iter().map(Into::into).collect();
        self.configure(|v| v.required_spec_claims.extend(claims.iter().cloned()))
    }

    pub fn with_issuer(self, issuer: impl Into<String>) -> Self {
        let issuer = issuer.into();
        self.configure(|v| v.set_issuer(&[&issuer]))
    }

    pub fn with_audience(self, audience: impl Into<String>) -> Self {
        let audience = audience.into();
        self.configure(|v| {
            v.set_audience(&[&audience]);
            v.validate_aud = true;
        })
    }

    fn configure(mut self, apply: impl Fn(&mut Validation)) -> Self {
        self.validations.values_mut().for_each(|v| apply(v));
        self
    }

    fn validation(&self, alg: Algorithm) -> Result<&Validation, KeyError> {
        self.validations
            .get(&alg)
            .ok_or(KeyError::UnexpectedAlgorithm(alg))
    }
}

impl TokenVerifier for JwtVerifier {
    fn verify(&self, token: &str, keys: &dyn KeyResolver) -> Result<Claims, VerifyError> {
        let header = jsonwebtoken::decode_header(token)?;
        // The resolver vets the header's algorithm before a validation is picked for it.
        let key = keys.resolve(&header)?;
        let validation = self.validation(header.alg)?;
        let data = jsonwebtoken::decode::<Claims>(token, &key, validation)?;

        Ok(data.claims)
    }
}
