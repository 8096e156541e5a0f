use jsonwebtoken::{Algorithm, DecodingKey, Header};

#[derive(Debug, thiserror::Error)]
pub enum KeyError {
    #[error("unexpected signing method: {0:?}")]
    UnexpectedAlgorithm(Algorithm),

    #[error("no verification key available: {0}")]
    Unavailable(String),

    #[error("invalid verification key: {0}")]
    InvalidKey(#[from] jsonwebtoken::errors::Error),
}

/// Maps a token's header to the key that must have signed it.
///
/// Supplied once when the gate is built. Implementations are expected to
/// reject algorithms they do not issue; the verifier trusts whatever key it
/// gets back for the header's `alg`.
pub trait KeyResolver: Send + Sync {
    fn resolve(&self, header: &Header) -> Result<DecodingKey, KeyError>;
}

impl<F> KeyResolver for F
where
    F: Fn(&Header) -> Result<DecodingKey, KeyError> + Send + Sync,
{
    fn resolve(&self, header: &Header) -> Result<DecodingKey, KeyError> {
        self(header)
    }
}

/// A single key pinned to a fixed set of algorithms.
///
/// Key material is not printable via Debug.
#[derive(Clone)]
pub struct StaticKey {
    key: DecodingKey,
    algorithms: Vec<Algorithm>,
}

impl std::fmt::Debug for StaticKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticKey")
            .field("algorithms", &self.algorithms)
            .finish_non_exhaustive()
    }
}

impl StaticKey {
    pub fn new(key: DecodingKey, algorithms: impl Into<Vec<Algorithm>>) -> Self {
        Self {
            key,
            algorithms: algorithms.into(),
        }
    }

    /// Shared-secret key for `HS256` / `HS384` / `HS512`.
    pub fn hmac(secret: &[u8], algorithm: Algorithm) -> Self {
        Self::new(DecodingKey::from_secret(secret), vec![algorithm])
    }

    /// Public key in PEM form; the key type follows `algorithm`.
    pub fn from_pem(algorithm: Algorithm, pem: &[u8]) -> Result<Self, KeyError> {
        let key = match algorithm {
            Algorithm::RS256
            | Algorithm::RS384
            | Algorithm::RS512
            | Algorithm::PS256
            | Algorithm::PS384
            | Algorithm::PS512 => DecodingKey::from_rsa_pem(pem)?,
            Algorithm::ES256 | Algorithm::ES384 => DecodingKey::from_ec_pem(pem)?,
            Algorithm::EdDSA => DecodingKey::from_ed_pem(pem)?,
            _ => {
                return Err(KeyError::Unavailable(format!(
                    "{algorithm:?} uses a shared secret, not a PEM public key"
                )));
            }
        };

        Ok(Self::new(key, vec![algorithm]))
    }

    pub fn algorithms(&self) -> &[Algorithm] {
        &self.algorithms
    }
}

impl KeyResolver for StaticKey {
    fn resolve(&self, header: &Header) -> Result<DecodingKey, KeyError> {
        if !self.algorithms.contains(&header.alg) {
            return Err(KeyError::UnexpectedAlgorithm(header.alg));
        }
        Ok(self.key.clone())
    }
}
