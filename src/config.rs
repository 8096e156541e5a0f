/*
 * Responsibility
 * - 環境変数の読み込み (PORT, token 検証鍵, exempt routes など)
 * - 設定値のバリデーション (不足なら起動失敗)
 */
use std::collections::HashMap;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;
use std::{env, fmt};

use jsonwebtoken::Algorithm;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Verification key material, matching the configured algorithm family.
#[derive(Clone)]
pub enum KeyMaterial {
    Secret(String),
    PublicKeyPem(String),
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print key material
        match self {
            KeyMaterial::Secret(_) => f.write_str("Secret(..)"),
            KeyMaterial::PublicKeyPem(_) => f.write_str("PublicKeyPem(..)"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,

    pub auth_algorithm: Algorithm,
    pub auth_key: KeyMaterial,
    pub auth_leeway_seconds: u64,
    pub auth_require_exp: bool,
    pub auth_issuer: Option<String>,
    pub auth_audience: Option<String>,
    // path -> exempt methods
    pub auth_exempt: HashMap<String, Vec<String>>,

    pub body_limit_bytes: usize,
    pub request_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key/value source; `from_env` passes the
    /// process environment.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port: u16 = get("PORT").and_then(|s| s.parse().ok()).unwrap_or(3000);

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::parse(&get("APP_ENV").unwrap_or_else(|| "development".to_string()));

        let auth_algorithm = get("AUTH_ALGORITHM")
            .unwrap_or_else(|| "HS256".to_string())
            .parse::<Algorithm>()
            .map_err(|_| ConfigError::Invalid("AUTH_ALGORITHM"))?;

        let auth_key = if is_hmac(auth_algorithm) {
            let secret = get("AUTH_SECRET").ok_or(ConfigError::Missing("AUTH_SECRET"))?;
            if secret.is_empty() {
                return Err(ConfigError::Invalid("AUTH_SECRET"));
            }
            KeyMaterial::Secret(secret)
        } else {
            let pem = get("AUTH_PUBLIC_KEY_PEM")
                .ok_or(ConfigError::Missing("AUTH_PUBLIC_KEY_PEM"))?
                .replace("\\n", "\n");
            KeyMaterial::PublicKeyPem(pem)
        };

        let auth_leeway_seconds = get("AUTH_LEEWAY_SECONDS")
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(0);

        let auth_require_exp = match get("AUTH_REQUIRE_EXP") {
            Some(raw) => parse_flag(&raw).ok_or(ConfigError::Invalid("AUTH_REQUIRE_EXP"))?,
            None => false,
        };

        let auth_issuer = get("AUTH_ISSUER").filter(|s| !s.trim().is_empty());
        let auth_audience = get("AUTH_AUDIENCE").filter(|s| !s.trim().is_empty());

        let auth_exempt = parse_exempt_routes(
            &get("AUTH_EXEMPT").unwrap_or_else(|| "GET /health".to_string()),
        )?;

        let body_limit_bytes = get("BODY_LIMIT_BYTES")
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(1024 * 1024);

        let request_timeout = get("REQUEST_TIMEOUT_SECONDS")
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(30));

        Ok(Self {
            addr,
            app_env,
            auth_algorithm,
            auth_key,
            auth_leeway_seconds,
            auth_require_exp,
            auth_issuer,
            auth_audience,
            auth_exempt,
            body_limit_bytes,
            request_timeout,
        })
    }
}

/// Strict boolean: anything outside the two sets is a config error.
fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "" | "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn is_hmac(alg: Algorithm) -> bool {
    matches!(alg, Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512)
}

/// `"GET /health, POST /login, GET /"` -> `{"/health": ["GET"], ...}`
///
/// Method names are kept as written; the exemption table decides whether
/// they are valid.
fn parse_exempt_routes(raw: &str) -> Result<HashMap<String, Vec<String>>, ConfigError> {
    let mut routes: HashMap<String, Vec<String>> = HashMap::new();

    for entry in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let (method, path) = entry
            .split_once(char::is_whitespace)
            .map(|(m, p)| (m.trim(), p.trim()))
            .filter(|(m, p)| !m.is_empty() && p.starts_with('/'))
            .ok_or(ConfigError::Invalid("AUTH_EXEMPT"))?;

        routes
            .entry(path.to_string())
            .or_default()
            .push(method.to_string());
    }

    Ok(routes)
}
