/*
 * Responsibility
 * - Config読み込み → AuthGate 生成 → Router 組み立て
 * - Middleware の適用 (auth gate, http layers)
 * - axum::serve() で起動
 */
use std::{panic, process};

use anyhow::{Context, Result};
use axum::Router;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use jwt_gate::middleware::{self, http::HttpSettings};
use jwt_gate::{AuthGate, ExemptionTable, JwtVerifier, StaticKey};

use crate::api;
use crate::config::{Config, KeyMaterial};

fn init_tracing() {
    // Prefer RUST_LOG if set; otherwise use a sensible default.
    // Ex:
    // RUST_LOG=info,jwt_gate=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        tracing::error!(?info, "panic");

        // Development: crash the whole process so we notice immediately.
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env()?;

    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting gate in {:?} mode on {} ({:?}, {} exempt paths)",
        config.app_env,
        config.addr,
        config.auth_algorithm,
        config.auth_exempt.len()
    );

    let gate = build_gate(&config)?;
    let app = build_router(gate, &config);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}

pub fn build_gate(config: &Config) -> Result<AuthGate> {
    let keys = match &config.auth_key {
        KeyMaterial::Secret(secret) => StaticKey::hmac(secret.as_bytes(), config.auth_algorithm),
        KeyMaterial::PublicKeyPem(pem) => {
            StaticKey::from_pem(config.auth_algorithm, pem.as_bytes())
                .context("AUTH_PUBLIC_KEY_PEM does not match AUTH_ALGORITHM")?
        }
    };

    let exemptions = ExemptionTable::from_config(config.auth_exempt.clone())?;

    let mut verifier = JwtVerifier::new().with_leeway(config.auth_leeway_seconds);
    if config.auth_require_exp {
        verifier = verifier.require_claims(["exp"]);
    }
    if let Some(iss) = &config.auth_issuer {
        verifier = verifier.with_issuer(iss);
    }
    if let Some(aud) = &config.auth_audience {
        verifier = verifier.with_audience(aud);
    }

    Ok(AuthGate::new(keys, exemptions).with_verifier(verifier))
}

pub fn build_router(gate: AuthGate, config: &Config) -> Router {
    let router = middleware::auth::apply(api::routes(), gate);

    middleware::http::apply(
        router,
        HttpSettings {
            body_limit_bytes: config.body_limit_bytes,
            request_timeout: config.request_timeout,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppEnv;
    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
    };
    use jsonwebtoken::{Algorithm, EncodingKey, Header, get_current_timestamp};
    use serde_json::json;
    use std::collections::HashMap;
    use std::time::Duration;
    use tower::ServiceExt;

    fn config() -> Config {
        Config {
            addr: "127.0.0.1:0".parse().unwrap(),
            app_env: AppEnv::Development,
            auth_algorithm: Algorithm::HS256,
            auth_key: KeyMaterial::Secret("test".into()),
            auth_leeway_seconds: 0,
            auth_require_exp: true,
            auth_issuer: Some("test".into()),
            auth_audience: None,
            auth_exempt: HashMap::from([("/health".to_string(), vec!["GET".to_string()])]),
            body_limit_bytes: 1024,
            request_timeout: Duration::from_secs(5),
        }
    }

    fn token(claims: serde_json::Value) -> String {
        jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"test"),
        )
        .unwrap()
    }

    async fn status(app: Router, uri: &str, auth: Option<String>) -> StatusCode {
        let mut req = Request::builder().uri(uri);
        if let Some(auth) = auth {
            req = req.header(header::AUTHORIZATION, auth);
        }
        app.oneshot(req.body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn health_is_exempt() {
        let config = config();
        let app = build_router(build_gate(&config).unwrap(), &config);

        assert_eq!(status(app, "/health", None).await, StatusCode::OK);
    }

    #[tokio::test]
    async fn ping_needs_a_token() {
        let config = config();
        let app = build_router(build_gate(&config).unwrap(), &config);

        assert_eq!(
            status(app, "/api/v1/ping", None).await,
            StatusCode::UNAUTHORIZED
        );
    }

    #[tokio::test]
    async fn ping_with_valid_token() {
        let config = config();
        let app = build_router(build_gate(&config).unwrap(), &config);
        let auth = format!(
            "Bearer {}",
            token(json!({ "iss": "test", "exp": get_current_timestamp() + 60 }))
        );

        assert_eq!(
            status(app, "/api/v1/ping", Some(auth)).await,
            StatusCode::OK
        );
    }

    #[tokio::test]
    async fn configured_claim_rules_apply() {
        let config = config();

        // exp is required
        let app = build_router(build_gate(&config).unwrap(), &config);
        let auth = format!("Bearer {}", token(json!({ "iss": "test" })));
        assert_eq!(
            status(app, "/api/v1/ping", Some(auth)).await,
            StatusCode::UNAUTHORIZED
        );

        // issuer is pinned
        let app = build_router(build_gate(&config).unwrap(), &config);
        let auth = format!(
            "Bearer {}",
            token(json!({ "iss": "other", "exp": get_current_timestamp() + 60 }))
        );
        assert_eq!(
            status(app, "/api/v1/ping", Some(auth)).await,
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn invalid_exempt_method_fails_startup() {
        let mut config = config();
        config
            .auth_exempt
            .insert("/x".to_string(), vec!["BAD METHOD".to_string()]);

        assert!(build_gate(&config).is_err());
    }

    #[test]
    fn pem_that_does_not_parse_fails_startup() {
        let mut config = config();
        config.auth_algorithm = Algorithm::RS256;
        config.auth_key = KeyMaterial::PublicKeyPem("garbage".into());

        assert!(build_gate(&config).is_err());
    }
}
