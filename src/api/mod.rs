pub mod v1;

use axum::{Router, routing::get};

/// Top-level routes. `/health` sits outside `/api/v1` so it can be exempted
/// by exact path.
pub fn routes() -> Router {
    Router::new()
        .route("/health", get(v1::handlers::health::health))
        .nest("/api/v1", v1::routes())
}
