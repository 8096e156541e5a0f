/*
 * Responsibility
 * - GET/POST /api/v1/ping
 * - gate を通過したリクエストだけがここに届く
 */
use axum::{Json, http::Method, response::IntoResponse};
use serde_json::json;

pub async fn ping(method: Method) -> impl IntoResponse {
    Json(json!({ "pong": true, "method": method.as_str() }))
}
