/*
 * Responsibility
 * - GET /health (疎通用)
 * - 既定の AUTH_EXEMPT で gate を素通りする
 */
use axum::{Json, http::StatusCode, response::IntoResponse};
use serde_json::json;

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({"status": "ok"})))
}
