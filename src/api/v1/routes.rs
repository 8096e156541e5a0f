/*
 * Responsibility
 * - v1 の URL 構造を定義
 * - Bearer の要否は AuthGate の exemption table で決める (ここでは route_layer を掛けない)
 */
use axum::{Router, routing::get};

use crate::api::v1::handlers::ping::ping;

pub fn routes() -> Router {
    Router::new().route("/ping", get(ping).post(ping))
}
