/*
 * Responsibility
 * - middleware の公開インターフェース
 * - auth: bearer token gate, http: transport-level layers
 */
pub mod auth;
pub mod http;
