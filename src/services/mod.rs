/*
 * Responsibility
 * - token 検証まわりの部品 (exemption, bearer extraction, keys, verifier, log sink)
 */
pub mod auth;
