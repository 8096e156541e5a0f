use axum::http::Method;

use crate::error::GateError;

/// Sink for gate rejections, injected at construction.
///
/// Called exactly once per rejected request and never for admitted ones.
pub trait AuthLogger: Send + Sync {
    fn rejected(&self, method: &Method, path: &str, err: &GateError);
}

/// Default sink: one `warn` line per rejection through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl AuthLogger for TracingLogger {
    fn rejected(&self, method: &Method, path: &str, err: &GateError) {
        tracing::warn!(%method, path, error = %err, "request rejected by auth gate");
    }
}
