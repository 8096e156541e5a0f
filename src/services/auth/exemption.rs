//! Routes that bypass bearer authentication.
//!
//! The table is keyed by the exact request path. Each path lists the methods
//! that are exempt on it; every other method on that path still needs a token.

use std::collections::{HashMap, HashSet};

use axum::http::Method;

#[derive(Debug, thiserror::Error)]
pub enum ExemptionError {
    #[error("invalid http method '{method}' for exempt path '{path}'")]
    InvalidMethod { path: String, method: String },
}

/// Immutable `(path, method)` exemption table.
///
/// Built once while wiring the server, then handed to
/// [`AuthGate`](crate::middleware::auth::AuthGate), which only ever reads it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExemptionTable {
    routes: HashMap<String, HashSet<Method>>,
}

impl ExemptionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`insert`](Self::insert).
    ///
    /// ```ignore
    /// let table = ExemptionTable::new()
    ///     .allow("/health", [Method::GET])
    ///     .allow("/login", [Method::POST]);
    /// ```
    pub fn allow<I>(mut self, path: impl Into<String>, methods: I) -> Self
    where
        I: IntoIterator<Item = Method>,
    {
        self.insert(path, methods);
        self
    }

    /// Adds `methods` to the exempt set of `path`.
    ///
    /// An entry with no methods is kept but grants no exemption.
    pub fn insert<I>(&mut self, path: impl Into<String>, methods: I)
    where
        I: IntoIterator<Item = Method>,
    {
        self.routes.entry(path.into()).or_default().extend(methods);
    }

    /// Builds a table from plain strings, e.g. `{"/": ["GET"]}`.
    ///
    /// Method names are case-sensitive, as on the wire.
    pub fn from_config(config: HashMap<String, Vec<String>>) -> Result<Self, ExemptionError> {
        let mut table = Self::new();

        for (path, methods) in config {
            let mut parsed = HashSet::with_capacity(methods.len());
            for method in methods {
                let m = Method::from_bytes(method.as_bytes()).map_err(|_| {
                    ExemptionError::InvalidMethod {
                        path: path.clone(),
                        method: method.clone(),
                    }
                })?;
                parsed.insert(m);
            }
            table.insert(path, parsed);
        }

        Ok(table)
    }

    /// True only when `path` is listed exactly and `method` is one of its
    /// exempt methods.
    pub fn is_exempt(&self, path: &str, method: &Method) -> bool {
        self.routes
            .get(path)
            .is_some_and(|methods| methods.contains(method))
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl<P, I> FromIterator<(P, I)> for ExemptionTable
where
    P: Into<String>,
    I: IntoIterator<Item = Method>,
{
    fn from_iter<T: IntoIterator<Item = (P, I)>>(iter: T) -> Self {
        let mut table = Self::new();
        for (path, methods) in iter {
            table.insert(path, methods);
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listed_method_is_exempt() {
        let table = ExemptionTable::new().allow("/", [Method::GET]);

        assert!(table.is_exempt("/", &Method::GET));
    }

    #[test]
    fn other_method_on_listed_path_is_not_exempt() {
        let table = ExemptionTable::new().allow("/", [Method::GET]);

        assert!(!table.is_exempt("/", &Method::POST));
        assert!(!table.is_exempt("/", &Method::DELETE));
    }

    #[test]
    fn path_without_methods_grants_nothing() {
        let table = ExemptionTable::new().allow("/open", Vec::<Method>::new());

        assert_eq!(table.len(), 1);
        assert!(!table.is_exempt("/open", &Method::GET));
        assert!(!table.is_exempt("/open", &Method::POST));
    }

    #[test]
    fn path_match_is_exact() {
        let table = ExemptionTable::new().allow("/health", [Method::GET]);

        assert!(!table.is_exempt("/health/", &Method::GET));
        assert!(!table.is_exempt("/health/deep", &Method::GET));
        assert!(!table.is_exempt("/Health", &Method::GET));
        assert!(!table.is_exempt("/", &Method::GET));
    }

    #[test]
    fn empty_table_exempts_nothing() {
        let table = ExemptionTable::new();

        assert!(table.is_empty());
        assert!(!table.is_exempt("/", &Method::GET));
    }

    #[test]
    fn insert_accumulates_methods() {
        let mut table = ExemptionTable::new();
        table.insert("/login", [Method::POST]);
        table.insert("/login", [Method::OPTIONS]);

        assert!(table.is_exempt("/login", &Method::POST));
        assert!(table.is_exempt("/login", &Method::OPTIONS));
        assert!(!table.is_exempt("/login", &Method::GET));
    }

    #[test]
    fn from_config_parses_method_names() {
        let config = HashMap::from([
            ("/".to_string(), vec!["GET".to_string()]),
            (
                "/hooks".to_string(),
                vec!["POST".to_string(), "PUT".to_string()],
            ),
        ]);

        let table = ExemptionTable::from_config(config).unwrap();

        assert!(table.is_exempt("/", &Method::GET));
        assert!(table.is_exempt("/hooks", &Method::PUT));
        assert!(!table.is_exempt("/hooks", &Method::GET));
    }

    #[test]
    fn from_config_is_case_sensitive_on_methods() {
        let config = HashMap::from([("/".to_string(), vec!["get".to_string()])]);

        let table = ExemptionTable::from_config(config).unwrap();

        assert!(!table.is_exempt("/", &Method::GET));
    }

    #[test]
    fn from_config_rejects_invalid_method() {
        let config = HashMap::from([("/".to_string(), vec!["GE T".to_string()])]);

        let err = ExemptionTable::from_config(config).unwrap_err();

        assert!(matches!(err, ExemptionError::InvalidMethod { .. }));
    }

    #[test]
    fn collects_from_pairs() {
        let table: ExemptionTable = [("/a", vec![Method::GET]), ("/b", vec![Method::HEAD])]
            .into_iter()
            .collect();

        assert!(table.is_exempt("/a", &Method::GET));
        assert!(table.is_exempt("/b", &Method::HEAD));
        assert!(!table.is_exempt("/a", &Method::HEAD));
    }
}
