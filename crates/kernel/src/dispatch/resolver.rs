//! Path to route resolution.
//!
//! `/{handler}/{method}/{params...}` with fallbacks: an unknown handler
//! segment is retried as a method of the default handler, and an unknown
//! method segment becomes the first parameter of the default method.

use serde::Serialize;

use super::registry::HandlerRegistry;

/// The resolved target of one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Route {
    pub handler: String,
    pub method: String,
    pub params: Vec<String>,
}

/// Resolves request paths against a [`HandlerRegistry`].
#[derive(Debug, Clone)]
pub struct PathResolver {
    base_path: String,
    default_handler: String,
    default_method: String,
}

impl PathResolver {
    /// `base_path` is stripped from every path before resolution.
    pub fn new(
        base_path: impl Into<String>,
        default_handler: impl Into<String>,
        default_method: impl Into<String>,
    ) -> Self {
        Self {
            base_path: base_path.into(),
            default_handler: default_handler.into(),
            default_method: default_method.into(),
        }
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// Resolve a request path. Never fails: anything unrecognized falls back
    /// to the defaults, leaving arity validation to reject leftovers.
    pub fn resolve(&self, registry: &HandlerRegistry, raw_path: &str) -> Route {
        let path = self.strip_base(raw_path).trim_matches('/');

        // Empty segments keep their position but count as absent.
        let segments: Vec<&str> = path.splitn(3, '/').collect();
        let segment = |i: usize| segments.get(i).copied().filter(|s| !s.is_empty());

        let mut handler = registry
            .handler(&self.default_handler)
            .map(|h| h.name().to_string())
            .unwrap_or_else(|| self.default_handler.clone());
        let mut method_candidate = segment(1);
        let mut params = segment(2).map(str::to_owned);

        if let Some(candidate) = segment(0) {
            match registry.handler(candidate) {
                Some(found) => handler = found.name().to_string(),
                None => {
                    let mut rest = path.splitn(2, '/');
                    method_candidate = rest.next().filter(|s| !s.is_empty());
                    params = rest.next().filter(|s| !s.is_empty()).map(str::to_owned);
                }
            }
        }

        let mut method = registry
            .routable_method(&handler, &self.default_method)
            .map(str::to_owned)
            .unwrap_or_else(|| self.default_method.clone());

        if let Some(candidate) = method_candidate {
            match registry.routable_method(&handler, candidate) {
                Some(found) => method = found.to_string(),
                None => {
                    params = Some(match params {
                        Some(rest) => format!("{candidate}/{rest}"),
                        None => candidate.to_string(),
                    });
                }
            }
        }

        Route {
            handler,
            method,
            params: split_params(params.as_deref()),
        }
    }

    fn strip_base<'a>(&self, raw_path: &'a str) -> &'a str {
        if self.base_path == "/" {
            return raw_path;
        }
        if let Some(rest) = raw_path.strip_prefix(self.base_path.as_str()) {
            return rest;
        }
        if raw_path == self.base_path.trim_end_matches('/') {
            return "";
        }
        raw_path
    }
}

/// Split the parameter remainder on `/`. Nothing or an empty string is no
/// parameters; interior empty segments are kept.
pub fn split_params(params: Option<&str>) -> Vec<String> {
    match params {
        None | Some("") => Vec::new(),
        Some(params) => params.split('/').map(str::to_owned).collect(),
    }
}
