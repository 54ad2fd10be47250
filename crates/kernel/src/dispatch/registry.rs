//! Handler registry - indexes handlers and the methods they expose as routes.
//!
//! Built once at startup. Names are matched case-insensitively.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use anyhow::{Result, bail};
use async_trait::async_trait;
use axum::response::Response;
use tracing::{debug, warn};

use crate::error::AppResult;

use super::arity::Arity;
use super::context::HandlerContext;

/// Operations every handler reaches through its [`HandlerContext`]. A method
/// with one of these names is never a route, even if a handler declares it.
pub const SHARED_METHODS: &[&str] = &["form", "models", "not_found", "redirect", "render"];

/// A method a handler exposes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSpec {
    pub name: String,
    pub arity: Arity,
}

impl MethodSpec {
    pub fn new(name: impl Into<String>, arity: Arity) -> Self {
        Self {
            name: name.into(),
            arity,
        }
    }
}

/// A named unit of request handling, addressed by the first path segment.
#[async_trait]
pub trait Handler: Send + Sync {
    /// Registry name.
    fn name(&self) -> &str;

    /// Methods reachable as the second path segment.
    fn methods(&self) -> Vec<MethodSpec>;

    /// Run `method` with positional `params`.
    ///
    /// Only called with a method from [`methods`](Self::methods) and a
    /// parameter count its arity accepts.
    async fn invoke(
        &self,
        method: &str,
        params: Vec<String>,
        cx: HandlerContext,
    ) -> AppResult<Response>;
}

/// A routable method with its declared spelling.
#[derive(Debug, Clone)]
struct RoutableMethod {
    name: String,
    arity: Arity,
}

/// A handler and its routable methods.
pub struct RegisteredHandler {
    name: String,
    handler: Arc<dyn Handler>,
    methods: HashMap<String, RoutableMethod>,
}

impl RegisteredHandler {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn handler(&self) -> Arc<dyn Handler> {
        Arc::clone(&self.handler)
    }

    /// Routable method names, sorted.
    pub fn method_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.methods.values().map(|m| m.name.as_str()).collect();
        names.sort_unstable();
        names
    }
}

impl std::fmt::Debug for RegisteredHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredHandler")
            .field("name", &self.name)
            .field("methods", &self.method_names())
            .finish()
    }
}

/// Static table of handlers, routable methods, and their arities.
#[derive(Debug)]
pub struct HandlerRegistry {
    handlers: HashMap<String, RegisteredHandler>,
    shared: HashSet<String>,
}

impl HandlerRegistry {
    /// Registry excluding [`SHARED_METHODS`] from routing.
    pub fn new() -> Self {
        Self::with_shared_methods(SHARED_METHODS.iter().copied())
    }

    /// Registry excluding the given method names from routing.
    pub fn with_shared_methods<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            handlers: HashMap::new(),
            shared: names.into_iter().map(str::to_lowercase).collect(),
        }
    }

    /// Add a handler.
    ///
    /// Fails on a duplicate handler name or a method declared twice. Methods
    /// named like a shared operation are skipped.
    pub fn register(&mut self, handler: impl Handler + 'static) -> Result<()> {
        self.register_arc(Arc::new(handler))
    }

    pub fn register_arc(&mut self, handler: Arc<dyn Handler>) -> Result<()> {
        let name = handler.name().to_string();
        let key = name.to_lowercase();
        if name.is_empty() || name.contains('/') {
            bail!("invalid handler name '{name}'");
        }
        if self.handlers.contains_key(&key) {
            bail!("handler '{name}' registered twice");
        }

        let mut methods = HashMap::new();
        for spec in handler.methods() {
            let method_key = spec.name.to_lowercase();
            if self.shared.contains(&method_key) {
                warn!(handler = %name, method = %spec.name, "shared method is not routable");
                continue;
            }
            if methods.contains_key(&method_key) {
                bail!("method '{}' declared twice on handler '{name}'", spec.name);
            }
            methods.insert(
                method_key,
                RoutableMethod {
                    name: spec.name,
                    arity: spec.arity,
                },
            );
        }

        debug!(handler = %name, methods = methods.len(), "registered handler");
        self.handlers.insert(
            key,
            RegisteredHandler {
                name,
                handler,
                methods,
            },
        );
        Ok(())
    }

    /// Look up a handler by name, ignoring case.
    pub fn handler(&self, name: &str) -> Option<&RegisteredHandler> {
        self.handlers.get(&name.to_lowercase())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handler(name).is_some()
    }

    /// Declared spelling of a routable method, ignoring case.
    pub fn routable_method(&self, handler: &str, method: &str) -> Option<&str> {
        self.routable(handler, method).map(|m| m.name.as_str())
    }

    /// Arity of a routable method.
    pub fn arity(&self, handler: &str, method: &str) -> Option<Arity> {
        self.routable(handler, method).map(|m| m.arity)
    }

    /// Whether `method` is excluded from routing on every handler.
    pub fn is_shared(&self, method: &str) -> bool {
        self.shared.contains(&method.to_lowercase())
    }

    /// Registered handler names, sorted.
    pub fn handler_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.values().map(|h| h.name.as_str()).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    fn routable(&self, handler: &str, method: &str) -> Option<&RoutableMethod> {
        self.handler(handler)?.methods.get(&method.to_lowercase())
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
