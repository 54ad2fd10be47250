//! Parameter arity of handler methods.

use std::fmt;

use crate::error::{AppError, AppResult};

use super::registry::HandlerRegistry;

/// How many positional parameters a method accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Arity {
    pub required: usize,
    pub total: usize,
}

impl Arity {
    /// No parameters.
    pub const fn none() -> Self {
        Self {
            required: 0,
            total: 0,
        }
    }

    /// Exactly `n` parameters.
    pub const fn exact(n: usize) -> Self {
        Self {
            required: n,
            total: n,
        }
    }

    /// Between `required` and `total` parameters. `total` is raised to
    /// `required` if smaller.
    pub const fn range(required: usize, total: usize) -> Self {
        Self {
            required,
            total: if total < required { required } else { total },
        }
    }

    pub fn accepts(&self, supplied: usize) -> bool {
        self.required <= supplied && supplied <= self.total
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.required, self.total)
    }
}

/// Number of parameters actually supplied.
///
/// Splitting an empty parameter string yields a single empty element, which
/// counts as none.
pub fn supplied_len(params: &[String]) -> usize {
    match params {
        [only] if only.is_empty() => 0,
        _ => params.len(),
    }
}

/// Checks parameter lists against the registry's declared arities.
#[derive(Debug, Clone, Copy)]
pub struct ArityValidator<'a> {
    registry: &'a HandlerRegistry,
}

impl<'a> ArityValidator<'a> {
    pub fn new(registry: &'a HandlerRegistry) -> Self {
        Self { registry }
    }

    /// Whether `handler::method` exists and accepts `params`.
    pub fn validate(&self, handler: &str, method: &str, params: &[String]) -> bool {
        self.check(handler, method, params).is_ok()
    }

    /// Like [`validate`](Self::validate), with the reason for a rejection.
    pub fn check(&self, handler: &str, method: &str, params: &[String]) -> AppResult<()> {
        let Some(arity) = self.registry.arity(handler, method) else {
            tracing::debug!(%handler, %method, "no routable method");
            return Err(AppError::NotFound);
        };

        let supplied = supplied_len(params);
        if arity.accepts(supplied) {
            Ok(())
        } else {
            tracing::debug!(
                %handler,
                %method,
                required = arity.required,
                total = arity.total,
                supplied,
                "parameter count mismatch"
            );
            Err(AppError::ArityMismatch {
                handler: handler.to_string(),
                method: method.to_string(),
                required: arity.required,
                total: arity.total,
                supplied,
            })
        }
    }
}
