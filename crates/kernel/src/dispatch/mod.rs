//! Request dispatch: path resolution, arity validation, and handler invocation.
//!
//! Every request path is resolved to `(handler, method, params)` against a
//! registry built at startup, checked against the method's declared arity,
//! and handed to the handler with a [`HandlerContext`].

mod arity;
mod context;
mod dispatcher;
mod hook;
mod redirect;
mod registry;
mod resolver;

pub use arity::{Arity, ArityValidator, supplied_len};
pub use context::HandlerContext;
pub use dispatcher::{Dispatcher, dispatch_request};
pub use hook::{CurrentUser, CurrentUserHook, PreDispatchHook, SESSION_USER_ID};
pub use redirect::{redirect, redirect_location};
pub use registry::{Handler, HandlerRegistry, MethodSpec, RegisteredHandler, SHARED_METHODS};
pub use resolver::{PathResolver, Route, split_params};

use axum::Router;

use crate::state::AppState;

/// Router sending every request to the dispatcher.
///
/// Needs a session layer.
pub fn router() -> Router<AppState> {
    Router::new().fallback(dispatch_request)
}
