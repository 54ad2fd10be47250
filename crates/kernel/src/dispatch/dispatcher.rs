//! Dispatcher - resolves a request to a handler method and invokes it.
//!
//! Resolution and arity failures end the request with the 404 page; nothing
//! is retried and no handler code runs.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use axum::Form;
use axum::extract::{FromRequest, Request, State};
use axum::response::{IntoResponse, Response};
use tower_sessions::Session;
use tracing::{debug, info};

use crate::error::{AppError, AppResult};
use crate::form::Submission;
use crate::session::SessionStore;
use crate::state::AppState;

use super::arity::ArityValidator;
use super::context::HandlerContext;
use super::hook::PreDispatchHook;
use super::registry::HandlerRegistry;
use super::resolver::{PathResolver, Route};

/// Routes requests through the handler registry.
pub struct Dispatcher {
    registry: Arc<HandlerRegistry>,
    resolver: PathResolver,
    hooks: Vec<Arc<dyn PreDispatchHook>>,
}

impl Dispatcher {
    pub fn new(registry: HandlerRegistry, resolver: PathResolver) -> Self {
        Self {
            registry: Arc::new(registry),
            resolver,
            hooks: Vec::new(),
        }
    }

    /// Add a hook to run before every handler invocation.
    pub fn with_hook(mut self, hook: impl PreDispatchHook + 'static) -> Self {
        self.hooks.push(Arc::new(hook));
        self
    }

    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    /// Resolve `path` and check the parameter count.
    pub fn route(&self, path: &str) -> AppResult<Route> {
        let route = self.resolver.resolve(&self.registry, path);
        ArityValidator::new(&self.registry).check(&route.handler, &route.method, &route.params)?;
        Ok(route)
    }

    /// Serve one request.
    pub async fn dispatch(
        &self,
        state: &AppState,
        session: Arc<dyn SessionStore>,
        request: Request,
    ) -> AppResult<Response> {
        let started = Instant::now();
        let route = self.route(request.uri().path())?;

        let handler = self
            .registry
            .handler(&route.handler)
            .ok_or(AppError::NotFound)?
            .handler();

        let submission = read_submission(request).await;

        info!(
            handler = %route.handler,
            method = %route.method,
            params = ?route.params,
            http_method = %submission.method,
            "dispatching"
        );

        let method = route.method.clone();
        let params = route.params.clone();
        let mut cx = HandlerContext::new(route, submission, session, state.clone(), started);

        for hook in &self.hooks {
            hook.before_dispatch(&mut cx).await?;
        }

        handler.invoke(&method, params, cx).await
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("registry", &self.registry)
            .field("resolver", &self.resolver)
            .field("hooks", &self.hooks.len())
            .finish()
    }
}

/// Method and urlencoded body fields. Only state-changing requests have fields.
async fn read_submission(request: Request) -> Submission {
    let method = request.method().clone();
    let mut submission = Submission::new(method, BTreeMap::new());
    if !submission.is_state_changing() {
        return submission;
    }

    match Form::<BTreeMap<String, String>>::from_request(request, &()).await {
        Ok(Form(fields)) => submission.fields = fields,
        Err(rejection) => debug!(error = %rejection, "request has no form body"),
    }
    submission
}

/// Router fallback serving every path through the dispatcher.
pub async fn dispatch_request(
    State(state): State<AppState>,
    session: Session,
    request: Request,
) -> Response {
    let session: Arc<dyn SessionStore> = Arc::new(session);
    match state.dispatcher().dispatch(&state, session, request).await {
        Ok(response) => response,
        Err(e) => e.into_response(),
    }
}
