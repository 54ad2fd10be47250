//! Per-request context handed to handlers.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use axum::http::{Extensions, Method};
use axum::response::{Html, IntoResponse, Response};

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::form::{FormKey, FormSession, Submission};
use crate::models::ModelFactory;
use crate::session::SessionStore;
use crate::state::AppState;
use crate::view::View;

use super::redirect::redirect;
use super::resolver::Route;

/// What a handler can reach while serving one request.
pub struct HandlerContext {
    route: Route,
    submission: Submission,
    session: Arc<dyn SessionStore>,
    state: AppState,
    started: Instant,
    /// Values attached by pre-dispatch hooks.
    pub extensions: Extensions,
}

impl HandlerContext {
    pub fn new(
        route: Route,
        submission: Submission,
        session: Arc<dyn SessionStore>,
        state: AppState,
        started: Instant,
    ) -> Self {
        Self {
            route,
            submission,
            session,
            state,
            started,
            extensions: Extensions::new(),
        }
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    pub fn http_method(&self) -> &Method {
        &self.submission.method
    }

    pub fn submission(&self) -> &Submission {
        &self.submission
    }

    /// A submitted form field.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.submission.fields.get(name).map(String::as_str)
    }

    pub fn fields(&self) -> &BTreeMap<String, String> {
        &self.submission.fields
    }

    pub fn session(&self) -> &Arc<dyn SessionStore> {
        &self.session
    }

    pub fn config(&self) -> &Config {
        self.state.config()
    }

    pub fn view(&self) -> &View {
        self.state.view()
    }

    pub fn models(&self) -> &ModelFactory {
        self.state.models()
    }

    /// The form protocol for the routed handler method.
    pub fn form(&self) -> FormSession {
        FormSession::new(
            Arc::clone(&self.session),
            FormKey::new(&self.route.handler, &self.route.method),
            self.state.tokens(),
            self.submission.clone(),
        )
    }

    /// Render a view as the response.
    pub fn render(&self, view: &str, data: &tera::Context) -> AppResult<Response> {
        let html = self.state.view().render(view, data, Some(self.started))?;
        Ok(Html(html).into_response())
    }

    /// Redirect to `target`, or to the base URL when `None`.
    pub fn redirect(&self, target: Option<&str>) -> AppResult<Response> {
        redirect(&self.state.config().base_url, target)
    }

    /// End the request with the 404 page.
    pub fn not_found(&self) -> AppResult<Response> {
        Err(AppError::NotFound)
    }
}

impl std::fmt::Debug for HandlerContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerContext")
            .field("route", &self.route)
            .field("method", &self.submission.method)
            .finish_non_exhaustive()
    }
}
