//! Application state shared across all requests.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use crate::config::Config;
use crate::dispatch::{Dispatcher, HandlerRegistry, PathResolver};
use crate::form::TokenIssuer;
use crate::models::ModelFactory;
use crate::view::View;

/// Shared application state.
///
/// Wrapped in Arc internally so Clone is cheap.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,

    /// Path resolution, handler registry, and hooks.
    dispatcher: Dispatcher,

    /// Template rendering.
    view: View,

    /// Model construction and database pool.
    models: ModelFactory,

    /// CSRF token generation.
    tokens: TokenIssuer,
}

impl AppState {
    /// Build state from configuration: templates from `templates_dir`, a lazy
    /// pool when `database_url` is set.
    pub fn new(config: Config, dispatcher: Dispatcher) -> Result<Self> {
        let mut view = View::new(&config.templates_dir, &config.site_title, config.development)
            .context("failed to load templates")?;
        view.set_base_path(&config.base_path);
        let models = ModelFactory::from_config(&config)?;

        info!(
            handlers = dispatcher.registry().len(),
            database = models.has_database(),
            "application state ready"
        );

        Ok(Self::from_parts(config, dispatcher, view, models))
    }

    /// Build state from ready parts.
    pub fn from_parts(
        config: Config,
        dispatcher: Dispatcher,
        view: View,
        models: ModelFactory,
    ) -> Self {
        let tokens = TokenIssuer::new(config.token_length);
        Self {
            inner: Arc::new(AppStateInner {
                config,
                dispatcher,
                view,
                models,
                tokens,
            }),
        }
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.inner.dispatcher
    }

    pub fn view(&self) -> &View {
        &self.inner.view
    }

    pub fn models(&self) -> &ModelFactory {
        &self.inner.models
    }

    pub fn tokens(&self) -> TokenIssuer {
        self.inner.tokens
    }
}

/// Resolver configured from `config`.
pub fn path_resolver(config: &Config) -> PathResolver {
    PathResolver::new(
        config.base_path.clone(),
        config.default_handler.clone(),
        config.default_method.clone(),
    )
}

/// Dispatcher over `registry` with the resolver from `config`.
pub fn dispatcher(config: &Config, registry: HandlerRegistry) -> Dispatcher {
    Dispatcher::new(registry, path_resolver(config))
}
