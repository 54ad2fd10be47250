#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Common test utilities for integration tests.
//!
//! Builds the real router, state, and session layer around the built-in
//! handlers plus test fixtures, then drives it with `oneshot`.

#![allow(dead_code)]

use std::path::PathBuf;

use axum::Router;
use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use tower::ServiceExt;

use nano_kernel::dispatch::{Arity, CurrentUserHook, HandlerRegistry};
use nano_kernel::{AppState, Config, dispatch, handlers, session, state};
use nano_test_utils::{AccountFixture, FixtureHandler};

/// Test application wrapper using the real kernel router.
pub struct TestApp {
    router: Router,
    pub state: AppState,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: Config) -> Self {
        let dispatcher = state::dispatcher(&config, registry()).with_hook(CurrentUserHook);
        let state =
            AppState::new(config.clone(), dispatcher).expect("Failed to initialize AppState");

        // Must match main.rs
        let router = dispatch::router()
            .layer(session::create_memory_session_layer(&config))
            .with_state(state.clone());

        Self { router, state }
    }

    /// Send a request to the test application.
    pub async fn request(&self, request: Request<Body>) -> Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request")
    }
}

/// Test configuration pointing at the project templates.
pub fn test_config() -> Config {
    let mut config = Config::for_tests();
    config.templates_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../templates");
    config
}

/// Built-in handlers plus `blog` and `account` fixtures.
pub fn registry() -> HandlerRegistry {
    let mut registry = handlers::registry().expect("built-in handlers register");
    registry
        .register(
            FixtureHandler::new("blog")
                .method("index", Arity::range(0, 1))
                .method("show", Arity::range(1, 2))
                .method("render", Arity::none()),
        )
        .expect("blog fixture registers");
    registry
        .register(AccountFixture)
        .expect("account fixture registers");
    registry
}
