//! Nano Kernel
//!
//! HTTP server routing every request through the dispatcher.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use nano_kernel::dispatch::{self, CurrentUserHook};
use nano_kernel::{AppState, Config, handlers, session, state};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    init_tracing();

    info!("Starting Nano kernel");

    let config = Config::from_env().context("failed to load configuration")?;
    info!(
        port = config.port,
        base_url = %config.base_url,
        "Configuration loaded"
    );

    let registry = handlers::registry().context("failed to register handlers")?;
    info!(handlers = ?registry.handler_names(), "Handlers registered");

    let dispatcher = state::dispatcher(&config, registry).with_hook(CurrentUserHook);
    let state = AppState::new(config.clone(), dispatcher)
        .context("failed to initialize application state")?;

    // Session layer: Redis when configured, process memory otherwise
    let app = dispatch::router();
    let app = match &config.redis_url {
        Some(redis_url) => {
            let layer = session::create_redis_session_layer(redis_url, &config)
                .await
                .context("failed to create session layer")?;
            info!("Sessions stored in Redis");
            app.layer(layer)
        }
        None => {
            info!("Sessions stored in memory");
            app.layer(session::create_memory_session_layer(&config))
        }
    };

    let app = app.layer(TraceLayer::new_for_http()).with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("failed to bind to address")?;

    info!(%addr, "Server listening");

    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
