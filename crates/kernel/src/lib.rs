//! Nano Kernel Library
//!
//! Path dispatcher with arity-checked handler methods and a session-backed
//! form protocol (CSRF tokens, flash messages, preserved input).
//! The main entry point for running the server is the `nano` binary.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod form;
pub mod handlers;
pub mod models;
pub mod session;
pub mod state;
pub mod view;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use state::AppState;
