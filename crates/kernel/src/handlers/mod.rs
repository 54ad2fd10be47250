//! Built-in handlers.

pub mod contact;
pub mod index;

use anyhow::Result;

use crate::dispatch::HandlerRegistry;

pub use contact::ContactHandler;
pub use index::IndexHandler;

/// Registry with every built-in handler.
pub fn registry() -> Result<HandlerRegistry> {
    let mut registry = HandlerRegistry::new();
    registry.register(IndexHandler)?;
    registry.register(ContactHandler)?;
    Ok(registry)
}
