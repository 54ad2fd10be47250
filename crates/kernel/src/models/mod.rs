//! Model construction with an optional database pool.

use anyhow::Context;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::config::Config;
use crate::error::{AppError, AppResult};

/// A data model that handlers build through the [`ModelFactory`].
pub trait Model: Sized {
    /// Name used in log output.
    const NAME: &'static str;

    /// Construct the model, with a pool when one was requested.
    fn build(pool: Option<PgPool>) -> Self;
}

/// Hands out models, sharing one lazily connected pool.
#[derive(Debug, Clone, Default)]
pub struct ModelFactory {
    pool: Option<PgPool>,
}

impl ModelFactory {
    /// Create a factory from configuration.
    ///
    /// No connection is made until a model first uses the pool.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let pool = match &config.database_url {
            Some(url) => Some(
                PgPoolOptions::new()
                    .max_connections(config.database_max_connections)
                    .connect_lazy(url)
                    .context("invalid DATABASE_URL")?,
            ),
            None => None,
        };
        Ok(Self { pool })
    }

    /// A factory without a database.
    pub fn without_database() -> Self {
        Self::default()
    }

    pub fn has_database(&self) -> bool {
        self.pool.is_some()
    }

    /// Build a model, optionally connected to the database.
    pub fn build<M: Model>(&self, database: bool) -> AppResult<M> {
        if !database {
            return Ok(M::build(None));
        }
        match &self.pool {
            Some(pool) => Ok(M::build(Some(pool.clone()))),
            None => {
                tracing::error!(model = M::NAME, "model needs a database but none is configured");
                Err(AppError::Internal(anyhow::anyhow!(
                    "no database configured for model {}",
                    M::NAME
                )))
            }
        }
    }
}
