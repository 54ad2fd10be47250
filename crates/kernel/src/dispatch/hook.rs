//! Pre-dispatch hooks.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::AppResult;

use super::context::HandlerContext;

/// Session key holding the logged-in user's id.
pub const SESSION_USER_ID: &str = "user_id";

/// Per-request setup that runs after routing and before the handler.
///
/// Hooks run in registration order. An error ends the request.
#[async_trait]
pub trait PreDispatchHook: Send + Sync {
    async fn before_dispatch(&self, cx: &mut HandlerContext) -> AppResult<()>;
}

/// The user behind the current request, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: Option<String>,
}

impl CurrentUser {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn is_authenticated(&self) -> bool {
        self.id.is_some()
    }
}

/// Loads [`CurrentUser`] from the session into the context extensions.
#[derive(Debug, Default, Clone, Copy)]
pub struct CurrentUserHook;

#[async_trait]
impl PreDispatchHook for CurrentUserHook {
    async fn before_dispatch(&self, cx: &mut HandlerContext) -> AppResult<()> {
        let id = match cx.session().get(SESSION_USER_ID).await? {
            Some(Value::String(id)) if !id.is_empty() => Some(id),
            Some(Value::Number(id)) => Some(id.to_string()),
            _ => None,
        };
        if let Some(id) = &id {
            tracing::debug!(user = %id, "current user loaded");
        }
        cx.extensions.insert(CurrentUser { id });
        Ok(())
    }
}
