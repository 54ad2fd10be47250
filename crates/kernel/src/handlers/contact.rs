//! Contact form handler.
//!
//! GET draws the form; POST checks the token, validates, records the outcome
//! in the session, and redirects back so the result is shown by the next GET.

use async_trait::async_trait;
use axum::response::Response;
use tracing::info;

use crate::dispatch::{Arity, Handler, HandlerContext, MethodSpec};
use crate::error::{AppError, AppResult};
use crate::form::{InputKind, validate};

pub const NAME_ERROR: &str = "Please enter your name.";
pub const EMAIL_ERROR: &str = "Please enter a valid email address.";
pub const THANKS: &str = "Thanks, your message has been received.";

/// Serves the contact form.
#[derive(Debug, Default, Clone, Copy)]
pub struct ContactHandler;

#[async_trait]
impl Handler for ContactHandler {
    fn name(&self) -> &str {
        "contact"
    }

    fn methods(&self) -> Vec<MethodSpec> {
        vec![MethodSpec::new("index", Arity::none())]
    }

    async fn invoke(
        &self,
        method: &str,
        _params: Vec<String>,
        cx: HandlerContext,
    ) -> AppResult<Response> {
        match method {
            "index" => contact(&cx).await,
            _ => Err(AppError::NotFound),
        }
    }
}

async fn contact(cx: &HandlerContext) -> AppResult<Response> {
    let form = cx.form();

    if cx.submission().is_state_changing() {
        if form.submit_request().await? {
            let name = cx.field("name").unwrap_or_default();
            let email = cx.field("email").unwrap_or_default();
            let mut valid = true;

            if !validate(name, InputKind::Alpha, Some(64), Some("'-.")) {
                form.error("name", Some(NAME_ERROR)).await?;
                valid = false;
            }
            if !validate(email, InputKind::Email, Some(254), None) {
                form.error("email", Some(EMAIL_ERROR)).await?;
                valid = false;
            }

            if valid {
                info!(%email, "contact message received");
                form.success(THANKS).await?;
            }
        }
        return cx.redirect(Some(&cx.route().handler));
    }

    let mut data = tera::Context::new();
    data.insert("form", &form.view_state().await?);
    cx.render("contact", &data)
}
