//! Home page handler.

use async_trait::async_trait;
use axum::response::Response;

use crate::dispatch::{Arity, Handler, HandlerContext, MethodSpec};
use crate::error::{AppError, AppResult};

/// Serves the home page.
#[derive(Debug, Default, Clone, Copy)]
pub struct IndexHandler;

#[async_trait]
impl Handler for IndexHandler {
    fn name(&self) -> &str {
        "index"
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
            "index" => home(&cx),
            _ => Err(AppError::NotFound),
        }
    }
}

fn home(cx: &HandlerContext) -> AppResult<Response> {
    let mut data = tera::Context::new();
    data.insert("page_title", "Nano");
    data.insert("description", "Nano framework.");
    data.insert(
        "keywords",
        "nano, framework, dispatcher, csrf, rust, open source",
    );
    cx.render("home", &data)
}
