//! Nano test utilities.
//!
//! Fixture handlers and request helpers for exercising the dispatcher
//! end to end.

#![allow(clippy::expect_used)]

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, header};
use axum::response::{IntoResponse, Response};
use http_body_util::BodyExt;
use serde_json::Value;

use nano_kernel::AppResult;
use nano_kernel::dispatch::{
    Arity, CurrentUser, Handler, HandlerContext, MethodSpec, SESSION_USER_ID,
};

/// Handler answering `"{handler}::{method}(p1,p2)"` for any declared method.
#[derive(Debug, Clone)]
pub struct FixtureHandler {
    name: String,
    methods: Vec<MethodSpec>,
}

impl FixtureHandler {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            methods: Vec::new(),
        }
    }

    /// Declare a method.
    pub fn method(mut self, name: &str, arity: Arity) -> Self {
        self.methods.push(MethodSpec::new(name, arity));
        self
    }
}

#[async_trait]
impl Handler for FixtureHandler {
    fn name(&self) -> &str {
        &self.name
    }

    fn methods(&self) -> Vec<MethodSpec> {
        self.methods.clone()
    }

    async fn invoke(
        &self,
        method: &str,
        params: Vec<String>,
        cx: HandlerContext,
    ) -> AppResult<Response> {
        Ok(format!(
            "{}::{}({})",
            cx.route().handler,
            method,
            params.join(",")
        )
        .into_response())
    }
}

/// `account/login/{id}` stores a user id in the session; `account/whoami`
/// answers with the current user or `anonymous`.
#[derive(Debug, Default, Clone, Copy)]
pub struct AccountFixture;

#[async_trait]
impl Handler for AccountFixture {
    fn name(&self) -> &str {
        "account"
    }

    fn methods(&self) -> Vec<MethodSpec> {
        vec![
            MethodSpec::new("login", Arity::exact(1)),
            MethodSpec::new("whoami", Arity::none()),
        ]
    }

    async fn invoke(
        &self,
        method: &str,
        params: Vec<String>,
        cx: HandlerContext,
    ) -> AppResult<Response> {
        match method {
            "login" => {
                let id = params.into_iter().next().unwrap_or_default();
                cx.session()
                    .set(SESSION_USER_ID, Value::String(id.clone()))
                    .await?;
                Ok(format!("logged in {id}").into_response())
            }
            _ => {
                let user = cx
                    .extensions
                    .get::<CurrentUser>()
                    .cloned()
                    .unwrap_or_else(CurrentUser::anonymous);
                if !user.is_authenticated() {
                    return Ok("anonymous".into_response());
                }
                Ok(user.id.unwrap_or_default().into_response())
            }
        }
    }
}

/// Build a GET request, attaching `cookie` when non-empty.
pub fn get(uri: &str, cookie: &str) -> Request<Body> {
    let mut builder = Request::get(uri);
    if !cookie.is_empty() {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).expect("valid request")
}

/// Build a urlencoded POST request, attaching `cookie` when non-empty.
pub fn post_form(uri: &str, cookie: &str, fields: &[(&str, &str)]) -> Request<Body> {
    let body = fields
        .iter()
        .map(|(k, v)| {
            format!("{}={}", urlencoding::encode(k), urlencoding::encode(v))
        })
        .collect::<Vec<_>>()
        .join("&");

    let mut builder =
        Request::post(uri).header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if !cookie.is_empty() {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body)).expect("valid request")
}

/// Collect a response body as a string.
pub async fn body_string(response: Response) -> String {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("readable body")
        .to_bytes();
    String::from_utf8_lossy(&bytes).into_owned()
}

/// `name=value` pairs from every Set-Cookie header, joined for a Cookie header.
pub fn extract_cookies(response: &Response) -> String {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|cookie| cookie.split(';').next())
        .collect::<Vec<_>>()
        .join("; ")
}

/// The Location header of a redirect.
pub fn location(response: &Response) -> Option<String> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}
