#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Routing, arity, and hook behaviour through the full router.

mod common;

use axum::http::StatusCode;

use common::{TestApp, test_config};
use nano_kernel::error::NOT_FOUND_BODY;
use nano_test_utils::{body_string, extract_cookies, get, post_form};

async fn get_text(app: &TestApp, uri: &str) -> (StatusCode, String) {
    let response = app.request(get(uri, "")).await;
    let status = response.status();
    (status, body_string(response).await)
}

#[tokio::test]
async fn root_renders_home_page() {
    let app = TestApp::new();
    let (status, body) = get_text(&app, "/").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("<title>Nano | Nano</title>"));
    assert!(body.contains(r#"<meta name="description" content="Nano framework.">"#));
    assert!(body.trim_end().ends_with("-->"));
    assert!(body.contains(r#"<a href="/contact">Contact</a>"#));
}

#[tokio::test]
async fn extra_params_end_with_not_found_page() {
    let app = TestApp::new();

    for uri in ["/index/index/extra", "/contact/extra", "/unknown"] {
        let (status, body) = get_text(&app, uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
        assert_eq!(body, NOT_FOUND_BODY, "{uri}");
    }
}

#[tokio::test]
async fn method_arity_range_is_enforced() {
    let app = TestApp::new();

    let (status, _) = get_text(&app, "/blog/show").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = get_text(&app, "/blog/show/1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "blog::show(1)");

    let (_, body) = get_text(&app, "/blog/show/1/2").await;
    assert_eq!(body, "blog::show(1,2)");

    let (status, _) = get_text(&app, "/blog/show/1/2/3").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn empty_segments_keep_their_position() {
    let app = TestApp::new();
    let (status, body) = get_text(&app, "/blog/show//2").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "blog::show(,2)");
}

#[tokio::test]
async fn names_match_case_insensitively() {
    let app = TestApp::new();

    let (_, body) = get_text(&app, "/BLOG/Show/7").await;
    assert_eq!(body, "blog::show(7)");

    let (status, _) = get_text(&app, "/Contact").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn unknown_method_becomes_parameter_of_default_method() {
    let app = TestApp::new();

    let (_, body) = get_text(&app, "/blog/2024").await;
    assert_eq!(body, "blog::index(2024)");

    let (_, body) = get_text(&app, "/blog").await;
    assert_eq!(body, "blog::index()");
}

#[tokio::test]
async fn shared_method_names_are_never_routed() {
    let app = TestApp::new();

    let (status, body) = get_text(&app, "/blog/render").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "blog::index(render)");

    let (status, _) = get_text(&app, "/blog/redirect/x").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn base_path_is_stripped_before_resolution() {
    let mut config = test_config();
    config.base_path = "/app/".to_string();
    let app = TestApp::with_config(config);

    let (status, body) = get_text(&app, "/app/blog/show/3").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "blog::show(3)");

    let (status, body) = get_text(&app, "/app").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#"<a href="/app/">Home</a>"#));
    assert!(body.contains(r#"<a href="/app/contact">Contact</a>"#));
}

#[tokio::test]
async fn current_user_hook_reads_session() {
    let app = TestApp::new();

    let (_, body) = get_text(&app, "/account/whoami").await;
    assert_eq!(body, "anonymous");

    let response = app.request(get("/account/login/42", "")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let cookies = extract_cookies(&response);
    assert!(!cookies.is_empty());

    let response = app.request(get("/account/whoami", &cookies)).await;
    assert_eq!(body_string(response).await, "42");
}

#[tokio::test]
async fn post_to_unroutable_path_is_not_found() {
    let app = TestApp::new();
    let response = app
        .request(post_form("/nowhere/at/all", "", &[("a", "b")]))
        .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_string(response).await, NOT_FOUND_BODY);
}
