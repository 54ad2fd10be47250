//! Redirect responses.

use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use url::Url;

use crate::error::{AppError, AppResult};
use crate::form::is_absolute_url;

/// Resolve a redirect target to a `Location` value.
///
/// Absolute URLs are used as given; anything else is appended to `base_url`.
/// No target means the base URL itself. CR and LF are stripped first.
pub fn redirect_location(base_url: &Url, target: Option<&str>) -> AppResult<String> {
    let Some(target) = target else {
        return Ok(base_url.to_string());
    };
    let target: String = target.chars().filter(|c| !matches!(c, '\r' | '\n')).collect();
    let target = target.as_str();

    if is_absolute_url(target) {
        return Ok(target.to_string());
    }

    let joined = format!("{base_url}{}", target.trim_start_matches('/'));
    if is_absolute_url(&joined) {
        Ok(joined)
    } else {
        Err(AppError::InvalidRedirect(target.to_string()))
    }
}

/// 302 to the resolved target, or the 404 page if it cannot be resolved.
pub fn redirect(base_url: &Url, target: Option<&str>) -> AppResult<Response> {
    let location = redirect_location(base_url, target)?;
    tracing::debug!(%location, "redirecting");
    Ok((StatusCode::FOUND, [(header::LOCATION, location)]).into_response())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://example.com/app/").unwrap()
    }

    #[test]
    fn no_target_goes_to_base() {
        assert_eq!(
            redirect_location(&base(), None).unwrap(),
            "https://example.com/app/"
        );
    }

    #[test]
    fn absolute_target_is_kept() {
        assert_eq!(
            redirect_location(&base(), Some("https://other.example/path")).unwrap(),
            "https://other.example/path"
        );
    }

    #[test]
    fn relative_target_joins_base() {
        assert_eq!(
            redirect_location(&base(), Some("contact")).unwrap(),
            "https://example.com/app/contact"
        );
        assert_eq!(
            redirect_location(&base(), Some("/blog/show/1")).unwrap(),
            "https://example.com/app/blog/show/1"
        );
    }

    #[test]
    fn line_breaks_are_stripped() {
        assert_eq!(
            redirect_location(&base(), Some("contact\r\n")).unwrap(),
            "https://example.com/app/contact"
        );
        let err = redirect_location(&base(), Some("contact\r\nSet-Cookie: x=1")).unwrap_err();
        assert!(matches!(err, AppError::InvalidRedirect(_)));
    }

    #[test]
    fn unparseable_target_is_rejected() {
        assert!(redirect_location(&base(), Some("has space")).is_err());
    }

    #[test]
    fn redirect_sets_location() {
        let response = redirect(&base(), Some("contact")).unwrap();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(
            response.headers()[header::LOCATION],
            "https://example.com/app/contact"
        );
    }
}
