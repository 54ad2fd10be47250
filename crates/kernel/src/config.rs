//! Configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use url::Url;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port (default: 3000).
    pub port: u16,

    /// Path prefix the application is mounted under (default: "/").
    ///
    /// Always starts and ends with `/`.
    pub base_path: String,

    /// Absolute base URL used to resolve relative redirect targets.
    pub base_url: Url,

    /// Appended to every page title (default: "Nano").
    pub site_title: String,

    /// Handler used when the path does not name a registered one (default: "index").
    pub default_handler: String,

    /// Method used when the path does not name a routable one (default: "index").
    pub default_method: String,

    /// Path to Tera templates (default: ./templates).
    pub templates_dir: PathBuf,

    /// Redis connection URL. When None, sessions are kept in process memory.
    pub redis_url: Option<String>,

    /// PostgreSQL connection URL. When None, models are built without a pool.
    pub database_url: Option<String>,

    /// Maximum database connections in pool (default: 5).
    pub database_max_connections: u32,

    /// Cookie SameSite policy: "strict", "lax", or "none" (default: "strict").
    pub cookie_same_site: String,

    /// Only send the session cookie over HTTPS (default: false).
    pub cookie_secure: bool,

    /// Session inactivity expiry. None expires the cookie when the browser closes.
    pub session_expiry_hours: Option<i64>,

    /// Random bytes per CSRF token (default: 40).
    pub token_length: usize,

    /// Append a dump of the view data to rendered pages (default: false).
    pub development: bool,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let port: u16 = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .context("PORT must be a valid u16")?;

        let base_path = normalize_base_path(&env::var("BASE_PATH").unwrap_or_default());

        let base_url = env::var("BASE_URL")
            .unwrap_or_else(|_| format!("http://localhost:{port}{base_path}"));
        let base_url = parse_base_url(&base_url)?;

        let site_title = env::var("SITE_TITLE").unwrap_or_else(|_| "Nano".to_string());

        let default_handler = env::var("DEFAULT_HANDLER").unwrap_or_else(|_| "index".to_string());
        let default_method = env::var("DEFAULT_METHOD").unwrap_or_else(|_| "index".to_string());

        let templates_dir = env::var("TEMPLATES_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./templates"));

        let redis_url = env::var("REDIS_URL").ok().filter(|s| !s.is_empty());
        let database_url = env::var("DATABASE_URL").ok().filter(|s| !s.is_empty());

        let database_max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "5".to_string())
            .parse()
            .context("DATABASE_MAX_CONNECTIONS must be a valid u32")?;

        let cookie_same_site = env::var("COOKIE_SAME_SITE")
            .unwrap_or_else(|_| "strict".to_string())
            .to_lowercase();

        let cookie_secure = parse_flag(env::var("COOKIE_SECURE").ok().as_deref());

        let session_expiry_hours = match env::var("SESSION_EXPIRY_HOURS") {
            Ok(v) if !v.is_empty() => Some(
                v.parse()
                    .context("SESSION_EXPIRY_HOURS must be a valid i64")?,
            ),
            _ => None,
        };

        let token_length: usize = env::var("TOKEN_LENGTH")
            .unwrap_or_else(|_| "40".to_string())
            .parse()
            .context("TOKEN_LENGTH must be a valid usize")?;
        if token_length == 0 {
            bail!("TOKEN_LENGTH must be greater than zero");
        }

        let development = parse_flag(env::var("DEVELOPMENT").ok().as_deref());

        Ok(Self {
            port,
            base_path,
            base_url,
            site_title,
            default_handler,
            default_method,
            templates_dir,
            redis_url,
            database_url,
            database_max_connections,
            cookie_same_site,
            cookie_secure,
            session_expiry_hours,
            token_length,
            development,
        })
    }

    /// Configuration suitable for tests: no Redis, no database, defaults elsewhere.
    #[allow(clippy::expect_used)]
    pub fn for_tests() -> Self {
        Self {
            port: 3000,
            base_path: "/".to_string(),
            base_url: Url::parse("http://localhost:3000/").expect("static URL is valid"),
            site_title: "Nano".to_string(),
            default_handler: "index".to_string(),
            default_method: "index".to_string(),
            templates_dir: PathBuf::from("./templates"),
            redis_url: None,
            database_url: None,
            database_max_connections: 5,
            cookie_same_site: "strict".to_string(),
            cookie_secure: false,
            session_expiry_hours: None,
            token_length: 40,
            development: false,
        }
    }
}

/// Normalize a mount path to `/` or `/prefix/`.
pub fn normalize_base_path(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{trimmed}/")
    }
}

fn parse_base_url(raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw).with_context(|| format!("BASE_URL is not a valid URL: {raw}"))?;
    if !url.has_host() {
        bail!("BASE_URL must include a host: {raw}");
    }
    // Relative targets are appended to the base, so it must end in a separator.
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn parse_flag(value: Option<&str>) -> bool {
    matches!(
        value.map(|v| v.trim().to_lowercase()).as_deref(),
        Some("1" | "true" | "yes" | "on")
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn base_path_is_normalized() {
        assert_eq!(normalize_base_path(""), "/");
        assert_eq!(normalize_base_path("/"), "/");
        assert_eq!(normalize_base_path("app"), "/app/");
        assert_eq!(normalize_base_path("/app/"), "/app/");
        assert_eq!(normalize_base_path("//nested/app//"), "/nested/app/");
    }

    #[test]
    fn base_url_gains_trailing_slash() {
        let url = parse_base_url("https://example.com/app").unwrap();
        assert_eq!(url.as_str(), "https://example.com/app/");
    }

    #[test]
    fn base_url_requires_host() {
        assert!(parse_base_url("not a url").is_err());
        assert!(parse_base_url("mailto:someone@example.com").is_err());
    }

    #[test]
    fn flags_accept_common_spellings() {
        assert!(parse_flag(Some("true")));
        assert!(parse_flag(Some("1")));
        assert!(parse_flag(Some(" YES ")));
        assert!(!parse_flag(Some("false")));
        assert!(!parse_flag(Some("")));
        assert!(!parse_flag(None));
    }

    #[test]
    fn test_config_has_sane_defaults() {
        let config = Config::for_tests();
        assert_eq!(config.base_path, "/");
        assert_eq!(config.base_url.as_str(), "http://localhost:3000/");
        assert_eq!(config.token_length, 40);
        assert!(config.redis_url.is_none());
    }
}
