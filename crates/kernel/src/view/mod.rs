//! Page rendering with Tera templates.

mod paginate;

pub use paginate::{Pagination, paginate};

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use tera::Tera;
use tracing::debug;

use crate::error::AppResult;

/// Renders named views into complete pages.
pub struct View {
    tera: Tera,
    site_title: String,
    base_path: String,
    development: bool,
}

impl View {
    /// Load every `*.html` template under `template_dir`.
    pub fn new(template_dir: &Path, site_title: &str, development: bool) -> Result<Self> {
        let pattern = template_dir.join("**/*.html");
        let pattern_str = pattern
            .to_str()
            .context("invalid template directory path")?;

        let tera = Tera::new(pattern_str).context("failed to initialize Tera templates")?;

        let template_names: Vec<_> = tera.get_template_names().collect();
        debug!(count = template_names.len(), "loaded templates");

        Ok(Self {
            tera,
            site_title: site_title.to_string(),
            base_path: "/".to_string(),
            development,
        })
    }

    /// Create a view with no templates (for testing).
    pub fn empty(site_title: &str) -> Self {
        Self {
            tera: Tera::default(),
            site_title: site_title.to_string(),
            base_path: "/".to_string(),
            development: false,
        }
    }

    /// Add a template from a string.
    pub fn add_raw_template(&mut self, name: &str, content: &str) -> Result<()> {
        self.tera
            .add_raw_template(name, content)
            .with_context(|| format!("failed to add template {name}"))
    }

    /// Mount path exposed to templates as `base_path`.
    pub fn set_base_path(&mut self, base_path: &str) {
        self.base_path = base_path.to_string();
    }

    pub fn set_development(&mut self, development: bool) {
        self.development = development;
    }

    pub fn tera(&self) -> &Tera {
        &self.tera
    }

    /// Render `{view}.html` with `data`.
    ///
    /// `page_title` defaults to the view name in title case and always gets the
    /// site title appended. The output ends with an HTML comment holding the
    /// seconds elapsed since `started`.
    pub fn render(
        &self,
        view: &str,
        data: &tera::Context,
        started: Option<Instant>,
    ) -> AppResult<String> {
        let mut context = data.clone();
        let title = context
            .get("page_title")
            .and_then(|v| v.as_str())
            .map(str::to_owned)
            .unwrap_or_else(|| page_title(view));
        context.insert("page_title", &format!("{title} | {}", self.site_title));
        if !context.contains_key("base_path") {
            context.insert("base_path", &self.base_path);
        }

        let mut html = self.tera.render(&format!("{view}.html"), &context)?;

        if self.development {
            let dump = serde_json::to_string_pretty(&context.into_json())
                .unwrap_or_else(|e| e.to_string());
            html.push_str("<pre>");
            html.push_str(&html_escape(&dump));
            html.push_str("</pre>");
        }

        if let Some(started) = started {
            html.push_str(&format!("<!-- {:.6} -->", started.elapsed().as_secs_f64()));
        }

        Ok(html)
    }
}

impl std::fmt::Debug for View {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("View")
            .field("templates", &self.tera.get_template_names().count())
            .field("site_title", &self.site_title)
            .field("development", &self.development)
            .finish()
    }
}

/// Default page title for a view: `contact/thank_you` becomes `Contact Thank You`.
pub fn page_title(view: &str) -> String {
    view.replace(['_', '/'], " ")
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// HTML-escape a string for safe output.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}
