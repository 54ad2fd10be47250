//! Page navigation for paged listings.

use super::html_escape;

/// Navigation state for a paged listing addressed with `/page/N` segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
    /// Link prefix; the page number is appended.
    pub prefix: String,
    pub page: u64,
    pub pages: u64,
}

impl Pagination {
    /// Build navigation for `request_path` (which may already end in `page/N`).
    pub fn new(request_path: &str, base_path: &str, page: u64, per_page: u64, total: u64) -> Self {
        let relative = request_path
            .strip_prefix(base_path)
            .unwrap_or_else(|| request_path.trim_start_matches('/'))
            .trim_end_matches('/');

        let prefix = if relative.is_empty() {
            format!("{base_path}page/")
        } else if relative.contains("page/") {
            format!(
                "{base_path}{}",
                relative.trim_end_matches(|c: char| c.is_ascii_digit())
            )
        } else {
            format!("{base_path}{relative}/page/")
        };

        let pages = if per_page == 0 || total <= per_page {
            1
        } else {
            total.div_ceil(per_page)
        };

        Self {
            prefix,
            page: page.max(1),
            pages,
        }
    }

    pub fn link(&self, page: u64) -> String {
        format!("{}{page}", self.prefix)
    }

    /// `first « prev « (page X of Y) » next » last`, linking what is reachable.
    pub fn to_html(&self) -> String {
        let anchor = |page: u64, label: &str| {
            format!(r#"<a href="{}">{label}</a>"#, html_escape(&self.link(page)))
        };

        let back = if self.page > 1 {
            format!(
                "{} &#171; {} &#171;",
                anchor(1, "first"),
                anchor(self.page - 1, "prev")
            )
        } else {
            "first &#171; prev &#171;".to_string()
        };

        let forward = if self.page < self.pages {
            format!(
                "&#187; {} &#187; {}",
                anchor(self.page + 1, "next"),
                anchor(self.pages, "last")
            )
        } else {
            "&#187; next &#187; last".to_string()
        };

        format!("{back} (page {} of {}) {forward}", self.page, self.pages)
    }
}

/// Render page navigation HTML.
pub fn paginate(request_path: &str, base_path: &str, page: u64, per_page: u64, total: u64) -> String {
    Pagination::new(request_path, base_path, page, per_page, total).to_html()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn front_page_links() {
        let p = Pagination::new("/", "/", 1, 10, 35);
        assert_eq!(p.prefix, "/page/");
        assert_eq!(p.pages, 4);
    }

    #[test]
    fn listing_gains_page_segment() {
        let p = Pagination::new("/blog/", "/", 1, 10, 20);
        assert_eq!(p.link(2), "/blog/page/2");
    }

    #[test]
    fn existing_page_segment_is_reused() {
        let p = Pagination::new("/app/blog/page/12", "/app/", 12, 5, 100);
        assert_eq!(p.prefix, "/app/blog/page/");
        assert_eq!(p.pages, 20);
    }

    #[test]
    fn single_page_has_no_links() {
        let html = paginate("/blog", "/", 1, 10, 3);
        assert_eq!(
            html,
            "first &#171; prev &#171; (page 1 of 1) &#187; next &#187; last"
        );
    }

    #[test]
    fn middle_page_links_both_ways() {
        let html = paginate("/blog", "/", 2, 10, 30);
        assert!(html.contains(r#"<a href="/blog/page/1">first</a>"#));
        assert!(html.contains(r#"<a href="/blog/page/1">prev</a>"#));
        assert!(html.contains("(page 2 of 3)"));
        assert!(html.contains(r#"<a href="/blog/page/3">next</a>"#));
        assert!(html.contains(r#"<a href="/blog/page/3">last</a>"#));
    }

    #[test]
    fn zero_per_page_is_one_page() {
        assert_eq!(Pagination::new("/", "/", 1, 0, 50).pages, 1);
    }
}
