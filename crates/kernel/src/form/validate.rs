//! Input validation predicates.

use std::net::IpAddr;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use url::Url;

static EMAIL_RE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(
        r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$",
    )
    .ok()
});

/// What a value must look like.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputKind {
    Alpha,
    Alnum,
    Numeric,
    Email,
    Url,
    Ip,
    /// Anything non-blank.
    #[default]
    Any,
}

impl FromStr for InputKind {
    type Err = std::convert::Infallible;

    /// Unknown names mean [`InputKind::Any`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_ascii_lowercase().as_str() {
            "alpha" => InputKind::Alpha,
            "alnum" => InputKind::Alnum,
            "numeric" => InputKind::Numeric,
            "email" => InputKind::Email,
            "url" => InputKind::Url,
            "ip" => InputKind::Ip,
            _ => InputKind::Any,
        })
    }
}

/// Check user input.
///
/// Blank input always fails. `max_len` (in characters) is checked against the
/// raw value; afterwards every character of `allowed` and every space is
/// removed and the remainder must match `kind`.
pub fn validate(value: &str, kind: InputKind, max_len: Option<usize>, allowed: Option<&str>) -> bool {
    if value.trim().is_empty() {
        return false;
    }
    if max_len.is_some_and(|max| value.chars().count() > max) {
        return false;
    }

    let stripped: String = value
        .chars()
        .filter(|c| *c != ' ' && !allowed.is_some_and(|chars| chars.contains(*c)))
        .collect();

    match kind {
        InputKind::Alpha => !stripped.is_empty() && stripped.chars().all(char::is_alphabetic),
        InputKind::Alnum => !stripped.is_empty() && stripped.chars().all(char::is_alphanumeric),
        InputKind::Numeric => !stripped.is_empty() && stripped.chars().all(|c| c.is_ascii_digit()),
        InputKind::Email => EMAIL_RE
            .as_ref()
            .is_some_and(|re| stripped.len() <= 254 && re.is_match(&stripped)),
        InputKind::Url => is_absolute_url(&stripped),
        InputKind::Ip => stripped.parse::<IpAddr>().is_ok(),
        InputKind::Any => true,
    }
}

/// An absolute URL with a host and no whitespace.
pub fn is_absolute_url(value: &str) -> bool {
    if value.is_empty() || value.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return false;
    }
    Url::parse(value).is_ok_and(|url| url.has_host())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn alnum_accepts_letters_and_digits() {
        assert!(validate("abc123", InputKind::Alnum, None, None));
        assert!(validate("abc 123", InputKind::Alnum, None, None));
        assert!(!validate("abc-123", InputKind::Alnum, None, None));
    }

    #[test]
    fn alpha_strips_internal_spaces() {
        assert!(validate("abc def", InputKind::Alpha, None, None));
        assert!(!validate("abc 123", InputKind::Alpha, None, None));
    }

    #[test]
    fn blank_input_fails() {
        assert!(!validate("", InputKind::Alpha, None, None));
        assert!(!validate("   ", InputKind::Any, None, None));
        assert!(!validate("\t\n", InputKind::Any, None, None));
    }

    #[test]
    fn max_length_is_checked_before_stripping() {
        assert!(!validate("toolong", InputKind::Alpha, Some(3), None));
        assert!(validate("abc", InputKind::Alpha, Some(3), None));
        // Spaces count toward the limit even though they are stripped later.
        assert!(!validate("a b c", InputKind::Alpha, Some(3), None));
    }

    #[test]
    fn allowed_characters_are_stripped() {
        assert!(validate("O'Brien-Smith", InputKind::Alpha, None, Some("'-")));
        assert!(!validate("O'Brien-Smith", InputKind::Alpha, None, Some("'")));
        // Nothing left after stripping.
        assert!(!validate("--", InputKind::Alpha, None, Some("-")));
    }

    #[test]
    fn numeric_is_digits_only() {
        assert!(validate("0042", InputKind::Numeric, None, None));
        assert!(validate("1 000", InputKind::Numeric, None, None));
        assert!(!validate("-5", InputKind::Numeric, None, None));
        assert!(!validate("4.2", InputKind::Numeric, None, None));
        assert!(validate("4.2", InputKind::Numeric, None, Some(".")));
    }

    #[test]
    fn email_format() {
        assert!(validate("user@example.com", InputKind::Email, None, None));
        assert!(validate("first.last+tag@mail.example.org", InputKind::Email, None, None));
        assert!(!validate("user@", InputKind::Email, None, None));
        assert!(!validate("example.com", InputKind::Email, None, None));
        assert!(!validate("user@@example.com", InputKind::Email, None, None));
    }

    #[test]
    fn url_format() {
        assert!(validate("https://example.com/path?q=1", InputKind::Url, None, None));
        assert!(validate("ftp://files.example.com", InputKind::Url, None, None));
        assert!(!validate("example.com", InputKind::Url, None, None));
        assert!(!validate("/relative/path", InputKind::Url, None, None));
    }

    #[test]
    fn ip_format() {
        assert!(validate("192.168.1.10", InputKind::Ip, None, None));
        assert!(validate("::1", InputKind::Ip, None, None));
        assert!(!validate("256.1.1.1", InputKind::Ip, None, None));
        assert!(!validate("localhost", InputKind::Ip, None, None));
    }

    #[test]
    fn any_accepts_non_blank() {
        assert!(validate("anything <goes> here", InputKind::Any, None, None));
    }

    #[test]
    fn kind_names_parse() {
        assert_eq!("alpha".parse::<InputKind>().unwrap(), InputKind::Alpha);
        assert_eq!("ALNUM".parse::<InputKind>().unwrap(), InputKind::Alnum);
        assert_eq!("ip".parse::<InputKind>().unwrap(), InputKind::Ip);
        assert_eq!("whatever".parse::<InputKind>().unwrap(), InputKind::Any);
    }
}
