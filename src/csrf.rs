//! CSRF Token
//!
//! The token is read from the cookie jar once, when the page boots, and
//! reused for every request afterwards. A cookie rotated mid-session is not
//! seen until the next full page load.

/// Security token sent as `X-CSRFToken`. May be empty, in which case the
/// server rejects the request like any other failure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsrfToken(String);

impl CsrfToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Pick cookie `name` out of a raw `document.cookie` string
    pub fn from_cookie_string(raw: &str, name: &str) -> Self {
        let value = raw
            .split(';')
            .filter_map(|pair| pair.split_once('='))
            .find(|(key, _)| key.trim() == name)
            .map(|(_, value)| value.trim())
            .unwrap_or_default();
        Self(value.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
