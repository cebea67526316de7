use std::collections::HashMap;

pub const DEFAULT_CSRF_COOKIE: &str = "csrf_token";
pub const DEFAULT_CSRF_HEADER: &str = "x-csrf-token";

/// Read-only view of the ambient cookie store.
pub trait CookieSource: Send + Sync {
    fn cookie(&self, name: &str) -> Option<String>;
}

/// A store with no cookies at all.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCookies;

impl CookieSource for NoCookies {
    fn cookie(&self, _name: &str) -> Option<String> {
        None
    }
}

/// Cookies parsed from a `Cookie:` header value.
#[derive(Debug, Default, Clone)]
pub struct CookieJar {
    cookies: HashMap<String, String>,
}

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `name=value; other=value`. Values are percent-decoded and
    /// stripped of surrounding quotes. The first occurrence of a name wins.
    pub fn parse(header: &str) -> Self {
        let mut cookies = HashMap::new();
        for pair in header.split(';') {
            let Some((name, value)) = pair.split_once('=') else {
                continue;
            };
            let name = name.trim();
            if name.is_empty() {
                continue;
            }
            let value = value.trim().trim_matches('"');
            let decoded = urlencoding::decode(value)
                .map_or_else(|_| value.to_string(), std::borrow::Cow::into_owned);
            cookies.entry(name.to_string()).or_insert(decoded);
        }
        Self { cookies }
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies.insert(name.into(), value.into());
        self
    }

    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }
}

impl CookieSource for CookieJar {
    fn cookie(&self, name: &str) -> Option<String> {
        self.cookies.get(name).filter(|v| !v.is_empty()).cloned()
    }
}
