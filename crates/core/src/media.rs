/// Default media host, matching the CMS development setup.
pub const DEFAULT_MEDIA_URL: &str = "http://localhost:1337";

/// Environment variable overriding the media host.
pub const MEDIA_URL_ENV: &str = "GAMBIT_MEDIA_URL";

/// Rewrites relative upload paths into absolute URLs.
///
/// The CMS stores uploads as host-relative paths (`/uploads/x.png`);
/// anything already absolute is passed through untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaResolver {
    base: String,
}

impl MediaResolver {
    /// Create a resolver for the given media host.
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into().trim_end_matches('/').to_string(),
        }
    }

    /// Create a resolver from `GAMBIT_MEDIA_URL`, falling back to the
    /// default development host.
    #[must_use]
    pub fn from_env() -> Self {
        match std::env::var(MEDIA_URL_ENV) {
            Ok(base) if !base.is_empty() => Self::new(base),
            _ => Self::new(DEFAULT_MEDIA_URL),
        }
    }

    /// The configured media host.
    #[must_use]
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Resolve a possibly-missing upload path to an absolute URL.
    ///
    /// `None` stays `None`; paths already starting with `http` are
    /// returned unchanged; everything else is prefixed with the media
    /// host.
    #[must_use]
    pub fn resolve(&self, path: Option<&str>) -> Option<String> {
        let path = path?;
        if path.starts_with("http") {
            return Some(path.to_owned());
        }
        Some(format!("{}{path}", self.base))
    }
}

impl Default for MediaResolver {
    fn default() -> Self {
        Self::new(DEFAULT_MEDIA_URL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_path_stays_missing() {
        let resolver = MediaResolver::new("http://media.example");
        assert_eq!(resolver.resolve(None), None);
    }

    #[test]
    fn absolute_url_is_untouched() {
        let resolver = MediaResolver::new("http://media.example");
        assert_eq!(
            resolver.resolve(Some("http://a/b")).as_deref(),
            Some("http://a/b")
        );
        assert_eq!(
            resolver.resolve(Some("https://a/b.png")).as_deref(),
            Some("https://a/b.png")
        );
    }

    #[test]
    fn relative_path_gets_the_media_host() {
        let resolver = MediaResolver::new("http://media.example");
        assert_eq!(
            resolver.resolve(Some("/uploads/x.png")).as_deref(),
            Some("http://media.example/uploads/x.png")
        );
    }

    #[test]
    fn trailing_slash_on_base_is_trimmed() {
        let resolver = MediaResolver::new("http://media.example/");
        assert_eq!(
            resolver.resolve(Some("/uploads/x.png")).as_deref(),
            Some("http://media.example/uploads/x.png")
        );
    }
}
