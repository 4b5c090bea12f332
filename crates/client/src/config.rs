use std::time::Duration;

/// Default content API base URL, matching the CMS development setup.
pub const DEFAULT_API_URL: &str = "http://localhost:1337/api";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Environment variable overriding the API base URL.
pub const API_URL_ENV: &str = "GAMBIT_API_URL";

/// Environment variable supplying the static site token.
pub const API_TOKEN_ENV: &str = "GAMBIT_API_TOKEN";

/// Configuration for a [`GambitClient`](crate::GambitClient).
#[derive(Clone)]
pub struct GambitConfig {
    /// Base URL of the content API, without a trailing slash.
    pub api_base_url: String,

    /// Media host used to absolutize upload paths.
    pub media_base_url: String,

    /// Static site token sent when no user session is active. Public
    /// content is readable with this token alone.
    pub site_token: Option<String>,

    /// Request timeout.
    pub timeout: Duration,
}

impl std::fmt::Debug for GambitConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GambitConfig")
            .field("api_base_url", &self.api_base_url)
            .field("media_base_url", &self.media_base_url)
            .field(
                "site_token",
                &self.site_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Default for GambitConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_owned(),
            media_base_url: gambit_core::media::DEFAULT_MEDIA_URL.to_owned(),
            site_token: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl GambitConfig {
    /// Create a configuration with development defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a configuration from `GAMBIT_API_URL`, `GAMBIT_MEDIA_URL`,
    /// and `GAMBIT_API_TOKEN`, falling back to defaults.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.is_empty() {
                config.api_base_url = url.trim_end_matches('/').to_owned();
            }
        }
        if let Ok(url) = std::env::var(gambit_core::media::MEDIA_URL_ENV) {
            if !url.is_empty() {
                config.media_base_url = url.trim_end_matches('/').to_owned();
            }
        }
        if let Ok(token) = std::env::var(API_TOKEN_ENV) {
            if !token.is_empty() {
                config.site_token = Some(token);
            }
        }
        config
    }

    /// Override the API base URL.
    #[must_use]
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_owned();
        self
    }

    /// Override the media host.
    #[must_use]
    pub fn with_media_base_url(mut self, url: impl Into<String>) -> Self {
        self.media_base_url = url.into().trim_end_matches('/').to_owned();
        self
    }

    /// Set the static site token.
    #[must_use]
    pub fn with_site_token(mut self, token: impl Into<String>) -> Self {
        self.site_token = Some(token.into());
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_development_setup() {
        let config = GambitConfig::new();
        assert_eq!(config.api_base_url, "http://localhost:1337/api");
        assert_eq!(config.media_base_url, "http://localhost:1337");
        assert!(config.site_token.is_none());
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn builder_trims_trailing_slashes() {
        let config = GambitConfig::new()
            .with_api_base_url("http://cms.example/api/")
            .with_media_base_url("http://cms.example/");
        assert_eq!(config.api_base_url, "http://cms.example/api");
        assert_eq!(config.media_base_url, "http://cms.example");
    }

    #[test]
    fn debug_redacts_site_token() {
        let config = GambitConfig::new().with_site_token("sk-very-secret");
        let debug = format!("{config:?}");
        assert!(debug.contains("REDACTED"));
        assert!(!debug.contains("sk-very-secret"));
    }
}
