//! Client configuration.

use serde::{Deserialize, Serialize};

/// Where the conversion service lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the conversion API, without a trailing slash.
    pub api_base_url: String,
}

impl ClientConfig {
    /// Base URL used when none is configured.
    pub const DEFAULT_API_BASE_URL: &'static str = "http://localhost:8000";

    /// Build a config, stripping trailing slashes from `api_base_url`.
    ///
    /// A blank URL falls back to [`Self::DEFAULT_API_BASE_URL`].
    #[must_use]
    pub fn new(api_base_url: &str) -> Self {
        let trimmed = api_base_url.trim();
        let base = if trimmed.is_empty() {
            Self::DEFAULT_API_BASE_URL
        } else {
            trimmed
        };
        Self {
            api_base_url: base.trim_end_matches('/').to_owned(),
        }
    }

    /// Config from an optional override, e.g. a build-time environment
    /// variable.
    #[must_use]
    pub fn from_override(api_base_url: Option<&str>) -> Self {
        api_base_url.map_or_else(Self::default, Self::new)
    }

    /// Absolute URL for an API path. A missing leading slash is added;
    /// an empty path yields the base URL.
    #[must_use]
    pub fn build_url(&self, path: &str) -> String {
        // Deserialized configs skip `new`, so normalise here too.
        let base = self.api_base_url.trim_end_matches('/');
        if path.is_empty() {
            base.to_owned()
        } else if path.starts_with('/') {
            format!("{base}{path}")
        } else {
            format!("{base}/{path}")
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_API_BASE_URL)
    }
}
