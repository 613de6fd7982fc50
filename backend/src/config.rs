//! Site settings: where to write and which absolute URLs to emit.
//!
//! Resolution order is defaults, then environment (`.env` honoured), then
//! whatever the caller applies on top (CLI flags).

use chrono::NaiveDate;
use std::path::PathBuf;
use url::Url;

use crate::error::{ConfigError, ConfigResult};

/// Public URL of the published directory.
pub const DEFAULT_BASE_URL: &str = "https://sichuanlambda.github.io/cre-directory";

pub const ENV_SITE_ROOT: &str = "CRE_SITE_ROOT";
pub const ENV_BASE_URL: &str = "CRE_BASE_URL";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteConfig {
    /// Directory that receives `data/`, `sitemap.xml` and `robots.txt`
    pub site_root: PathBuf,
    /// Absolute base URL, without a trailing slash
    pub base_url: String,
    /// Optional `<lastmod>` for sitemap entries
    pub lastmod: Option<NaiveDate>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            site_root: PathBuf::from("."),
            base_url: DEFAULT_BASE_URL.to_string(),
            lastmod: None,
        }
    }
}

impl SiteConfig {
    /// Defaults overridden by `CRE_SITE_ROOT` / `CRE_BASE_URL`.
    pub fn from_env() -> ConfigResult<Self> {
        dotenvy::dotenv().ok();

        let mut config = Self::default();
        if let Ok(root) = std::env::var(ENV_SITE_ROOT) {
            if !root.trim().is_empty() {
                config.site_root = PathBuf::from(root.trim());
            }
        }
        if let Ok(base) = std::env::var(ENV_BASE_URL) {
            if !base.trim().is_empty() {
                config = config.with_base_url(&base)?;
            }
        }
        Ok(config)
    }

    pub fn with_site_root(mut self, site_root: impl Into<PathBuf>) -> Self {
        self.site_root = site_root.into();
        self
    }

    /// Set the base URL; it must be an absolute http(s) URL.
    pub fn with_base_url(mut self, base_url: &str) -> ConfigResult<Self> {
        self.base_url = normalize_base_url(base_url)?;
        Ok(self)
    }

    pub fn with_lastmod(mut self, lastmod: Option<NaiveDate>) -> Self {
        self.lastmod = lastmod;
        self
    }
}

/// Check a base URL and strip trailing slashes.
pub fn normalize_base_url(raw: &str) -> ConfigResult<String> {
    let trimmed = raw.trim();
    let invalid = |message: String| ConfigError::InvalidBaseUrl {
        value: trimmed.to_string(),
        message,
    };

    let parsed = Url::parse(trimmed).map_err(|e| invalid(e.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", parsed.scheme())));
    }
    if parsed.host_str().is_none() {
        return Err(invalid("missing host".to_string()));
    }

    Ok(trimmed.trim_end_matches('/').to_string())
}

/// Parse a `YYYY-MM-DD` date.
pub fn parse_lastmod(raw: &str) -> ConfigResult<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| ConfigError::InvalidDate(raw.to_string()))
}
