//! Logo resolution strategies.
//!
//! The normalizer only knows the [`LogoResolver`] trait. The default,
//! [`ClearbitLogoResolver`], is a pure URL pattern; [`HomepageLogoResolver`]
//! fetches the product homepage and looks for a logo image, falling back to
//! the same pattern. Rows with an explicit `logoUrl` never reach a resolver.

use once_cell::sync::Lazy;
use regex::Regex;
use std::time::Duration;
use tracing::{debug, warn};

/// Logo-by-domain service used as the deterministic fallback.
pub const CLEARBIT_LOGO_BASE: &str = "https://logo.clearbit.com";

/// Homepage fetch timeout.
const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Only the top of the page is scanned; logos live in the header.
const SCAN_LINES: usize = 100;

/// Resolves a logo image URL for a (non-empty) domain.
pub trait LogoResolver {
    fn resolve(&self, domain: &str) -> String;
}

/// `https://logo.clearbit.com/{domain}`.
pub fn clearbit_logo_url(domain: &str) -> String {
    format!("{CLEARBIT_LOGO_BASE}/{domain}")
}

/// Deterministic resolver: always the Clearbit pattern.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClearbitLogoResolver;

impl LogoResolver for ClearbitLogoResolver {
    fn resolve(&self, domain: &str) -> String {
        clearbit_logo_url(domain)
    }
}

static LOGO_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r#"(?i)src="([^"]*logo[^"]*\.(?:svg|png|jpg|jpeg)[^"]*)""#,
        r#"(?i)src="([^"]*\.svg[^"]*)""#,
        r#"(?i)href="([^"]*logo[^"]*\.(?:svg|png|jpg|jpeg)[^"]*)""#,
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

/// A candidate is only accepted when its absolute URL names one of these.
const LOGO_HINTS: [&str; 4] = ["dark", "color", "colour", "logo"];

/// Best-effort resolver that scrapes `https://{domain}` for a logo image.
pub struct HomepageLogoResolver {
    client: reqwest::blocking::Client,
}

impl HomepageLogoResolver {
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .user_agent(concat!("cre-directory/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }

    fn fetch(&self, domain: &str) -> Result<String, reqwest::Error> {
        self.client
            .get(format!("https://{domain}"))
            .send()?
            .error_for_status()?
            .text()
    }
}

impl LogoResolver for HomepageLogoResolver {
    fn resolve(&self, domain: &str) -> String {
        match self.fetch(domain) {
            Ok(html) => {
                if let Some(logo) = find_logo_in_html(&html, domain) {
                    debug!(domain, %logo, "found homepage logo");
                    return logo;
                }
            }
            Err(e) => warn!(domain, error = %e, "homepage fetch failed, using fallback logo"),
        }
        clearbit_logo_url(domain)
    }
}

/// Find the first logo-looking image reference in the top of a page.
///
/// Patterns are tried in order and every match of a pattern is considered;
/// the first absolutized match carrying a `LOGO_HINTS` term wins.
pub fn find_logo_in_html(html: &str, domain: &str) -> Option<String> {
    let head: String = html.lines().take(SCAN_LINES).collect::<Vec<_>>().join("\n");

    LOGO_PATTERNS
        .iter()
        .flat_map(|pattern| pattern.captures_iter(&head))
        .filter_map(|caps| caps.get(1))
        .map(|m| absolutize(m.as_str(), domain))
        .find(|url| {
            let lower = url.to_lowercase();
            LOGO_HINTS.iter().any(|hint| lower.contains(hint))
        })
}

/// Turn an image reference found on `https://{domain}` into an absolute URL.
pub fn absolutize(reference: &str, domain: &str) -> String {
    if let Some(rest) = reference.strip_prefix("//") {
        format!("https://{rest}")
    } else if reference.starts_with('/') {
        format!("https://{domain}{reference}")
    } else if reference.starts_with("http") {
        reference.to_string()
    } else {
        format!("https://{domain}/{reference}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clearbit_pattern() {
        assert_eq!(ClearbitLogoResolver.resolve("acme.com"), "https://logo.clearbit.com/acme.com");
    }

    #[test]
    fn test_absolutize() {
        assert_eq!(absolutize("//cdn.acme.com/logo.svg", "acme.com"), "https://cdn.acme.com/logo.svg");
        assert_eq!(absolutize("/img/logo.png", "acme.com"), "https://acme.com/img/logo.png");
        assert_eq!(absolutize("https://cdn.x.io/logo.png", "acme.com"), "https://cdn.x.io/logo.png");
        assert_eq!(absolutize("img/logo.png", "acme.com"), "https://acme.com/img/logo.png");
    }

    #[test]
    fn test_find_logo_prefers_logo_src() {
        let html = r#"<html><head><link href="/favicon.svg"></head>
<body><img src="/assets/hero.svg"><img src="/assets/Acme-Logo.png?v=2"></body>"#;
        assert_eq!(
            find_logo_in_html(html, "acme.com").as_deref(),
            Some("https://acme.com/assets/Acme-Logo.png?v=2")
        );
    }

    #[test]
    fn test_find_logo_accepts_hinted_svg() {
        let html = r#"<img src="/assets/hero.svg"><img src="/brand/mark-dark.svg">"#;
        assert_eq!(
            find_logo_in_html(html, "acme.com").as_deref(),
            Some("https://acme.com/brand/mark-dark.svg")
        );
    }

    #[test]
    fn test_find_logo_rejects_unhinted_svg() {
        let html = r#"<img src="/assets/hero.svg"><img src="/assets/team-photo.svg">"#;
        assert_eq!(find_logo_in_html(html, "acme.com"), None);
    }

    #[test]
    fn test_find_logo_none() {
        assert_eq!(find_logo_in_html("<p>no images</p>", "acme.com"), None);
    }

    #[test]
    fn test_find_logo_ignores_deep_lines() {
        let mut html = "<p>\n".repeat(SCAN_LINES);
        html.push_str(r#"<img src="/logo.png">"#);
        assert_eq!(find_logo_in_html(&html, "acme.com"), None);
    }
}
