//! Slug and domain helpers shared by the normalizer and the aggregator.

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

static NON_SLUG_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s-]").unwrap());
static SEPARATORS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\s_]+").unwrap());
static HYPHEN_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"-+").unwrap());

/// Turn arbitrary text into a URL-safe, lowercase, hyphen-delimited slug.
///
/// ```
/// use cre_directory::slugify;
///
/// assert_eq!(slugify("  CRM & Marketing "), "crm-marketing");
/// assert_eq!(slugify("Yardi_Voyager -- Pro"), "yardi-voyager-pro");
/// ```
///
/// `slugify(slugify(s)) == slugify(s)` for every input.
pub fn slugify(text: &str) -> String {
    let lowered = text.to_lowercase();
    let stripped = NON_SLUG_CHARS.replace_all(lowered.trim(), "");
    let hyphenated = SEPARATORS.replace_all(&stripped, "-");
    let collapsed = HYPHEN_RUNS.replace_all(&hyphenated, "-");
    collapsed.trim_matches('-').to_string()
}

/// Derive the display domain of a product URL.
///
/// Takes the network location (host and port), or the path when the URL has
/// none, e.g. a bare `acme.com`. A leading `www.` is removed. Anything that
/// cannot be interpreted yields an empty string.
///
/// Hosts of absolute URLs come back in `url`'s canonical form, so
/// `https://WWW.Acme.com:443` gives `acme.com`.
pub fn extract_domain(raw_url: &str) -> String {
    let raw_url = raw_url.trim();
    if raw_url.is_empty() {
        return String::new();
    }

    let location = match Url::parse(raw_url) {
        Ok(url) => match url.host_str() {
            Some(host) if !host.is_empty() => match url.port() {
                Some(port) => format!("{host}:{port}"),
                None => host.to_string(),
            },
            _ => url.path().to_string(),
        },
        Err(url::ParseError::RelativeUrlWithoutBase) => path_component(raw_url).to_string(),
        Err(_) => String::new(),
    };

    match location.strip_prefix("www.") {
        Some(rest) => rest.to_string(),
        None => location,
    }
}

/// Path part of a scheme-less reference: everything before `?` or `#`.
fn path_component(reference: &str) -> &str {
    let end = reference.find(&['?', '#'][..]).unwrap_or(reference.len());
    &reference[..end]
}
