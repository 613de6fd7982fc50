//! Row normalizer: one raw CSV row in, zero or one [`Product`] out.
//!
//! ```text
//! RawRow ──▶ filters ──▶ slug / dedup ──▶ text fields ──▶ classification ──▶ Product
//!              │              │
//!              ▼              ▼
//!          DroppedRow     DroppedRow
//! ```
//!
//! The only state carried between rows is the set of slugs already emitted,
//! owned by a [`Normalizer`] and therefore scoped to one run.

pub mod classify;

use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use tracing::{debug, warn};

use crate::logo::{ClearbitLogoResolver, LogoResolver};
use crate::models::Product;
use crate::parser::RawRow;
use crate::slug::{extract_domain, slugify};
use crate::taxonomy::Taxonomy;

pub use classify::{infer_deployment, infer_pricing, infer_property_types, map_categories};

/// Input columns read by the normalizer.
pub mod columns {
    pub const TITLE: &str = "title";
    pub const URL: &str = "url";
    pub const TAGLINE: &str = "text";
    pub const DESCRIPTION: &str = "Details";
    pub const CATEGORY: &str = "Category";
    pub const SLUG: &str = "page";
    pub const LOGO_URL: &str = "logoUrl";
    pub const IS_FREE: &str = "isFree";
    pub const IS_TOP_RATED: &str = "isTopRated";
    pub const VERIFIED: &str = "verified";
    pub const SEO_HEADLINE: &str = "SEOHeadline";
    pub const SEO_DESCRIPTION: &str = "SEODescription";
    pub const HIDE: &str = "Hide";
}

/// Taglines this short carry no information.
const MIN_TAGLINE_CHARS: usize = 2;

/// Descriptions shorter than this get the tagline prepended.
const MIN_DESCRIPTION_CHARS: usize = 100;

/// Length of a tagline derived from the description.
const DERIVED_TAGLINE_CHARS: usize = 150;

/// Why a row produced no product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum DropReason {
    MissingTitle,
    Hidden,
    /// Neither a usable tagline nor a description.
    NoContent,
    /// An earlier row already produced this slug.
    DuplicateSlug { slug: String },
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingTitle => write!(f, "missing title"),
            Self::Hidden => write!(f, "hidden"),
            Self::NoContent => write!(f, "no tagline or description"),
            Self::DuplicateSlug { slug } => write!(f, "duplicate slug '{slug}'"),
        }
    }
}

/// A row that was dropped
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DroppedRow {
    pub line: u64,
    pub title: String,
    #[serde(flatten)]
    pub reason: DropReason,
}

/// Result of normalizing a whole export
#[derive(Debug, Default, Serialize)]
pub struct NormalizeResult {
    /// Products in row order
    pub products: Vec<Product>,
    /// Rows that produced nothing
    pub dropped: Vec<DroppedRow>,
}

impl NormalizeResult {
    pub fn duplicate_count(&self) -> usize {
        self.dropped
            .iter()
            .filter(|d| matches!(d.reason, DropReason::DuplicateSlug { .. }))
            .count()
    }

    pub fn summary(&self) -> String {
        format!(
            "Normalized: {} products, {} dropped ({} duplicate slugs)",
            self.products.len(),
            self.dropped.len(),
            self.duplicate_count()
        )
    }
}

/// Stateful row normalizer for a single run.
pub struct Normalizer<'a> {
    taxonomy: &'a Taxonomy,
    logos: Box<dyn LogoResolver + 'a>,
    seen_slugs: HashSet<String>,
}

impl<'a> Normalizer<'a> {
    /// Normalizer with the deterministic logo fallback.
    pub fn new(taxonomy: &'a Taxonomy) -> Self {
        Self::with_logo_resolver(taxonomy, Box::new(ClearbitLogoResolver))
    }

    pub fn with_logo_resolver(taxonomy: &'a Taxonomy, logos: Box<dyn LogoResolver + 'a>) -> Self {
        Self {
            taxonomy,
            logos,
            seen_slugs: HashSet::new(),
        }
    }

    /// Normalize every row, in order.
    pub fn normalize_all(&mut self, rows: &[RawRow]) -> NormalizeResult {
        let mut result = NormalizeResult::default();

        for row in rows {
            match self.normalize_row(row) {
                Ok(product) => result.products.push(product),
                Err(reason) => {
                    let title = row.trimmed(columns::TITLE).to_string();
                    match &reason {
                        DropReason::DuplicateSlug { slug } => {
                            warn!(line = row.line, %title, %slug, "dropping row with duplicate slug")
                        }
                        other => debug!(line = row.line, %title, reason = %other, "dropping row"),
                    }
                    result.dropped.push(DroppedRow {
                        line: row.line,
                        title,
                        reason,
                    });
                }
            }
        }

        result
    }

    /// Normalize one row. Filters apply in order and the first match wins;
    /// only a row that passes every filter claims its slug.
    pub fn normalize_row(&mut self, row: &RawRow) -> Result<Product, DropReason> {
        let title = row.trimmed(columns::TITLE);
        if title.is_empty() {
            return Err(DropReason::MissingTitle);
        }

        if row.flag(columns::HIDE) {
            return Err(DropReason::Hidden);
        }

        let tagline = row.trimmed(columns::TAGLINE);
        let description = row.trimmed(columns::DESCRIPTION);
        if char_len(tagline) <= MIN_TAGLINE_CHARS && description.is_empty() {
            return Err(DropReason::NoContent);
        }

        let slug = match row.trimmed(columns::SLUG) {
            "" => slugify(title),
            explicit => explicit.to_string(),
        };
        if !self.seen_slugs.insert(slug.clone()) {
            return Err(DropReason::DuplicateSlug { slug });
        }

        let url = row.trimmed(columns::URL);
        let domain = extract_domain(url);
        let logo_url = self.logo_for(row.trimmed(columns::LOGO_URL), &domain);

        let description = expand_description(tagline, description);
        let tagline = if char_len(tagline) > MIN_TAGLINE_CHARS {
            tagline.to_string()
        } else {
            tagline_from_description(&description)
        };

        Ok(Product {
            title: title.to_string(),
            slug,
            url: url.to_string(),
            domain,
            tagline,
            categories: map_categories(row.trimmed(columns::CATEGORY), row, self.taxonomy),
            property_types: infer_property_types(&description),
            deployment: infer_deployment(&description),
            pricing_model: infer_pricing(&description),
            description,
            logo_url,
            is_free: row.flag(columns::IS_FREE),
            is_top_rated: row.flag(columns::IS_TOP_RATED),
            is_verified: row.flag(columns::VERIFIED),
            seo_headline: row.trimmed(columns::SEO_HEADLINE).to_string(),
            seo_description: row.trimmed(columns::SEO_DESCRIPTION).to_string(),
            extra: Default::default(),
        })
    }

    /// Number of distinct slugs emitted so far.
    pub fn emitted(&self) -> usize {
        self.seen_slugs.len()
    }

    fn logo_for(&self, explicit: &str, domain: &str) -> String {
        if !explicit.is_empty() {
            explicit.to_string()
        } else if domain.is_empty() {
            String::new()
        } else {
            self.logos.resolve(domain)
        }
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Prefix a short description with the tagline.
fn expand_description(tagline: &str, description: &str) -> String {
    if char_len(description) >= MIN_DESCRIPTION_CHARS || tagline.is_empty() {
        return description.to_string();
    }
    if description.is_empty() {
        tagline.to_string()
    } else {
        format!("{tagline}. {description}")
    }
}

/// First 150 characters of the description, ending in exactly one period.
fn tagline_from_description(description: &str) -> String {
    let prefix: String = description.chars().take(DERIVED_TAGLINE_CHARS).collect();
    format!("{}.", prefix.trim_end_matches('.'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Deployment, PricingModel};

    fn row(title: &str, tagline: &str, details: &str) -> RawRow {
        RawRow::new(2)
            .with("title", title)
            .with("text", tagline)
            .with("Details", details)
    }

    struct FixedLogo;

    impl LogoResolver for FixedLogo {
        fn resolve(&self, domain: &str) -> String {
            format!("https://img.test/{domain}.png")
        }
    }

    #[test]
    fn test_reference_example() {
        let taxonomy = Taxonomy::default();
        let mut normalizer = Normalizer::new(&taxonomy);
        let raw = row(
            "Acme CRE",
            "",
            "Acme helps brokers close deals faster with cloud-based analytics.",
        )
        .with("url", "https://www.acme.com/product")
        .with("Category", "broker, data");

        let product = normalizer.normalize_row(&raw).unwrap();

        assert_eq!(product.slug, "acme-cre");
        assert_eq!(product.domain, "acme.com");
        assert_eq!(
            product.tagline,
            "Acme helps brokers close deals faster with cloud-based analytics."
        );
        assert_eq!(product.categories, vec!["Broker Tools", "Data & Analytics"]);
        assert_eq!(product.deployment, vec![Deployment::Cloud]);
        assert_eq!(product.pricing_model, PricingModel::QuoteBased);
        assert_eq!(product.logo_url, "https://logo.clearbit.com/acme.com");
        assert!(product.extra.is_empty());
    }

    #[test]
    fn test_short_description_gets_tagline() {
        let taxonomy = Taxonomy::default();
        let mut normalizer = Normalizer::new(&taxonomy);
        let product = normalizer
            .normalize_row(&row("Leasey", "Fast CRE leasing", "For brokers."))
            .unwrap();

        assert_eq!(product.description, "Fast CRE leasing. For brokers.");
        assert_eq!(product.tagline, "Fast CRE leasing");
    }

    #[test]
    fn test_tagline_only_becomes_description() {
        let taxonomy = Taxonomy::default();
        let mut normalizer = Normalizer::new(&taxonomy);
        let product = normalizer
            .normalize_row(&row("Leasey", "Fast CRE leasing", ""))
            .unwrap();

        assert_eq!(product.description, "Fast CRE leasing");
    }

    #[test]
    fn test_long_description_untouched() {
        let taxonomy = Taxonomy::default();
        let mut normalizer = Normalizer::new(&taxonomy);
        let details = "x".repeat(100);
        let product = normalizer.normalize_row(&row("Long", "Tag", &details)).unwrap();
        assert_eq!(product.description, details);
    }

    #[test]
    fn test_derived_tagline_is_truncated_with_one_period() {
        let taxonomy = Taxonomy::default();
        let mut normalizer = Normalizer::new(&taxonomy);
        let details = format!("{}...{}", "a".repeat(147), "b".repeat(50));
        let product = normalizer.normalize_row(&row("Trunc", "", &details)).unwrap();

        assert_eq!(product.tagline, format!("{}.", "a".repeat(147)));
    }

    #[test]
    fn test_two_char_tagline_is_prepended_but_replaced() {
        let taxonomy = Taxonomy::default();
        let mut normalizer = Normalizer::new(&taxonomy);
        let product = normalizer.normalize_row(&row("Tiny", "ab", "Short copy.")).unwrap();

        assert_eq!(product.description, "ab. Short copy.");
        assert_eq!(product.tagline, "ab. Short copy.");
    }

    #[test]
    fn test_filters_in_order() {
        let taxonomy = Taxonomy::default();
        let mut normalizer = Normalizer::new(&taxonomy);

        assert_eq!(
            normalizer.normalize_row(&row("  ", "tagline", "desc")),
            Err(DropReason::MissingTitle)
        );
        assert_eq!(
            normalizer.normalize_row(&row("Hidden", "tagline", "desc").with("Hide", "true")),
            Err(DropReason::Hidden)
        );
        assert_eq!(
            normalizer.normalize_row(&row("Empty", "ab", "  ")),
            Err(DropReason::NoContent)
        );
        assert_eq!(normalizer.emitted(), 0);
    }

    #[test]
    fn test_dropped_rows_do_not_claim_slugs() {
        let taxonomy = Taxonomy::default();
        let mut normalizer = Normalizer::new(&taxonomy);

        let hidden = row("Acme", "tagline", "desc").with("Hide", "TRUE");
        assert!(normalizer.normalize_row(&hidden).is_err());
        assert!(normalizer.normalize_row(&row("Acme", "tagline", "desc")).is_ok());
    }

    #[test]
    fn test_duplicate_slug_first_wins() {
        let taxonomy = Taxonomy::default();
        let mut normalizer = Normalizer::new(&taxonomy);
        let rows = vec![
            row("Acme CRE", "First", "one"),
            row("Acme  CRE!", "Second", "two"),
            row("Other", "Third", "three").with("page", "acme-cre"),
        ];

        let result = normalizer.normalize_all(&rows);

        assert_eq!(result.products.len(), 1);
        assert_eq!(result.products[0].tagline, "First");
        assert_eq!(result.duplicate_count(), 2);
        assert_eq!(
            result.dropped[0].reason,
            DropReason::DuplicateSlug { slug: "acme-cre".into() }
        );
    }

    #[test]
    fn test_explicit_slug_used_verbatim() {
        let taxonomy = Taxonomy::default();
        let mut normalizer = Normalizer::new(&taxonomy);
        let product = normalizer
            .normalize_row(&row("Acme", "tagline", "desc").with("page", " acme-pro "))
            .unwrap();
        assert_eq!(product.slug, "acme-pro");
    }

    #[test]
    fn test_explicit_logo_wins() {
        let taxonomy = Taxonomy::default();
        let mut normalizer = Normalizer::with_logo_resolver(&taxonomy, Box::new(FixedLogo));
        let product = normalizer
            .normalize_row(
                &row("Acme", "tagline", "desc")
                    .with("url", "https://acme.com")
                    .with("logoUrl", "https://cdn.acme.com/logo.svg"),
            )
            .unwrap();
        assert_eq!(product.logo_url, "https://cdn.acme.com/logo.svg");
    }

    #[test]
    fn test_resolver_used_without_explicit_logo() {
        let taxonomy = Taxonomy::default();
        let mut normalizer = Normalizer::with_logo_resolver(&taxonomy, Box::new(FixedLogo));
        let product = normalizer
            .normalize_row(&row("Acme", "tagline", "desc").with("url", "https://acme.com"))
            .unwrap();
        assert_eq!(product.logo_url, "https://img.test/acme.com.png");
    }

    #[test]
    fn test_no_url_means_no_logo() {
        let taxonomy = Taxonomy::default();
        let mut normalizer = Normalizer::new(&taxonomy);
        let product = normalizer.normalize_row(&row("Acme", "tagline", "desc")).unwrap();
        assert_eq!(product.domain, "");
        assert_eq!(product.logo_url, "");
    }

    #[test]
    fn test_boolean_and_seo_columns() {
        let taxonomy = Taxonomy::default();
        let mut normalizer = Normalizer::new(&taxonomy);
        let product = normalizer
            .normalize_row(
                &row("Acme", "tagline", "desc")
                    .with("isFree", "TRUE")
                    .with("isTopRated", "false")
                    .with("verified", "True")
                    .with("SEOHeadline", " Best CRE tool ")
                    .with("SEODescription", ""),
            )
            .unwrap();

        assert!(product.is_free);
        assert!(!product.is_top_rated);
        assert!(product.is_verified);
        assert_eq!(product.seo_headline, "Best CRE tool");
        assert_eq!(product.seo_description, "");
    }

    #[test]
    fn test_inference_uses_expanded_description() {
        let taxonomy = Taxonomy::default();
        let mut normalizer = Normalizer::new(&taxonomy);
        // "Free" and "mobile" only appear in the tagline
        let product = normalizer
            .normalize_row(&row("Acme", "Free mobile rent tracker", "For landlords."))
            .unwrap();

        assert_eq!(product.pricing_model, PricingModel::Free);
        assert_eq!(product.deployment, vec![Deployment::Mobile]);
    }

    #[test]
    fn test_summary_mentions_counts() {
        let taxonomy = Taxonomy::default();
        let mut normalizer = Normalizer::new(&taxonomy);
        let result = normalizer.normalize_all(&[row("A", "tagline", "d"), row("", "t", "d")]);
        assert_eq!(result.summary(), "Normalized: 1 products, 1 dropped (0 duplicate slugs)");
    }
}
