//! High-level pipeline API: CSV export in, static site data out.
//!
//! # Example
//!
//! ```rust,ignore
//! use cre_directory::{build_site, BuildOptions, SiteConfig};
//! use std::path::Path;
//!
//! let config = SiteConfig::from_env()?;
//! let report = build_site(Path::new("raw/export.csv"), &config, &BuildOptions::default())?;
//! println!("{}", report.summary());
//! ```

use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

use crate::aggregate::{build_categories, CategoryIndex};
use crate::config::SiteConfig;
use crate::enrich::{apply_enrichment, load_enrichment, load_products, EnrichReport};
use crate::error::{PipelineError, PipelineResult};
use crate::logo::{ClearbitLogoResolver, HomepageLogoResolver, LogoResolver};
use crate::models::Product;
use crate::normalize::{DroppedRow, NormalizeResult, Normalizer};
use crate::parser::{read_csv_file, ParseResult, RawRow, ReadOptions};
use crate::publish::{Publisher, SitePaths};
use crate::taxonomy::Taxonomy;
use crate::validation::{validate_catalog, validate_categories, InvalidRecord};

/// Which logo resolver the normalizer consults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogoSource {
    /// Deterministic URL pattern, no network
    #[default]
    Clearbit,
    /// Scrape the product homepage, falling back to the pattern
    Homepage,
}

/// Options for [`build_site`]
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    pub read: ReadOptions,
    pub taxonomy: Taxonomy,
    pub logos: LogoSource,
    /// Skip product and category schema validation before publishing
    pub skip_validation: bool,
}

/// CSV file information
#[derive(Debug, Clone, Serialize)]
pub struct CsvInfo {
    pub encoding: String,
    pub delimiter: char,
    pub headers: Vec<String>,
    pub row_count: usize,
}

impl From<&ParseResult> for CsvInfo {
    fn from(parsed: &ParseResult) -> Self {
        Self {
            encoding: parsed.encoding.clone(),
            delimiter: parsed.delimiter,
            headers: parsed.headers.clone(),
            row_count: parsed.rows.len(),
        }
    }
}

/// Outcome of a full build
#[derive(Debug, Clone, Serialize)]
pub struct BuildReport {
    pub csv: CsvInfo,
    pub product_count: usize,
    pub dropped: Vec<DroppedRow>,
    pub category_count: usize,
    pub written: Vec<PathBuf>,
}

impl BuildReport {
    pub fn summary(&self) -> String {
        format!(
            "Built {} products in {} categories from {} rows ({} dropped)",
            self.product_count,
            self.category_count,
            self.csv.row_count,
            self.dropped.len()
        )
    }
}

/// Outcome of [`enrich_site`]
#[derive(Debug, Clone, Serialize)]
pub struct EnrichSiteReport {
    pub enrich: EnrichReport,
    pub product_count: usize,
    pub category_count: usize,
    pub written: Vec<PathBuf>,
}

fn logo_resolver(source: LogoSource) -> PipelineResult<Box<dyn LogoResolver>> {
    let resolver: Box<dyn LogoResolver> = match source {
        LogoSource::Clearbit => Box::new(ClearbitLogoResolver),
        LogoSource::Homepage => Box::new(HomepageLogoResolver::new()?),
    };
    Ok(resolver)
}

/// Normalize parsed rows with the chosen logo resolver.
pub fn normalize_rows(rows: &[RawRow], taxonomy: &Taxonomy, logos: LogoSource) -> PipelineResult<NormalizeResult> {
    let mut normalizer = Normalizer::with_logo_resolver(taxonomy, logo_resolver(logos)?);
    let result = normalizer.normalize_all(rows);
    info!("{}", result.summary());
    Ok(result)
}

fn log_invalid(invalid: &[InvalidRecord]) {
    for record in invalid {
        for message in &record.errors {
            error!(index = record.index, slug = %record.slug, "{message}");
        }
    }
}

/// Abort with [`PipelineError::InvalidProducts`] if any product is invalid.
fn ensure_valid(products: &[Product], taxonomy: &Taxonomy) -> PipelineResult<()> {
    let invalid = validate_catalog(products, taxonomy);
    if invalid.is_empty() {
        return Ok(());
    }
    log_invalid(&invalid);
    Err(PipelineError::InvalidProducts(invalid.len()))
}

/// Abort with [`PipelineError::InvalidCategories`] if any category is invalid.
fn ensure_valid_categories(categories: &CategoryIndex) -> PipelineResult<()> {
    let invalid = validate_categories(categories);
    if invalid.is_empty() {
        return Ok(());
    }
    log_invalid(&invalid);
    Err(PipelineError::InvalidCategories(invalid.len()))
}

/// Read, normalize, validate, aggregate and publish.
///
/// Nothing is written unless every earlier stage succeeds.
pub fn build_site(input: &Path, config: &SiteConfig, options: &BuildOptions) -> PipelineResult<BuildReport> {
    info!(input = %input.display(), site_root = %config.site_root.display(), "building site");

    let parsed = read_csv_file(input, options.read)?;
    info!(
        rows = parsed.rows.len(),
        encoding = %parsed.encoding,
        delimiter = %parsed.delimiter,
        "parsed CSV"
    );

    let normalized = normalize_rows(&parsed.rows, &options.taxonomy, options.logos)?;
    if normalized.products.is_empty() {
        warn!("no products survived normalization");
    }

    if options.skip_validation {
        warn!("schema validation skipped");
    } else {
        ensure_valid(&normalized.products, &options.taxonomy)?;
    }

    let categories = build_categories(&options.taxonomy, &normalized.products);
    info!(categories = categories.len(), "aggregated categories");
    if !options.skip_validation {
        ensure_valid_categories(&categories)?;
    }

    let written = Publisher::new(&config.site_root).publish(
        &config.base_url,
        &normalized.products,
        &categories,
        config.lastmod,
    )?;

    let report = BuildReport {
        csv: CsvInfo::from(&parsed),
        product_count: normalized.products.len(),
        dropped: normalized.dropped,
        category_count: categories.len(),
        written,
    };
    info!("{}", report.summary());
    Ok(report)
}

/// Apply an override file to the published catalog and republish.
pub fn enrich_site(overrides: &Path, config: &SiteConfig, taxonomy: &Taxonomy) -> PipelineResult<EnrichSiteReport> {
    let paths = SitePaths::new(&config.site_root);
    info!(catalog = %paths.products.display(), overrides = %overrides.display(), "enriching catalog");

    let mut products = load_products(&paths.products)?;
    let file = load_enrichment(overrides)?;
    let enrich = apply_enrichment(&mut products, &file);

    ensure_valid(&products, taxonomy)?;

    let categories = build_categories(taxonomy, &products);
    ensure_valid_categories(&categories)?;
    let written = Publisher::new(&config.site_root).publish(&config.base_url, &products, &categories, config.lastmod)?;

    Ok(EnrichSiteReport {
        enrich,
        product_count: products.len(),
        category_count: categories.len(),
        written,
    })
}
