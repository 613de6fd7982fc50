//! # CRE Directory - static catalog builder for commercial real-estate software
//!
//! Turns a spreadsheet export of CRE software listings into the data files of
//! a static directory site: a product catalog, a category index, a sitemap
//! and a robots file.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   CSV File  │────▶│   Parser    │────▶│  Normalize  │────▶│  Aggregate  │
//! │  (ISO/UTF8) │     │  (RawRow)   │     │  (Product)  │     │ (Category)  │
//! └─────────────┘     └─────────────┘     └─────────────┘     └──────┬──────┘
//!                                                                    │
//!                     products.json · categories.json · sitemap ◀────┘ Publish
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use cre_directory::{build_site, BuildOptions, SiteConfig};
//! use std::path::Path;
//!
//! let config = SiteConfig::default().with_site_root("site");
//! let report = build_site(Path::new("export.csv"), &config, &BuildOptions::default())?;
//! println!("{}", report.summary());
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - Domain models (Product, Category)
//! - [`parser`] - CSV reading with encoding detection
//! - [`normalize`] - Row normalization and classification
//! - [`aggregate`] - Category index
//! - [`publish`] - Artifact rendering and atomic writes
//! - [`validation`] - JSON Schema validation
//! - [`enrich`] - Override records for an existing catalog
//! - [`taxonomy`] - Category and keyword tables
//! - [`pipeline`] - End-to-end build and enrich

// Core modules
pub mod error;
pub mod models;
pub mod config;
pub mod logs;

// Reading
pub mod parser;

// Normalization
pub mod slug;
pub mod taxonomy;
pub mod logo;
pub mod normalize;

// Output
pub mod aggregate;
pub mod publish;

// Validation
pub mod validation;

// Enrichment
pub mod enrich;

// Orchestration
pub mod pipeline;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    ConfigError,
    EnrichError,
    PipelineError,
    PipelineResult,
    PublishError,
    ReaderError,
    TaxonomyError,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{Category, Deployment, PricingModel, Product};

// =============================================================================
// Re-exports - CSV Reading
// =============================================================================

pub use parser::{
    decode_content,
    detect_delimiter,
    detect_encoding,
    read_csv_bytes,
    read_csv_file,
    ParseResult,
    RawRow,
    ReadOptions,
};

// =============================================================================
// Re-exports - Normalization
// =============================================================================

pub use slug::{extract_domain, slugify};
pub use taxonomy::Taxonomy;
pub use logo::{ClearbitLogoResolver, HomepageLogoResolver, LogoResolver};
pub use normalize::{DropReason, DroppedRow, NormalizeResult, Normalizer};

// =============================================================================
// Re-exports - Aggregation & Publishing
// =============================================================================

pub use aggregate::{build_categories, CategoryIndex};
pub use publish::{
    render_categories,
    render_products,
    render_robots,
    render_sitemap,
    Publisher,
    SitePaths,
};

// =============================================================================
// Re-exports - Validation
// =============================================================================

pub use validation::{
    is_valid,
    is_valid_category,
    is_valid_product,
    validate,
    validate_catalog,
    validate_categories,
    validate_category,
    validate_product,
    validate_values,
    InvalidRecord,
};

// =============================================================================
// Re-exports - Enrichment
// =============================================================================

pub use enrich::{apply_enrichment, EnrichReport, EnrichmentFile, SlugUpdate, TitleUpdate};

// =============================================================================
// Re-exports - Config & Pipeline
// =============================================================================

pub use config::SiteConfig;
pub use pipeline::{
    build_site,
    enrich_site,
    normalize_rows,
    BuildOptions,
    BuildReport,
    CsvInfo,
    EnrichSiteReport,
    LogoSource,
};
