//! Error types for the catalog build pipeline.
//!
//! One enum per stage, with a top-level [`PipelineError`] wrapping them:
//!
//! - [`ReaderError`] - reading and parsing the CSV export
//! - [`TaxonomyError`] - loading or checking a taxonomy file
//! - [`PublishError`] - writing the site artifacts
//! - [`EnrichError`] - loading overrides or an existing catalog
//! - [`ConfigError`] - invalid site settings
//!
//! Conversions are provided via `From` so `?` works across stage boundaries.
//! Row-level problems (missing title, duplicate slug, ...) are not errors:
//! they are recorded as [`crate::normalize::DroppedRow`]s.

use std::path::PathBuf;
use thiserror::Error;

// =============================================================================
// Reader Errors
// =============================================================================

/// Errors while reading the raw CSV export.
#[derive(Debug, Error)]
pub enum ReaderError {
    /// Failed to read the input file.
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The CSV itself is malformed (bad quoting, unreadable record, ...).
    #[error("Invalid CSV at record {line}: {message}")]
    Csv { line: u64, message: String },

    /// Nothing to read.
    #[error("CSV input is empty")]
    Empty,

    /// Header row is present but declares no columns.
    #[error("No headers found in CSV")]
    NoHeaders,
}

impl From<csv::Error> for ReaderError {
    fn from(err: csv::Error) -> Self {
        let line = err.position().map(|p| p.line()).unwrap_or(0);
        ReaderError::Csv {
            line,
            message: err.to_string(),
        }
    }
}

// =============================================================================
// Taxonomy Errors
// =============================================================================

/// Errors in a taxonomy definition.
#[derive(Debug, Error)]
pub enum TaxonomyError {
    #[error("Failed to read taxonomy file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid taxonomy JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A keyword or flag points at a name missing from the category list.
    #[error("'{source_key}' maps to unknown category '{category}'")]
    UnknownCategory { source_key: String, category: String },

    #[error("Category '{0}' is declared more than once")]
    DuplicateCategory(String),

    #[error("Fallback category '{0}' is not a canonical category")]
    MissingFallback(String),
}

// =============================================================================
// Publish Errors
// =============================================================================

/// Errors while writing site artifacts.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),

    /// The temporary file could not be moved over the target.
    #[error("Failed to replace {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

// =============================================================================
// Enrichment Errors
// =============================================================================

/// Errors while loading enrichment inputs. Lookup misses are not errors.
#[derive(Debug, Error)]
pub enum EnrichError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

// =============================================================================
// Config Errors
// =============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid base URL '{value}': {message}")]
    InvalidBaseUrl { value: String, message: String },

    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level error returned by [`crate::pipeline::build_site`] and
/// [`crate::pipeline::enrich_site`].
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Reader error: {0}")]
    Reader(#[from] ReaderError),

    #[error("Taxonomy error: {0}")]
    Taxonomy(#[from] TaxonomyError),

    #[error("Publish error: {0}")]
    Publish(#[from] PublishError),

    #[error("Enrichment error: {0}")]
    Enrich(#[from] EnrichError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Logo resolver error: {0}")]
    LogoClient(#[from] reqwest::Error),

    /// Some normalized products failed schema validation; nothing was written.
    #[error("{0} products failed schema validation")]
    InvalidProducts(usize),

    /// The aggregated category index failed schema validation; nothing was written.
    #[error("{0} categories failed schema validation")]
    InvalidCategories(usize),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

pub type ReaderResult<T> = Result<T, ReaderError>;

pub type TaxonomyResult<T> = Result<T, TaxonomyError>;

pub type PublishResult<T> = Result<T, PublishError>;

pub type EnrichResult<T> = Result<T, EnrichError>;

pub type ConfigResult<T> = Result<T, ConfigError>;

pub type PipelineResult<T> = Result<T, PipelineError>;
