//! Category taxonomy and keyword tables.
//!
//! The canonical category list, the keyword lookup used to classify the free
//! text `Category` column and the flag-column bindings are data, not logic.
//! [`Taxonomy::default`] carries the built-in tables; a replacement can be
//! loaded from JSON without touching the classifier.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::error::{TaxonomyError, TaxonomyResult};

/// Version tag of the built-in tables.
pub const TAXONOMY_VERSION: &str = "2026.1";

/// Category used when nothing else matches.
pub const FALLBACK_CATEGORY: &str = "Data & Analytics";

/// Canonical categories, in publication order.
const CANONICAL_CATEGORIES: &[(&str, &str)] = &[
    ("Property Management", "Tools for managing commercial and residential properties, tenants, and maintenance."),
    ("CRM & Marketing", "Customer relationship management and marketing tools for real estate professionals."),
    ("Investment & Valuation", "Software for real estate investment analysis, valuation, and portfolio management."),
    ("Construction & Development", "Tools for construction management, project development, and planning."),
    ("Lease Administration", "Lease management, tracking, and administration software."),
    ("Data & Analytics", "Data platforms, analytics, and business intelligence for real estate."),
    ("Broker Tools", "Software designed specifically for commercial real estate brokers."),
    ("Site Selection", "Tools for location analysis, site selection, and market research."),
    ("Tenant Experience", "Platforms enhancing tenant engagement, communication, and building experience."),
    ("Accounting & Finance", "Financial management, accounting, and budgeting for real estate."),
    ("AI & Automation", "Artificial intelligence and automation tools for real estate workflows."),
    ("Listing Services", "Property listing platforms and marketing for available spaces."),
    ("Crowdfunding & Investing", "Real estate crowdfunding and investment platforms."),
    ("Energy & Sustainability", "Energy management, sustainability, and green building tools."),
    ("Legal & Compliance", "Legal, regulatory, and compliance tools for real estate."),
    ("Workplace & Space Management", "Workspace planning, space utilization, and facility management."),
];

/// Keyword -> category. Order matters for substring fallback matching.
const CATEGORY_KEYWORDS: &[(&str, &str)] = &[
    ("property management", "Property Management"),
    ("management", "Property Management"),
    ("asset management", "Property Management"),
    ("facilities management", "Property Management"),
    ("facility management", "Property Management"),
    ("portfolio management", "Investment & Valuation"),
    ("crm", "CRM & Marketing"),
    ("marketing", "CRM & Marketing"),
    ("lead generation", "CRM & Marketing"),
    ("customer relationship", "CRM & Marketing"),
    ("investment", "Investment & Valuation"),
    ("valuation", "Investment & Valuation"),
    ("appraisal", "Investment & Valuation"),
    ("underwriting", "Investment & Valuation"),
    ("financial analysis", "Investment & Valuation"),
    ("real estate investment", "Investment & Valuation"),
    ("construction", "Construction & Development"),
    ("development", "Construction & Development"),
    ("project management", "Construction & Development"),
    ("building", "Construction & Development"),
    ("lease", "Lease Administration"),
    ("lease management", "Lease Administration"),
    ("lease administration", "Lease Administration"),
    ("lease accounting", "Lease Administration"),
    ("data", "Data & Analytics"),
    ("analytics", "Data & Analytics"),
    ("data analytics", "Data & Analytics"),
    ("real estate data", "Data & Analytics"),
    ("market insights", "Data & Analytics"),
    ("market research", "Data & Analytics"),
    ("market data", "Data & Analytics"),
    ("research", "Data & Analytics"),
    ("broker", "Broker Tools"),
    ("brokerage", "Broker Tools"),
    ("deal management", "Broker Tools"),
    ("transactions", "Broker Tools"),
    ("transaction management", "Broker Tools"),
    ("site selection", "Site Selection"),
    ("location intelligence", "Site Selection"),
    ("location analytics", "Site Selection"),
    ("geospatial", "Site Selection"),
    ("mapping", "Site Selection"),
    ("gis", "Site Selection"),
    ("tenant", "Tenant Experience"),
    ("tenant experience", "Tenant Experience"),
    ("tenant engagement", "Tenant Experience"),
    ("occupier", "Tenant Experience"),
    ("accounting", "Accounting & Finance"),
    ("finance", "Accounting & Finance"),
    ("financial", "Accounting & Finance"),
    ("budgeting", "Accounting & Finance"),
    ("payments", "Accounting & Finance"),
    ("ai", "AI & Automation"),
    ("artificial intelligence", "AI & Automation"),
    ("automation", "AI & Automation"),
    ("machine learning", "AI & Automation"),
    ("listing", "Listing Services"),
    ("listings", "Listing Services"),
    ("marketplace", "Listing Services"),
    ("commercial real estate", "Broker Tools"),
    ("crowdfunding", "Crowdfunding & Investing"),
    ("investing", "Crowdfunding & Investing"),
    ("fundraising", "Crowdfunding & Investing"),
    ("energy", "Energy & Sustainability"),
    ("sustainability", "Energy & Sustainability"),
    ("green", "Energy & Sustainability"),
    ("esg", "Energy & Sustainability"),
    ("legal", "Legal & Compliance"),
    ("compliance", "Legal & Compliance"),
    ("regulatory", "Legal & Compliance"),
    ("law", "Legal & Compliance"),
    ("municipal", "Legal & Compliance"),
    ("zoning", "Legal & Compliance"),
    ("workspace", "Workplace & Space Management"),
    ("space management", "Workplace & Space Management"),
    ("space planning", "Workplace & Space Management"),
    ("coworking", "Workplace & Space Management"),
    ("workplace", "Workplace & Space Management"),
    ("facilities", "Workplace & Space Management"),
    ("operations", "Property Management"),
    ("maintenance", "Property Management"),
    ("inspections", "Property Management"),
    ("proptech", "Data & Analytics"),
    ("technology", "Data & Analytics"),
    ("visualization", "Data & Analytics"),
    ("reporting", "Data & Analytics"),
    ("document management", "Legal & Compliance"),
    ("communication", "Tenant Experience"),
    ("collaboration", "Workplace & Space Management"),
    ("design", "Construction & Development"),
    ("architecture", "Construction & Development"),
    ("planning", "Construction & Development"),
    ("insurance", "Accounting & Finance"),
    ("tax", "Accounting & Finance"),
    ("debt", "Accounting & Finance"),
    ("lending", "Accounting & Finance"),
    ("mortgage", "Accounting & Finance"),
    ("residential", "Property Management"),
    ("multifamily", "Property Management"),
];

/// Boolean spreadsheet columns, each bound to one category. Names are the
/// export's headers verbatim (note the trailing space on the AI column).
const FLAG_COLUMNS: &[(&str, &str)] = &[
    ("Cat - DevelopmentY/N", "Construction & Development"),
    ("Cat - Constr Y/N", "Construction & Development"),
    ("Cat - Law & Muni Y/N", "Legal & Compliance"),
    ("Cat - Search & Sele Y/N", "Site Selection"),
    ("Cat - CRM & Mar Y/N", "CRM & Marketing"),
    ("Cat - Fin & Eval Y/N", "Investment & Valuation"),
    ("Cat - AI ", "AI & Automation"),
];

/// A canonical category and its static description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryDef {
    pub name: String,
    pub description: String,
}

/// Maps a lowercase keyword to a canonical category name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordRule {
    pub keyword: String,
    pub category: String,
}

/// Binds a boolean column to a canonical category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlagRule {
    pub column: String,
    pub category: String,
}

/// The complete classification table set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Taxonomy {
    #[serde(default = "default_version")]
    pub version: String,
    pub categories: Vec<CategoryDef>,
    pub keywords: Vec<KeywordRule>,
    #[serde(default)]
    pub flags: Vec<FlagRule>,
    #[serde(default = "default_fallback")]
    pub fallback: String,
}

fn default_version() -> String {
    TAXONOMY_VERSION.to_string()
}

fn default_fallback() -> String {
    FALLBACK_CATEGORY.to_string()
}

impl Default for Taxonomy {
    fn default() -> Self {
        Self {
            version: default_version(),
            categories: CANONICAL_CATEGORIES
                .iter()
                .map(|(name, description)| CategoryDef {
                    name: name.to_string(),
                    description: description.to_string(),
                })
                .collect(),
            keywords: CATEGORY_KEYWORDS
                .iter()
                .map(|(keyword, category)| KeywordRule {
                    keyword: keyword.to_string(),
                    category: category.to_string(),
                })
                .collect(),
            flags: FLAG_COLUMNS
                .iter()
                .map(|(column, category)| FlagRule {
                    column: column.to_string(),
                    category: category.to_string(),
                })
                .collect(),
            fallback: default_fallback(),
        }
    }
}

impl Taxonomy {
    /// Parse and check a taxonomy from JSON.
    pub fn from_json(json: &str) -> TaxonomyResult<Self> {
        let taxonomy: Taxonomy = serde_json::from_str(json)?;
        taxonomy.validate()?;
        Ok(taxonomy)
    }

    /// Load a taxonomy file.
    pub fn from_file(path: &Path) -> TaxonomyResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Every keyword, flag and the fallback must name a declared category,
    /// and no category may be declared twice.
    pub fn validate(&self) -> TaxonomyResult<()> {
        let mut names = HashSet::new();
        for def in &self.categories {
            if !names.insert(def.name.as_str()) {
                return Err(TaxonomyError::DuplicateCategory(def.name.clone()));
            }
        }

        for rule in &self.keywords {
            if !names.contains(rule.category.as_str()) {
                return Err(TaxonomyError::UnknownCategory {
                    source_key: rule.keyword.clone(),
                    category: rule.category.clone(),
                });
            }
        }

        for rule in &self.flags {
            if !names.contains(rule.category.as_str()) {
                return Err(TaxonomyError::UnknownCategory {
                    source_key: rule.column.clone(),
                    category: rule.category.clone(),
                });
            }
        }

        if !names.contains(self.fallback.as_str()) {
            return Err(TaxonomyError::MissingFallback(self.fallback.clone()));
        }

        Ok(())
    }

    /// Whether `name` is one of the canonical categories.
    pub fn is_canonical(&self, name: &str) -> bool {
        self.categories.iter().any(|c| c.name == name)
    }

    /// Category for a lowercased token: exact keyword first, then the first
    /// keyword (in table order) contained in the token or containing it.
    pub fn lookup(&self, token: &str) -> Option<&str> {
        if let Some(rule) = self.keywords.iter().find(|r| r.keyword == token) {
            return Some(&rule.category);
        }

        self.keywords
            .iter()
            .find(|r| token.contains(r.keyword.as_str()) || r.keyword.contains(token))
            .map(|r| r.category.as_str())
    }
}
