//! Publisher: render and write the site artifacts.
//!
//! Rendering is pure; [`Publisher::publish`] renders every document before
//! touching the filesystem, then replaces each target atomically.

use chrono::NaiveDate;
use std::fmt::Write as _;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::info;

use crate::aggregate::CategoryIndex;
use crate::error::{PublishError, PublishResult};
use crate::models::Product;

const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

const ROOT_PRIORITY: &str = "1.0";
const CATEGORY_PRIORITY: &str = "0.9";
const PRODUCT_PRIORITY: &str = "0.8";

// =============================================================================
// Layout
// =============================================================================

/// Where each artifact lives under a site root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SitePaths {
    pub products: PathBuf,
    pub categories: PathBuf,
    pub sitemap: PathBuf,
    pub robots: PathBuf,
}

impl SitePaths {
    pub fn new(site_root: &Path) -> Self {
        let data = site_root.join("data");
        Self {
            products: data.join("products.json"),
            categories: data.join("categories.json"),
            sitemap: site_root.join("sitemap.xml"),
            robots: site_root.join("robots.txt"),
        }
    }

    /// All four paths in write order.
    pub fn all(&self) -> [&Path; 4] {
        [&self.products, &self.categories, &self.sitemap, &self.robots]
    }
}

// =============================================================================
// Rendering
// =============================================================================

/// `products.json`: pretty-printed array in catalog order.
pub fn render_products(products: &[Product]) -> Result<String, serde_json::Error> {
    let mut json = serde_json::to_string_pretty(products)?;
    json.push('\n');
    Ok(json)
}

/// `categories.json`: pretty-printed object keyed by category slug.
pub fn render_categories(categories: &CategoryIndex) -> Result<String, serde_json::Error> {
    let mut json = serde_json::to_string_pretty(categories)?;
    json.push('\n');
    Ok(json)
}

/// `sitemap.xml`: root, then products, then categories.
pub fn render_sitemap(
    base_url: &str,
    products: &[Product],
    categories: &CategoryIndex,
    lastmod: Option<NaiveDate>,
) -> String {
    let lastmod = lastmod.map(|d| d.format("%Y-%m-%d").to_string());
    let mut xml = String::new();
    xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    let _ = writeln!(xml, "<urlset xmlns=\"{SITEMAP_NS}\">");

    push_url(&mut xml, &format!("{base_url}/"), lastmod.as_deref(), ROOT_PRIORITY);
    for product in products {
        let loc = format!("{base_url}/product.html#{}", product.slug);
        push_url(&mut xml, &loc, lastmod.as_deref(), PRODUCT_PRIORITY);
    }
    for slug in categories.keys() {
        let loc = format!("{base_url}/category.html#{slug}");
        push_url(&mut xml, &loc, lastmod.as_deref(), CATEGORY_PRIORITY);
    }

    xml.push_str("</urlset>\n");
    xml
}

fn push_url(xml: &mut String, loc: &str, lastmod: Option<&str>, priority: &str) {
    let _ = write!(xml, "  <url><loc>{}</loc>", escape_xml(loc));
    if let Some(date) = lastmod {
        let _ = write!(xml, "<lastmod>{date}</lastmod>");
    }
    let _ = writeln!(xml, "<priority>{priority}</priority></url>");
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

/// `robots.txt`: allow everything and point at the sitemap.
pub fn render_robots(base_url: &str) -> String {
    format!("User-agent: *\nAllow: /\nSitemap: {base_url}/sitemap.xml\n")
}

// =============================================================================
// Publisher
// =============================================================================

/// Rendered artifacts, ready to write.
#[derive(Debug, Clone, PartialEq)]
pub struct SiteDocuments {
    pub products: String,
    pub categories: String,
    pub sitemap: String,
    pub robots: String,
}

impl SiteDocuments {
    pub fn render(
        base_url: &str,
        products: &[Product],
        categories: &CategoryIndex,
        lastmod: Option<NaiveDate>,
    ) -> PublishResult<Self> {
        Ok(Self {
            products: render_products(products)?,
            categories: render_categories(categories)?,
            sitemap: render_sitemap(base_url, products, categories, lastmod),
            robots: render_robots(base_url),
        })
    }
}

/// Writes a rendered site under a root directory.
#[derive(Debug, Clone)]
pub struct Publisher {
    paths: SitePaths,
}

impl Publisher {
    pub fn new(site_root: impl AsRef<Path>) -> Self {
        Self {
            paths: SitePaths::new(site_root.as_ref()),
        }
    }

    pub fn paths(&self) -> &SitePaths {
        &self.paths
    }

    /// Render then write all four artifacts. Returns the written paths.
    pub fn publish(
        &self,
        base_url: &str,
        products: &[Product],
        categories: &CategoryIndex,
        lastmod: Option<NaiveDate>,
    ) -> PublishResult<Vec<PathBuf>> {
        let docs = SiteDocuments::render(base_url, products, categories, lastmod)?;
        self.write(&docs)
    }

    /// Write already-rendered artifacts.
    pub fn write(&self, docs: &SiteDocuments) -> PublishResult<Vec<PathBuf>> {
        let contents = [&docs.products, &docs.categories, &docs.sitemap, &docs.robots];
        let mut written = Vec::with_capacity(contents.len());

        for (path, content) in self.paths.all().into_iter().zip(contents) {
            write_atomic(path, content)?;
            info!(path = %path.display(), bytes = content.len(), "wrote artifact");
            written.push(path.to_path_buf());
        }

        Ok(written)
    }
}

/// Write to a sibling temp file, then rename over `path`.
fn write_atomic(path: &Path, content: &str) -> PublishResult<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let io_err = |source| PublishError::Io {
        path: path.to_path_buf(),
        source,
    };

    std::fs::create_dir_all(dir).map_err(io_err)?;
    let mut tmp = NamedTempFile::new_in(dir).map_err(io_err)?;
    tmp.write_all(content.as_bytes()).map_err(io_err)?;
    tmp.flush().map_err(io_err)?;
    tmp.persist(path).map_err(|e| PublishError::Persist {
        path: path.to_path_buf(),
        source: e.error,
    })?;
    Ok(())
}
