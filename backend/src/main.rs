//! CRE Directory CLI - build the directory site data from a CSV export
//!
//! # Main Commands
//!
//! ```bash
//! cre-directory build raw/export.csv        # CSV → data/*.json, sitemap.xml, robots.txt
//! cre-directory enrich overrides.json       # Apply overrides to data/products.json
//! ```
//!
//! # Debug Commands (for development)
//!
//! ```bash
//! cre-directory parse raw/export.csv        # Just parse CSV to JSON rows
//! cre-directory normalize raw/export.csv    # Rows → products, with drop report
//! cre-directory validate data/products.json # Schema-check a catalog
//! cre-directory taxonomy                    # Show the effective taxonomy
//! ```

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use cre_directory::config::parse_lastmod;
use cre_directory::logs::init_logging;
use cre_directory::{
    build_site, enrich_site, normalize_rows, read_csv_file, validate_values, BuildOptions, LogoSource, ReadOptions,
    SiteConfig, Taxonomy,
};
use serde_json::Value;
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "cre-directory", version)]
#[command(about = "Build the CRE software directory from a spreadsheet export", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Full pipeline: CSV → products, categories, sitemap and robots
    Build {
        /// Input CSV file
        input: PathBuf,

        #[command(flatten)]
        site: SiteArgs,

        #[command(flatten)]
        csv: CsvArgs,

        /// Taxonomy JSON file (default: built-in tables)
        #[arg(long)]
        taxonomy: Option<PathBuf>,

        /// Logo resolution strategy
        #[arg(long, value_enum, default_value_t = LogoArg::Clearbit)]
        logos: LogoArg,

        /// Skip schema validation
        #[arg(long)]
        no_validate: bool,
    },

    /// Parse a CSV file and output rows as JSON
    Parse {
        /// Input CSV file
        input: PathBuf,

        #[command(flatten)]
        csv: CsvArgs,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Normalize a CSV file and output products as JSON
    Normalize {
        /// Input CSV file
        input: PathBuf,

        #[command(flatten)]
        csv: CsvArgs,

        /// Taxonomy JSON file (default: built-in tables)
        #[arg(long)]
        taxonomy: Option<PathBuf>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate a products.json file against the product schema
    Validate {
        /// Input JSON file (array of products)
        input: PathBuf,
    },

    /// Apply override records to the published catalog and republish
    Enrich {
        /// Overrides JSON file
        overrides: PathBuf,

        #[command(flatten)]
        site: SiteArgs,

        /// Taxonomy JSON file (default: built-in tables)
        #[arg(long)]
        taxonomy: Option<PathBuf>,
    },

    /// Show the effective taxonomy
    Taxonomy {
        /// Taxonomy JSON file to check and print (default: built-in tables)
        #[arg(long)]
        file: Option<PathBuf>,
    },
}

#[derive(clap::Args)]
struct SiteArgs {
    /// Site root receiving data/, sitemap.xml and robots.txt [env: CRE_SITE_ROOT]
    #[arg(long)]
    site_root: Option<PathBuf>,

    /// Public base URL of the site [env: CRE_BASE_URL]
    #[arg(long)]
    base_url: Option<String>,

    /// Sitemap <lastmod> date (YYYY-MM-DD)
    #[arg(long)]
    lastmod: Option<String>,
}

#[derive(clap::Args)]
struct CsvArgs {
    /// CSV delimiter (default: ',')
    #[arg(short, long, conflicts_with = "detect_delimiter", value_parser = parse_delimiter)]
    delimiter: Option<char>,

    /// Guess the delimiter from the header line
    #[arg(long)]
    detect_delimiter: bool,
}

impl CsvArgs {
    fn read_options(&self) -> ReadOptions {
        let mut options = ReadOptions {
            detect_delimiter: self.detect_delimiter,
            ..ReadOptions::default()
        };
        if let Some(d) = self.delimiter {
            options.delimiter = d;
        }
        options
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum LogoArg {
    /// logo.clearbit.com/{domain}, no network
    Clearbit,
    /// Scrape the product homepage, fall back to clearbit
    Homepage,
}

impl From<LogoArg> for LogoSource {
    fn from(arg: LogoArg) -> Self {
        match arg {
            LogoArg::Clearbit => LogoSource::Clearbit,
            LogoArg::Homepage => LogoSource::Homepage,
        }
    }
}

fn parse_delimiter(raw: &str) -> Result<char, String> {
    let delimiter = match raw {
        "\\t" | "tab" => '\t',
        other => {
            let mut chars = other.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => c,
                _ => return Err(format!("expected a single character, got '{raw}'")),
            }
        }
    };
    if !delimiter.is_ascii() {
        return Err(format!("delimiter must be ASCII, got '{delimiter}'"));
    }
    Ok(delimiter)
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Build {
            input,
            site,
            csv,
            taxonomy,
            logos,
            no_validate,
        } => cmd_build(&input, &site, &csv, taxonomy.as_deref(), logos, no_validate),

        Commands::Parse { input, csv, output } => cmd_parse(&input, &csv, output.as_deref()),

        Commands::Normalize {
            input,
            csv,
            taxonomy,
            output,
        } => cmd_normalize(&input, &csv, taxonomy.as_deref(), output.as_deref()),

        Commands::Validate { input } => cmd_validate(&input),

        Commands::Enrich {
            overrides,
            site,
            taxonomy,
        } => cmd_enrich(&overrides, &site, taxonomy.as_deref()),

        Commands::Taxonomy { file } => cmd_taxonomy(file.as_deref()),
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        let mut source = e.source();
        while let Some(cause) = source {
            eprintln!("   caused by: {}", cause);
            source = cause.source();
        }
        std::process::exit(1);
    }
}

fn site_config(site: &SiteArgs) -> Result<SiteConfig, Box<dyn Error>> {
    let mut config = SiteConfig::from_env()?;
    if let Some(root) = &site.site_root {
        config = config.with_site_root(root);
    }
    if let Some(url) = &site.base_url {
        config = config.with_base_url(url)?;
    }
    if let Some(date) = &site.lastmod {
        config = config.with_lastmod(Some(parse_lastmod(date)?));
    }
    Ok(config)
}

fn load_taxonomy(path: Option<&Path>) -> Result<Taxonomy, Box<dyn Error>> {
    match path {
        Some(p) => {
            eprintln!("📚 Taxonomy: {}", p.display());
            Ok(Taxonomy::from_file(p)?)
        }
        None => Ok(Taxonomy::default()),
    }
}

fn cmd_build(
    input: &Path,
    site: &SiteArgs,
    csv: &CsvArgs,
    taxonomy: Option<&Path>,
    logos: LogoArg,
    no_validate: bool,
) -> Result<(), Box<dyn Error>> {
    eprintln!("📄 Processing: {}", input.display());

    let config = site_config(site)?;
    let options = BuildOptions {
        read: csv.read_options(),
        taxonomy: load_taxonomy(taxonomy)?,
        logos: logos.into(),
        skip_validation: no_validate,
    };

    let report = build_site(input, &config, &options)?;

    eprintln!("   Encoding: {}", report.csv.encoding);
    eprintln!("   Delimiter: '{}'", format_delimiter(report.csv.delimiter));
    eprintln!("   Rows: {}", report.csv.row_count);
    eprintln!("\n⚙️  Products: {}", report.product_count);
    eprintln!("   Categories: {}", report.category_count);
    print_dropped(&report.dropped);

    eprintln!("\n💾 Written:");
    for path in &report.written {
        eprintln!("   {}", path.display());
    }

    eprintln!("\n✨ Done!");
    Ok(())
}

fn cmd_parse(input: &Path, csv: &CsvArgs, output: Option<&Path>) -> Result<(), Box<dyn Error>> {
    eprintln!("📄 Parsing CSV: {}", input.display());

    let result = read_csv_file(input, csv.read_options())?;

    eprintln!("   Encoding: {}", result.encoding);
    eprintln!(
        "   Delimiter: '{}'{}",
        format_delimiter(result.delimiter),
        if csv.detect_delimiter { " (auto-detected)" } else { "" }
    );
    eprintln!("   Columns: {}", result.headers.join(", "));
    eprintln!("✅ Parsed {} records", result.rows.len());

    let json = serde_json::to_string_pretty(&result.rows)?;
    write_output(&json, output)?;

    Ok(())
}

fn cmd_normalize(
    input: &Path,
    csv: &CsvArgs,
    taxonomy: Option<&Path>,
    output: Option<&Path>,
) -> Result<(), Box<dyn Error>> {
    eprintln!("📄 Normalizing: {}", input.display());

    let taxonomy = load_taxonomy(taxonomy)?;
    let parsed = read_csv_file(input, csv.read_options())?;
    let result = normalize_rows(&parsed.rows, &taxonomy, LogoSource::Clearbit)?;

    eprintln!("   Rows: {}", parsed.rows.len());
    eprintln!("✅ Products: {}", result.products.len());
    print_dropped(&result.dropped);

    let json = serde_json::to_string_pretty(&result.products)?;
    write_output(&json, output)?;

    Ok(())
}

fn cmd_validate(input: &Path) -> Result<(), Box<dyn Error>> {
    eprintln!("✔️  Validating: {}", input.display());

    let content = fs::read_to_string(input)?;
    let records: Vec<Value> = serde_json::from_str(&content)?;

    let invalid = validate_values(&records);

    for record in invalid.iter().take(5) {
        eprintln!("\n❌ Record {} ({}) invalid:", record.index, record.slug);
        for err in record.errors.iter().take(3) {
            eprintln!("   - {}", err);
        }
    }

    eprintln!(
        "\n📊 Results: {} valid, {} invalid",
        records.len() - invalid.len(),
        invalid.len()
    );

    if !invalid.is_empty() {
        std::process::exit(1);
    }

    Ok(())
}

fn cmd_enrich(overrides: &Path, site: &SiteArgs, taxonomy: Option<&Path>) -> Result<(), Box<dyn Error>> {
    eprintln!("🧩 Enriching with: {}", overrides.display());

    let config = site_config(site)?;
    let taxonomy = load_taxonomy(taxonomy)?;
    let report = enrich_site(overrides, &config, &taxonomy)?;

    eprintln!("   {}", report.enrich.summary());
    eprintln!("   Products: {}", report.product_count);
    eprintln!("   Categories: {}", report.category_count);

    eprintln!("\n✨ Done!");
    Ok(())
}

fn cmd_taxonomy(file: Option<&Path>) -> Result<(), Box<dyn Error>> {
    let taxonomy = load_taxonomy(file)?;
    println!("{}", taxonomy.to_json()?);
    Ok(())
}

fn print_dropped(dropped: &[cre_directory::DroppedRow]) {
    if dropped.is_empty() {
        return;
    }
    eprintln!("   Dropped: {}", dropped.len());
    for row in dropped.iter().take(10) {
        eprintln!("     - line {}: {} ({})", row.line, row.title, row.reason);
    }
    if dropped.len() > 10 {
        eprintln!("     ... and {} more", dropped.len() - 10);
    }
}

fn format_delimiter(d: char) -> String {
    match d {
        '\t' => "\\t".to_string(),
        c => c.to_string(),
    }
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
