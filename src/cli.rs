//! Command-line interface definitions.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Most options can also be provided via environment variables.

use clap::Parser;

/// Command-line arguments for the speech scraper.
///
/// # Examples
///
/// ```sh
/// # Crawl the ranges listed in date_ranges.txt
/// cb_speeches -o ./out
///
/// # Custom ranges, bigger gazetteer, metadata only
/// cb_speeches -d ranges.txt -o ./out --cities cities15000.tsv --no-pdf
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// File of `date_token, page_count` lines selecting the listing pages to crawl
    #[arg(short, long, env = "CB_DATE_RANGES", default_value = "date_ranges.txt")]
    pub date_ranges: String,

    /// Output directory for the JSONL file
    #[arg(short, long)]
    pub output_dir: String,

    /// Cities dataset (`name<TAB>country_code<TAB>population`); defaults to the embedded table
    #[arg(long, env = "CB_CITIES")]
    pub cities: Option<String>,

    /// Countries dataset (`code<TAB>name`); defaults to the embedded table
    #[arg(long, env = "CB_COUNTRIES")]
    pub countries: Option<String>,

    /// First-name gender dataset (`name<TAB>label`); defaults to the embedded table
    #[arg(long, env = "CB_NAMES")]
    pub names: Option<String>,

    /// Maximum number of pages and speeches fetched at once
    #[arg(long, default_value_t = 12)]
    pub concurrency: usize,

    /// Retries per request after the first attempt (exponential backoff)
    #[arg(long, default_value_t = 0)]
    pub max_retries: usize,

    /// Skip downloading and extracting speech PDFs
    #[arg(long)]
    pub no_pdf: bool,
}
