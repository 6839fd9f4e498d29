//! # Central Bank Speeches
//!
//! Crawls the BIS central bankers' speech archive and extracts structured
//! metadata and full text for every speech.
//!
//! ## Features
//!
//! - Enumerates archive listing pages from a file of date ranges
//! - Scrapes HTML speech pages and PDF-only listing entries
//! - Parses the free-text byline into speaker name, gender, title, central
//!   bank, city and country using embedded gazetteer and first-name tables
//! - Extracts PDF text
//! - Writes one JSON line per speech as soon as it is extracted
//!
//! ## Usage
//!
//! ```sh
//! cb_speeches -d date_ranges.txt -o ./out
//! ```
//!
//! ## Architecture
//!
//! The application follows a pipeline architecture:
//! 1. **Setup**: Load date ranges and reference data (once, shared read-only)
//! 2. **Indexing**: Visit every listing page and collect speech entries
//! 3. **Fetching**: Download each speech page and/or PDF (parallel, 12 at a time)
//! 4. **Output**: Append each record to a JSONL file

use chrono::Local;
use clap::Parser;
use futures::StreamExt;
use reqwest::Client;
use std::error::Error;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod byline;
mod cli;
mod fetch;
mod gazetteer;
mod gender;
mod models;
mod outputs;
mod pages;
mod pdf;
mod scrapers;
mod utils;

use byline::BylineParser;
use cli::Cli;
use gazetteer::{Gazetteer, read_dataset};
use gender::NameGenderTable;
use outputs::jsonl::{self, JsonlWriter};
use scrapers::bis::{self, Crawler};
use utils::ensure_writable_dir;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    let started_at = Local::now();
    info!("cb_speeches starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    if let Err(e) = ensure_writable_dir(&args.output_dir).await {
        error!(
            path = %args.output_dir,
            error = %e,
            "Output directory is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }

    // ---- Configuration & reference data ----
    let ranges = pages::load_date_ranges(Path::new(&args.date_ranges))?;
    let page_urls = pages::all_page_urls(&ranges);
    info!(ranges = ranges.len(), pages = page_urls.len(), "Listing pages to visit");

    let parser = Arc::new(load_reference_data(&args)?);

    let crawler = Crawler {
        client: Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(30))
            .build()?,
        parser,
        max_retries: args.max_retries,
        fetch_pdfs: !args.no_pdf,
    };

    // ---- Index ----
    let items = bis::index_speeches(&crawler, &page_urls, args.concurrency).await;
    let total = items.len();

    // ---- Fetch & write ----
    let mut writer = JsonlWriter::create(jsonl::output_path(&args.output_dir, &started_at)).await?;
    let mut records = Box::pin(bis::fetch_speeches(&crawler, items, args.concurrency));
    while let Some(record) = records.next().await {
        writer.write_record(&record).await?;
    }
    let path = writer.path().display().to_string();
    let written = writer.finish().await?;

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        total,
        written,
        failed = total - written,
        %path,
        "Execution complete"
    );
    Ok(())
}

/// Load the gazetteer and name table, from files when given and otherwise
/// from the embedded datasets.
#[instrument(level = "info", skip_all)]
fn load_reference_data(args: &Cli) -> Result<BylineParser, Box<dyn Error>> {
    let gazetteer = Gazetteer::load(args.cities.as_deref(), args.countries.as_deref())?;
    let names = match &args.names {
        Some(path) => NameGenderTable::parse(path, &read_dataset(path)?)?,
        None => NameGenderTable::embedded()?,
    };
    info!(
        cities = gazetteer.city_count(),
        countries = gazetteer.country_count(),
        names = names.len(),
        "Loaded reference data"
    );
    Ok(BylineParser::new(gazetteer, names))
}
