//! BIS central bankers' speeches scraper.
//!
//! This module scrapes the speech archive of the
//! [Bank for International Settlements](https://www.bis.org/cbspeeches/).
//!
//! # Page Layout
//!
//! Listing pages (`/list/cbspeeches/from_{date}/page_{n}.htm`) hold a
//! `#documents` table with one `.item` row per speech. A row links either to
//! an HTML speech page (`.htm`) or straight to a PDF. PDF-only rows carry the
//! title and date on `.item_date` and the byline in `.info`.
//!
//! HTML speech pages keep everything inside `#center`: the title in `h1`,
//! the byline in `#extratitle-div`, the body in `#cmsContent` and the
//! companion PDF link in `.pdftitle`.

use crate::byline::{BylineParser, SpeakerInfo};
use crate::fetch::{get_bytes, get_text};
use crate::models::{ListingItem, SpeechPage, SpeechRecord};
use crate::pdf;
use crate::utils::{clean_fragments, truncate_for_log};
use futures::stream::{self, Stream, StreamExt};
use once_cell::sync::Lazy;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use std::error::Error;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

/// Site root every relative link is resolved against.
pub const BIS_ROOT: &str = "https://www.bis.org/";

static DOCUMENTS: Lazy<Selector> = Lazy::new(|| selector("#documents"));
static ITEM: Lazy<Selector> = Lazy::new(|| selector(".item"));
static LINK: Lazy<Selector> = Lazy::new(|| selector("a[href]"));
static ITEM_DATE: Lazy<Selector> = Lazy::new(|| selector(".item_date"));
static INFO: Lazy<Selector> = Lazy::new(|| selector(".info"));
static CENTER: Lazy<Selector> = Lazy::new(|| selector("#center"));
static HEADING: Lazy<Selector> = Lazy::new(|| selector("h1"));
static DATE: Lazy<Selector> = Lazy::new(|| selector(".date"));
static BYLINE: Lazy<Selector> = Lazy::new(|| selector("#extratitle-div"));
static CONTENT: Lazy<Selector> = Lazy::new(|| selector("#cmsContent"));
static PDF_TITLE: Lazy<Selector> = Lazy::new(|| selector(".pdftitle"));

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("valid CSS selector")
}

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("page has no '{0}' element")]
    MissingElement(&'static str),
    #[error("cannot resolve link '{href}': {error}")]
    BadLink {
        href: String,
        #[source]
        error: url::ParseError,
    },
}

/// Shared state for one crawl.
#[derive(Debug)]
pub struct Crawler {
    pub client: Client,
    pub parser: Arc<BylineParser>,
    pub max_retries: usize,
    /// Download and extract PDFs.
    pub fetch_pdfs: bool,
}

/// Resolve a link found on a BIS page to an absolute URL.
pub fn resolve_link(href: &str) -> Result<String, ExtractError> {
    Url::parse(BIS_ROOT)
        .and_then(|base| base.join(href.trim()))
        .map(String::from)
        .map_err(|error| ExtractError::BadLink {
            href: href.to_string(),
            error,
        })
}

/// Text nodes below `element`, in document order, skipping text that sits
/// directly in `element` itself.
fn descendant_texts<'a>(element: ElementRef<'a>) -> Vec<&'a str> {
    let own_id = element.id();
    element
        .descendants()
        .filter(|node| node.parent().is_some_and(|parent| parent.id() != own_id))
        .filter_map(|node| node.value().as_text().map(|text| &**text))
        .collect()
}

/// The first text node directly inside any of the elements.
fn first_own_text<'a>(mut elements: impl Iterator<Item = ElementRef<'a>>) -> Option<String> {
    elements.find_map(|element| {
        element
            .children()
            .find_map(|child| child.value().as_text().map(|text| text.trim().to_string()))
    })
}

/// Parse a listing page into its speech entries.
///
/// Rows without a usable link are skipped.
pub fn parse_listing(html: &str) -> Result<Vec<ListingItem>, ExtractError> {
    let document = Html::parse_document(html);
    let documents = document
        .select(&DOCUMENTS)
        .next()
        .ok_or(ExtractError::MissingElement("#documents"))?;

    let mut items = Vec::new();
    for item in documents.select(&ITEM) {
        let Some(href) = item.select(&LINK).next().and_then(|a| a.value().attr("href")) else {
            debug!("Listing item without link; skipping");
            continue;
        };
        let url = match resolve_link(href) {
            Ok(url) => url,
            Err(e) => {
                warn!(error = %e, "Listing item with unusable link; skipping");
                continue;
            }
        };

        let title = item
            .select(&ITEM_DATE)
            .find_map(|d| d.value().attr("title"))
            .map(|t| t.trim().to_string());
        let date = first_own_text(item.select(&ITEM_DATE));
        let byline = clean_fragments(item.select(&INFO).flat_map(descendant_texts));

        items.push(ListingItem {
            url,
            title,
            date,
            byline,
        });
    }
    Ok(items)
}

/// Parse an HTML speech page.
pub fn parse_speech_page(html: &str) -> Result<SpeechPage, ExtractError> {
    let document = Html::parse_document(html);
    let center = document
        .select(&CENTER)
        .next()
        .ok_or(ExtractError::MissingElement("#center"))?;

    let title = first_own_text(center.select(&HEADING));
    let date = first_own_text(document.select(&DATE));
    let byline = clean_fragments(center.select(&BYLINE).flat_map(descendant_texts));

    let text = document
        .select(&CONTENT)
        .flat_map(descendant_texts)
        .filter(|t| !t.trim().is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    let pdf_url = center
        .select(&PDF_TITLE)
        .next()
        .and_then(|p| p.select(&LINK).next())
        .and_then(|a| a.value().attr("href"))
        .map(resolve_link)
        .transpose()?;

    Ok(SpeechPage {
        title,
        date,
        byline,
        text,
        pdf_url,
    })
}

/// Index listing pages, fetching up to `concurrency` pages at once.
///
/// Listing order is preserved. Pages that fail to download or parse are
/// logged and skipped.
#[instrument(level = "info", skip_all, fields(pages = page_urls.len()))]
pub async fn index_speeches(crawler: &Crawler, page_urls: &[String], concurrency: usize) -> Vec<ListingItem> {
    let pages: Vec<Vec<ListingItem>> = stream::iter(page_urls)
        .map(|url| async move {
            match index_page(crawler, url).await {
                Ok(items) => {
                    debug!(%url, count = items.len(), "Indexed listing page");
                    items
                }
                Err(e) => {
                    error!(%url, error = %e, "Listing page failed");
                    Vec::new()
                }
            }
        })
        .buffered(concurrency.max(1))
        .collect()
        .await;

    let items: Vec<ListingItem> = pages.into_iter().flatten().collect();
    let html = items.iter().filter(|i| i.is_html()).count();
    info!(count = items.len(), html, pdf = items.len() - html, "Indexed BIS speeches");
    items
}

async fn index_page(crawler: &Crawler, url: &str) -> Result<Vec<ListingItem>, Box<dyn Error>> {
    let html = get_text(&crawler.client, url, crawler.max_retries).await?;
    Ok(parse_listing(&html)?)
}

/// Fetch speeches with up to `concurrency` in flight, yielding records as
/// they complete. Failed speeches are logged and dropped.
pub fn fetch_speeches(
    crawler: &Crawler,
    items: Vec<ListingItem>,
    concurrency: usize,
) -> impl Stream<Item = SpeechRecord> + '_ {
    stream::iter(items)
        .map(move |item| async move {
            match fetch_speech(crawler, &item).await {
                Ok(record) => Some(record),
                Err(e) => {
                    error!(url = %item.url, error = %e, "Speech extraction failed");
                    None
                }
            }
        })
        .buffer_unordered(concurrency.max(1))
        .filter_map(std::future::ready)
}

/// Build the record for one listing item.
#[instrument(level = "info", skip_all, fields(url = %item.url))]
pub async fn fetch_speech(crawler: &Crawler, item: &ListingItem) -> Result<SpeechRecord, Box<dyn Error>> {
    if item.is_html() {
        fetch_html_speech(crawler, &item.url).await
    } else {
        fetch_pdf_speech(crawler, item).await
    }
}

async fn fetch_html_speech(crawler: &Crawler, url: &str) -> Result<SpeechRecord, Box<dyn Error>> {
    let html = get_text(&crawler.client, url, crawler.max_retries).await?;
    let page = parse_speech_page(&html)?;
    debug!(byline = %truncate_for_log(&page.byline.join(" | "), 200), "Speech page parsed");

    let speaker = crawler.parser.parse(&page.byline)?;
    let pdf_url = page.pdf_url.clone();
    let mut record = html_record(url, page, speaker);

    if let Some(pdf_url) = &pdf_url {
        attach_pdf_text(crawler, &mut record, pdf_url).await;
    }
    info!(bytes = record.text.as_ref().map_or(0, String::len), pdf = record.pdf_text.is_some(), "Parsed HTML speech");
    Ok(record)
}

async fn fetch_pdf_speech(crawler: &Crawler, item: &ListingItem) -> Result<SpeechRecord, Box<dyn Error>> {
    let speaker = crawler.parser.parse(&item.byline)?;
    let mut record = pdf_record(item, speaker);
    attach_pdf_text(crawler, &mut record, &item.url).await;
    info!(pdf = record.pdf_text.is_some(), "Parsed PDF speech");
    Ok(record)
}

/// Record for an HTML speech page. The page body becomes `text`.
pub fn html_record(url: &str, page: SpeechPage, speaker: SpeakerInfo) -> SpeechRecord {
    let mut record = SpeechRecord::new(
        url,
        required(page.title, "title", url),
        required(page.date, "date", url),
        speaker,
    );
    record.text = Some(page.text);
    record
}

/// Record for a PDF-only listing entry. Only `pdf_text` can carry a body.
pub fn pdf_record(item: &ListingItem, speaker: SpeakerInfo) -> SpeechRecord {
    SpeechRecord::new(
        &item.url,
        required(item.title.clone(), "title", &item.url),
        required(item.date.clone(), "date", &item.url),
        speaker,
    )
}

fn required(value: Option<String>, field: &str, url: &str) -> String {
    value.unwrap_or_else(|| {
        warn!(%url, field, "Speech is missing a field");
        String::new()
    })
}

/// Download and extract the PDF, keeping the record when that fails.
async fn attach_pdf_text(crawler: &Crawler, record: &mut SpeechRecord, pdf_url: &str) {
    if !crawler.fetch_pdfs {
        return;
    }
    match pdf_text(crawler, pdf_url).await {
        Ok(text) => record.set_pdf_text(text),
        Err(e) => warn!(%pdf_url, error = %e, "PDF text unavailable"),
    }
}

async fn pdf_text(crawler: &Crawler, pdf_url: &str) -> Result<String, Box<dyn Error>> {
    let bytes = get_bytes(&crawler.client, pdf_url, crawler.max_retries).await?;
    let text = tokio::task::spawn_blocking(move || pdf::extract_text(&bytes)).await??;
    Ok(text)
}
