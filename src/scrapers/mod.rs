//! Speech archive scrapers.
//!
//! Scraping follows a two-phase pattern:
//!
//! 1. **Indexing**: visit the archive's listing pages and collect one
//!    [`ListingItem`](crate::models::ListingItem) per speech
//! 2. **Fetching**: turn each listing item into a
//!    [`SpeechRecord`](crate::models::SpeechRecord), downloading the HTML page
//!    and/or the PDF as needed
//!
//! # Supported Sources
//!
//! | Source | Module | Method | Notes |
//! |--------|--------|--------|-------|
//! | BIS central bankers' speeches | [`bis`] | HTML scraping + PDF text | Listing pages enumerated from date ranges |
//!
//! Page parsing is kept separate from fetching: the `parse_*` functions take
//! raw HTML and never touch the network, so they can be tested on fixtures.

pub mod bis;
