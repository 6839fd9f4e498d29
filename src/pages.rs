//! Archive listing page enumeration.
//!
//! The crawl is configured by a line-oriented file of `date_token, page_count`
//! pairs:
//!
//! ```text
//! 20200101, 42
//! 20190101, 51
//! ```
//!
//! Each pair expands to `page_count` listing URLs of the form
//! `https://www.bis.org/list/cbspeeches/from_{date_token}/page_{n}.htm`,
//! numbered from 1.

use std::path::Path;
use thiserror::Error;
use tracing::{debug, info, instrument};

/// Base of every listing page URL.
pub const LISTING_BASE: &str = "https://www.bis.org/list/cbspeeches";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read date ranges from {path}: {error}")]
    Io {
        path: String,
        #[source]
        error: std::io::Error,
    },
    #[error("line {line}: {reason}")]
    Malformed { line: usize, reason: String },
}

/// A start-date token and the number of listing pages to visit for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateRange {
    pub date_token: String,
    pub page_count: u32,
}

impl DateRange {
    pub fn new(date_token: impl Into<String>, page_count: u32) -> Self {
        Self {
            date_token: date_token.into(),
            page_count,
        }
    }

    /// Listing URLs for this range, pages `1..=page_count`.
    pub fn page_urls(&self) -> Vec<String> {
        (1..=self.page_count)
            .map(|page| format!("{}/from_{}/page_{}.htm", LISTING_BASE, self.date_token, page))
            .collect()
    }
}

/// Listing URLs for all ranges, range by range in input order.
pub fn all_page_urls(ranges: &[DateRange]) -> Vec<String> {
    ranges.iter().flat_map(DateRange::page_urls).collect()
}

/// Parse `date_token, page_count` lines. Blank lines are skipped, as are any
/// fields after the second.
pub fn parse_date_ranges(data: &str) -> Result<Vec<DateRange>, ConfigError> {
    let mut ranges = Vec::new();
    for (idx, line) in data.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let malformed = |reason: String| ConfigError::Malformed {
            line: idx + 1,
            reason,
        };

        let mut fields = line.split(',');
        let token = fields.next().unwrap_or_default().trim();
        let count = fields
            .next()
            .ok_or_else(|| malformed(format!("expected 'date_token, page_count', got '{line}'")))?;
        if token.is_empty() {
            return Err(malformed("empty date token".to_string()));
        }
        let count = count
            .trim()
            .parse::<u32>()
            .map_err(|e| malformed(format!("bad page count '{}': {e}", count.trim())))?;

        debug!(date_token = token, page_count = count, "Parsed date range");
        ranges.push(DateRange::new(token, count));
    }
    Ok(ranges)
}

/// Read and parse the date range file.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub fn load_date_ranges(path: &Path) -> Result<Vec<DateRange>, ConfigError> {
    let data = std::fs::read_to_string(path).map_err(|error| ConfigError::Io {
        path: path.display().to_string(),
        error,
    })?;
    let ranges = parse_date_ranges(&data)?;
    info!(count = ranges.len(), "Loaded date ranges");
    Ok(ranges)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_urls_in_order() {
        let urls = DateRange::new("20200101", 3).page_urls();
        assert_eq!(
            urls,
            vec![
                "https://www.bis.org/list/cbspeeches/from_20200101/page_1.htm",
                "https://www.bis.org/list/cbspeeches/from_20200101/page_2.htm",
                "https://www.bis.org/list/cbspeeches/from_20200101/page_3.htm",
            ]
        );
    }

    #[test]
    fn test_zero_pages() {
        assert!(DateRange::new("20200101", 0).page_urls().is_empty());
    }

    #[test]
    fn test_all_page_urls_keeps_range_order() {
        let urls = all_page_urls(&[DateRange::new("B", 2), DateRange::new("A", 1)]);
        assert_eq!(urls.len(), 3);
        assert!(urls[0].ends_with("from_B/page_1.htm"));
        assert!(urls[1].ends_with("from_B/page_2.htm"));
        assert!(urls[2].ends_with("from_A/page_1.htm"));
    }

    #[test]
    fn test_parse_date_ranges() {
        let ranges = parse_date_ranges("20200101, 3\n\n  20190101,12  \n").unwrap();
        assert_eq!(
            ranges,
            vec![DateRange::new("20200101", 3), DateRange::new("20190101", 12)]
        );
    }

    #[test]
    fn test_parse_date_ranges_reports_line() {
        let err = parse_date_ranges("20200101, 3\n20190101, many\n").unwrap_err();
        assert!(matches!(err, ConfigError::Malformed { line: 2, .. }));

        let err = parse_date_ranges("20200101\n").unwrap_err();
        assert!(matches!(err, ConfigError::Malformed { line: 1, .. }));
    }

    #[test]
    fn test_load_date_ranges() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("date_ranges.txt");
        std::fs::write(&path, "20200101, 2\n").unwrap();

        let ranges = load_date_ranges(&path).unwrap();
        assert_eq!(all_page_urls(&ranges).len(), 2);
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            load_date_ranges(Path::new("/nonexistent/date_ranges.txt")),
            Err(ConfigError::Io { .. })
        ));
    }
}
