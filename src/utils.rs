//! Utility functions for text cleanup, logging and file system checks.
//!
//! This module provides helper functions used throughout the application:
//! - Cleaning scraped text fragments before byline parsing
//! - String truncation for log output
//! - File system validation for the output directory

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fs as stdfs;
use tokio::fs;
use tracing::{info, instrument};

static CONTROL_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\r\n\t]+").expect("valid control regex"));

/// Remove carriage returns, newlines and tabs from each fragment, trim it,
/// and drop fragments left empty.
///
/// # Examples
///
/// ```ignore
/// let cleaned = clean_fragments(["\n\tSpeech by Mr ", "  ", "John\r\nSmith"]);
/// assert_eq!(cleaned, vec!["Speech by Mr", "JohnSmith"]);
/// ```
pub fn clean_fragments<I, S>(fragments: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    fragments
        .into_iter()
        .map(|f| CONTROL_RUNS.replace_all(f.as_ref(), "").trim().to_string())
        .filter(|f| !f.is_empty())
        .collect()
}

/// Truncate a string for logging purposes.
///
/// Long strings are cut to at most `max` bytes (on a character boundary) with
/// an ellipsis and byte count indicator appended.
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
}

/// Ensure a directory exists and is writable.
///
/// This function creates the directory if it doesn't exist, then performs
/// a write test by creating and immediately deleting a probe file.
///
/// # Errors
///
/// Returns an error if:
/// - The directory cannot be created
/// - The directory is not writable (permission denied, read-only filesystem, etc.)
#[instrument(level = "info", skip_all, fields(path = %path))]
pub async fn ensure_writable_dir(path: &str) -> Result<(), Box<dyn Error>> {
    if let Err(e) = fs::create_dir_all(path).await {
        return Err(Box::new(e));
    }
    // Try a small sync write using std fs (simpler error surface)
    let probe_path = format!("{}/..__probe_write__", path.trim_end_matches('/'));
    match stdfs::File::create(&probe_path) {
        Ok(_) => {
            let _ = stdfs::remove_file(&probe_path);
            info!("Output directory is writable");
            Ok(())
        }
        Err(e) => Err(Box::new(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_fragments() {
        let cleaned = clean_fragments(["\n\tSpeech by Mr ", "  ", "\r\n", "John\r\nSmith"]);
        assert_eq!(cleaned, vec!["Speech by Mr".to_string(), "JohnSmith".to_string()]);
    }

    #[test]
    fn test_clean_fragments_keeps_inner_spaces() {
        let cleaned = clean_fragments(vec![String::from(" , Governor,  City, 1 May 2020. ")]);
        assert_eq!(cleaned, vec![", Governor,  City, 1 May 2020.".to_string()]);
    }

    #[test]
    fn test_truncate_for_log_short_string() {
        let s = "Hello, world!";
        assert_eq!(truncate_for_log(s, 100), "Hello, world!");
    }

    #[test]
    fn test_truncate_for_log_long_string() {
        let s = "a".repeat(500);
        let result = truncate_for_log(&s, 100);
        assert!(result.starts_with(&"a".repeat(100)));
        assert!(result.contains("…(+400 bytes)"));
    }

    #[test]
    fn test_truncate_for_log_char_boundary() {
        let result = truncate_for_log("Zürich", 2);
        assert_eq!(result, "Z…(+6 bytes)");
    }

    #[tokio::test]
    async fn test_ensure_writable_dir_creates() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("out/speeches");
        ensure_writable_dir(nested.to_str().unwrap()).await.unwrap();
        assert!(nested.is_dir());
    }
}
