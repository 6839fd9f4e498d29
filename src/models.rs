//! Data models for scraped speeches.
//!
//! This module defines the core data structures used throughout the application:
//! - [`SpeechRecord`]: one fully extracted speech, the unit written to the output
//! - [`Gender`]: the speaker gender, when it can be determined
//! - [`ListingItem`]: one entry on an archive listing page
//! - [`SpeechPage`]: the raw fields read from an HTML speech page
//!
//! Optional record fields are skipped during serialization, so each JSON line
//! only carries what could be extracted.

use crate::byline::SpeakerInfo;
use serde::{Deserialize, Serialize};

/// Speaker gender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

/// A single speech with everything that could be extracted about it.
///
/// `title`, `date` and `speaker_name` are always present; every other field
/// is best-effort.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct SpeechRecord {
    /// The speech URL (HTML page or PDF).
    pub url: String,
    pub title: String,
    /// Publication date as formatted by the archive.
    pub date: String,
    pub speaker_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaker_gender: Option<Gender>,
    /// The date at the end of the byline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upload_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaker_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub central_bank_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speech_city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speech_country: Option<String>,
    /// Body text of HTML speeches.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Text extracted from the speech PDF.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdf_text: Option<String>,
}

impl SpeechRecord {
    /// Start a record from the listing/page fields and the parsed byline.
    pub fn new(url: &str, title: String, date: String, speaker: SpeakerInfo) -> Self {
        Self {
            url: url.to_string(),
            title,
            date,
            speaker_name: speaker.speaker_name,
            speaker_gender: speaker.speaker_gender,
            upload_date: Some(speaker.upload_date).filter(|d| !d.is_empty()),
            speaker_title: speaker.speaker_title,
            central_bank_name: speaker.central_bank_name,
            speech_city: speaker.speech_city,
            speech_country: speaker.speech_country,
            text: None,
            pdf_text: None,
        }
    }

    /// Attach PDF text, ignoring documents without a text layer.
    pub fn set_pdf_text(&mut self, text: String) {
        if !text.trim().is_empty() {
            self.pdf_text = Some(text);
        }
    }
}

/// One speech entry on an archive listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingItem {
    /// Absolute URL of the speech (`.htm` page or PDF).
    pub url: String,
    /// Title from the `.item_date` element's `title` attribute.
    pub title: Option<String>,
    /// Text of the `.item_date` element.
    pub date: Option<String>,
    /// Cleaned text fragments of the `.info` block.
    pub byline: Vec<String>,
}

impl ListingItem {
    /// Listing entries linking to `.htm` pages have a full HTML speech page;
    /// anything else links straight to a PDF.
    pub fn is_html(&self) -> bool {
        self.url.ends_with(".htm")
    }
}

/// Fields read from an HTML speech page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpeechPage {
    pub title: Option<String>,
    pub date: Option<String>,
    pub byline: Vec<String>,
    pub text: String,
    /// Absolute URL of the companion PDF, when the page links one.
    pub pdf_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn speaker() -> SpeakerInfo {
        SpeakerInfo {
            speaker_name: "John Smith".to_string(),
            speaker_gender: Some(Gender::Male),
            upload_date: "1 January 2020".to_string(),
            speaker_title: Some("Governor".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_record_serialization_skips_absent_fields() {
        let record = SpeechRecord::new(
            "https://www.bis.org/review/r200101a.htm",
            "On money".to_string(),
            "01 Jan 2020".to_string(),
            speaker(),
        );
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["speaker_gender"], "male");
        assert_eq!(json["upload_date"], "1 January 2020");
        assert!(json.get("speech_city").is_none());
        assert!(json.get("pdf_text").is_none());
        assert!(json.get("text").is_none());
    }

    #[test]
    fn test_record_deserialization() {
        let json = r#"{
            "url": "https://www.bis.org/review/r200101a.pdf",
            "title": "On money",
            "date": "01 Jan 2020",
            "speaker_name": "Jane Doe",
            "speaker_gender": "female"
        }"#;
        let record: SpeechRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.speaker_gender, Some(Gender::Female));
        assert_eq!(record.speech_country, None);
    }

    #[test]
    fn test_empty_upload_date_is_dropped() {
        let mut info = speaker();
        info.upload_date.clear();
        let record = SpeechRecord::new("u", "t".to_string(), "d".to_string(), info);
        assert_eq!(record.upload_date, None);
    }

    #[test]
    fn test_blank_pdf_text_is_ignored() {
        let mut record = SpeechRecord::default();
        record.set_pdf_text(" \n ".to_string());
        assert_eq!(record.pdf_text, None);
        record.set_pdf_text("Page one".to_string());
        assert_eq!(record.pdf_text.as_deref(), Some("Page one"));
    }

    #[test]
    fn test_listing_item_kind() {
        let item = ListingItem {
            url: "https://www.bis.org/review/r200101a.htm".to_string(),
            title: None,
            date: None,
            byline: vec![],
        };
        assert!(item.is_html());
        let pdf = ListingItem {
            url: "https://www.bis.org/review/r200101a.pdf".to_string(),
            ..item
        };
        assert!(!pdf.is_html());
    }
}
