//! Byline parsing.
//!
//! A BIS speech byline is a short free-text line such as
//!
//! ```text
//! Speech by Mr John Smith, Governor of the Bank of Country, at the Annual Conference, City, 1 January 2020.
//! ```
//!
//! It arrives either as a single text fragment (PDF-only listing entries) or
//! split across several fragments because the speaker name is a link (HTML
//! speech pages). [`BylineParser::parse`] turns either shape into a
//! [`SpeakerInfo`]: speaker name and gender, upload date, and whatever title,
//! central bank and location can be recovered from the middle clauses.
//!
//! Every heuristic here is best-effort. A field that cannot be recovered is
//! left as `None` rather than reported as an error.

use crate::gazetteer::Gazetteer;
use crate::gender::{GenderLabel, NameGenderTable};
use crate::models::Gender;
use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;
use tracing::debug;

/// "... by the X", "... at the X", "... of the X" -> X
static BANK_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r".*(by|at|of)\s+the\s+(?P<bank_name>.*)").expect("valid bank pattern")
});

/// The word "by" introducing the speaker.
static BY_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bby\b").expect("valid by pattern"));

/// Tokens treated as honorifics when they precede the speaker name.
const HONORIFICS: &[&str] = &[
    "Mr", "Ms", "Mrs", "Miss", "Dr", "Prof", "Professor", "Sir", "Dame", "Lord", "Lady",
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BylineError {
    #[error("byline has no text fragments")]
    EmptyByline,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BankNameError {
    #[error("no 'by/at/of the <bank>' pattern in clause '{0}'")]
    NoMatch(String),
}

/// Speaker and location information recovered from a byline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpeakerInfo {
    pub speaker_name: String,
    pub speaker_gender: Option<Gender>,
    pub upload_date: String,
    pub speaker_title: Option<String>,
    pub central_bank_name: Option<String>,
    pub speech_city: Option<String>,
    pub speech_country: Option<String>,
}

/// The byline split into its positional parts.
///
/// `phrase` holds the middle clauses ("title, location") re-joined with
/// commas.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BylineSegment {
    pub honorific: Option<String>,
    pub speaker_name: String,
    pub upload_date: String,
    pub phrase: String,
}

/// Parses bylines against shared, read-only reference data.
#[derive(Debug)]
pub struct BylineParser {
    gazetteer: Gazetteer,
    names: NameGenderTable,
}

impl BylineParser {
    pub fn new(gazetteer: Gazetteer, names: NameGenderTable) -> Self {
        Self { gazetteer, names }
    }

    /// Parse cleaned byline fragments into a [`SpeakerInfo`].
    pub fn parse(&self, fragments: &[String]) -> Result<SpeakerInfo, BylineError> {
        let segment = split_byline(fragments)?;
        let speaker_gender = self.resolve_gender(segment.honorific.as_deref(), &segment.speaker_name);
        let (speech_city, speech_country) = self.speech_location(&segment.phrase);

        let info = SpeakerInfo {
            speaker_gender,
            speaker_title: speaker_title(&segment.phrase),
            central_bank_name: central_bank_name(&segment.phrase),
            speech_city,
            speech_country,
            speaker_name: segment.speaker_name,
            upload_date: segment.upload_date,
        };
        debug!(?info, "Parsed byline");
        Ok(info)
    }

    /// `Mr` and `Ms` decide the gender outright. Otherwise the first token of
    /// the name goes to the classifier and only a definite answer is kept.
    pub fn resolve_gender(&self, honorific: Option<&str>, speaker_name: &str) -> Option<Gender> {
        match honorific.map(|h| h.trim_end_matches('.')) {
            Some("Mr") => return Some(Gender::Male),
            Some("Ms") => return Some(Gender::Female),
            _ => {}
        }
        let first_name = speaker_name.split_whitespace().next()?;
        match self.names.classify(first_name) {
            GenderLabel::Male => Some(Gender::Male),
            GenderLabel::Female => Some(Gender::Female),
            _ => None,
        }
    }

    /// Returns `(city, country)` mentioned in the title/location phrase.
    ///
    /// The trailing clause is taken as the city when the gazetteer knows it
    /// by that exact name. The first country the recognizer finds always
    /// wins; otherwise the country is derived from the city.
    pub fn speech_location(&self, phrase: &str) -> (Option<String>, Option<String>) {
        let potential_city = phrase.rsplit(',').next().unwrap_or_default().trim();
        let mut city = self
            .gazetteer
            .has_city(potential_city)
            .then(|| potential_city.to_string());

        let places = self.gazetteer.find_places(phrase);
        let mut country = places.countries.into_iter().next();
        if city.is_none() {
            city = places.cities.into_iter().next();
        }
        if country.is_none() {
            if let Some(city) = &city {
                country = self.gazetteer.country_for_city(city).map(str::to_string);
            }
        }
        (city, country)
    }
}

/// Split byline fragments into honorific, name, upload date and the
/// title/location phrase.
///
/// One fragment: `"Speech by Mr John Smith, Governor, ..., 1 January 2020."`
/// Several: `["Speech by Mr", "John Smith", ", Governor, ..., 1 January 2020."]`
pub fn split_byline(fragments: &[String]) -> Result<BylineSegment, BylineError> {
    match fragments {
        [] => Err(BylineError::EmptyByline),
        [single] => Ok(split_single_fragment(single)),
        [first, name, ..] => {
            let last = &fragments[fragments.len() - 1];
            let honorific = first.split_whitespace().last().map(str::to_string);
            let upload_date = clean_date(last.rsplit(',').next().unwrap_or_default());
            let clauses: Vec<&str> = last.trim().split(',').collect();
            Ok(BylineSegment {
                honorific,
                speaker_name: name.trim().to_string(),
                upload_date,
                phrase: middle_clauses(&clauses),
            })
        }
    }
}

fn split_single_fragment(fragment: &str) -> BylineSegment {
    let clauses: Vec<&str> = fragment.split(',').collect();
    let head = clauses[0];
    let (before, after) = match BY_WORD.find_iter(head).last() {
        Some(m) => (&head[..m.start()], &head[m.end()..]),
        None => ("", head),
    };

    let tokens: Vec<&str> = after.split_whitespace().collect();
    let (honorific, speaker_name) = match tokens.iter().position(|t| is_honorific(t)) {
        Some(idx) if idx + 1 < tokens.len() => (Some(tokens[idx].to_string()), tokens[idx + 1..].join(" ")),
        _ => (
            before.split_whitespace().last().map(str::to_string),
            after.trim().to_string(),
        ),
    };

    BylineSegment {
        honorific,
        speaker_name,
        upload_date: clean_date(clauses[clauses.len() - 1]),
        phrase: middle_clauses(&clauses),
    }
}

fn is_honorific(token: &str) -> bool {
    HONORIFICS.contains(&token.trim_end_matches('.'))
}

fn clean_date(clause: &str) -> String {
    clause.replace('.', "").trim().to_string()
}

/// Clauses strictly between the first and the last, re-joined with commas.
fn middle_clauses(clauses: &[&str]) -> String {
    if clauses.len() < 3 {
        return String::new();
    }
    clauses[1..clauses.len() - 1].iter().join(",").trim().to_string()
}

/// The leading run of capitalised tokens of the phrase.
///
/// A place name written before any lowercase word is swept into the title;
/// that is accepted.
pub fn speaker_title(phrase: &str) -> Option<String> {
    let tokens: Vec<&str> = phrase
        .split_whitespace()
        .take_while(|token| token.chars().next().is_some_and(char::is_uppercase))
        .collect();
    (!tokens.is_empty()).then(|| tokens.join(" "))
}

/// Name of the central bank mentioned in the phrase, if any.
///
/// The first comma clause containing `"Bank "` is used. A clause that starts
/// with "Bank" is the name itself; otherwise the text after "by/at/of the" is
/// taken, and when that pattern is absent the whole clause is kept.
pub fn central_bank_name(phrase: &str) -> Option<String> {
    let clause = phrase.split(',').find(|clause| clause.contains("Bank "))?;
    let trimmed = clause.trim();
    if trimmed.starts_with("Bank") {
        return Some(trimmed.to_string());
    }
    match parse_bank_name(clause) {
        Ok(name) => Some(name),
        Err(e) => {
            debug!(error = %e, "Using whole clause as central bank name");
            Some(trimmed.to_string())
        }
    }
}

/// Extract `<bank>` from a clause of the form "... by/at/of the <bank>".
pub fn parse_bank_name(clause: &str) -> Result<String, BankNameError> {
    BANK_PATTERN
        .captures(clause)
        .and_then(|caps| caps.name("bank_name"))
        .map(|m| m.as_str().trim().to_string())
        .ok_or_else(|| BankNameError::NoMatch(clause.trim().to_string()))
}
