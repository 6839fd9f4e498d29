//! First-name gender classifier.
//!
//! A static lookup table mapping first names to a probabilistic gender label,
//! in the spirit of the `gender_guesser` name dictionaries. Labels outside
//! [`GenderLabel::Male`] and [`GenderLabel::Female`] are weak signals that the
//! byline parser discards.
//!
//! The table is loaded once at startup, either from the dataset embedded in
//! the binary (`data/names.tsv`) or from a user-supplied file with the same
//! `name<TAB>label` layout.

use crate::gazetteer::{DatasetError, data_lines};
use std::collections::HashMap;
use std::str::FromStr;

/// Embedded default name table.
const EMBEDDED_NAMES: &str = include_str!("../data/names.tsv");

/// Probabilistic gender label for a first name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenderLabel {
    Male,
    Female,
    MostlyMale,
    MostlyFemale,
    /// Androgynous: used for both genders about equally.
    Andy,
    Unknown,
}

impl FromStr for GenderLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "male" => Ok(Self::Male),
            "female" => Ok(Self::Female),
            "mostly_male" => Ok(Self::MostlyMale),
            "mostly_female" => Ok(Self::MostlyFemale),
            "andy" => Ok(Self::Andy),
            "unknown" => Ok(Self::Unknown),
            other => Err(format!("unrecognised gender label '{other}'")),
        }
    }
}

/// Immutable first-name -> gender label table.
#[derive(Debug, Default)]
pub struct NameGenderTable {
    by_name: HashMap<String, GenderLabel>,
}

impl NameGenderTable {
    /// Build a table from `(name, label)` pairs. Later duplicates win.
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, GenderLabel)>,
        S: AsRef<str>,
    {
        let by_name = entries
            .into_iter()
            .map(|(name, label)| (name.as_ref().to_lowercase(), label))
            .collect();
        Self { by_name }
    }

    /// Parse a `name<TAB>label` table.
    pub fn parse(source: &str, data: &str) -> Result<Self, DatasetError> {
        let mut entries = Vec::new();
        for (line_no, fields) in data_lines(data) {
            let [name, label] = fields.as_slice() else {
                return Err(DatasetError::Malformed {
                    dataset: source.to_string(),
                    line: line_no,
                    reason: format!("expected 2 columns, found {}", fields.len()),
                });
            };
            let label = label.parse::<GenderLabel>().map_err(|reason| DatasetError::Malformed {
                dataset: source.to_string(),
                line: line_no,
                reason,
            })?;
            entries.push((name.to_string(), label));
        }
        Ok(Self::from_entries(entries))
    }

    /// The table bundled with the binary.
    pub fn embedded() -> Result<Self, DatasetError> {
        Self::parse("embedded names.tsv", EMBEDDED_NAMES)
    }

    /// Classify a first name. Names absent from the table are `Unknown`.
    pub fn classify(&self, first_name: &str) -> GenderLabel {
        self.by_name
            .get(&first_name.trim().to_lowercase())
            .copied()
            .unwrap_or(GenderLabel::Unknown)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_is_case_insensitive() {
        let table = NameGenderTable::from_entries([("Christine", GenderLabel::Female)]);
        assert_eq!(table.classify("christine"), GenderLabel::Female);
        assert_eq!(table.classify("CHRISTINE"), GenderLabel::Female);
    }

    #[test]
    fn test_unknown_name() {
        let table = NameGenderTable::default();
        assert_eq!(table.classify("Zebedee"), GenderLabel::Unknown);
    }

    #[test]
    fn test_parse_rejects_bad_label() {
        let err = NameGenderTable::parse("test", "Pat\tsometimes\n").unwrap_err();
        assert!(err.to_string().contains("line 1"));
    }

    #[test]
    fn test_parse_skips_comments() {
        let table = NameGenderTable::parse("test", "# header\n\nJordan\tandy\n").unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.classify("Jordan"), GenderLabel::Andy);
    }

    #[test]
    fn test_embedded_table_loads() {
        let table = NameGenderTable::embedded().unwrap();
        assert!(table.len() > 100);
        assert_eq!(table.classify("Mario"), GenderLabel::Male);
        assert_eq!(table.classify("Janet"), GenderLabel::Female);
    }
}
