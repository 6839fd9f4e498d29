//! Static gazetteer: cities, countries and a small place-name recognizer.
//!
//! The gazetteer answers three questions for the byline parser:
//!
//! - is this string the exact name of a known city?
//! - which country does a city most likely belong to?
//! - which countries and cities are mentioned in a free-text phrase?
//!
//! Data is loaded once at startup into immutable maps and shared read-only
//! across all parsing calls. A default dataset is embedded in the binary
//! (`data/cities.tsv`, `data/countries.tsv`); larger datasets in the same
//! tab-separated layout can be supplied on the command line.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use thiserror::Error;

const EMBEDDED_CITIES: &str = include_str!("../data/cities.tsv");
const EMBEDDED_COUNTRIES: &str = include_str!("../data/countries.tsv");

/// Runs of capitalised words, optionally joined by a space, hyphen or a
/// lowercase "d*" particle ("Rio de Janeiro", "Dar es Salaam" partially).
static PLACE_CANDIDATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[A-ZÀ-Ú]+[a-zà-ú]+[ \-]?(?:d[a-u].)?(?:[A-ZÀ-Ú]+[a-zà-ú]+)*")
        .expect("valid place candidate regex")
});

/// Errors raised while loading a reference dataset.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to read dataset {path}: {error}")]
    Io {
        path: String,
        #[source]
        error: std::io::Error,
    },
    #[error("{dataset}, line {line}: {reason}")]
    Malformed {
        dataset: String,
        line: usize,
        reason: String,
    },
}

/// Iterate over the data lines of a tab-separated dataset, skipping blank
/// lines and `#` comments. Yields 1-based line numbers with trimmed fields.
pub fn data_lines(data: &str) -> impl Iterator<Item = (usize, Vec<&str>)> {
    data.lines()
        .enumerate()
        .filter(|(_, line)| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('#')
        })
        .map(|(idx, line)| (idx + 1, line.split('\t').map(str::trim).collect()))
}

/// Read a dataset file into memory, mapping I/O failures to [`DatasetError`].
pub fn read_dataset(path: &str) -> Result<String, DatasetError> {
    std::fs::read_to_string(path).map_err(|error| DatasetError::Io {
        path: path.to_string(),
        error,
    })
}

/// One gazetteer city record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CityEntry {
    pub name: String,
    pub country_code: String,
    pub population: u64,
}

/// Places mentioned in a phrase, in order of appearance.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PlaceMentions {
    pub countries: Vec<String>,
    pub cities: Vec<String>,
}

/// Immutable city and country lookup tables.
#[derive(Debug, Default)]
pub struct Gazetteer {
    /// Exact city name -> entries in load order.
    cities: HashMap<String, Vec<CityEntry>>,
    /// Country code -> country name.
    countries: HashMap<String, String>,
    /// Lowercased names for the recognizer.
    city_index: HashSet<String>,
    country_index: HashSet<String>,
}

impl Gazetteer {
    /// Build a gazetteer from in-memory records. City entries sharing a name
    /// keep their relative order.
    pub fn new<C, K>(cities: C, countries: K) -> Self
    where
        C: IntoIterator<Item = CityEntry>,
        K: IntoIterator<Item = (String, String)>,
    {
        let mut by_name: HashMap<String, Vec<CityEntry>> = HashMap::new();
        let mut city_index = HashSet::new();
        for entry in cities {
            city_index.insert(entry.name.to_lowercase());
            by_name.entry(entry.name.clone()).or_default().push(entry);
        }

        let countries: HashMap<String, String> = countries.into_iter().collect();
        let country_index = countries.values().map(|name| name.to_lowercase()).collect();

        Self {
            cities: by_name,
            countries,
            city_index,
            country_index,
        }
    }

    /// Parse the `name<TAB>country_code<TAB>population` city table and the
    /// `code<TAB>name` country table.
    pub fn parse(cities_data: &str, countries_data: &str) -> Result<Self, DatasetError> {
        let mut cities = Vec::new();
        for (line, fields) in data_lines(cities_data) {
            let [name, country_code, population] = fields.as_slice() else {
                return Err(malformed("cities", line, format!("expected 3 columns, found {}", fields.len())));
            };
            let population = population
                .parse::<u64>()
                .map_err(|e| malformed("cities", line, format!("bad population '{population}': {e}")))?;
            cities.push(CityEntry {
                name: name.to_string(),
                country_code: country_code.to_string(),
                population,
            });
        }

        let mut countries = Vec::new();
        for (line, fields) in data_lines(countries_data) {
            let [code, name] = fields.as_slice() else {
                return Err(malformed("countries", line, format!("expected 2 columns, found {}", fields.len())));
            };
            countries.push((code.to_string(), name.to_string()));
        }

        Ok(Self::new(cities, countries))
    }

    /// The gazetteer bundled with the binary.
    pub fn embedded() -> Result<Self, DatasetError> {
        Self::parse(EMBEDDED_CITIES, EMBEDDED_COUNTRIES)
    }

    /// Load from files, falling back to the embedded table for any path not given.
    pub fn load(cities_path: Option<&str>, countries_path: Option<&str>) -> Result<Self, DatasetError> {
        if cities_path.is_none() && countries_path.is_none() {
            return Self::embedded();
        }
        let cities = match cities_path {
            Some(path) => read_dataset(path)?,
            None => EMBEDDED_CITIES.to_string(),
        };
        let countries = match countries_path {
            Some(path) => read_dataset(path)?,
            None => EMBEDDED_COUNTRIES.to_string(),
        };
        Self::parse(&cities, &countries)
    }

    /// All entries for an exact city name, in load order.
    pub fn cities_by_name(&self, name: &str) -> &[CityEntry] {
        self.cities.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has_city(&self, name: &str) -> bool {
        !self.cities_by_name(name).is_empty()
    }

    pub fn country_name(&self, code: &str) -> Option<&str> {
        self.countries.get(code).map(String::as_str)
    }

    /// Resolve the country of a city name.
    ///
    /// Scans matching entries left to right with a running population
    /// maximum; an entry equal to the current maximum replaces it, so among
    /// ties the last one wins.
    pub fn country_for_city(&self, city: &str) -> Option<&str> {
        let mut best: Option<&CityEntry> = None;
        for entry in self.cities_by_name(city) {
            if best.is_none_or(|b| entry.population >= b.population) {
                best = Some(entry);
            }
        }
        best.and_then(|entry| self.country_name(&entry.country_code))
    }

    /// Find country and city mentions in free text.
    pub fn find_places(&self, text: &str) -> PlaceMentions {
        let mut mentions = PlaceMentions::default();
        for candidate in PLACE_CANDIDATE.find_iter(text) {
            let candidate = candidate.as_str().trim();
            let key = candidate.to_lowercase();
            if self.country_index.contains(&key) {
                mentions.countries.push(candidate.to_string());
            }
            if self.city_index.contains(&key) {
                mentions.cities.push(candidate.to_string());
            }
        }
        mentions
    }

    pub fn city_count(&self) -> usize {
        self.cities.values().map(Vec::len).sum()
    }

    pub fn country_count(&self) -> usize {
        self.countries.len()
    }
}

fn malformed(dataset: &str, line: usize, reason: String) -> DatasetError {
    DatasetError::Malformed {
        dataset: dataset.to_string(),
        line,
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn city(name: &str, code: &str, population: u64) -> CityEntry {
        CityEntry {
            name: name.to_string(),
            country_code: code.to_string(),
            population,
        }
    }

    fn sample() -> Gazetteer {
        Gazetteer::new(
            vec![
                city("Paris", "FR", 2_138_551),
                city("Paris", "US", 25_171),
                city("Basel", "CH", 164_488),
                city("Twin", "AA", 500),
                city("Twin", "BB", 500),
            ],
            vec![
                ("FR".to_string(), "France".to_string()),
                ("US".to_string(), "United States".to_string()),
                ("CH".to_string(), "Switzerland".to_string()),
                ("AA".to_string(), "Aland".to_string()),
                ("BB".to_string(), "Bbland".to_string()),
            ],
        )
    }

    #[test]
    fn test_country_for_city_prefers_larger_population() {
        let gc = sample();
        assert_eq!(gc.country_for_city("Paris"), Some("France"));
    }

    #[test]
    fn test_country_for_city_tie_keeps_last() {
        let gc = sample();
        assert_eq!(gc.country_for_city("Twin"), Some("Bbland"));
    }

    #[test]
    fn test_country_for_city_is_idempotent() {
        let gc = sample();
        let first = gc.country_for_city("Paris");
        for _ in 0..5 {
            assert_eq!(gc.country_for_city("Paris"), first);
        }
    }

    #[test]
    fn test_country_for_unknown_city() {
        let gc = sample();
        assert_eq!(gc.country_for_city("Atlantis"), None);
    }

    #[test]
    fn test_city_lookup_is_exact() {
        let gc = sample();
        assert!(gc.has_city("Basel"));
        assert!(!gc.has_city("basel"));
        assert!(!gc.has_city(" Basel"));
    }

    #[test]
    fn test_find_places() {
        let gc = sample();
        let places = gc.find_places("Governor of the Central Bank, speaking in Basel, France");
        assert_eq!(places.countries, vec!["France".to_string()]);
        assert_eq!(places.cities, vec!["Basel".to_string()]);
    }

    #[test]
    fn test_find_places_multiword_country() {
        let gc = sample();
        let places = gc.find_places("Federal Reserve Board, Paris, United States");
        assert_eq!(places.countries, vec!["United States".to_string()]);
        assert_eq!(places.cities, vec!["Paris".to_string()]);
    }

    #[test]
    fn test_parse_rejects_bad_population() {
        let err = Gazetteer::parse("Basel\tCH\tmany\n", "CH\tSwitzerland\n").unwrap_err();
        assert!(matches!(err, DatasetError::Malformed { line: 1, .. }));
    }

    #[test]
    fn test_embedded_gazetteer() {
        let gc = Gazetteer::embedded().unwrap();
        assert!(gc.city_count() > 100);
        assert!(gc.country_count() > 50);
        assert_eq!(gc.country_for_city("London"), Some("United Kingdom"));
        assert_eq!(gc.country_for_city("Basel"), Some("Switzerland"));
    }

    #[test]
    fn test_load_from_files() {
        let dir = tempfile::tempdir().unwrap();
        let cities = dir.path().join("cities.tsv");
        let countries = dir.path().join("countries.tsv");
        std::fs::write(&cities, "Gotham\tZZ\t100\n").unwrap();
        std::fs::write(&countries, "ZZ\tZedland\n").unwrap();

        let gc = Gazetteer::load(cities.to_str(), countries.to_str()).unwrap();
        assert_eq!(gc.country_for_city("Gotham"), Some("Zedland"));
    }

    #[test]
    fn test_load_without_paths_uses_embedded() {
        let gc = Gazetteer::load(None, None).unwrap();
        assert_eq!(gc.city_count(), Gazetteer::embedded().unwrap().city_count());
        assert_eq!(gc.country_for_city("Mumbai"), Some("India"));
    }

    #[test]
    fn test_load_missing_file() {
        let err = Gazetteer::load(Some("/nonexistent/cities.tsv"), None).unwrap_err();
        assert!(matches!(err, DatasetError::Io { .. }));
    }
}
