use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::info;

use crate::error::{CleanerError, Result};

/// A known postal code and the city/province it belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostalCodeEntry {
    pub postal_code: String,
    pub city: String,
    pub province: String,
}

/// One spelling of a country; several variants may share a canonical code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryEntry {
    pub name_variant: String,
    pub canonical_code: String,
    pub phone_prefix: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreetAbbreviation {
    pub abbreviation: String,
    pub canonical_form: String,
}

/// How ties between several matching entries are broken
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPolicy {
    /// The earliest-declared matching entry wins, no scoring
    #[default]
    FirstMatchInTableOrder,
}

/// Where a country variant was found in the searched text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchPosition {
    Prefix,
    Suffix,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountryMatch<'a> {
    pub entry: &'a CountryEntry,
    pub position: MatchPosition,
    /// Byte range of the matched variant inside the searched text
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AbbreviationMatch<'a> {
    pub entry: &'a StreetAbbreviation,
    /// Byte offset of the first occurrence inside the searched text
    pub offset: usize,
}

/// On-disk form of the reference tables, in declaration order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceTables {
    #[serde(default)]
    pub postal_codes: Vec<PostalCodeEntry>,
    #[serde(default)]
    pub countries: Vec<CountryEntry>,
    #[serde(default)]
    pub street_abbreviations: Vec<StreetAbbreviation>,
}

impl ReferenceTables {
    /// The reference universe the cleaner ships with
    pub fn builtin() -> Self {
        let postal = |code: &str, city: &str, province: &str| PostalCodeEntry {
            postal_code: code.to_string(),
            city: city.to_string(),
            province: province.to_string(),
        };
        let country = |name: &str, code: &str, prefix: &str| CountryEntry {
            name_variant: name.to_string(),
            canonical_code: code.to_string(),
            phone_prefix: prefix.to_string(),
        };
        let street = |abbreviation: &str, canonical: &str| StreetAbbreviation {
            abbreviation: abbreviation.to_string(),
            canonical_form: canonical.to_string(),
        };

        Self {
            postal_codes: vec![
                postal("12400", "Segorbe", "Castellon"),
                postal("46930", "Quart de Poblet", "Valencia"),
                postal("31500", "Tudela", "Navarra"),
                postal("28823", "Coslada", "Madrid"),
                postal("08008", "Barcelona", "Barcelona"),
                postal("28040", "Aravaca", "Madrid"),
                postal("17430", "Santa Coloma de Farners", "Girona"),
                postal("28232", "Las Rozas de Madrid", "Madrid"),
                postal("46185", "La Pobla de Vallbona", "Valencia"),
                postal("18006", "Ronda", "Granada"),
                postal("30009", "Murcia", "Murcia"),
                postal("08243", "Manresa", "Barcelona"),
            ],
            countries: vec![
                country("España", "ES", "+34"),
                country("Spain", "ES", "+34"),
                country("Germany", "DE", "+49"),
                country("Alemania", "DE", "+49"),
                country("Great Britain", "GB", "+44"),
                country("Reino Unido", "GB", "+44"),
            ],
            street_abbreviations: vec![
                street("C.", "Calle"),
                street("C/", "Calle"),
                street("Av.", "Avenida"),
                street("Av ", "Avenida"),
            ],
        }
    }

    fn validate(&self) -> Result<()> {
        for entry in &self.postal_codes {
            let code = &entry.postal_code;
            if code.len() != 5 || !code.bytes().all(|b| b.is_ascii_digit()) {
                return Err(CleanerError::Reference(format!(
                    "postal code '{}' for '{}' is not 5 ASCII digits",
                    code, entry.city
                )));
            }
        }
        if let Some(empty) = self.countries.iter().find(|c| c.name_variant.trim().is_empty()) {
            return Err(CleanerError::Reference(format!(
                "country entry with code '{}' has an empty name variant",
                empty.canonical_code
            )));
        }
        if self.street_abbreviations.iter().any(|s| s.abbreviation.is_empty()) {
            return Err(CleanerError::Reference(
                "street abbreviation table contains an empty abbreviation".to_string(),
            ));
        }
        Ok(())
    }
}

/// Immutable, queryable lookup tables.
///
/// Nothing mutates the store after construction, so one instance can be shared
/// behind an `Arc` by concurrent decompositions.
#[derive(Debug, Clone)]
pub struct ReferenceData {
    postal_codes: HashMap<String, PostalCodeEntry>,
    countries: Vec<CountryEntry>,
    street_abbreviations: Vec<StreetAbbreviation>,
    /// Anchored (prefix, suffix) patterns, parallel to `countries`
    country_patterns: Vec<(Regex, Regex)>,
    /// Word-bounded pattern for every city and province name
    place_patterns: HashMap<String, Regex>,
    policy: MatchPolicy,
}

impl ReferenceData {
    /// Validate and index a set of tables
    pub fn new(tables: ReferenceTables) -> Result<Self> {
        tables.validate()?;
        Self::index(tables)
    }

    /// The shipped tables
    pub fn builtin() -> Result<Self> {
        Self::index(ReferenceTables::builtin())
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let tables: ReferenceTables = toml::from_str(content)?;
        Self::new(tables)
    }

    /// Load the tables from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            CleanerError::Config(format!(
                "Failed to read reference file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let data = Self::from_toml_str(&content)?;
        info!(
            postal_codes = data.postal_codes.len(),
            countries = data.countries.len(),
            street_abbreviations = data.street_abbreviations.len(),
            "Loaded reference tables from {}",
            path.display()
        );
        Ok(data)
    }

    fn index(tables: ReferenceTables) -> Result<Self> {
        let mut postal_codes = HashMap::with_capacity(tables.postal_codes.len());
        let mut place_patterns = HashMap::new();
        for entry in tables.postal_codes {
            for place in [&entry.city, &entry.province] {
                if !place_patterns.contains_key(place) {
                    let pattern = Regex::new(&format!(r"(?i)\b{}\b", regex::escape(place)))?;
                    place_patterns.insert(place.clone(), pattern);
                }
            }
            // earlier declarations shadow later duplicates
            postal_codes.entry(entry.postal_code.clone()).or_insert(entry);
        }

        let country_patterns = tables
            .countries
            .iter()
            .map(|country| -> Result<(Regex, Regex)> {
                let variant = regex::escape(&country.name_variant);
                let prefix = Regex::new(&format!("(?i)^{}", variant))?;
                let suffix = Regex::new(&format!("(?i){}$", variant))?;
                Ok((prefix, suffix))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            postal_codes,
            countries: tables.countries,
            street_abbreviations: tables.street_abbreviations,
            country_patterns,
            place_patterns,
            policy: MatchPolicy::FirstMatchInTableOrder,
        })
    }

    pub fn lookup_postal_code(&self, code: &str) -> Option<&PostalCodeEntry> {
        self.postal_codes.get(code)
    }

    /// Country whose name variant starts or ends `text`, case-insensitively
    pub fn lookup_country(&self, text: &str) -> Option<CountryMatch<'_>> {
        match self.policy {
            MatchPolicy::FirstMatchInTableOrder => self
                .countries
                .iter()
                .zip(&self.country_patterns)
                .find_map(|(entry, (prefix, suffix))| {
                    let (position, found) = match prefix.find(text) {
                        Some(found) => (MatchPosition::Prefix, found),
                        None => (MatchPosition::Suffix, suffix.find(text)?),
                    };
                    Some(CountryMatch {
                        entry,
                        position,
                        start: found.start(),
                        end: found.end(),
                    })
                }),
        }
    }

    /// Case-insensitive, word-bounded pattern for a city or province of the
    /// postal code table
    pub fn place_pattern(&self, place: &str) -> Option<&Regex> {
        self.place_patterns.get(place)
    }

    /// First abbreviation in table order that occurs anywhere in `text`
    pub fn lookup_street_abbreviation(&self, text: &str) -> Option<AbbreviationMatch<'_>> {
        match self.policy {
            MatchPolicy::FirstMatchInTableOrder => self
                .street_abbreviations
                .iter()
                .find_map(|entry| {
                    text.find(&entry.abbreviation)
                        .map(|offset| AbbreviationMatch { entry, offset })
                }),
        }
    }

    /// Phone prefix of the country whose variant equals `country_name`
    pub fn phone_prefix_for(&self, country_name: &str) -> Option<&str> {
        if country_name.is_empty() {
            return None;
        }
        let wanted = country_name.to_lowercase();
        self.countries
            .iter()
            .find(|c| c.name_variant.to_lowercase() == wanted)
            .map(|c| c.phone_prefix.as_str())
            .filter(|p| !p.is_empty())
    }
}
