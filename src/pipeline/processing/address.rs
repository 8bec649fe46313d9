use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use super::reference::ReferenceData;
use super::text::capitalize_word;
use crate::constants;
use crate::types::{CompanyRecord, FieldValue};

static POSTAL_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[0-9]{5}\b").expect("postal code pattern is valid"));
static COMMA_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*,[\s,]*").expect("comma run pattern is valid"));

/// Connective words kept lowercase unless they open the address
const LOWERCASE_WORDS: [&str; 8] = ["el", "la", "los", "las", "de", "del", "en", "y"];

/// Structured fields extracted from one free-text address
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressComponents {
    /// What is left once postal code, city, province and country are removed
    pub street: String,
    pub postal_code: String,
    pub city: String,
    pub province: String,
    pub country_name: String,
    pub country_code: String,
}

/// A reference lookup that found nothing. Never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnresolvedLookup {
    /// No standalone 5-digit token in the address
    PostalCodeMissing,
    /// A postal code was found but is not in the reference table
    PostalCodeUnknown(String),
    /// No country variant at the start or end of the address
    CountryMissing,
}

impl UnresolvedLookup {
    pub fn kind(&self) -> &'static str {
        match self {
            UnresolvedLookup::PostalCodeMissing => "postal_code_missing",
            UnresolvedLookup::PostalCodeUnknown(_) => "postal_code_unknown",
            UnresolvedLookup::CountryMissing => "country_missing",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decomposition {
    pub components: AddressComponents,
    pub unresolved: Vec<UnresolvedLookup>,
}

/// Splits raw address strings into [`AddressComponents`] against a reference store.
///
/// Each call is a pure function of its input and the (immutable) store; the
/// decomposer can be cloned or shared across threads freely.
#[derive(Debug, Clone)]
pub struct AddressDecomposer {
    reference: Arc<ReferenceData>,
}

impl AddressDecomposer {
    pub fn new(reference: Arc<ReferenceData>) -> Self {
        Self { reference }
    }

    pub fn decompose(&self, raw_address: &str) -> AddressComponents {
        self.decompose_with_diagnostics(raw_address).components
    }

    /// Run the extraction steps in order. Each step works on the residual
    /// string left by the previous one, so the order cannot change.
    pub fn decompose_with_diagnostics(&self, raw_address: &str) -> Decomposition {
        let mut components = AddressComponents::default();
        let mut unresolved = Vec::new();

        let residual = pre_clean(raw_address);
        let residual = self.canonicalize_street_type(&residual);
        let residual = title_case(&residual);

        let (postal_code, residual) = extract_postal_code(&residual);
        components.postal_code = postal_code.unwrap_or_default();

        let residual = match self.reference.lookup_country(&residual) {
            Some(hit) => {
                components.country_name = title_case(&hit.entry.name_variant);
                components.country_code = hit.entry.canonical_code.clone();
                let without = format!("{}{}", &residual[..hit.start], &residual[hit.end..]);
                title_case(trim_separators(&without))
            }
            None => {
                unresolved.push(UnresolvedLookup::CountryMissing);
                residual
            }
        };

        let entry = if components.postal_code.is_empty() {
            unresolved.push(UnresolvedLookup::PostalCodeMissing);
            None
        } else {
            let entry = self.reference.lookup_postal_code(&components.postal_code);
            if entry.is_none() {
                unresolved.push(UnresolvedLookup::PostalCodeUnknown(
                    components.postal_code.clone(),
                ));
            }
            entry
        };

        let residual = match entry {
            Some(entry) => {
                components.city = entry.city.clone();
                components.province = entry.province.clone();
                let residual = match self.reference.place_pattern(&entry.city) {
                    Some(city) => remove_city(&residual, city),
                    None => residual,
                };
                match self.reference.place_pattern(&entry.province) {
                    Some(province) => remove_province(&residual, province),
                    None => residual,
                }
            }
            None => residual,
        };

        components.street = cleanup_punctuation(&residual);

        debug!(
            street = %components.street,
            postal_code = %components.postal_code,
            country = %components.country_name,
            unresolved = unresolved.len(),
            "Decomposed address"
        );

        Decomposition { components, unresolved }
    }

    /// Decompose a record's `address` cell and write the structured columns back
    pub fn apply(&self, record: &mut CompanyRecord) -> Decomposition {
        let raw = record.get(constants::ADDRESS).unwrap_or_default().to_string();
        let decomposition = self.decompose_with_diagnostics(&raw);
        let c = &decomposition.components;
        record.set_value(constants::ADDRESS, non_empty(&c.street));
        record.set_value(constants::POSTAL_CODE, non_empty(&c.postal_code));
        record.set_value(constants::CITY, non_empty(&c.city));
        record.set_value(constants::PROVINCE, non_empty(&c.province));
        record.set_value(constants::COUNTRY_NAME, non_empty(&c.country_name));
        decomposition
    }

    /// Replace the first abbreviation found (table order) with its canonical
    /// form. Only that one occurrence is touched.
    fn canonicalize_street_type(&self, text: &str) -> String {
        let Some(hit) = self.reference.lookup_street_abbreviation(text) else {
            return text.to_string();
        };
        let abbreviation = &hit.entry.abbreviation;
        let rest = &text[hit.offset + abbreviation.len()..];

        let mut out = String::with_capacity(text.len() + hit.entry.canonical_form.len());
        out.push_str(&text[..hit.offset]);
        out.push_str(&hit.entry.canonical_form);
        // "Av Mayor" and "C/Mayor" must not glue the street type to the name
        let glued = rest
            .chars()
            .next()
            .is_some_and(|c| !c.is_whitespace() && c != ',');
        if !rest.is_empty() && (abbreviation.ends_with(char::is_whitespace) || glued) {
            out.push(' ');
        }
        out.push_str(rest);
        out
    }
}

fn non_empty(value: &str) -> FieldValue {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Trim and turn the separator variants into ", "
fn pre_clean(raw: &str) -> String {
    raw.trim()
        .replace(" - ", ", ")
        .replace("- ", ", ")
        .replace(';', ", ")
}

/// Capitalize every whitespace-delimited token except the connective
/// stoplist; the first token is always capitalized.
pub fn title_case(text: &str) -> String {
    text.split_whitespace()
        .enumerate()
        .map(|(i, word)| {
            let lower = word.to_lowercase();
            if i > 0 && LOWERCASE_WORDS.contains(&lower.as_str()) {
                lower
            } else {
                capitalize_word(word)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// First standalone 5-digit token, with every such token removed from the text.
/// Without a match the text is returned untouched.
fn extract_postal_code(text: &str) -> (Option<String>, String) {
    match POSTAL_CODE.find(text) {
        Some(found) => {
            let code = found.as_str().to_string();
            let residual = POSTAL_CODE.replace_all(text, "");
            (Some(code), collapse_whitespace(&residual))
        }
        None => (None, text.to_string()),
    }
}

/// Remove the last word-bounded occurrence of the city and re-title-case
fn remove_city(text: &str, city: &Regex) -> String {
    let residual = match city.find_iter(text).last() {
        Some(found) => format!("{}{}", &text[..found.start()], &text[found.end()..]),
        None => text.to_string(),
    };
    title_case(trim_separators(&residual))
}

/// Remove every word-bounded occurrence of the province
fn remove_province(text: &str, province: &Regex) -> String {
    if !province.is_match(text) {
        return text.to_string();
    }
    trim_separators(&province.replace_all(text, "")).to_string()
}

/// Strip the commas, hyphens and whitespace that removals leave at the edges
fn trim_separators(text: &str) -> &str {
    text.trim_matches(|c: char| c == ',' || c == '-' || c.is_whitespace())
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Fold comma runs left behind by removals into single ", " separators
fn cleanup_punctuation(text: &str) -> String {
    let folded = COMMA_RUN.replace_all(text, ", ");
    trim_separators(&collapse_whitespace(&folded)).to_string()
}
