use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::pipeline::processing::normalize::{FieldNormalizer, NormalizationWarning};
use crate::types::CompanyRecord;

use super::base::NormalizerUtils;

static FOUR_DIGIT_YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(1[89][0-9]{2}|2[0-9]{3})\b").expect("valid year regex"));

const SHORT_DATE_FORMATS: [&str; 4] = ["%d/%m/%y", "%d-%m-%y", "%m/%d/%y", "%y-%m-%d"];

/// Reduces free-form dates to a bare year
pub struct YearNormalizer {
    columns: Vec<String>,
}

impl YearNormalizer {
    pub fn new(columns: &[&str]) -> Self {
        Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
        }
    }

    /// Best-effort year extraction; `None` when nothing year-like remains
    pub fn extract_year(raw: &str) -> Option<String> {
        let text = raw.trim().replace(['.', ','], "");
        if text.is_empty() {
            return None;
        }
        if let Some(found) = FOUR_DIGIT_YEAR.captures(&text).and_then(|c| c.get(1)) {
            return Some(found.as_str().to_string());
        }
        if let Some(date) = SHORT_DATE_FORMATS
            .iter()
            .find_map(|format| NaiveDate::parse_from_str(&text, format).ok())
        {
            return Some(date.year().to_string());
        }
        // written-out dates: keep the last word if it is short enough to be a year
        text.split_whitespace()
            .last()
            .filter(|token| token.chars().count() <= 4)
            .map(str::to_string)
    }
}

impl FieldNormalizer for YearNormalizer {
    fn normalize(&self, record: &mut CompanyRecord) -> Vec<NormalizationWarning> {
        let mut warnings = Vec::new();
        for column in &self.columns {
            NormalizerUtils::map_value(record, column, |value| {
                let year = Self::extract_year(value);
                if year.is_none() {
                    warnings.push(NormalizationWarning::new(
                        column,
                        format!("no year found in '{}'", value),
                    ));
                }
                year
            });
        }
        warnings
    }

    fn name(&self) -> &str {
        "year"
    }
}
