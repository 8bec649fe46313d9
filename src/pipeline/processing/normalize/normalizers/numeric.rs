use super::base::NormalizerUtils;
use crate::constants;
use crate::pipeline::processing::normalize::{FieldNormalizer, NormalizationWarning};
use crate::types::CompanyRecord;

/// Renders count columns as plain integers (`"3.0"` → `"3"`)
pub struct CountNormalizer {
    columns: Vec<String>,
}

impl CountNormalizer {
    pub fn new(columns: &[&str]) -> Self {
        Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl FieldNormalizer for CountNormalizer {
    fn normalize(&self, record: &mut CompanyRecord) -> Vec<NormalizationWarning> {
        let mut warnings = Vec::new();
        for column in &self.columns {
            NormalizerUtils::map_value(record, column, |value| {
                match NormalizerUtils::parse_number(value) {
                    Some(n) => Some(NormalizerUtils::render_integer(n)),
                    None => {
                        warnings.push(NormalizationWarning::new(
                            column,
                            format!("'{}' is not a count, replaced with 0", value),
                        ));
                        Some("0".to_string())
                    }
                }
            });
        }
        warnings
    }

    fn name(&self) -> &str {
        "counts"
    }
}

/// Zero-pads numeric activity codes to their classification width
pub struct ActivityCodeNormalizer {
    widths: Vec<(String, usize)>,
}

impl ActivityCodeNormalizer {
    pub fn new(widths: &[(&str, usize)]) -> Self {
        Self {
            widths: widths.iter().map(|(c, w)| (c.to_string(), *w)).collect(),
        }
    }
}

impl FieldNormalizer for ActivityCodeNormalizer {
    fn normalize(&self, record: &mut CompanyRecord) -> Vec<NormalizationWarning> {
        for (column, width) in &self.widths {
            NormalizerUtils::map_value(record, column, |value| {
                let padded = NormalizerUtils::parse_number(value)
                    .filter(|n| *n >= 0.0)
                    .map(|n| {
                        let digits = NormalizerUtils::render_integer(n);
                        format!("{:0>width$}", digits, width = *width)
                    });
                // codes that are not numeric are kept verbatim
                Some(padded.unwrap_or_else(|| value.to_string()))
            });
        }
        Vec::new()
    }

    fn name(&self) -> &str {
        "activity_codes"
    }
}

/// Fixed 8-decimal rendering for geocoordinates
pub struct CoordinateNormalizer {
    columns: Vec<String>,
}

impl CoordinateNormalizer {
    pub fn new(columns: &[&str]) -> Self {
        Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl FieldNormalizer for CoordinateNormalizer {
    fn normalize(&self, record: &mut CompanyRecord) -> Vec<NormalizationWarning> {
        let mut warnings = Vec::new();
        for column in &self.columns {
            NormalizerUtils::map_value(record, column, |value| {
                match NormalizerUtils::parse_number(value) {
                    Some(n) => Some(format!("{:.8}", n)),
                    None => {
                        warnings.push(NormalizationWarning::new(
                            column,
                            format!("'{}' is not a coordinate, cleared", value),
                        ));
                        None
                    }
                }
            });
        }
        warnings
    }

    fn name(&self) -> &str {
        "coordinates"
    }
}

/// Turns free-form amounts ("1.500.000 €", "$ 2.300,50") into integers.
///
/// The locale is explicit: thousands separators are removed and the decimal
/// separator is read as a decimal point. Unparsable text becomes `fallback`.
pub struct AmountNormalizer {
    decimal_separator: char,
    thousands_separator: char,
    currency_symbols: Vec<String>,
    fallback: String,
}

impl AmountNormalizer {
    pub fn new(
        decimal_separator: char,
        thousands_separator: char,
        currency_symbols: Vec<String>,
        fallback: String,
    ) -> Self {
        Self {
            decimal_separator,
            thousands_separator,
            currency_symbols,
            fallback,
        }
    }

    pub fn parse(&self, raw: &str) -> Option<i64> {
        let mut text = raw.trim().replace(self.thousands_separator, "");
        for symbol in &self.currency_symbols {
            text = text.replace(symbol.as_str(), "");
        }
        let text = text.trim().replace(self.decimal_separator, ".");
        NormalizerUtils::parse_number(&text).map(|n| n.trunc() as i64)
    }
}

impl FieldNormalizer for AmountNormalizer {
    fn normalize(&self, record: &mut CompanyRecord) -> Vec<NormalizationWarning> {
        let mut warnings = Vec::new();
        NormalizerUtils::map_value(record, constants::AMOUNT, |value| match self.parse(value) {
            Some(amount) => Some(amount.to_string()),
            None => {
                warnings.push(NormalizationWarning::new(
                    constants::AMOUNT,
                    format!("'{}' is not an amount, replaced with {}", value, self.fallback),
                ));
                Some(self.fallback.clone())
            }
        });
        warnings
    }

    fn name(&self) -> &str {
        "amount"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spanish_amounts() -> AmountNormalizer {
        AmountNormalizer::new(
            ',',
            '.',
            vec!["$".into(), "USD".into(), "€".into(), "EUR".into(), "£".into()],
            "0".to_string(),
        )
    }

    #[test]
    fn test_amount_locale_and_symbols() {
        let n = spanish_amounts();
        assert_eq!(n.parse("1.500.000 €"), Some(1_500_000));
        assert_eq!(n.parse("USD 2.300,75"), Some(2300));
        assert_eq!(n.parse("  £12 "), Some(12));
        assert_eq!(n.parse("unknown"), None);
    }

    #[test]
    fn test_unparsable_amount_falls_back() {
        let n = spanish_amounts();
        let mut record = CompanyRecord::from_pairs([("amount", "a consultar")]);
        let warnings = n.normalize(&mut record);
        assert_eq!(record.get("amount"), Some("0"));
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].column, "amount");
    }

    #[test]
    fn test_counts_and_codes() {
        let mut record = CompanyRecord::from_pairs([
            ("employees_total", "12.0"),
            ("online_shop", "yes"),
            ("activity_code", "56.0"),
            ("NAICS_activity_code", "445110"),
            ("activity_code_secondary", "n/d"),
        ]);
        let counts = CountNormalizer::new(&["employees_total", "online_shop"]);
        let codes = ActivityCodeNormalizer::new(&[
            ("activity_code", 4),
            ("NAICS_activity_code", 6),
            ("activity_code_secondary", 4),
        ]);

        assert_eq!(counts.normalize(&mut record).len(), 1);
        codes.normalize(&mut record);

        assert_eq!(record.get("employees_total"), Some("12"));
        assert_eq!(record.get("online_shop"), Some("0"));
        assert_eq!(record.get("activity_code"), Some("0056"));
        assert_eq!(record.get("NAICS_activity_code"), Some("445110"));
        assert_eq!(record.get("activity_code_secondary"), Some("n/d"));
    }

    #[test]
    fn test_coordinates_have_eight_decimals() {
        let mut record =
            CompanyRecord::from_pairs([("longitude", "-3.7038"), ("latitude", "north")]);
        let n = CoordinateNormalizer::new(&["longitude", "latitude"]);
        let warnings = n.normalize(&mut record);
        assert_eq!(record.get("longitude"), Some("-3.70380000"));
        assert_eq!(record.get("latitude"), None);
        assert_eq!(warnings.len(), 1);
    }
}
