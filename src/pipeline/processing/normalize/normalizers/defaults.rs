use crate::pipeline::processing::normalize::{FieldNormalizer, NormalizationWarning};
use crate::types::CompanyRecord;

/// Fills absent cells with fixed per-column values
pub struct DefaultsNormalizer {
    fills: Vec<(String, String)>,
}

impl DefaultsNormalizer {
    pub fn new(fills: Vec<(String, String)>) -> Self {
        Self { fills }
    }
}

impl FieldNormalizer for DefaultsNormalizer {
    fn normalize(&self, record: &mut CompanyRecord) -> Vec<NormalizationWarning> {
        for (column, value) in &self.fills {
            let blank = record.get(column).map_or(true, |v| v.trim().is_empty());
            if blank {
                record.set(column, value.clone());
            }
        }
        Vec::new()
    }

    fn name(&self) -> &str {
        "defaults"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fills_only_blank_cells() {
        let normalizer = DefaultsNormalizer::new(vec![
            ("currency".to_string(), "EUR".to_string()),
            ("mode".to_string(), "Estimated".to_string()),
            ("hours".to_string(), "-".to_string()),
        ]);
        let mut record = CompanyRecord::from_pairs([("currency", "USD"), ("mode", " ")]);
        normalizer.normalize(&mut record);
        assert_eq!(record.get("currency"), Some("USD"));
        assert_eq!(record.get("mode"), Some("Estimated"));
        assert_eq!(record.get("hours"), Some("-"));
    }
}
