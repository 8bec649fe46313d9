use std::sync::Arc;

use super::normalizers::{
    ActivityCodeNormalizer, AmountNormalizer, CategoricalNormalizer, CompanyNameNormalizer,
    CoordinateNormalizer, CountNormalizer, DefaultsNormalizer, EmailNormalizer,
    HiringNormalizer, PhoneNormalizer, YearNormalizer,
};
use super::{FieldNormalizer, NormalizationWarning};
use crate::config::{DefaultsConfig, NormalizeConfig};
use crate::constants;
use crate::pipeline::processing::reference::ReferenceData;
use crate::types::CompanyRecord;

/// Ordered list of field normalizers; records pass through them in registration order
pub struct NormalizationRegistry {
    normalizers: Vec<Box<dyn FieldNormalizer>>,
}

impl NormalizationRegistry {
    pub fn empty() -> Self {
        Self {
            normalizers: Vec::new(),
        }
    }

    /// Defaults first, then the independent formatters
    pub fn standard(normalize: &NormalizeConfig, defaults: &DefaultsConfig) -> Self {
        let mut registry = Self::empty();
        let default_amount = defaults
            .effective()
            .into_iter()
            .find(|(column, _)| column == constants::AMOUNT)
            .map(|(_, value)| value)
            .unwrap_or_else(|| "0".to_string());

        registry.register(Box::new(DefaultsNormalizer::new(defaults.effective())));
        registry.register(Box::new(CountNormalizer::new(&constants::COUNT_COLUMNS)));
        registry.register(Box::new(ActivityCodeNormalizer::new(&constants::ACTIVITY_CODE_WIDTHS)));
        registry.register(Box::new(CoordinateNormalizer::new(&[
            constants::LONGITUDE,
            constants::LATITUDE,
        ])));
        registry.register(Box::new(EmailNormalizer));
        registry.register(Box::new(HiringNormalizer));
        registry.register(Box::new(AmountNormalizer::new(
            normalize.decimal_separator,
            normalize.thousands_separator,
            normalize.currency_symbols.clone(),
            default_amount,
        )));
        registry.register(Box::new(YearNormalizer::new(&[
            constants::YEAR,
            constants::INCORPORATED,
        ])));
        registry.register(Box::new(CategoricalNormalizer::new(
            constants::STATUS,
            normalize.status_active.clone(),
            "Active",
            "Inactive",
        )));
        registry.register(Box::new(CategoricalNormalizer::new(
            constants::MODE,
            normalize.mode_estimated.clone(),
            "Estimated",
            "Real",
        )));
        registry.register(Box::new(CompanyNameNormalizer));
        registry
    }

    /// Formatters that depend on decomposed address fields
    pub fn post_address(reference: Arc<ReferenceData>) -> Self {
        let mut registry = Self::empty();
        registry.register(Box::new(PhoneNormalizer::new(reference)));
        registry
    }

    pub fn register(&mut self, normalizer: Box<dyn FieldNormalizer>) {
        self.normalizers.push(normalizer);
    }

    /// Run every registered normalizer over the record
    pub fn apply(&self, record: &mut CompanyRecord) -> Vec<NormalizationWarning> {
        self.normalizers
            .iter()
            .flat_map(|n| n.normalize(record))
            .collect()
    }

    /// Registered normalizer names, in order
    pub fn list(&self) -> Vec<&str> {
        self.normalizers.iter().map(|n| n.name()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_registry_runs_defaults_first() {
        let registry = NormalizationRegistry::standard(
            &NormalizeConfig::default(),
            &DefaultsConfig::default(),
        );
        let names = registry.list();
        assert_eq!(names.first(), Some(&"defaults"));
        assert!(names.contains(&"amount"));
        assert!(names.contains(&"company_name"));
    }

    #[test]
    fn test_standard_registry_normalizes_a_record() {
        let registry = NormalizationRegistry::standard(
            &NormalizeConfig::default(),
            &DefaultsConfig::default(),
        );
        let mut record = CompanyRecord::from_pairs([
            ("id", "1"),
            ("name", "acme sociedad limitada"),
            ("amount", "1.500.000 €"),
            ("status", " ACTIVA "),
            ("mode", ""),
            ("year", "15 de marzo de 2001"),
            ("activity_code", "471.0"),
            ("hiring", "TRUE"),
        ]);

        let warnings = registry.apply(&mut record);
        assert!(warnings.is_empty(), "{:?}", warnings);
        assert_eq!(record.get("name"), Some("ACME, S.L."));
        assert_eq!(record.get("amount"), Some("1500000"));
        assert_eq!(record.get("currency"), Some("EUR"));
        assert_eq!(record.get("status"), Some("Active"));
        assert_eq!(record.get("mode"), Some("Estimated"));
        assert_eq!(record.get("year"), Some("2001"));
        assert_eq!(record.get("incorporated"), Some("-"));
        assert_eq!(record.get("activity_code"), Some("0471"));
        assert_eq!(record.get("hiring"), Some("1"));
        assert_eq!(record.get("website"), Some("-"));
    }

    #[test]
    fn test_empty_registry_is_a_no_op() {
        let registry = NormalizationRegistry::empty();
        let mut record = CompanyRecord::from_pairs([("id", "1")]);
        let before = record.clone();
        assert!(registry.apply(&mut record).is_empty());
        assert_eq!(record, before);
    }
}
