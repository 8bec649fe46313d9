use std::sync::Arc;

use crate::constants;
use crate::pipeline::processing::normalize::{FieldNormalizer, NormalizationWarning};
use crate::pipeline::processing::reference::ReferenceData;
use crate::types::CompanyRecord;

use super::base::NormalizerUtils;

/// Drops tracking query strings from e-mail addresses
pub struct EmailNormalizer;

impl FieldNormalizer for EmailNormalizer {
    fn normalize(&self, record: &mut CompanyRecord) -> Vec<NormalizationWarning> {
        NormalizerUtils::map_value(record, constants::EMAIL, |value| {
            let address = value.split('?').next().unwrap_or(value).trim();
            Some(address.to_string())
        });
        Vec::new()
    }

    fn name(&self) -> &str {
        "email"
    }
}

/// Boolean-ish hiring flag rendered as `1` / `0`
pub struct HiringNormalizer;

impl HiringNormalizer {
    fn is_truthy(value: &str) -> bool {
        match value.trim().to_lowercase().as_str() {
            "true" | "yes" | "si" | "sí" => true,
            other => NormalizerUtils::parse_number(other).is_some_and(|n| n != 0.0),
        }
    }
}

impl FieldNormalizer for HiringNormalizer {
    fn normalize(&self, record: &mut CompanyRecord) -> Vec<NormalizationWarning> {
        let flag = record.get(constants::HIRING).is_some_and(Self::is_truthy);
        record.set(constants::HIRING, if flag { "1" } else { "0" });
        Vec::new()
    }

    fn name(&self) -> &str {
        "hiring"
    }
}

/// Prepends the international prefix of the record's country to its phone number.
///
/// Runs after address decomposition since it keys on `country_name`.
pub struct PhoneNormalizer {
    reference: Arc<ReferenceData>,
}

impl PhoneNormalizer {
    pub fn new(reference: Arc<ReferenceData>) -> Self {
        Self { reference }
    }

    /// Format a single number for a given country name
    pub fn format(&self, phone: &str, country_name: &str) -> String {
        let number = phone.trim();
        // spreadsheet exports turn numbers into floats
        let number = number.split('.').next().unwrap_or(number);
        if number.is_empty() || number == "0" || number == "-" {
            return number.to_string();
        }
        match self.reference.phone_prefix_for(country_name) {
            Some(prefix) if !number.starts_with(prefix) => format!("{}{}", prefix, number),
            _ => number.to_string(),
        }
    }
}

impl FieldNormalizer for PhoneNormalizer {
    fn normalize(&self, record: &mut CompanyRecord) -> Vec<NormalizationWarning> {
        let country = record.get(constants::COUNTRY_NAME).unwrap_or("").to_string();
        NormalizerUtils::map_value(record, constants::PHONE_NUMBER, |value| {
            Some(self.format(value, &country))
        });
        Vec::new()
    }

    fn name(&self) -> &str {
        "phone"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_query_string_is_removed() {
        let mut record =
            CompanyRecord::from_pairs([("email", "info@acme.es?subject=Contacto")]);
        EmailNormalizer.normalize(&mut record);
        assert_eq!(record.get("email"), Some("info@acme.es"));
    }

    #[test]
    fn test_hiring_flag() {
        for (raw, expected) in [("TRUE", "1"), ("1.0", "1"), ("False", "0"), ("0", "0")] {
            let mut record = CompanyRecord::from_pairs([("hiring", raw)]);
            HiringNormalizer.normalize(&mut record);
            assert_eq!(record.get("hiring"), Some(expected), "{raw}");
        }
        let mut absent = CompanyRecord::new();
        HiringNormalizer.normalize(&mut absent);
        assert_eq!(absent.get("hiring"), Some("0"));
    }

    #[test]
    fn test_phone_prefix_added_once() {
        let phone = PhoneNormalizer::new(Arc::new(ReferenceData::builtin().unwrap()));
        assert_eq!(phone.format("912345678.0", "España"), "+34912345678");
        assert_eq!(phone.format("+34912345678", "España"), "+34912345678");
        assert_eq!(phone.format("2071234567", "Great Britain"), "+442071234567");
        assert_eq!(phone.format("912345678", ""), "912345678");
        assert_eq!(phone.format("0", "España"), "0");
        assert_eq!(phone.format("-", "España"), "-");
    }

    #[test]
    fn test_phone_reads_country_from_record() {
        let phone = PhoneNormalizer::new(Arc::new(ReferenceData::builtin().unwrap()));
        let mut record =
            CompanyRecord::from_pairs([("phone_number", "30123456"), ("country_name", "Germany")]);
        phone.normalize(&mut record);
        assert_eq!(record.get("phone_number"), Some("+4930123456"));
    }
}
