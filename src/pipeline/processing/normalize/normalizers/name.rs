use crate::constants;
use crate::pipeline::processing::normalize::{FieldNormalizer, NormalizationWarning};
use crate::types::CompanyRecord;

use super::base::NormalizerUtils;

const LONG_LEGAL_FORMS: [(&str, &str); 3] = [
    ("SOCIEDAD LIMITADA", "SL"),
    ("SOCIEDAD ANONIMA", "SA"),
    ("SOCIEDAD ANÓNIMA", "SA"),
];

/// Trailing legal-form suffix and its dotted rendering
const LEGAL_FORM_SUFFIXES: [(&str, &str); 5] = [
    ("SA", "S.A."),
    ("SL", "S.L."),
    ("SAU", "S.A.U."),
    ("SCCL", "S.C.C.L."),
    ("BV", "B.V."),
];

/// Upper-cases company names and renders the legal form as `NAME, S.L.`
pub struct CompanyNameNormalizer;

impl CompanyNameNormalizer {
    pub fn format(name: &str) -> String {
        let mut formatted = name.trim().to_uppercase().replace('.', "");
        for (long, short) in LONG_LEGAL_FORMS {
            formatted = formatted.replace(long, short);
        }

        for (suffix, dotted) in LEGAL_FORM_SUFFIXES {
            let Some(stem) = formatted.strip_suffix(suffix) else {
                continue;
            };
            if !stem.ends_with(' ') {
                continue;
            }
            let stem = stem.trim_end().trim_end_matches(',').trim_end();
            if stem.is_empty() {
                break;
            }
            return format!("{}, {}", stem, dotted);
        }
        formatted
    }
}

impl FieldNormalizer for CompanyNameNormalizer {
    fn normalize(&self, record: &mut CompanyRecord) -> Vec<NormalizationWarning> {
        NormalizerUtils::map_value(record, constants::NAME, |value| Some(Self::format(value)));
        Vec::new()
    }

    fn name(&self) -> &str {
        "company_name"
    }
}
