use super::base::NormalizerUtils;
use crate::pipeline::processing::normalize::{FieldNormalizer, NormalizationWarning};
use crate::types::CompanyRecord;

/// Collapses a free-text column into one of two labels.
///
/// Values found in `members` (trimmed, case-insensitive) become `matched`,
/// anything else present becomes `other`.
pub struct CategoricalNormalizer {
    column: String,
    members: Vec<String>,
    matched: String,
    other: String,
}

impl CategoricalNormalizer {
    pub fn new(column: &str, members: Vec<String>, matched: &str, other: &str) -> Self {
        Self {
            column: column.to_string(),
            members,
            matched: matched.to_string(),
            other: other.to_string(),
        }
    }
}

impl FieldNormalizer for CategoricalNormalizer {
    fn normalize(&self, record: &mut CompanyRecord) -> Vec<NormalizationWarning> {
        NormalizerUtils::map_value(record, &self.column, |value| {
            if NormalizerUtils::is_member(value, &self.members) {
                Some(self.matched.clone())
            } else {
                Some(self.other.clone())
            }
        });
        Vec::new()
    }

    fn name(&self) -> &str {
        &self.column
    }
}
