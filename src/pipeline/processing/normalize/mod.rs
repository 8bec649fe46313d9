//! Single-column formatters applied to every record before and after address
//! decomposition. None of them can fail: malformed input falls back to a
//! default or heuristic value and is reported as a [`NormalizationWarning`].

pub mod normalizers;
pub mod registry;

use serde::{Deserialize, Serialize};

use crate::types::CompanyRecord;

pub use registry::NormalizationRegistry;

/// A value that could not be interpreted and was replaced by a fallback
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizationWarning {
    pub column: String,
    pub message: String,
}

impl NormalizationWarning {
    pub fn new(column: &str, message: impl Into<String>) -> Self {
        Self {
            column: column.to_string(),
            message: message.into(),
        }
    }
}

/// Trait for transforming one record field (or a small set of related fields) in place
pub trait FieldNormalizer: Send + Sync {
    /// Rewrite the record's field(s), reporting any fallback that was needed
    fn normalize(&self, record: &mut CompanyRecord) -> Vec<NormalizationWarning>;

    /// A human-readable name for logs and metrics
    fn name(&self) -> &str;
}
