use crate::types::CompanyRecord;

/// Shared utilities for normalizers
pub struct NormalizerUtils;

impl NormalizerUtils {
    /// Parse a plain decimal number such as `"3"`, `"3.0"` or `" -3.70 "`
    pub fn parse_number(text: &str) -> Option<f64> {
        text.trim().parse::<f64>().ok().filter(|n| n.is_finite())
    }

    /// Render a number as an integer, dropping any fractional part
    pub fn render_integer(number: f64) -> String {
        format!("{}", number.trunc() as i64)
    }

    /// Apply `f` to the column's value when present, storing its result
    pub fn map_value<F>(record: &mut CompanyRecord, column: &str, f: F)
    where
        F: FnOnce(&str) -> Option<String>,
    {
        if let Some(current) = record.get(column) {
            let updated = f(current);
            record.set_value(column, updated);
        }
    }

    /// Case-insensitive, whitespace-trimmed membership test
    pub fn is_member(value: &str, members: &[String]) -> bool {
        let value = value.trim().to_lowercase();
        members.iter().any(|m| m.to_lowercase() == value)
    }
}
