use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single cell; `None` is an absent/null value
pub type FieldValue = Option<String>;

/// A company row as observed by one upstream source.
///
/// `id` is not unique: several sources may describe the same company and share it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyRecord {
    fields: HashMap<String, FieldValue>,
}

impl CompanyRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a record from column/value pairs, treating empty strings as absent
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let fields = pairs
            .into_iter()
            .map(|(k, v)| {
                let v: String = v.into();
                (k.into(), if v.is_empty() { None } else { Some(v) })
            })
            .collect();
        Self { fields }
    }

    /// Present, non-null value of a column
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields.get(column).and_then(|v| v.as_deref())
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.fields.contains_key(column)
    }

    pub fn set(&mut self, column: &str, value: impl Into<String>) {
        self.fields.insert(column.to_string(), Some(value.into()));
    }

    pub fn set_value(&mut self, column: &str, value: FieldValue) {
        self.fields.insert(column.to_string(), value);
    }

    pub fn remove(&mut self, column: &str) -> Option<FieldValue> {
        self.fields.remove(column)
    }

    /// Move a column's cell under a new name; no-op if the column is missing
    pub fn rename(&mut self, from: &str, to: &str) {
        if let Some(value) = self.fields.remove(from) {
            self.fields.insert(to.to_string(), value);
        }
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(|k| k.as_str())
    }

    /// Project the record onto a column ordering, rendering absent cells as ""
    pub fn to_row(&self, columns: &[String]) -> Vec<String> {
        columns
            .iter()
            .map(|c| self.get(c).unwrap_or_default().to_string())
            .collect()
    }
}

/// The single post-merge representation of all records sharing one id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalRecord {
    pub key: String,
    pub values: HashMap<String, String>,
    /// How many raw records contributed to this one
    pub member_count: usize,
    /// Columns whose contributing records disagreed
    pub conflicts: Vec<String>,
}

impl CanonicalRecord {
    pub fn get(&self, column: &str) -> &str {
        self.values.get(column).map(|s| s.as_str()).unwrap_or("")
    }

    pub fn to_row(&self, columns: &[String]) -> Vec<String> {
        columns.iter().map(|c| self.get(c).to_string()).collect()
    }
}

/// A header plus rows, ready to be written by a table sink
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl OutputTable {
    pub fn from_records(columns: &[String], records: &[CompanyRecord]) -> Self {
        Self {
            columns: columns.to_vec(),
            rows: records.iter().map(|r| r.to_row(columns)).collect(),
        }
    }

    pub fn from_canonical(columns: &[String], records: &[CanonicalRecord]) -> Self {
        Self {
            columns: columns.to_vec(),
            rows: records.iter().map(|r| r.to_row(columns)).collect(),
        }
    }

    /// Cell lookup by row index and column name, mostly for tests and diagnostics
    pub fn cell(&self, row: usize, column: &str) -> Option<&str> {
        let idx = self.columns.iter().position(|c| c == column)?;
        self.rows.get(row)?.get(idx).map(|s| s.as_str())
    }
}
