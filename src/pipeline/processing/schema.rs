use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::SchemaConfig;
use crate::types::CompanyRecord;

/// Why a raw row never reached normalization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DropReason {
    /// The row has no company name
    MissingIdentity,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DroppedRow {
    /// Zero-based position in the input batch
    pub index: usize,
    pub reason: DropReason,
}

#[derive(Debug, Default)]
pub struct PreparedBatch {
    pub records: Vec<CompanyRecord>,
    pub dropped: Vec<DroppedRow>,
}

/// Drops redundant columns, renames the rest and discards nameless rows
#[derive(Debug, Clone)]
pub struct SchemaPreparer {
    drop_columns: Vec<String>,
    rename_columns: Vec<(String, String)>,
    required_column: String,
}

impl SchemaPreparer {
    pub fn new(config: &SchemaConfig) -> Self {
        Self {
            drop_columns: config.drop_columns.clone(),
            rename_columns: config
                .rename_columns
                .iter()
                .map(|(from, to)| (from.clone(), to.clone()))
                .collect(),
            required_column: config.required_column.clone(),
        }
    }

    pub fn prepare(&self, records: Vec<CompanyRecord>) -> PreparedBatch {
        let mut batch = PreparedBatch::default();

        for (index, mut record) in records.into_iter().enumerate() {
            for column in &self.drop_columns {
                record.remove(column);
            }
            for (from, to) in &self.rename_columns {
                record.rename(from, to);
            }

            let has_identity = record
                .get(&self.required_column)
                .is_some_and(|v| !v.trim().is_empty());
            if has_identity {
                batch.records.push(record);
            } else {
                debug!(index, "Dropping row without '{}'", self.required_column);
                batch.dropped.push(DroppedRow {
                    index,
                    reason: DropReason::MissingIdentity,
                });
            }
        }

        if !batch.dropped.is_empty() {
            info!(
                dropped = batch.dropped.len(),
                kept = batch.records.len(),
                "Dropped rows with missing identity"
            );
        }
        batch
    }
}

impl Default for SchemaPreparer {
    fn default() -> Self {
        Self::new(&SchemaConfig::default())
    }
}
