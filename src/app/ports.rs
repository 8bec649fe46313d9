use async_trait::async_trait;

use crate::types::{CompanyRecord, OutputTable};

/// Where raw company rows come from
#[async_trait]
pub trait RecordSourcePort: Send + Sync {
    async fn read_records(&self) -> anyhow::Result<Vec<CompanyRecord>>;
}

/// Where a finished table (intermediate or final) is written
#[async_trait]
pub trait TableSinkPort: Send + Sync {
    async fn write_table(&self, table: &OutputTable) -> anyhow::Result<()>;
}
