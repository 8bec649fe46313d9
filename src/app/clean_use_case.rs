use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use serde::Serialize;
use tracing::{debug, info, info_span, instrument, warn};
use uuid::Uuid;

use crate::app::ports::{RecordSourcePort, TableSinkPort};
use crate::config::Config;
use crate::constants;
use crate::observability::metrics;
use crate::pipeline::processing::address::{AddressDecomposer, UnresolvedLookup};
use crate::pipeline::processing::merge::RecordMerger;
use crate::pipeline::processing::normalize::NormalizationRegistry;
use crate::pipeline::processing::reference::ReferenceData;
use crate::pipeline::processing::schema::SchemaPreparer;
use crate::types::{CompanyRecord, OutputTable};

/// Counts describing one completed cleaning run
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub rows_read: usize,
    pub rows_dropped: usize,
    pub records_normalized: usize,
    pub canonical_records: usize,
    pub conflicting_groups: usize,
    pub records_without_key: usize,
    pub elapsed: Duration,
}

/// Use case for turning a raw company table into merged canonical records.
///
/// Stages run in a fixed order: schema, field normalization, address
/// decomposition, phone formatting, intermediate output, grouping and merging,
/// final output.
pub struct CleanCompaniesUseCase {
    source: Box<dyn RecordSourcePort>,
    intermediate: Box<dyn TableSinkPort>,
    output: Box<dyn TableSinkPort>,
    schema: SchemaPreparer,
    normalizers: NormalizationRegistry,
    post_address: NormalizationRegistry,
    decomposer: Arc<AddressDecomposer>,
    merger: RecordMerger,
    workers: usize,
    columns: Vec<String>,
}

impl CleanCompaniesUseCase {
    pub fn new(
        config: &Config,
        reference: Arc<ReferenceData>,
        source: Box<dyn RecordSourcePort>,
        intermediate: Box<dyn TableSinkPort>,
        output: Box<dyn TableSinkPort>,
    ) -> Self {
        Self {
            source,
            intermediate,
            output,
            schema: SchemaPreparer::new(&config.schema),
            normalizers: NormalizationRegistry::standard(&config.normalize, &config.defaults),
            post_address: NormalizationRegistry::post_address(reference.clone()),
            decomposer: Arc::new(AddressDecomposer::new(reference)),
            merger: RecordMerger::new(
                &config.merge.group_key,
                &config.merge.delimiter,
                config.merge.policies.clone(),
            ),
            workers: config.pipeline.workers.max(1),
            columns: constants::OUTPUT_COLUMNS.iter().map(|c| c.to_string()).collect(),
        }
    }

    /// Run the whole batch once
    #[instrument(skip(self))]
    pub async fn run(&self) -> Result<RunSummary> {
        let run_id = Uuid::new_v4();
        let started = Instant::now();
        info!(%run_id, "Starting company cleaning run");

        let stage = Instant::now();
        let raw = self.source.read_records().await?;
        let rows_read = raw.len();
        metrics::input::rows_read(rows_read);

        let batch = self.schema.prepare(raw);
        let rows_dropped = batch.dropped.len();
        metrics::input::rows_dropped("missing_identity", rows_dropped);
        metrics::stage_duration("read", stage.elapsed().as_secs_f64());

        let stage = Instant::now();
        let mut records = batch.records;
        info_span!("normalize", records = records.len())
            .in_scope(|| self.normalize(&mut records, &self.normalizers));
        metrics::normalize::records_processed(records.len());
        metrics::stage_duration("normalize", stage.elapsed().as_secs_f64());

        let stage = Instant::now();
        let mut records = self.decompose_addresses(records).await?;
        self.normalize(&mut records, &self.post_address);
        metrics::stage_duration("decompose", stage.elapsed().as_secs_f64());

        let intermediate = OutputTable::from_records(&self.columns, &records);
        self.intermediate.write_table(&intermediate).await?;
        info!(rows = intermediate.rows.len(), "Intermediate table written");

        let stage = Instant::now();
        let outcome = info_span!("merge", key = %self.merger.group_key())
            .in_scope(|| self.merger.merge_all(&records));
        metrics::merge::groups_merged(outcome.records.len());
        metrics::merge::groups_conflicting(outcome.conflicting_groups);
        metrics::merge::records_without_key(outcome.skipped_without_key);
        metrics::stage_duration("merge", stage.elapsed().as_secs_f64());

        let final_table = OutputTable::from_canonical(&self.columns, &outcome.records);
        self.output.write_table(&final_table).await?;

        let summary = RunSummary {
            run_id,
            rows_read,
            rows_dropped,
            records_normalized: records.len(),
            canonical_records: outcome.records.len(),
            conflicting_groups: outcome.conflicting_groups,
            records_without_key: outcome.skipped_without_key,
            elapsed: started.elapsed(),
        };
        info!(
            %run_id,
            rows_read,
            rows_dropped,
            canonical = summary.canonical_records,
            conflicting = summary.conflicting_groups,
            elapsed_ms = summary.elapsed.as_millis() as u64,
            "Company cleaning run finished"
        );
        Ok(summary)
    }

    fn normalize(&self, records: &mut [CompanyRecord], registry: &NormalizationRegistry) {
        for record in records.iter_mut() {
            for warning in registry.apply(record) {
                debug!(column = %warning.column, "{}", warning.message);
                metrics::normalize::warning_logged(&warning.column);
            }
        }
    }

    /// Decompose every address on blocking workers, keeping input order
    async fn decompose_addresses(&self, records: Vec<CompanyRecord>) -> Result<Vec<CompanyRecord>> {
        if records.is_empty() {
            return Ok(records);
        }
        let chunk_size = records.len().div_ceil(self.workers);
        let mut handles = Vec::with_capacity(self.workers);
        let mut remaining = records.into_iter();

        loop {
            let chunk: Vec<CompanyRecord> = remaining.by_ref().take(chunk_size).collect();
            if chunk.is_empty() {
                break;
            }
            let decomposer = Arc::clone(&self.decomposer);
            handles.push(tokio::task::spawn_blocking(move || {
                let mut chunk = chunk;
                let unresolved: Vec<Vec<UnresolvedLookup>> = chunk
                    .iter_mut()
                    .map(|record| decomposer.apply(record).unresolved)
                    .collect();
                (chunk, unresolved)
            }));
        }

        let mut decomposed = Vec::new();
        let mut misses: BTreeMap<&'static str, usize> = BTreeMap::new();
        for handle in handles {
            let (chunk, unresolved) = handle.await?;
            for lookups in unresolved.iter().flatten() {
                *misses.entry(lookups.kind()).or_default() += 1;
                metrics::address::lookup_miss(lookups.kind());
            }
            decomposed.extend(chunk);
        }

        metrics::address::decomposed(decomposed.len());
        if !misses.is_empty() {
            warn!(?misses, "Some addresses could not be fully resolved");
        }
        Ok(decomposed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use tokio::sync::Mutex;

    struct MockSource {
        records: Vec<CompanyRecord>,
    }

    #[async_trait]
    impl RecordSourcePort for MockSource {
        async fn read_records(&self) -> Result<Vec<CompanyRecord>> {
            Ok(self.records.clone())
        }
    }

    struct MockSink {
        pub tables: Arc<Mutex<Vec<OutputTable>>>,
    }

    impl MockSink {
        fn new() -> Self {
            Self {
                tables: Arc::new(Mutex::new(Vec::new())),
            }
        }
    }

    #[async_trait]
    impl TableSinkPort for MockSink {
        async fn write_table(&self, table: &OutputTable) -> Result<()> {
            self.tables.lock().await.push(table.clone());
            Ok(())
        }
    }

    fn sample_rows() -> Vec<CompanyRecord> {
        vec![
            CompanyRecord::from_pairs([
                ("id", "1"),
                ("name", "acme sociedad limitada"),
                ("address", "Calle Mayor 3, 30009 Murcia, Murcia, Spain"),
                ("phone_number", "968111222.0"),
                ("mode", "estimated"),
                ("hiring", "TRUE"),
            ]),
            CompanyRecord::from_pairs([
                ("id", "2"),
                ("name", ""),
                ("address", "Calle Sin Nombre 1"),
            ]),
            CompanyRecord::from_pairs([
                ("id", "3"),
                ("name", "Bar Pepe"),
                ("address", "Av. Mayor 10, 28040 Aravaca"),
            ]),
            CompanyRecord::from_pairs([
                ("id", "1"),
                ("name", "Acme S.L."),
                ("address", "Calle Mayor 3, 30009 Murcia, Murcia, Spain"),
                ("phone_number", "968111222"),
                ("mode", "real"),
                ("hiring", "false"),
            ]),
        ]
    }

    async fn run_with(workers: usize) -> (RunSummary, Vec<OutputTable>, Vec<OutputTable>) {
        let mut config = Config::default();
        config.pipeline.workers = workers;
        let intermediate = MockSink::new();
        let output = MockSink::new();
        let intermediate_tables = intermediate.tables.clone();
        let output_tables = output.tables.clone();

        let use_case = CleanCompaniesUseCase::new(
            &config,
            Arc::new(ReferenceData::builtin().unwrap()),
            Box::new(MockSource { records: sample_rows() }),
            Box::new(intermediate),
            Box::new(output),
        );
        let summary = use_case.run().await.expect("run succeeds");
        let intermediate = intermediate_tables.lock().await.clone();
        let output = output_tables.lock().await.clone();
        (summary, intermediate, output)
    }

    #[tokio::test]
    async fn test_run_counts_and_merges() {
        let (summary, intermediate, output) = run_with(2).await;

        assert_eq!(summary.rows_read, 4);
        assert_eq!(summary.rows_dropped, 1);
        assert_eq!(summary.records_normalized, 3);
        assert_eq!(summary.canonical_records, 2);
        assert_eq!(summary.conflicting_groups, 1);
        assert_eq!(summary.records_without_key, 0);

        assert_eq!(intermediate.len(), 1);
        assert_eq!(intermediate[0].rows.len(), 3);
        assert_eq!(intermediate[0].columns.len(), constants::OUTPUT_COLUMNS.len());

        let table = &output[0];
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.cell(0, "id"), Some("1"));
        assert_eq!(table.cell(0, "name"), Some("ACME, S.L."));
        assert_eq!(table.cell(0, "address"), Some("Calle Mayor 3"));
        assert_eq!(table.cell(0, "city"), Some("Murcia"));
        assert_eq!(table.cell(0, "country_name"), Some("Spain"));
        assert_eq!(table.cell(0, "phone_number"), Some("+34968111222"));
        assert_eq!(table.cell(0, "mode"), Some("Estimated//Real"));
        assert_eq!(table.cell(0, "hiring"), Some("1//0"));

        assert_eq!(table.cell(1, "id"), Some("3"));
        assert_eq!(table.cell(1, "address"), Some("Avenida Mayor 10"));
        assert_eq!(table.cell(1, "province"), Some("Madrid"));
        assert_eq!(table.cell(1, "phone_number"), Some("-"));
        assert_eq!(table.cell(1, "country_name"), Some(""));
    }

    #[tokio::test]
    async fn test_worker_count_does_not_change_order() {
        let (_, single, _) = run_with(1).await;
        let (_, many, _) = run_with(8).await;
        assert_eq!(single[0].rows, many[0].rows);
        assert_eq!(many[0].cell(0, "id"), Some("1"));
        assert_eq!(many[0].cell(1, "id"), Some("3"));
        assert_eq!(many[0].cell(2, "id"), Some("1"));
    }
}
