//! Metrics for the company cleaning pipeline
//!
//! Counters and histograms go through the `metrics` facade; a Prometheus
//! recorder is installed once per process and its text exposition can be
//! rendered at the end of a run.

use std::fmt;
use std::sync::OnceLock;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing::{debug, info};

/// Enum representing all metric names used by the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    // Input metrics
    InputRowsRead,
    InputRowsDropped,

    // Normalize metrics
    NormalizeRecordsProcessed,
    NormalizeWarnings,

    // Address metrics
    AddressDecomposed,
    AddressLookupMisses,

    // Merge metrics
    MergeGroupsMerged,
    MergeGroupsConflicting,
    MergeRecordsWithoutKey,

    // Stage timing
    StageDuration,
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl MetricName {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::InputRowsRead => "company_cleaner_input_rows_read_total",
            MetricName::InputRowsDropped => "company_cleaner_input_rows_dropped_total",

            MetricName::NormalizeRecordsProcessed => {
                "company_cleaner_normalize_records_processed_total"
            }
            MetricName::NormalizeWarnings => "company_cleaner_normalize_warnings_total",

            MetricName::AddressDecomposed => "company_cleaner_address_decomposed_total",
            MetricName::AddressLookupMisses => "company_cleaner_address_lookup_misses_total",

            MetricName::MergeGroupsMerged => "company_cleaner_merge_groups_merged_total",
            MetricName::MergeGroupsConflicting => "company_cleaner_merge_groups_conflicting_total",
            MetricName::MergeRecordsWithoutKey => "company_cleaner_merge_records_without_key_total",

            MetricName::StageDuration => "company_cleaner_stage_duration_seconds",
        }
    }

    /// Every metric the pipeline can emit
    pub fn all_metrics() -> impl Iterator<Item = MetricName> {
        use MetricName::*;
        [
            InputRowsRead,
            InputRowsDropped,
            NormalizeRecordsProcessed,
            NormalizeWarnings,
            AddressDecomposed,
            AddressLookupMisses,
            MergeGroupsMerged,
            MergeGroupsConflicting,
            MergeRecordsWithoutKey,
            StageDuration,
        ]
        .into_iter()
    }
}

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the Prometheus recorder. Calling it again is a no-op.
pub fn init() -> anyhow::Result<()> {
    if METRICS_HANDLE.get().is_some() {
        debug!("Metrics recorder already installed");
        return Ok(());
    }
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install Prometheus recorder: {}", e))?;
    METRICS_HANDLE.set(handle).ok();
    info!("Metrics system initialized");
    Ok(())
}

/// Prometheus text exposition of everything recorded so far
pub fn render() -> Option<String> {
    METRICS_HANDLE.get().map(|handle| handle.render())
}

// ============================================================================
// Input Metrics
// ============================================================================

pub mod input {
    use super::MetricName;

    pub fn rows_read(count: usize) {
        ::metrics::counter!(MetricName::InputRowsRead.as_str()).increment(count as u64);
    }

    /// Rows discarded before normalization, labelled by reason
    pub fn rows_dropped(reason: &str, count: usize) {
        ::metrics::counter!(MetricName::InputRowsDropped.as_str(), "reason" => reason.to_string())
            .increment(count as u64);
    }
}

// ============================================================================
// Normalize Metrics
// ============================================================================

pub mod normalize {
    use super::MetricName;

    pub fn records_processed(count: usize) {
        ::metrics::counter!(MetricName::NormalizeRecordsProcessed.as_str()).increment(count as u64);
    }

    pub fn warning_logged(column: &str) {
        ::metrics::counter!(MetricName::NormalizeWarnings.as_str(), "column" => column.to_string())
            .increment(1);
    }
}

// ============================================================================
// Address Metrics
// ============================================================================

pub mod address {
    use super::MetricName;

    pub fn decomposed(count: usize) {
        ::metrics::counter!(MetricName::AddressDecomposed.as_str()).increment(count as u64);
    }

    /// A reference-table lookup that found nothing, labelled by kind
    pub fn lookup_miss(kind: &'static str) {
        ::metrics::counter!(MetricName::AddressLookupMisses.as_str(), "kind" => kind).increment(1);
    }
}

// ============================================================================
// Merge Metrics
// ============================================================================

pub mod merge {
    use super::MetricName;

    pub fn groups_merged(count: usize) {
        ::metrics::counter!(MetricName::MergeGroupsMerged.as_str()).increment(count as u64);
    }

    pub fn groups_conflicting(count: usize) {
        ::metrics::counter!(MetricName::MergeGroupsConflicting.as_str()).increment(count as u64);
    }

    pub fn records_without_key(count: usize) {
        ::metrics::counter!(MetricName::MergeRecordsWithoutKey.as_str()).increment(count as u64);
    }
}

/// Record how long a pipeline stage took
pub fn stage_duration(stage: &'static str, secs: f64) {
    ::metrics::histogram!(MetricName::StageDuration.as_str(), "stage" => stage).record(secs);
}
