use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use csv::{ReaderBuilder, WriterBuilder};
use tracing::{debug, info};

use crate::app::ports::{RecordSourcePort, TableSinkPort};
use crate::constants;
use crate::error::{CleanerError, Result};
use crate::types::{CompanyRecord, OutputTable};

/// Parse a header-bearing CSV into records. Repeated headers get a `.N`
/// suffix (`name`, `name.1`, ...) so no column is silently overwritten.
pub fn read_records<R: Read>(
    reader: R,
    delimiter: u8,
    required: &[&str],
) -> Result<Vec<CompanyRecord>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(reader);

    let headers = dedupe_headers(rdr.headers()?.iter().map(|h| h.trim()));
    for column in required {
        if !headers.iter().any(|h| h == column) {
            return Err(CleanerError::MissingColumn(column.to_string()));
        }
    }

    let mut records = Vec::new();
    for row in rdr.records() {
        let row = row?;
        let pairs = headers
            .iter()
            .enumerate()
            .map(|(idx, header)| (header.clone(), row.get(idx).unwrap_or("").trim().to_string()));
        records.push(CompanyRecord::from_pairs(pairs));
    }
    Ok(records)
}

fn dedupe_headers<'a>(raw: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    raw.map(|header| {
        let count = seen.entry(header.to_string()).or_insert(0);
        let name = if *count == 0 {
            header.to_string()
        } else {
            format!("{}.{}", header, count)
        };
        *count += 1;
        name
    })
    .collect()
}

/// Write a table with its header row
pub fn write_table<W: Write>(writer: W, delimiter: u8, table: &OutputTable) -> Result<()> {
    let mut wtr = WriterBuilder::new().delimiter(delimiter).from_writer(writer);
    wtr.write_record(&table.columns)?;
    for row in &table.rows {
        wtr.write_record(row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// File-based implementation of RecordSourcePort
pub struct CsvRecordSource {
    path: PathBuf,
    delimiter: u8,
}

impl CsvRecordSource {
    pub fn new(path: impl AsRef<Path>, delimiter: u8) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            delimiter,
        }
    }
}

#[async_trait::async_trait]
impl RecordSourcePort for CsvRecordSource {
    async fn read_records(&self) -> anyhow::Result<Vec<CompanyRecord>> {
        let path = self.path.clone();
        let delimiter = self.delimiter;
        let records = tokio::task::spawn_blocking(move || -> Result<Vec<CompanyRecord>> {
            let file = File::open(&path)?;
            read_records(file, delimiter, &[constants::ID, constants::NAME])
        })
        .await?
        .with_context(|| format!("Failed to read input table '{}'", self.path.display()))?;

        info!(path = %self.path.display(), rows = records.len(), "Input table loaded");
        Ok(records)
    }
}

/// File-based implementation of TableSinkPort; the file is replaced on every write
pub struct CsvTableSink {
    path: PathBuf,
    delimiter: u8,
}

impl CsvTableSink {
    pub fn new(path: impl AsRef<Path>, delimiter: u8) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            delimiter,
        }
    }
}

#[async_trait::async_trait]
impl TableSinkPort for CsvTableSink {
    async fn write_table(&self, table: &OutputTable) -> anyhow::Result<()> {
        let path = self.path.clone();
        let delimiter = self.delimiter;
        let table = table.clone();
        let rows = table.rows.len();

        tokio::task::spawn_blocking(move || -> Result<()> {
            if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
                fs::create_dir_all(dir)?;
            }
            debug!(path = %path.display(), "Writing table");
            write_table(File::create(&path)?, delimiter, &table)
        })
        .await?
        .with_context(|| format!("Failed to write table '{}'", self.path.display()))?;

        info!(path = %self.path.display(), rows, "Table written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeated_headers_are_suffixed() {
        let input = "id,name,name,name\n1,Acme,ACME SL,acme\n";
        let records = read_records(input.as_bytes(), b',', &[]).expect("parses");
        assert_eq!(records[0].get("name"), Some("Acme"));
        assert_eq!(records[0].get("name.1"), Some("ACME SL"));
        assert_eq!(records[0].get("name.2"), Some("acme"));
    }

    #[test]
    fn test_empty_and_short_rows_are_absent() {
        let input = "id;name;email\n1;;\n2;Bar\n";
        let records = read_records(input.as_bytes(), b';', &[]).expect("parses");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("name"), None);
        assert_eq!(records[1].get("name"), Some("Bar"));
        assert_eq!(records[1].get("email"), None);
    }

    #[test]
    fn test_missing_required_column_is_an_error() {
        let input = "id,address\n1,Calle Mayor\n";
        let err = read_records(input.as_bytes(), b',', &["id", "name"]).unwrap_err();
        assert!(matches!(err, CleanerError::MissingColumn(ref c) if c == "name"));
    }

    #[tokio::test]
    async fn test_sink_then_source_on_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("out.csv");
        let table = OutputTable {
            columns: vec!["id".to_string(), "name".to_string(), "mode".to_string()],
            rows: vec![
                vec!["1".to_string(), "ACME, S.L.".to_string(), "Estimated//Real".to_string()],
                vec!["3".to_string(), "BAR PEPE".to_string(), String::new()],
            ],
        };

        CsvTableSink::new(&path, b',').write_table(&table).await.expect("write");
        let records = CsvRecordSource::new(&path, b',')
            .read_records()
            .await
            .expect("read");

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("name"), Some("ACME, S.L."));
        assert_eq!(records[0].get("mode"), Some("Estimated//Real"));
        assert_eq!(records[1].get("mode"), None);
    }

    #[tokio::test]
    async fn test_missing_input_file_reports_path() {
        let source = CsvRecordSource::new("does/not/exist.csv", b',');
        let err = source.read_records().await.unwrap_err();
        assert!(format!("{:#}", err).contains("does/not/exist.csv"));
    }
}
