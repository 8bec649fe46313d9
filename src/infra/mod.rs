// Infrastructure adapters implementing the application ports

pub mod csv_adapter;

pub use csv_adapter::{CsvRecordSource, CsvTableSink};
