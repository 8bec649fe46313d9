// Observability: metrics for the cleaning pipeline (logging lives in crate::logging)

pub mod metrics;

pub use metrics::{init, render};
