// Data cleaning pipeline stages

pub mod processing;
