// Application layer: use cases orchestrating the cleaning pipeline behind ports

pub mod clean_use_case;
pub mod ports;

pub use clean_use_case::{CleanCompaniesUseCase, RunSummary};
