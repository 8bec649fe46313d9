use thiserror::Error;

#[derive(Error, Debug)]
pub enum CleanerError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid reference pattern: {0}")]
    Regex(#[from] regex::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Reference data error: {0}")]
    Reference(String),

    #[error("Missing required column: {0}")]
    MissingColumn(String),
}

pub type Result<T> = std::result::Result<T, CleanerError>;
