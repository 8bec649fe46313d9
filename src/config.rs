use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::info;

use crate::constants;
use crate::error::{CleanerError, Result};
use crate::pipeline::processing::merge::ColumnPolicies;
use crate::pipeline::processing::reference::ReferenceData;

/// Environment variable naming the config file when `--config` is not given
pub const CONFIG_ENV_VAR: &str = "COMPANY_CLEANER_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub io: IoConfig,
    pub reference: ReferenceConfig,
    pub schema: SchemaConfig,
    pub defaults: DefaultsConfig,
    pub normalize: NormalizeConfig,
    pub merge: MergeConfig,
    pub pipeline: PipelineConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IoConfig {
    pub input: String,
    pub intermediate: String,
    pub output: String,
    pub delimiter: char,
}

impl Default for IoConfig {
    fn default() -> Self {
        Self {
            input: "data/companies.csv".to_string(),
            intermediate: "output/intermediate.csv".to_string(),
            output: "output/final_result.csv".to_string(),
            delimiter: ',',
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceConfig {
    /// TOML file with the reference tables; the built-in tables are used when unset
    pub path: Option<String>,
}

impl ReferenceConfig {
    pub fn load_reference(&self) -> Result<ReferenceData> {
        match &self.path {
            Some(path) => ReferenceData::load(path),
            None => {
                info!("Using built-in reference tables");
                ReferenceData::builtin()
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaConfig {
    pub drop_columns: Vec<String>,
    pub rename_columns: BTreeMap<String, String>,
    /// Rows without a value here are dropped before normalization
    pub required_column: String,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            drop_columns: vec!["country_user".to_string(), "name.1".to_string()],
            rename_columns: BTreeMap::from([
                ("Longitude".to_string(), "longitude".to_string()),
                ("Latitude".to_string(), "latitude".to_string()),
            ]),
            required_column: constants::NAME.to_string(),
        }
    }
}

/// Extra or overriding fill values, applied on top of the built-in defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DefaultsConfig {
    #[serde(flatten)]
    pub values: BTreeMap<String, String>,
}

impl DefaultsConfig {
    /// Built-in defaults merged with configured overrides, in a stable order
    pub fn effective(&self) -> Vec<(String, String)> {
        let mut merged: BTreeMap<String, String> = constants::default_fill_values()
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        merged.extend(self.values.clone());
        merged.into_iter().collect()
    }
}

/// Locale and vocabulary used by the single-field formatters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizeConfig {
    pub decimal_separator: char,
    pub thousands_separator: char,
    pub currency_symbols: Vec<String>,
    pub status_active: Vec<String>,
    pub mode_estimated: Vec<String>,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        let strings =
            |items: &[&str]| -> Vec<String> { items.iter().map(|s| s.to_string()).collect() };
        Self {
            decimal_separator: ',',
            thousands_separator: '.',
            currency_symbols: strings(&["$", "USD", "€", "EUR", "£"]),
            status_active: strings(&["activa", "active"]),
            mode_estimated: strings(&["estimated", "estimate"]),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    pub group_key: String,
    pub delimiter: String,
    pub policies: ColumnPolicies,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            group_key: constants::ID.to_string(),
            delimiter: constants::MERGE_DELIMITER.to_string(),
            policies: ColumnPolicies::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Blocking tasks used for address decomposition
    pub workers: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self { workers: 4 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub dir: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: "logs".to_string(),
        }
    }
}

impl Config {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            CleanerError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&content)
    }

    /// Explicit path first, then the environment, then `config.toml` if it
    /// exists; built-in defaults otherwise.
    pub fn resolve(explicit: Option<&str>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            return Self::load(path);
        }
        if Path::new(DEFAULT_CONFIG_PATH).exists() {
            return Self::load(DEFAULT_CONFIG_PATH);
        }
        Ok(Self::default())
    }

    fn validate(&self) -> Result<()> {
        if self.merge.delimiter.is_empty() {
            return Err(CleanerError::Config("merge.delimiter must not be empty".to_string()));
        }
        if self.merge.group_key.is_empty() {
            return Err(CleanerError::Config("merge.group_key must not be empty".to_string()));
        }
        if !self.io.delimiter.is_ascii() {
            return Err(CleanerError::Config(format!(
                "io.delimiter '{}' must be a single ASCII character",
                self.io.delimiter
            )));
        }
        if self.normalize.decimal_separator == self.normalize.thousands_separator {
            return Err(CleanerError::Config(
                "normalize.decimal_separator and thousands_separator must differ".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::processing::merge::ConflictPolicy;

    #[test]
    fn test_empty_file_yields_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config.merge.delimiter, "//");
        assert_eq!(config.merge.group_key, "id");
        assert_eq!(config.merge.policies.policy_for("mode"), ConflictPolicy::FullDisclosure);
        assert_eq!(config.merge.policies.policy_for("activity"), ConflictPolicy::Consensus);
        assert_eq!(config.schema.required_column, "name");
        assert_eq!(config.pipeline.workers, 4);
    }

    #[test]
    fn test_sections_override_defaults() {
        let content = r#"
            [io]
            input = "in.csv"
            delimiter = ";"

            [defaults]
            currency = "USD"

            [merge.policies]
            default = "consensus"

            [merge.policies.columns]
            status = "full_disclosure"
        "#;
        let config = Config::from_toml_str(content).unwrap();
        assert_eq!(config.io.input, "in.csv");
        assert_eq!(config.io.delimiter, ';');
        assert_eq!(config.io.output, "output/final_result.csv");
        assert_eq!(config.merge.policies.policy_for("status"), ConflictPolicy::FullDisclosure);

        let defaults = config.defaults.effective();
        assert!(defaults.contains(&("currency".to_string(), "USD".to_string())));
        assert!(defaults.contains(&("mode".to_string(), "Estimated".to_string())));
    }

    #[test]
    fn test_rejects_empty_delimiter() {
        let err = Config::from_toml_str("[merge]\ndelimiter = \"\"").unwrap_err();
        assert!(matches!(err, CleanerError::Config(_)));
    }

    #[test]
    fn test_shipped_config_parses() {
        let config = Config::from_toml_str(include_str!("../config.toml")).unwrap();
        assert_eq!(config.reference.path.as_deref(), Some("reference.toml"));
        assert_eq!(config.merge.policies.policy_for("mode"), ConflictPolicy::FullDisclosure);
        assert_eq!(config.merge.policies.policy_for("activity"), ConflictPolicy::Consensus);
        assert_eq!(config.pipeline.workers, 4);
    }
}
