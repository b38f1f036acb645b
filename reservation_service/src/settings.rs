use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File};
use scylla::statement::Consistency;
use serde::Deserialize;

use crate::store_client::StoreConfig;

#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("Failed to open store session {0}")]
    Session(#[from] scylla::errors::NewSessionError),

    #[error("Failed to load settings {0}")]
    Settings(#[from] config::ConfigError),

    #[error("Invalid setting {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Copy, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum ConsistencyLevel {
    Any,
    One,
    Two,
    Three,
    Quorum,
    All,
    LocalQuorum,
    EachQuorum,
    LocalOne,
}

impl From<ConsistencyLevel> for Consistency {
    fn from(level: ConsistencyLevel) -> Self {
        match level {
            ConsistencyLevel::Any => Consistency::Any,
            ConsistencyLevel::One => Consistency::One,
            ConsistencyLevel::Two => Consistency::Two,
            ConsistencyLevel::Three => Consistency::Three,
            ConsistencyLevel::Quorum => Consistency::Quorum,
            ConsistencyLevel::All => Consistency::All,
            ConsistencyLevel::LocalQuorum => Consistency::LocalQuorum,
            ConsistencyLevel::EachQuorum => Consistency::EachQuorum,
            ConsistencyLevel::LocalOne => Consistency::LocalOne,
        }
    }
}

/// How a fresh confirmation number is secured against the store
#[derive(Debug, Clone, Copy, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum AllocationStrategy {
    /// Look the candidate up, then insert unconditionally.
    /// Two concurrent creates may both pass the lookup for the same candidate.
    #[default]
    Probe,
    /// Insert with `IF NOT EXISTS` and draw again when the insert was not applied
    ConditionalInsert,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub contact_points: Vec<String>,
    pub keyspace: String,
    pub consistency_level: Option<ConsistencyLevel>,
    pub max_allocation_retries: u32,
    pub allocation_strategy: AllocationStrategy,
    pub use_in_memory_db: bool,
    pub http_port: u16,
}

impl Settings {
    /// Defaults for every option
    pub fn builder() -> Result<ConfigBuilder<DefaultState>, ConfigurationError> {
        Ok(Config::builder()
            .set_default("contact_points", vec!["127.0.0.1:9042"])?
            .set_default("keyspace", "reservation")?
            .set_default("max_allocation_retries", 16)?
            .set_default("allocation_strategy", "probe")?
            .set_default("use_in_memory_db", false)?
            .set_default("http_port", 8080)?)
    }

    /// Defaults, overridden by an optional `reservation_service` config file,
    /// overridden by `RESERVATION__*` environment variables
    pub fn load() -> Result<Self, ConfigurationError> {
        let config = Self::builder()?
            .add_source(File::with_name("reservation_service").required(false))
            .add_source(
                Environment::with_prefix("RESERVATION")
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("contact_points")
                    .try_parsing(true),
            )
            .build()?;
        Self::from_config(config)
    }

    pub fn from_config(config: Config) -> Result<Self, ConfigurationError> {
        let settings: Settings = config.try_deserialize()?;

        if settings.max_allocation_retries == 0 {
            return Err(ConfigurationError::Invalid(
                "max_allocation_retries must be positive".to_string(),
            ));
        }
        if settings.contact_points.is_empty() {
            return Err(ConfigurationError::Invalid(
                "at least one contact point is required".to_string(),
            ));
        }
        Ok(settings)
    }

    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            contact_points: self.contact_points.clone(),
            keyspace: self.keyspace.clone(),
            consistency: self.consistency_level.map(Consistency::from),
        }
    }
}

#[cfg(test)]
mod settings_tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings =
            Settings::from_config(Settings::builder().unwrap().build().unwrap()).unwrap();

        assert_eq!(settings.contact_points, vec!["127.0.0.1:9042".to_string()]);
        assert_eq!(settings.keyspace, "reservation");
        assert_eq!(settings.consistency_level, None);
        assert_eq!(settings.max_allocation_retries, 16);
        assert_eq!(settings.allocation_strategy, AllocationStrategy::Probe);
        assert!(!settings.use_in_memory_db);
        assert_eq!(settings.http_port, 8080);
    }

    #[test]
    fn test_overrides() {
        let config = Settings::builder()
            .unwrap()
            .set_override("contact_points", vec!["10.0.0.1:9042", "10.0.0.2:9042"])
            .unwrap()
            .set_override("keyspace", "reservation_test")
            .unwrap()
            .set_override("consistency_level", "local_quorum")
            .unwrap()
            .set_override("allocation_strategy", "conditional_insert")
            .unwrap()
            .build()
            .unwrap();
        let settings = Settings::from_config(config).unwrap();

        assert_eq!(settings.contact_points.len(), 2);
        assert_eq!(settings.keyspace, "reservation_test");
        assert_eq!(
            settings.consistency_level,
            Some(ConsistencyLevel::LocalQuorum)
        );
        assert_eq!(
            settings.allocation_strategy,
            AllocationStrategy::ConditionalInsert
        );

        let store_config = settings.store_config();
        assert_eq!(store_config.consistency, Some(Consistency::LocalQuorum));
        assert_eq!(store_config.keyspace, "reservation_test");
    }

    #[test]
    fn test_zero_retries_rejected() {
        let config = Settings::builder()
            .unwrap()
            .set_override("max_allocation_retries", 0)
            .unwrap()
            .build()
            .unwrap();

        assert!(matches!(
            Settings::from_config(config),
            Err(ConfigurationError::Invalid(..))
        ));
    }

    #[test]
    fn test_unknown_consistency_rejected() {
        let config = Settings::builder()
            .unwrap()
            .set_override("consistency_level", "most")
            .unwrap()
            .build()
            .unwrap();

        assert!(matches!(
            Settings::from_config(config),
            Err(ConfigurationError::Settings(..))
        ));
    }
}
