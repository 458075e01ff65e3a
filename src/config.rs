//! Engine configuration with file loading, environment overrides and
//! validation.

use crate::errors::{EngineError, EngineResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Balance granted to an account on first contact, in the smallest
    /// currency unit.
    pub starting_balance: u64,
    /// Largest stake a single wager may carry.
    pub max_stake: u64,
    /// Upper bound on one wager lifecycle. An abandoned lifecycle settles as
    /// a stake forfeiture once this expires.
    pub resolve_timeout_ms: u64,
    /// Attempts a steered generator may spend before the honest-draw
    /// fallback takes over.
    pub generation_retry_budget: u32,
    /// Directory for the keyed store.
    pub data_dir: String,
    /// Fsync settlement commits before acknowledging the outcome.
    pub sync_writes: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            starting_balance: 1_000,
            max_stake: 100_000,
            resolve_timeout_ms: 10_000,
            generation_retry_budget: 64,
            data_dir: "./croupier_data".to_string(),
            sync_writes: true,
        }
    }
}

impl EngineConfig {
    /// Validate configuration values.
    pub fn validate(&self) -> EngineResult<()> {
        if self.max_stake == 0 {
            return Err(EngineError::Config(
                "max_stake cannot be zero".to_string(),
            ));
        }
        if self.generation_retry_budget == 0 {
            return Err(EngineError::Config(
                "generation_retry_budget cannot be zero".to_string(),
            ));
        }
        if self.resolve_timeout_ms < 100 {
            return Err(EngineError::Config(
                "resolve_timeout_ms must be at least 100".to_string(),
            ));
        }
        if self.data_dir.is_empty() {
            return Err(EngineError::Config("data_dir is required".to_string()));
        }
        Ok(())
    }
}

/// Configuration loader with environment variable support.
pub struct ConfigLoader {
    config_path: Option<String>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self { config_path: None }
    }

    /// Set the configuration file path.
    pub fn with_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_path = Some(path.as_ref().to_string_lossy().to_string());
        self
    }

    /// Load configuration from file and environment variables.
    pub fn load(&self) -> EngineResult<EngineConfig> {
        let mut config = if let Some(ref path) = self.config_path {
            self.load_from_file(path)?
        } else {
            EngineConfig::default()
        };

        self.apply_env_overrides(&mut config)?;
        config.validate()?;

        Ok(config)
    }

    fn load_from_file(&self, path: &str) -> EngineResult<EngineConfig> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| EngineError::Config(format!("failed to read {}: {}", path, e)))?;

        toml::from_str(&content)
            .map_err(|e| EngineError::Config(format!("failed to parse TOML: {}", e)))
    }

    fn apply_env_overrides(&self, config: &mut EngineConfig) -> EngineResult<()> {
        fn parse<T: std::str::FromStr>(field: &str, value: String) -> EngineResult<T> {
            value.parse().map_err(|_| {
                EngineError::Config(format!("invalid value for {}: '{}'", field, value))
            })
        }

        if let Ok(dir) = env::var("CROUPIER_DATA_DIR") {
            config.data_dir = dir;
        }
        if let Ok(v) = env::var("CROUPIER_STARTING_BALANCE") {
            config.starting_balance = parse("CROUPIER_STARTING_BALANCE", v)?;
        }
        if let Ok(v) = env::var("CROUPIER_MAX_STAKE") {
            config.max_stake = parse("CROUPIER_MAX_STAKE", v)?;
        }
        if let Ok(v) = env::var("CROUPIER_RESOLVE_TIMEOUT_MS") {
            config.resolve_timeout_ms = parse("CROUPIER_RESOLVE_TIMEOUT_MS", v)?;
        }
        if let Ok(v) = env::var("CROUPIER_GENERATION_RETRY_BUDGET") {
            config.generation_retry_budget = parse("CROUPIER_GENERATION_RETRY_BUDGET", v)?;
        }
        if let Ok(v) = env::var("CROUPIER_SYNC_WRITES") {
            config.sync_writes = parse("CROUPIER_SYNC_WRITES", v)?;
        }

        Ok(())
    }

    /// Save configuration to file.
    pub fn save(&self, config: &EngineConfig, path: &str) -> EngineResult<()> {
        let toml_string = toml::to_string_pretty(config)
            .map_err(|e| EngineError::Config(format!("failed to serialize config: {}", e)))?;

        std::fs::write(path, toml_string)
            .map_err(|e| EngineError::Config(format!("failed to write {}: {}", path, e)))
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
