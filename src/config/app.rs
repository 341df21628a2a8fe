//! Main application configuration
//!
//! This module defines the top-level configuration for the skill-rating
//! binary, including environment variable loading, TOML file loading and
//! validation.

use crate::config::rating::EngineConfig;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub service: ServiceSettings,
    #[serde(default)]
    pub engine: EngineConfig,
}

/// Service-level settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceSettings {
    /// Service name for logging
    pub name: String,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Length of one Glicko-2 rating period in seconds
    pub rating_period_seconds: i64,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            name: "skill-rating".to_string(),
            log_level: "info".to_string(),
            rating_period_seconds: 86_400, // one day
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables with fallback to defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        validate_config(&config)?;
        Ok(config)
    }

    /// Load configuration from a TOML file, then apply environment overrides
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config: AppConfig = toml::from_str(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.apply_env()?;
        validate_config(&config)?;
        Ok(config)
    }

    fn apply_env(&mut self) -> Result<()> {
        // Service settings
        if let Ok(name) = env::var("SERVICE_NAME") {
            self.service.name = name;
        }
        if let Ok(log_level) = env::var("LOG_LEVEL") {
            self.service.log_level = log_level;
        }
        if let Ok(period) = env::var("RATING_PERIOD_SECONDS") {
            self.service.rating_period_seconds = period
                .parse()
                .map_err(|_| anyhow!("Invalid RATING_PERIOD_SECONDS value: {}", period))?;
        }

        // Glicko-2 settings
        if let Ok(tau) = env::var("GLICKO2_TAU") {
            self.engine.glicko2.tau = tau
                .parse()
                .map_err(|_| anyhow!("Invalid GLICKO2_TAU value: {}", tau))?;
        }
        if let Ok(min_rd) = env::var("GLICKO2_MIN_DEVIATION") {
            self.engine.glicko2.min_deviation = min_rd
                .parse()
                .map_err(|_| anyhow!("Invalid GLICKO2_MIN_DEVIATION value: {}", min_rd))?;
        }
        if let Ok(iterations) = env::var("GLICKO2_MAX_ITERATIONS") {
            self.engine.glicko2.max_iterations = iterations.parse().map_err(|_| {
                anyhow!("Invalid GLICKO2_MAX_ITERATIONS value: {}", iterations)
            })?;
        }

        // Category selection
        if let Ok(system) = env::var("DEFAULT_RATING_SYSTEM") {
            self.engine.categories.default_system = system
                .parse()
                .map_err(|e| anyhow!("Invalid DEFAULT_RATING_SYSTEM value: {}", e))?;
        }

        Ok(())
    }

    /// Get the rating period as a chrono Duration
    pub fn rating_period(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.service.rating_period_seconds)
    }
}

/// Validate configuration values
pub fn validate_config(config: &AppConfig) -> Result<()> {
    // Validate log level
    match config.service.log_level.to_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        _ => return Err(anyhow!("Invalid log level: {}", config.service.log_level)),
    }

    if config.service.rating_period_seconds <= 0 {
        return Err(anyhow!("Rating period must be greater than 0"));
    }

    config.engine.validate()?;

    Ok(())
}
