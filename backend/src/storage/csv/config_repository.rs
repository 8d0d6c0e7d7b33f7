//! # Planner Config Repository
//!
//! Stores the planner configuration in `planner_config.yaml` at the root of
//! the data directory.
//!
//! ## YAML Format
//!
//! ```yaml
//! currency: EUR
//! locale: fr-FR
//! auto_adjust_percentages: true
//! first_day_of_month: 1
//! data_format_version: "1.0"
//! created_at: "2025-01-21T19:30:00Z"
//! updated_at: "2025-01-21T19:35:00Z"
//! ```
//!
//! The file is created with defaults on first access and written through a
//! temp file followed by a rename.

use anyhow::{Context, Result};
use chrono::Utc;
use log::{debug, info};
use std::fs;
use std::path::PathBuf;

use super::connection::CsvConnection;
use crate::domain::models::PlannerConfig;
use crate::storage::traits::ConfigStorage;

const CONFIG_FILE: &str = "planner_config.yaml";

/// YAML-backed planner configuration repository
#[derive(Clone)]
pub struct ConfigRepository {
    connection: CsvConnection,
}

impl ConfigRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    fn config_path(&self) -> PathBuf {
        self.connection.base_directory().join(CONFIG_FILE)
    }

    /// Load the config from file, creating the default one if it doesn't exist
    fn load_or_create_config(&self) -> Result<PlannerConfig> {
        let config_path = self.config_path();

        if config_path.exists() {
            let yaml_content = fs::read_to_string(&config_path)?;
            let config: PlannerConfig = serde_yaml::from_str(&yaml_content)
                .with_context(|| format!("Failed to parse {:?}", config_path))?;
            debug!("Loaded planner config from {:?}", config_path);
            Ok(config)
        } else {
            let config = PlannerConfig::default();
            self.save_config(&config)?;
            info!("Created default planner config at {:?}", config_path);
            Ok(config)
        }
    }

    fn save_config(&self, config: &PlannerConfig) -> Result<()> {
        let config_path = self.config_path();
        let base_dir = self.connection.base_directory();

        if !base_dir.exists() {
            fs::create_dir_all(&base_dir)?;
            info!("Created base data directory: {:?}", base_dir);
        }

        let yaml_content = serde_yaml::to_string(config)?;

        let temp_path = config_path.with_extension("tmp");
        fs::write(&temp_path, yaml_content)?;
        fs::rename(&temp_path, &config_path)?;

        debug!("Saved planner config to {:?}", config_path);
        Ok(())
    }
}

impl ConfigStorage for ConfigRepository {
    fn get_config(&self) -> Result<PlannerConfig> {
        self.load_or_create_config()
    }

    fn update_config(&self, config: &PlannerConfig) -> Result<()> {
        if !(1..=28).contains(&config.first_day_of_month) {
            return Err(anyhow::anyhow!(
                "First day of month must be between 1 and 28, got {}",
                config.first_day_of_month
            ));
        }

        let mut updated_config = config.clone();
        updated_config.updated_at = Utc::now().to_rfc3339();

        self.save_config(&updated_config)?;
        info!("Updated planner config");
        Ok(())
    }
}
