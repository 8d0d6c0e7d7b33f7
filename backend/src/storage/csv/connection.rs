use anyhow::{Context, Result};
use log::info;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::config_repository::ConfigRepository;
use super::plan_repository::PlanRepository;
use crate::storage::traits::Connection;

/// Environment variable overriding the default data directory
pub const DATA_DIR_ENV: &str = "MONETO_DATA_DIR";

const DEFAULT_DIRECTORY_NAME: &str = "Moneto";
const PLANS_DIRECTORY_NAME: &str = "plans";

/// CsvConnection manages the data directory layout shared by the repositories
#[derive(Clone, Debug)]
pub struct CsvConnection {
    base_directory: Arc<PathBuf>,
}

impl CsvConnection {
    /// Create a new CSV connection with a base directory, creating it if needed
    pub fn new<P: AsRef<Path>>(base_directory: P) -> Result<Self> {
        let base_path = base_directory.as_ref().to_path_buf();

        if !base_path.exists() {
            fs::create_dir_all(&base_path)
                .with_context(|| format!("Failed to create data directory {:?}", base_path))?;
            info!("Created data directory: {}", base_path.display());
        }

        Ok(Self {
            base_directory: Arc::new(base_path),
        })
    }

    /// Connection on `$MONETO_DATA_DIR`, else `<documents>/Moneto`
    pub fn new_default() -> Result<Self> {
        Self::new(Self::default_data_directory()?)
    }

    pub fn default_data_directory() -> Result<PathBuf> {
        if let Ok(path) = std::env::var(DATA_DIR_ENV) {
            if !path.trim().is_empty() {
                return Ok(PathBuf::from(path));
            }
        }

        let documents = dirs::document_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| anyhow::anyhow!("Could not determine documents directory"))?;
        Ok(documents.join(DEFAULT_DIRECTORY_NAME))
    }

    /// Get the base directory path
    pub fn base_directory(&self) -> PathBuf {
        self.base_directory.as_ref().clone()
    }

    pub fn plans_directory(&self) -> PathBuf {
        self.base_directory.join(PLANS_DIRECTORY_NAME)
    }

    /// Directory holding one plan's files; `None` for an empty ID
    pub fn plan_directory(&self, plan_id: &str) -> Option<PathBuf> {
        let name = Self::plan_directory_name(plan_id);
        (!name.is_empty()).then(|| self.plans_directory().join(name))
    }

    /// File-system safe directory name for a plan ID (`plan::x` -> `plan_x`)
    pub fn plan_directory_name(plan_id: &str) -> String {
        plan_id
            .replace("::", "_")
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect()
    }
}

impl Connection for CsvConnection {
    type PlanRepository = PlanRepository;
    type ConfigRepository = ConfigRepository;

    fn create_plan_repository(&self) -> Self::PlanRepository {
        PlanRepository::new(self.clone())
    }

    fn create_config_repository(&self) -> Self::ConfigRepository {
        ConfigRepository::new(self.clone())
    }
}
