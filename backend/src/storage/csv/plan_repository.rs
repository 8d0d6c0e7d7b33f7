//! # CSV Plan Repository
//!
//! Stores each monthly plan in its own directory:
//!
//! ```text
//! plans/plan_<uuid>/
//! ├── plan.yaml       ← id, month, stored results, timestamps
//! ├── incomes.csv     ← id,name,amount
//! ├── expenses.csv    ← id,name,amount
//! └── envelopes.csv   ← id,name,type,percentage,amount
//! ```
//!
//! An empty `type` column is an envelope written before fixed envelopes
//! existed; it is read back as a percentage envelope.
//!
//! Writes go to `<dir>.tmp` first; the previous directory is moved aside to
//! `<dir>.old`, the new one renamed into place, and the old one removed.

use anyhow::{anyhow, Context, Result};
use csv::{Reader, Writer};
use log::{debug, info, warn};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use shared::{CalculatedResults, EnvelopeRecord, EnvelopeType, FixedItem, PlanRecord};
use std::fs;
use std::path::{Path, PathBuf};

use super::connection::CsvConnection;
use crate::domain::models::{load_plan, to_record, MonthlyPlan};
use crate::storage::traits::PlanStorage;

const PLAN_FILE: &str = "plan.yaml";
const INCOMES_FILE: &str = "incomes.csv";
const EXPENSES_FILE: &str = "expenses.csv";
const ENVELOPES_FILE: &str = "envelopes.csv";
const TEMP_SUFFIX: &str = ".tmp";
const OLD_SUFFIX: &str = ".old";

/// YAML part of a stored plan
#[derive(Debug, Clone, Serialize, Deserialize)]
struct YamlPlan {
    id: String,
    month: String,
    #[serde(default)]
    calculated_results: Option<CalculatedResults>,
    created_at: String,
    updated_at: String,
}

/// CSV row of `envelopes.csv`
#[derive(Debug, Clone, Serialize, Deserialize)]
struct EnvelopeRow {
    id: String,
    name: String,
    #[serde(rename = "type")]
    envelope_type: Option<EnvelopeType>,
    #[serde(default)]
    percentage: f64,
    #[serde(default)]
    amount: f64,
}

impl From<EnvelopeRecord> for EnvelopeRow {
    fn from(record: EnvelopeRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            envelope_type: record.envelope_type,
            percentage: record.percentage,
            amount: record.amount,
        }
    }
}

impl From<EnvelopeRow> for EnvelopeRecord {
    fn from(row: EnvelopeRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            envelope_type: row.envelope_type,
            percentage: row.percentage,
            amount: row.amount,
        }
    }
}

/// CSV/YAML plan repository using one directory per plan
#[derive(Clone)]
pub struct PlanRepository {
    connection: CsvConnection,
}

impl PlanRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    fn sibling(path: &Path, suffix: &str) -> PathBuf {
        let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        name.push(suffix);
        path.with_file_name(name)
    }

    fn write_rows<T: Serialize>(path: &Path, rows: impl IntoIterator<Item = T>) -> Result<()> {
        let mut writer = Writer::from_path(path)
            .with_context(|| format!("Failed to create {:?}", path))?;
        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
        Ok(())
    }

    fn read_rows<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
        if !path.exists() {
            return Ok(Vec::new());
        }
        let mut reader =
            Reader::from_path(path).with_context(|| format!("Failed to open {:?}", path))?;
        let mut rows = Vec::new();
        for row in reader.deserialize() {
            rows.push(row.with_context(|| format!("Invalid row in {:?}", path))?);
        }
        Ok(rows)
    }

    fn write_plan_files(directory: &Path, plan: &MonthlyPlan) -> Result<()> {
        let record = to_record(plan);

        let yaml = YamlPlan {
            id: record.id,
            month: record.month,
            calculated_results: record.calculated_results,
            created_at: record.created_at,
            updated_at: record.updated_at,
        };
        fs::write(directory.join(PLAN_FILE), serde_yaml::to_string(&yaml)?)?;

        Self::write_rows(&directory.join(INCOMES_FILE), record.fixed_incomes)?;
        Self::write_rows(&directory.join(EXPENSES_FILE), record.fixed_expenses)?;
        Self::write_rows(
            &directory.join(ENVELOPES_FILE),
            record.envelopes.into_iter().map(EnvelopeRow::from),
        )?;
        Ok(())
    }

    fn read_plan_directory(directory: &Path) -> Result<MonthlyPlan> {
        let plan_path = directory.join(PLAN_FILE);
        let yaml_content = fs::read_to_string(&plan_path)
            .with_context(|| format!("Failed to read {:?}", plan_path))?;
        let yaml: YamlPlan = serde_yaml::from_str(&yaml_content)
            .with_context(|| format!("Failed to parse {:?}", plan_path))?;

        let fixed_incomes: Vec<FixedItem> = Self::read_rows(&directory.join(INCOMES_FILE))?;
        let fixed_expenses: Vec<FixedItem> = Self::read_rows(&directory.join(EXPENSES_FILE))?;
        let envelopes: Vec<EnvelopeRow> = Self::read_rows(&directory.join(ENVELOPES_FILE))?;

        Ok(load_plan(PlanRecord {
            id: yaml.id,
            month: yaml.month,
            fixed_incomes,
            fixed_expenses,
            envelopes: envelopes.into_iter().map(EnvelopeRecord::from).collect(),
            calculated_results: yaml.calculated_results,
            created_at: yaml.created_at,
            updated_at: yaml.updated_at,
        }))
    }

    fn is_scratch_directory(path: &Path) -> bool {
        path.file_name()
            .and_then(|name| name.to_str())
            .map(|name| name.ends_with(TEMP_SUFFIX) || name.ends_with(OLD_SUFFIX))
            .unwrap_or(true)
    }
}

impl PlanStorage for PlanRepository {
    fn store_plan(&self, plan: &MonthlyPlan) -> Result<()> {
        let plans_directory = self.connection.plans_directory();
        fs::create_dir_all(&plans_directory)?;

        let target = self
            .connection
            .plan_directory(&plan.id)
            .ok_or_else(|| anyhow!("Cannot store a plan without an ID"))?;
        let temp = Self::sibling(&target, TEMP_SUFFIX);
        let old = Self::sibling(&target, OLD_SUFFIX);

        if temp.exists() {
            fs::remove_dir_all(&temp)?;
        }
        fs::create_dir_all(&temp)?;
        Self::write_plan_files(&temp, plan)
            .with_context(|| format!("Failed to write plan {}", plan.id))?;

        if target.exists() {
            if old.exists() {
                fs::remove_dir_all(&old)?;
            }
            fs::rename(&target, &old)?;
        }
        fs::rename(&temp, &target)?;
        if old.exists() {
            fs::remove_dir_all(&old)?;
        }

        debug!("Stored plan {} ({}) in {:?}", plan.id, plan.month, target);
        Ok(())
    }

    fn get_plan(&self, plan_id: &str) -> Result<Option<MonthlyPlan>> {
        let Some(directory) = self.connection.plan_directory(plan_id) else {
            return Ok(None);
        };
        if !directory.join(PLAN_FILE).exists() {
            debug!("Plan {} not found in {:?}", plan_id, directory);
            return Ok(None);
        }
        Self::read_plan_directory(&directory).map(Some)
    }

    fn list_plans(&self) -> Result<Vec<MonthlyPlan>> {
        let plans_directory = self.connection.plans_directory();
        if !plans_directory.exists() {
            return Ok(Vec::new());
        }

        let mut plans = Vec::new();
        for entry in fs::read_dir(&plans_directory)? {
            let path = entry?.path();
            if !path.is_dir() || Self::is_scratch_directory(&path) {
                continue;
            }
            if !path.join(PLAN_FILE).exists() {
                continue;
            }
            match Self::read_plan_directory(&path) {
                Ok(plan) => plans.push(plan),
                Err(e) => warn!("Skipping unreadable plan directory {:?}: {:#}", path, e),
            }
        }

        debug!("Listed {} plan(s) from {:?}", plans.len(), plans_directory);
        Ok(plans)
    }

    fn delete_plan(&self, plan_id: &str) -> Result<bool> {
        let Some(directory) = self.connection.plan_directory(plan_id) else {
            return Ok(false);
        };
        if !directory.exists() {
            return Ok(false);
        }
        fs::remove_dir_all(&directory)
            .with_context(|| format!("Failed to delete plan directory {:?}", directory))?;
        info!("Deleted plan {}", plan_id);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{Envelope, EnvelopeKind, FixedItemList};
    use crate::domain::plan_calculator::{create_plan, recalculate_plan};
    use crate::storage::csv::test_utils::TestEnvironment;

    fn stored_plan() -> MonthlyPlan {
        let mut plan = create_plan("2025-01");
        plan.fixed_incomes = vec![FixedItemList::Incomes.new_item("Salaire, net", 2500.0)];
        plan.fixed_expenses = vec![FixedItemList::Expenses.new_item("Loyer", 800.0)];
        plan.envelopes = vec![
            Envelope::new_fixed("Epargne", 200.0),
            Envelope::new_percentage("Courses", 100.0),
        ];
        recalculate_plan(plan)
    }

    #[test]
    fn test_store_and_get_round_trip() {
        let env = TestEnvironment::new().unwrap();
        let repo = PlanRepository::new(env.connection.clone());
        let plan = stored_plan();

        repo.store_plan(&plan).unwrap();
        let loaded = repo.get_plan(&plan.id).unwrap().unwrap();

        assert_eq!(loaded, plan);
    }

    #[test]
    fn test_get_missing_plan() {
        let env = TestEnvironment::new().unwrap();
        let repo = PlanRepository::new(env.connection.clone());

        assert!(repo.get_plan("plan::missing").unwrap().is_none());
        assert!(repo.list_plans().unwrap().is_empty());
    }

    #[test]
    fn test_store_replaces_previous_version() {
        let env = TestEnvironment::new().unwrap();
        let repo = PlanRepository::new(env.connection.clone());
        let mut plan = stored_plan();
        repo.store_plan(&plan).unwrap();

        plan.envelopes.truncate(1);
        plan.fixed_expenses.clear();
        let plan = recalculate_plan(plan);
        repo.store_plan(&plan).unwrap();

        let loaded = repo.get_plan(&plan.id).unwrap().unwrap();
        assert_eq!(loaded.envelopes.len(), 1);
        assert!(loaded.fixed_expenses.is_empty());

        let entries: Vec<_> = fs::read_dir(env.connection.plans_directory())
            .unwrap()
            .collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_list_skips_scratch_and_broken_directories() {
        let env = TestEnvironment::new().unwrap();
        let repo = PlanRepository::new(env.connection.clone());
        repo.store_plan(&stored_plan()).unwrap();

        let plans_directory = env.connection.plans_directory();
        fs::create_dir_all(plans_directory.join("plan_x.tmp")).unwrap();
        fs::create_dir_all(plans_directory.join("empty")).unwrap();
        let broken = plans_directory.join("broken");
        fs::create_dir_all(&broken).unwrap();
        fs::write(broken.join(PLAN_FILE), "id: [not closed").unwrap();

        assert_eq!(repo.list_plans().unwrap().len(), 1);
    }

    #[test]
    fn test_delete_plan() {
        let env = TestEnvironment::new().unwrap();
        let repo = PlanRepository::new(env.connection.clone());
        let plan = stored_plan();
        repo.store_plan(&plan).unwrap();

        assert!(repo.delete_plan(&plan.id).unwrap());
        assert!(!repo.delete_plan(&plan.id).unwrap());
        assert!(repo.get_plan(&plan.id).unwrap().is_none());
    }

    #[test]
    fn test_empty_id_leaves_stored_plans_alone() {
        let env = TestEnvironment::new().unwrap();
        let repo = PlanRepository::new(env.connection.clone());
        repo.store_plan(&stored_plan()).unwrap();
        repo.store_plan(&stored_plan()).unwrap();

        assert!(!repo.delete_plan("").unwrap());
        assert!(!repo.delete_plan("::").unwrap());
        assert!(repo.get_plan("").unwrap().is_none());
        assert_eq!(repo.list_plans().unwrap().len(), 2);

        let mut nameless = stored_plan();
        nameless.id = String::new();
        assert!(repo.store_plan(&nameless).is_err());
        assert_eq!(repo.list_plans().unwrap().len(), 2);
    }

    #[test]
    fn test_legacy_envelope_rows_without_type() {
        let env = TestEnvironment::new().unwrap();
        let directory = env.connection.plan_directory("plan::legacy").unwrap();
        fs::create_dir_all(&directory).unwrap();
        fs::write(
            directory.join(PLAN_FILE),
            "id: plan::legacy\nmonth: 2024-11\ncreated_at: 2024-11-01T08:00:00Z\nupdated_at: 2024-11-02T08:00:00Z\n",
        )
        .unwrap();
        fs::write(
            directory.join(ENVELOPES_FILE),
            "id,name,type,percentage,amount\nenv-1,Courses,,60,0\nenv-2,Voyage,fixed,0,150\n",
        )
        .unwrap();

        let repo = PlanRepository::new(env.connection.clone());
        let plan = repo.get_plan("plan::legacy").unwrap().unwrap();

        assert_eq!(plan.month, "2024-11");
        assert!(plan.fixed_incomes.is_empty());
        assert_eq!(
            plan.envelopes[0].kind,
            EnvelopeKind::Percentage { percentage: 60.0, amount: 0.0 }
        );
        assert_eq!(plan.envelopes[1].kind, EnvelopeKind::Fixed { amount: 150.0 });
        assert_eq!(plan.results.computed_at, "2024-11-02T08:00:00Z");
    }
}
