//! # Storage Traits
//!
//! Storage abstraction used by the domain layer. Services depend on these
//! traits through a [`Connection`], never on a concrete file layout.

use anyhow::Result;

use crate::domain::models::{MonthlyPlan, PlannerConfig};

/// Trait defining the interface for plan storage operations.
///
/// A stored plan is always a complete, recalculated plan; implementations
/// must never leave a partially written plan behind.
pub trait PlanStorage: Send + Sync {
    /// Store a plan, replacing any plan with the same ID
    fn store_plan(&self, plan: &MonthlyPlan) -> Result<()>;

    /// Retrieve a plan by ID, upgraded to the current shape
    fn get_plan(&self, plan_id: &str) -> Result<Option<MonthlyPlan>>;

    /// List every stored plan, in no particular order
    fn list_plans(&self) -> Result<Vec<MonthlyPlan>>;

    /// Delete a plan
    /// Returns true if the plan was found and deleted, false otherwise
    fn delete_plan(&self, plan_id: &str) -> Result<bool>;
}

/// Trait defining the interface for planner configuration storage
pub trait ConfigStorage: Send + Sync {
    /// Get the configuration, creating the default one on first access
    fn get_config(&self) -> Result<PlannerConfig>;

    /// Replace the configuration; `updated_at` is refreshed
    fn update_config(&self, config: &PlannerConfig) -> Result<()>;
}

/// Connection to a storage backend, handing out its repositories
pub trait Connection: Send + Sync + Clone {
    type PlanRepository: PlanStorage;
    type ConfigRepository: ConfigStorage;

    fn create_plan_repository(&self) -> Self::PlanRepository;

    fn create_config_repository(&self) -> Self::ConfigRepository;
}
