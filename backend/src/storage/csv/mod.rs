//! # CSV Storage Module
//!
//! File-based storage for monthly plans and the planner configuration.
//!
//! ## File Structure
//!
//! ```text
//! data/
//! ├── planner_config.yaml
//! └── plans/
//!     └── plan_<uuid>/
//!         ├── plan.yaml
//!         ├── incomes.csv
//!         ├── expenses.csv
//!         └── envelopes.csv
//! ```
//!
//! Each plan is written as a whole into a temporary directory which is then
//! renamed into place, so a plan on disk is never half updated.

pub mod config_repository;
pub mod connection;
pub mod plan_repository;

#[cfg(test)]
pub mod test_utils;

pub use config_repository::ConfigRepository;
pub use connection::CsvConnection;
pub use plan_repository::PlanRepository;
