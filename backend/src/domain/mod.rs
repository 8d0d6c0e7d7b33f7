//! Domain layer of the envelope planner.
//!
//! The pure allocation core (`validation`, `fixed_items`, `envelopes`,
//! `allocation`, `plan_calculator`, `plan_validation`) never touches storage.
//! The services on top of it (`plan_service`, `export_service`,
//! `notification_service`) add persistence and file exchange.

pub mod allocation;
pub mod commands;
pub mod envelopes;
pub mod export_service;
pub mod fixed_items;
pub mod formatting;
pub mod models;
pub mod notification_service;
pub mod plan_calculator;
pub mod plan_service;
pub mod plan_validation;
pub mod validation;

#[cfg(test)]
pub(crate) mod test_fixtures;

pub use export_service::{ExportService, ImportOutcome};
pub use notification_service::{MonthStatus, NotificationService};
pub use plan_service::{PlanService, PlanServiceError};
