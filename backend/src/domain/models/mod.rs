pub mod config;
pub mod envelope;
pub mod plan;

pub use config::PlannerConfig;
pub use envelope::{Envelope, EnvelopeKind};
pub use plan::{load_plan, to_record, FixedItemList, MonthlyPlan, ResultsSnapshot};
