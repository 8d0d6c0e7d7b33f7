//! Domain-level command types.
//! These structs are inputs of [`PlanService`](super::plan_service::PlanService)
//! operations; front ends map their own input to them.

pub mod plan {
    use crate::domain::models::FixedItemList;

    /// Input for adding an income or expense line
    #[derive(Debug, Clone)]
    pub struct AddFixedItemCommand {
        pub plan_id: String,
        pub list: FixedItemList,
        pub name: String,
        pub amount: f64,
    }

    /// Input for editing an income or expense line; `None` keeps the value
    #[derive(Debug, Clone)]
    pub struct UpdateFixedItemCommand {
        pub plan_id: String,
        pub list: FixedItemList,
        pub item_id: String,
        pub name: Option<String>,
        pub amount: Option<f64>,
    }

    /// Kind of a new envelope
    #[derive(Debug, Clone, Copy, PartialEq)]
    pub enum EnvelopeDraft {
        /// Seeded with the percentage left to allocate
        Percentage,
        Fixed { amount: f64 },
    }

    /// Input for adding an envelope
    #[derive(Debug, Clone)]
    pub struct AddEnvelopeCommand {
        pub plan_id: String,
        pub name: String,
        pub draft: EnvelopeDraft,
    }
}
