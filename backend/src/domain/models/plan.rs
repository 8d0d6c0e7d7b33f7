//! Domain model for a monthly plan and its versioned loading from records.
use log::debug;
use shared::{CalculatedResults, EnvelopeRecord, FixedItem, PlanRecord};
use uuid::Uuid;

use super::envelope::Envelope;

/// Which fixed list of a plan an item belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixedItemList {
    Incomes,
    Expenses,
}

impl FixedItemList {
    pub fn generate_id(&self) -> String {
        match self {
            FixedItemList::Incomes => format!("income::{}", Uuid::new_v4()),
            FixedItemList::Expenses => format!("expense::{}", Uuid::new_v4()),
        }
    }

    /// Singular label used in messages
    pub fn label(&self) -> &'static str {
        match self {
            FixedItemList::Incomes => "income",
            FixedItemList::Expenses => "expense",
        }
    }

    /// New item with a generated ID
    pub fn new_item(&self, name: &str, amount: f64) -> FixedItem {
        FixedItem {
            id: self.generate_id(),
            name: name.trim().to_string(),
            amount,
        }
    }
}

/// Derived totals of a plan, regenerated wholesale on every recalculation
#[derive(Debug, Clone, PartialEq)]
pub struct ResultsSnapshot {
    pub total_income: f64,
    pub total_expenses: f64,
    pub available_amount: f64,
    pub total_envelopes: f64,
    pub final_balance: f64,
    /// RFC 3339
    pub computed_at: String,
}

impl ResultsSnapshot {
    pub fn zeroed(computed_at: String) -> Self {
        Self {
            total_income: 0.0,
            total_expenses: 0.0,
            available_amount: 0.0,
            total_envelopes: 0.0,
            final_balance: 0.0,
            computed_at,
        }
    }
}

impl From<CalculatedResults> for ResultsSnapshot {
    fn from(results: CalculatedResults) -> Self {
        Self {
            total_income: results.total_income,
            total_expenses: results.total_expenses,
            available_amount: results.available_amount,
            total_envelopes: results.total_envelopes,
            final_balance: results.final_balance,
            computed_at: results.last_calculated,
        }
    }
}

impl From<&ResultsSnapshot> for CalculatedResults {
    fn from(snapshot: &ResultsSnapshot) -> Self {
        Self {
            total_income: snapshot.total_income,
            total_expenses: snapshot.total_expenses,
            available_amount: snapshot.available_amount,
            total_envelopes: snapshot.total_envelopes,
            final_balance: snapshot.final_balance,
            last_calculated: snapshot.computed_at.clone(),
        }
    }
}

/// A month's budget: fixed incomes, fixed expenses and envelopes.
///
/// The plan exclusively owns its lists and snapshot. Nothing is shared
/// between plans; copies go through [`MonthlyPlan::duplicate_for_month`].
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyPlan {
    pub id: String,
    /// Format: YYYY-MM
    pub month: String,
    pub fixed_incomes: Vec<FixedItem>,
    pub fixed_expenses: Vec<FixedItem>,
    pub envelopes: Vec<Envelope>,
    pub results: ResultsSnapshot,
    pub created_at: String,
    pub updated_at: String,
}

impl MonthlyPlan {
    pub fn generate_id() -> String {
        format!("plan::{}", Uuid::new_v4())
    }

    /// Empty plan with zeroed results
    pub fn empty(month: &str, now: &str) -> Self {
        Self {
            id: Self::generate_id(),
            month: month.to_string(),
            fixed_incomes: Vec::new(),
            fixed_expenses: Vec::new(),
            envelopes: Vec::new(),
            results: ResultsSnapshot::zeroed(now.to_string()),
            created_at: now.to_string(),
            updated_at: now.to_string(),
        }
    }

    pub fn items(&self, list: FixedItemList) -> &[FixedItem] {
        match list {
            FixedItemList::Incomes => &self.fixed_incomes,
            FixedItemList::Expenses => &self.fixed_expenses,
        }
    }

    pub fn items_mut(&mut self, list: FixedItemList) -> &mut Vec<FixedItem> {
        match list {
            FixedItemList::Incomes => &mut self.fixed_incomes,
            FixedItemList::Expenses => &mut self.fixed_expenses,
        }
    }

    pub fn envelope(&self, envelope_id: &str) -> Option<&Envelope> {
        self.envelopes.iter().find(|e| e.id == envelope_id)
    }

    pub fn envelope_mut(&mut self, envelope_id: &str) -> Option<&mut Envelope> {
        self.envelopes.iter_mut().find(|e| e.id == envelope_id)
    }

    /// Deep copy for another month: new plan ID, new item and envelope IDs
    pub fn duplicate_for_month(&self, month: &str, now: &str) -> Self {
        Self {
            id: Self::generate_id(),
            month: month.to_string(),
            fixed_incomes: self
                .fixed_incomes
                .iter()
                .map(|item| FixedItemList::Incomes.new_item(&item.name, item.amount))
                .collect(),
            fixed_expenses: self
                .fixed_expenses
                .iter()
                .map(|item| FixedItemList::Expenses.new_item(&item.name, item.amount))
                .collect(),
            envelopes: self.envelopes.iter().map(Envelope::with_fresh_id).collect(),
            results: self.results.clone(),
            created_at: now.to_string(),
            updated_at: now.to_string(),
        }
    }
}

/// Build a plan from its stored record, upgrading older shapes.
///
/// - envelopes without a `type` are percentage envelopes
/// - plans without stored results get a zeroed snapshot
///
/// Callers recalculate after loading; stored results are never trusted.
pub fn load_plan(record: PlanRecord) -> MonthlyPlan {
    let legacy_envelopes = record
        .envelopes
        .iter()
        .filter(|e| e.envelope_type.is_none())
        .count();
    if legacy_envelopes > 0 {
        debug!(
            "Plan {}: {} envelope(s) without type loaded as percentage envelopes",
            record.id, legacy_envelopes
        );
    }

    let results = match record.calculated_results {
        Some(results) => ResultsSnapshot::from(results),
        None => {
            debug!("Plan {}: no stored results, starting from zero", record.id);
            ResultsSnapshot::zeroed(record.updated_at.clone())
        }
    };

    MonthlyPlan {
        id: record.id,
        month: record.month,
        fixed_incomes: record.fixed_incomes,
        fixed_expenses: record.fixed_expenses,
        envelopes: record.envelopes.into_iter().map(Envelope::from).collect(),
        results,
        created_at: record.created_at,
        updated_at: record.updated_at,
    }
}

/// Stored record of a plan
pub fn to_record(plan: &MonthlyPlan) -> PlanRecord {
    PlanRecord {
        id: plan.id.clone(),
        month: plan.month.clone(),
        fixed_incomes: plan.fixed_incomes.clone(),
        fixed_expenses: plan.fixed_expenses.clone(),
        envelopes: plan.envelopes.iter().map(EnvelopeRecord::from).collect(),
        calculated_results: Some(CalculatedResults::from(&plan.results)),
        created_at: plan.created_at.clone(),
        updated_at: plan.updated_at.clone(),
    }
}
