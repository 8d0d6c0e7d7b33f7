//! Whole-plan consistency checks.
//!
//! Unlike field validation, every check runs and all failures are reported
//! together so the user sees the full picture at once.

use shared::PlanValidation;

use crate::domain::allocation::is_percentage_valid;
use crate::domain::fixed_items::available_amount;
use crate::domain::models::MonthlyPlan;

pub const NO_INCOME: &str = "No fixed income defined";
pub const NO_EXPENSE: &str = "No fixed expense defined";
pub const NO_ENVELOPE: &str = "No envelope defined";
pub const PERCENTAGE_SUM: &str = "Percentage sum must equal 100%";
pub const EXPENSES_EXCEED_INCOME: &str = "Fixed expenses exceed fixed income";

pub fn validate_plan(plan: &MonthlyPlan) -> PlanValidation {
    let mut errors = Vec::new();

    if plan.fixed_incomes.is_empty() {
        errors.push(NO_INCOME.to_string());
    }
    if plan.fixed_expenses.is_empty() {
        errors.push(NO_EXPENSE.to_string());
    }
    if plan.envelopes.is_empty() {
        errors.push(NO_ENVELOPE.to_string());
    } else if !is_percentage_valid(&plan.envelopes) {
        errors.push(PERCENTAGE_SUM.to_string());
    }
    if available_amount(&plan.fixed_incomes, &plan.fixed_expenses) < 0.0 {
        errors.push(EXPENSES_EXCEED_INCOME.to_string());
    }

    PlanValidation {
        valid: errors.is_empty(),
        errors,
    }
}
