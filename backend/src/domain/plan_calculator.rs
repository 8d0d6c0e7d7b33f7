//! Results calculation for monthly plans.
//!
//! [`calculate_results`] is the only producer of plan totals. Every mutation
//! of a plan ends with [`recalculate_plan`], which refreshes envelope amounts
//! and the snapshot together so they never disagree.

use chrono::Utc;
use log::debug;

use crate::domain::allocation::AllocationBreakdown;
use crate::domain::models::{MonthlyPlan, ResultsSnapshot};

/// Snapshot of the plan's totals stamped with the current time
pub fn calculate_results(plan: &MonthlyPlan) -> ResultsSnapshot {
    calculate_results_at(plan, &Utc::now().to_rfc3339())
}

/// Snapshot of the plan's totals stamped with `computed_at`
pub fn calculate_results_at(plan: &MonthlyPlan, computed_at: &str) -> ResultsSnapshot {
    let breakdown =
        AllocationBreakdown::compute(&plan.fixed_incomes, &plan.fixed_expenses, &plan.envelopes);
    snapshot_from(&breakdown, computed_at)
}

fn snapshot_from(breakdown: &AllocationBreakdown, computed_at: &str) -> ResultsSnapshot {
    ResultsSnapshot {
        total_income: breakdown.total_income,
        total_expenses: breakdown.total_expenses,
        available_amount: breakdown.available_amount,
        total_envelopes: breakdown.total_envelopes,
        final_balance: breakdown.final_balance,
        computed_at: computed_at.to_string(),
    }
}

/// Recompute envelope amounts and results, and bump `updated_at`
pub fn recalculate_plan(plan: MonthlyPlan) -> MonthlyPlan {
    let now = Utc::now().to_rfc3339();
    let breakdown =
        AllocationBreakdown::compute(&plan.fixed_incomes, &plan.fixed_expenses, &plan.envelopes);
    let results = snapshot_from(&breakdown, &now);

    debug!(
        "Recalculated plan {} ({}): available {:.2}, allocated {:.2}, balance {:.2}",
        plan.id, plan.month, results.available_amount, results.total_envelopes, results.final_balance
    );

    MonthlyPlan {
        envelopes: breakdown.envelopes,
        results,
        updated_at: now,
        ..plan
    }
}

/// Empty plan for `month` with a zeroed snapshot
pub fn create_plan(month: &str) -> MonthlyPlan {
    MonthlyPlan::empty(month, &Utc::now().to_rfc3339())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::Envelope;
    use crate::domain::test_fixtures::{assert_close, item, sample_plan};

    #[test]
    fn test_sample_plan_results() {
        let results = calculate_results(&sample_plan());

        assert_eq!(results.total_income, 3000.0);
        assert_eq!(results.total_expenses, 1200.0);
        assert_eq!(results.available_amount, 1800.0);
        assert_close(results.total_envelopes, 1800.0);
        assert_close(results.final_balance, 0.0);
    }

    #[test]
    fn test_calculate_results_is_idempotent_except_timestamp() {
        let plan = sample_plan();

        let first = calculate_results_at(&plan, "2025-01-01T10:00:00Z");
        let second = calculate_results_at(&plan, "2025-01-01T10:00:00Z");
        let later = calculate_results_at(&plan, "2025-01-02T10:00:00Z");

        assert_eq!(first, second);
        assert_eq!(
            ResultsSnapshot {
                computed_at: first.computed_at.clone(),
                ..later
            },
            first
        );
    }

    #[test]
    fn test_recalculate_plan_updates_envelope_amounts() {
        let plan = sample_plan();
        assert!(plan.envelopes.iter().all(|e| e.amount() == 0.0));

        let recalculated = recalculate_plan(plan.clone());

        let amounts: Vec<f64> = recalculated.envelopes.iter().map(Envelope::amount).collect();
        assert_eq!(amounts, vec![720.0, 540.0, 540.0]);
        assert_eq!(recalculated.id, plan.id);
        assert_eq!(recalculated.created_at, plan.created_at);
        assert_ne!(recalculated.updated_at, plan.updated_at);
        assert_eq!(recalculated.results.computed_at, recalculated.updated_at);
    }

    #[test]
    fn test_mixed_envelopes_deduct_fixed_first() {
        let mut plan = create_plan("2025-02");
        plan.fixed_incomes = vec![item("Salaire", 3000.0)];
        plan.fixed_expenses = vec![item("Loyer", 1200.0)];
        plan.envelopes = vec![
            Envelope::new_fixed("Epargne", 300.0),
            Envelope::new_percentage("Courses", 60.0),
            Envelope::new_percentage("Loisirs", 40.0),
        ];

        let plan = recalculate_plan(plan);

        let amounts: Vec<f64> = plan.envelopes.iter().map(Envelope::amount).collect();
        assert_eq!(amounts, vec![300.0, 900.0, 600.0]);
        assert_close(plan.results.total_envelopes, 1800.0);
        assert_close(plan.results.final_balance, 0.0);
    }

    #[test]
    fn test_create_plan_is_empty_and_zeroed() {
        let plan = create_plan("2025-03");

        assert!(plan.id.starts_with("plan::"));
        assert_eq!(plan.month, "2025-03");
        assert!(plan.fixed_incomes.is_empty());
        assert!(plan.envelopes.is_empty());
        assert_eq!(plan.results.final_balance, 0.0);
        assert_eq!(plan.results.computed_at, plan.created_at);
    }
}
