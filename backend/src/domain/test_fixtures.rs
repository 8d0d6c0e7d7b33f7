//! Shared builders for domain tests.

use shared::FixedItem;

use crate::domain::models::{Envelope, MonthlyPlan};

pub const TOLERANCE: f64 = 1e-6;

pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < TOLERANCE,
        "expected {} to be within {} of {}",
        actual,
        TOLERANCE,
        expected
    );
}

pub fn item(name: &str, amount: f64) -> FixedItem {
    FixedItem {
        id: format!("item::{}", name.to_lowercase()),
        name: name.to_string(),
        amount,
    }
}

/// January plan: 3000 income, 1200 expenses, 40/30/30 percentage envelopes
pub fn sample_plan() -> MonthlyPlan {
    let mut plan = MonthlyPlan::empty("2025-01", "2025-01-01T00:00:00Z");
    plan.fixed_incomes = vec![item("Salaire", 2500.0), item("Freelance", 500.0)];
    plan.fixed_expenses = vec![
        item("Loyer", 800.0),
        item("Courses", 300.0),
        item("Transport", 100.0),
    ];
    plan.envelopes = vec![
        Envelope::new_percentage("Alimentation", 40.0),
        Envelope::new_percentage("Loisirs", 30.0),
        Envelope::new_percentage("Epargne", 30.0),
    ];
    plan
}
