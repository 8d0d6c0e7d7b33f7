//! Aggregation of fixed incomes and expenses.

use shared::FixedItem;

/// Sum of item amounts; an empty list sums to zero
pub fn sum_amounts(items: &[FixedItem]) -> f64 {
    items.iter().map(|item| item.amount).sum()
}

/// Fixed incomes minus fixed expenses. Not clamped: a negative result means
/// the expenses exceed the incomes.
pub fn available_amount(incomes: &[FixedItem], expenses: &[FixedItem]) -> f64 {
    sum_amounts(incomes) - sum_amounts(expenses)
}
