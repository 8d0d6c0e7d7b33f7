//! Envelope allocation engine.
//!
//! Derived quantities are computed in a fixed order, each feeding the next:
//!
//! 1. available amount = fixed incomes - fixed expenses
//! 2. fixed envelope total
//! 3. available for percentage = available amount - fixed envelope total
//! 4. percentage envelope amount = available for percentage * percentage / 100
//! 5. total envelopes = sum of all envelope amounts after step 4
//! 6. final balance = available amount - total envelopes
//!
//! Fixed envelopes are deducted before percentages are applied. Nothing is
//! clamped: negative pools yield negative percentage amounts, and plan
//! validation reports the overspending instead.

use shared::FixedItem;

use crate::domain::envelopes::fixed_total;
use crate::domain::fixed_items::{available_amount, sum_amounts};
use crate::domain::models::{Envelope, EnvelopeKind};

/// Absolute tolerance when comparing a percentage sum against 100
pub const PERCENTAGE_TOLERANCE: f64 = 0.01;
pub const FULL_ALLOCATION: f64 = 100.0;

/// Pool shared by percentage envelopes (step 3)
pub fn available_for_percentage(available_amount: f64, envelopes: &[Envelope]) -> f64 {
    available_amount - fixed_total(envelopes)
}

/// Recompute percentage envelope amounts from `available_amount` (steps 2-4).
/// Fixed envelopes are returned unchanged.
pub fn recalculate_envelope_amounts(envelopes: &[Envelope], available_amount: f64) -> Vec<Envelope> {
    let pool = available_for_percentage(available_amount, envelopes);

    envelopes
        .iter()
        .map(|envelope| match envelope.kind {
            EnvelopeKind::Percentage { percentage, .. } => Envelope {
                kind: EnvelopeKind::Percentage {
                    percentage,
                    amount: pool * percentage / FULL_ALLOCATION,
                },
                ..envelope.clone()
            },
            EnvelopeKind::Fixed { .. } => envelope.clone(),
        })
        .collect()
}

/// Sum of all envelope amounts, fixed and percentage (step 5)
pub fn total_envelopes(envelopes: &[Envelope]) -> f64 {
    envelopes.iter().map(Envelope::amount).sum()
}

/// Sum of percentages over percentage envelopes only
pub fn total_percentage(envelopes: &[Envelope]) -> f64 {
    envelopes.iter().filter_map(Envelope::percentage).sum()
}

/// True when percentage envelopes add up to 100%, or when there are none
pub fn is_percentage_valid(envelopes: &[Envelope]) -> bool {
    if !envelopes.iter().any(Envelope::is_percentage) {
        return true;
    }
    (total_percentage(envelopes) - FULL_ALLOCATION).abs() < PERCENTAGE_TOLERANCE
}

/// Percentage left to allocate; negative when over-allocated
pub fn remaining_percentage(envelopes: &[Envelope]) -> f64 {
    FULL_ALLOCATION - total_percentage(envelopes)
}

/// Initial percentage of a newly added percentage envelope: the visible
/// remainder, never negative
pub fn seed_percentage(envelopes: &[Envelope]) -> f64 {
    remaining_percentage(envelopes).max(0.0)
}

/// Rescale percentage envelopes so they add up to exactly 100%.
///
/// - already at 100% (within tolerance): unchanged
/// - all at zero: equal shares
/// - otherwise: proportional scaling by `100 / sum`
///
/// Fixed envelopes are never touched. Amounts are not recomputed here; run
/// [`recalculate_envelope_amounts`] afterwards.
pub fn normalize_percentages(envelopes: &[Envelope]) -> Vec<Envelope> {
    let count = envelopes.iter().filter(|e| e.is_percentage()).count();
    if count == 0 {
        return envelopes.to_vec();
    }

    let total = total_percentage(envelopes);
    if (total - FULL_ALLOCATION).abs() < PERCENTAGE_TOLERANCE {
        return envelopes.to_vec();
    }

    let equal_share = (total == 0.0).then(|| FULL_ALLOCATION / count as f64);
    let factor = FULL_ALLOCATION / total;

    envelopes
        .iter()
        .map(|envelope| match envelope.kind {
            EnvelopeKind::Percentage { percentage, amount } => Envelope {
                kind: EnvelopeKind::Percentage {
                    percentage: match equal_share {
                        Some(share) => share,
                        None => percentage * factor,
                    },
                    amount,
                },
                ..envelope.clone()
            },
            EnvelopeKind::Fixed { .. } => envelope.clone(),
        })
        .collect()
}

/// Switch an envelope between percentage and fixed allocation.
///
/// Percentage to fixed keeps the last computed amount as the fixed amount.
/// Fixed to percentage derives `amount / pool * 100`, or 0 when the pool is
/// not positive; the result is only a seed and is recomputed on the next
/// pass. `available_for_percentage` is the pool as computed with this
/// envelope still in its current kind.
pub fn toggle_kind(envelope: &Envelope, available_for_percentage: f64) -> Envelope {
    let kind = match envelope.kind {
        EnvelopeKind::Percentage { amount, .. } => EnvelopeKind::Fixed { amount },
        EnvelopeKind::Fixed { amount } => {
            let percentage = if available_for_percentage > 0.0 {
                amount / available_for_percentage * FULL_ALLOCATION
            } else {
                0.0
            };
            EnvelopeKind::Percentage { percentage, amount }
        }
    };

    Envelope {
        kind,
        ..envelope.clone()
    }
}

/// Every intermediate figure of one allocation pass
#[derive(Debug, Clone, PartialEq)]
pub struct AllocationBreakdown {
    pub total_income: f64,
    pub total_expenses: f64,
    pub available_amount: f64,
    pub fixed_envelope_total: f64,
    pub available_for_percentage: f64,
    /// Envelopes with recomputed amounts
    pub envelopes: Vec<Envelope>,
    pub total_envelopes: f64,
    pub final_balance: f64,
}

impl AllocationBreakdown {
    /// Run steps 1 to 6 over a plan's constituents
    pub fn compute(incomes: &[FixedItem], expenses: &[FixedItem], envelopes: &[Envelope]) -> Self {
        let total_income = sum_amounts(incomes);
        let total_expenses = sum_amounts(expenses);
        let available = available_amount(incomes, expenses);
        let fixed_envelope_total = fixed_total(envelopes);
        let pool = available - fixed_envelope_total;
        let envelopes = recalculate_envelope_amounts(envelopes, available);
        let total = total_envelopes(&envelopes);

        Self {
            total_income,
            total_expenses,
            available_amount: available,
            fixed_envelope_total,
            available_for_percentage: pool,
            envelopes,
            total_envelopes: total,
            final_balance: available - total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::test_fixtures::{assert_close, item};

    fn percentages(envelopes: &[Envelope]) -> Vec<f64> {
        envelopes.iter().filter_map(Envelope::percentage).collect()
    }

    #[test]
    fn test_three_percentage_envelopes_fill_available() {
        let envelopes = vec![
            Envelope::new_percentage("Courses", 40.0),
            Envelope::new_percentage("Loisirs", 30.0),
            Envelope::new_percentage("Epargne", 30.0),
        ];

        let updated = recalculate_envelope_amounts(&envelopes, 1800.0);

        let amounts: Vec<f64> = updated.iter().map(Envelope::amount).collect();
        assert_eq!(amounts, vec![720.0, 540.0, 540.0]);
        assert_close(1800.0 - total_envelopes(&updated), 0.0);
    }

    #[test]
    fn test_fixed_envelope_deducted_before_percentages() {
        let incomes = vec![item("Salaire", 2500.0), item("Freelance", 500.0)];
        let expenses = vec![
            item("Loyer", 800.0),
            item("Courses", 300.0),
            item("Transport", 100.0),
        ];
        let envelopes = vec![
            Envelope::new_fixed("Epargne", 500.0),
            Envelope::new_percentage("Vie courante", 100.0),
        ];

        let breakdown = AllocationBreakdown::compute(&incomes, &expenses, &envelopes);

        assert_eq!(breakdown.available_amount, 1800.0);
        assert_eq!(breakdown.fixed_envelope_total, 500.0);
        assert_eq!(breakdown.available_for_percentage, 1300.0);
        assert_eq!(breakdown.envelopes[0].amount(), 500.0);
        assert_eq!(breakdown.envelopes[1].amount(), 1300.0);
        assert_eq!(breakdown.total_envelopes, 1800.0);
        assert_eq!(breakdown.final_balance, 0.0);
    }

    #[test]
    fn test_sum_matches_available_when_valid_without_fixed() {
        let cases: Vec<(Vec<f64>, f64)> = vec![
            (vec![33.33, 33.33, 33.34], 2471.19),
            (vec![12.5, 87.5], 0.0),
            (vec![100.0], 1234.56),
            (vec![10.0, 20.0, 30.0, 40.0], 999_999.99),
        ];

        for (percentages, available) in cases {
            let envelopes: Vec<Envelope> = percentages
                .iter()
                .map(|p| Envelope::new_percentage("Env", *p))
                .collect();
            assert!(is_percentage_valid(&envelopes));

            let total = total_envelopes(&recalculate_envelope_amounts(&envelopes, available));
            assert!((total - available).abs() <= 1e-6 * available.abs().max(1.0));
        }
    }

    #[test]
    fn test_negative_pool_is_not_clamped() {
        let envelopes = vec![
            Envelope::new_fixed("Epargne", 300.0),
            Envelope::new_percentage("Courses", 50.0),
            Envelope::new_percentage("Loisirs", 50.0),
        ];

        let updated = recalculate_envelope_amounts(&envelopes, 100.0);

        assert_eq!(updated[0].amount(), 300.0);
        assert_eq!(updated[1].amount(), -100.0);
        assert_eq!(updated[2].amount(), -100.0);
    }

    #[test]
    fn test_percentage_validity() {
        assert!(is_percentage_valid(&[]));
        assert!(is_percentage_valid(&[Envelope::new_fixed("Epargne", 100.0)]));

        let over = vec![
            Envelope::new_percentage("A", 50.0),
            Envelope::new_percentage("B", 60.0),
        ];
        assert!(!is_percentage_valid(&over));
        assert_eq!(total_percentage(&over), 110.0);

        let close = vec![
            Envelope::new_percentage("A", 50.0),
            Envelope::new_percentage("B", 49.995),
            Envelope::new_fixed("C", 999.0),
        ];
        assert!(is_percentage_valid(&close));
    }

    #[test]
    fn test_normalize_scales_proportionally() {
        let envelopes = vec![
            Envelope::new_percentage("A", 50.0),
            Envelope::new_percentage("B", 60.0),
        ];

        let normalized = normalize_percentages(&envelopes);
        let values = percentages(&normalized);

        assert_close(values[0], 45.454545);
        assert_close(values[1], 54.545454);
        assert_close(values.iter().sum::<f64>(), 100.0);
        assert!(is_percentage_valid(&normalized));
    }

    #[test]
    fn test_normalize_zero_sum_gives_equal_shares() {
        let envelopes = vec![
            Envelope::new_percentage("A", 0.0),
            Envelope::new_fixed("B", 250.0),
            Envelope::new_percentage("C", 0.0),
            Envelope::new_percentage("D", 0.0),
        ];

        let normalized = normalize_percentages(&envelopes);

        for value in percentages(&normalized) {
            assert_close(value, 100.0 / 3.0);
        }
        assert_eq!(normalized[1], envelopes[1]);
    }

    #[test]
    fn test_normalize_leaves_valid_and_fixed_only_sets_alone() {
        let valid = vec![
            Envelope::new_percentage("A", 70.0),
            Envelope::new_percentage("B", 30.0),
        ];
        assert_eq!(normalize_percentages(&valid), valid);

        let fixed_only = vec![Envelope::new_fixed("A", 10.0)];
        assert_eq!(normalize_percentages(&fixed_only), fixed_only);
        assert!(normalize_percentages(&[]).is_empty());
    }

    #[test]
    fn test_normalize_is_idempotent_and_spares_fixed() {
        let sets = vec![
            vec![
                Envelope::new_percentage("A", 10.0),
                Envelope::new_fixed("B", 400.0),
                Envelope::new_percentage("C", 15.0),
            ],
            vec![
                Envelope::new_percentage("A", 0.0),
                Envelope::new_percentage("B", 0.0),
            ],
            vec![
                Envelope::new_fixed("A", 12.0),
                Envelope::new_percentage("B", 33.0),
                Envelope::new_percentage("C", 33.0),
                Envelope::new_percentage("D", 33.0),
            ],
        ];

        for envelopes in sets {
            let once = normalize_percentages(&envelopes);
            let twice = normalize_percentages(&once);
            assert_eq!(once, twice);

            for (before, after) in envelopes.iter().zip(once.iter()) {
                if before.is_fixed() {
                    assert_eq!(before, after);
                }
            }
        }
    }

    #[test]
    fn test_toggle_round_trip_with_same_pool() {
        let pool = 1800.0;
        let envelopes =
            recalculate_envelope_amounts(&[Envelope::new_percentage("Courses", 40.0)], pool);

        let fixed = toggle_kind(&envelopes[0], pool);
        assert_eq!(fixed.kind, EnvelopeKind::Fixed { amount: 720.0 });

        let back = toggle_kind(&fixed, pool);
        assert_close(back.percentage().unwrap(), 40.0);
        assert_eq!(back.id, envelopes[0].id);
    }

    #[test]
    fn test_toggle_to_percentage_with_empty_pool() {
        let envelope = Envelope::new_fixed("Epargne", 500.0);

        assert_eq!(toggle_kind(&envelope, 0.0).percentage(), Some(0.0));
        assert_eq!(toggle_kind(&envelope, -250.0).percentage(), Some(0.0));
    }

    #[test]
    fn test_seed_percentage_fills_remainder() {
        assert_eq!(seed_percentage(&[]), 100.0);

        let partial = vec![
            Envelope::new_percentage("A", 40.0),
            Envelope::new_fixed("B", 100.0),
        ];
        assert_eq!(seed_percentage(&partial), 60.0);

        let over = vec![
            Envelope::new_percentage("A", 80.0),
            Envelope::new_percentage("B", 30.0),
        ];
        assert_eq!(seed_percentage(&over), 0.0);
        assert_close(remaining_percentage(&over), -10.0);
    }
}
