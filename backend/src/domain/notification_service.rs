//! Status notifications about the current month's plan.

use chrono::{Datelike, NaiveDate};
use log::debug;
use shared::{Notification, NotificationAction, NotificationType};

use crate::domain::allocation::{total_percentage, FULL_ALLOCATION, PERCENTAGE_TOLERANCE};
use crate::domain::fixed_items::available_amount;
use crate::domain::models::MonthlyPlan;

/// Current month's plan, if any, with the notifications about it
#[derive(Debug, Clone)]
pub struct MonthStatus {
    pub current_month_plan: Option<MonthlyPlan>,
    pub notifications: Vec<Notification>,
}

fn notification(
    id: &str,
    notification_type: NotificationType,
    title: &str,
    message: String,
    action: (&str, &str),
) -> Notification {
    Notification {
        id: id.to_string(),
        notification_type,
        title: title.to_string(),
        message,
        action: Some(NotificationAction {
            label: action.0.to_string(),
            target: action.1.to_string(),
        }),
    }
}

#[derive(Clone, Default)]
pub struct NotificationService {}

impl NotificationService {
    pub fn new() -> Self {
        Self {}
    }

    /// Inspect the plan of `today`'s month.
    ///
    /// Without such a plan a single `no-current-month` warning is returned.
    /// Otherwise each problem yields one notification, and a plan with no
    /// problem yields `all-good`.
    pub fn current_month_status(&self, plans: &[MonthlyPlan], today: NaiveDate) -> MonthStatus {
        let current_month = format!("{:04}-{:02}", today.year(), today.month());
        debug!("Checking status of month {}", current_month);

        let Some(plan) = plans.iter().find(|plan| plan.month == current_month) else {
            return MonthStatus {
                current_month_plan: None,
                notifications: vec![notification(
                    "no-current-month",
                    NotificationType::Warning,
                    "No plan for the current month",
                    format!(
                        "You have not created a plan for {} yet. Create one to start managing your budget.",
                        today.format("%B %Y")
                    ),
                    ("Create a plan", "create"),
                )],
            };
        };

        let mut notifications = Vec::new();

        if plan.fixed_incomes.is_empty() {
            notifications.push(notification(
                "no-incomes",
                NotificationType::Error,
                "Incomplete budget",
                "You have not defined your fixed incomes for this month yet.".to_string(),
                ("Add incomes", "incomes"),
            ));
        }

        if plan.fixed_expenses.is_empty() {
            notifications.push(notification(
                "no-expenses",
                NotificationType::Error,
                "Incomplete budget",
                "You have not defined your fixed expenses for this month yet.".to_string(),
                ("Add expenses", "expenses"),
            ));
        }

        let available = available_amount(&plan.fixed_incomes, &plan.fixed_expenses);
        if available < 0.0 {
            notifications.push(notification(
                "negative-balance",
                NotificationType::Error,
                "Unbalanced budget",
                "Your expenses exceed your incomes. Adjust your budget to restore the balance."
                    .to_string(),
                ("Adjust the budget", "expenses"),
            ));
        }

        if available > 0.0 && plan.envelopes.is_empty() {
            notifications.push(notification(
                "no-envelopes",
                NotificationType::Warning,
                "Missing allocation",
                "You have not allocated your available money to envelopes yet.".to_string(),
                ("Allocate the budget", "envelopes"),
            ));
        }

        if plan.envelopes.iter().any(|e| e.is_percentage()) {
            let total = total_percentage(&plan.envelopes);
            if (total - FULL_ALLOCATION).abs() > PERCENTAGE_TOLERANCE {
                notifications.push(notification(
                    "invalid-percentages",
                    NotificationType::Warning,
                    "Incomplete allocation",
                    format!(
                        "Your percentages do not add up to 100% (currently: {:.1}%).",
                        total
                    ),
                    ("Adjust the percentages", "envelopes"),
                ));
            }
        }

        if notifications.is_empty() {
            notifications.push(notification(
                "all-good",
                NotificationType::Success,
                "Budget in order!",
                format!(
                    "Your budget for {} is complete and valid. Well done!",
                    today.format("%B")
                ),
                ("See the summary", "show"),
            ));
        }

        MonthStatus {
            current_month_plan: Some(plan.clone()),
            notifications,
        }
    }
}
