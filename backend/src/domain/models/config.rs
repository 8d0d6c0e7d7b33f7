//! User-level planner settings, persisted as YAML next to the plans.
use chrono::Utc;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// ISO currency code used for display only
    pub currency: String,
    /// Display locale, e.g. "fr-FR" or "en-US"
    pub locale: String,
    /// When false, explicit normalization requests are ignored
    pub auto_adjust_percentages: bool,
    /// First day of the budget month (1-28)
    pub first_day_of_month: u8,
    /// Data format version for future migrations
    pub data_format_version: String,
    pub created_at: String,
    pub updated_at: String,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        let now = Utc::now().to_rfc3339();
        Self {
            currency: "EUR".to_string(),
            locale: "fr-FR".to_string(),
            auto_adjust_percentages: true,
            first_day_of_month: 1,
            data_format_version: "1.0".to_string(),
            created_at: now.clone(),
            updated_at: now,
        }
    }
}
