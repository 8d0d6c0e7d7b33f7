use serde::{Deserialize, Serialize};
use std::fmt;

/// Format version written into every export file
pub const EXPORT_FORMAT_VERSION: &str = "1.0";

/// One recurring income or expense line of a monthly plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixedItem {
    /// Item ID in format: "<income|expense>::<uuid>"
    pub id: String,
    pub name: String,
    /// Monthly amount, never negative once validated
    pub amount: f64,
}

/// How an envelope claims its share of the available amount
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvelopeType {
    /// Share of what remains after fixed envelopes
    Percentage,
    /// Fixed currency amount
    Fixed,
}

impl fmt::Display for EnvelopeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnvelopeType::Percentage => write!(f, "percentage"),
            EnvelopeType::Fixed => write!(f, "fixed"),
        }
    }
}

/// Flat envelope record as found in export files and on disk.
///
/// Records written before fixed envelopes existed carry no `type` field;
/// those are read back as percentage envelopes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvelopeRecord {
    pub id: String,
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub envelope_type: Option<EnvelopeType>,
    /// Only meaningful for percentage envelopes
    #[serde(default)]
    pub percentage: f64,
    /// Computed for percentage envelopes, authoritative for fixed ones
    #[serde(default)]
    pub amount: f64,
}

/// Derived totals of a monthly plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculatedResults {
    pub total_income: f64,
    pub total_expenses: f64,
    pub available_amount: f64,
    pub total_envelopes: f64,
    pub final_balance: f64,
    /// RFC 3339 timestamp of the calculation
    pub last_calculated: String,
}

impl CalculatedResults {
    /// All-zero results, used for freshly created plans
    pub fn zeroed(last_calculated: String) -> Self {
        Self {
            total_income: 0.0,
            total_expenses: 0.0,
            available_amount: 0.0,
            total_envelopes: 0.0,
            final_balance: 0.0,
            last_calculated,
        }
    }
}

/// Stored representation of a monthly plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanRecord {
    pub id: String,
    /// Format: YYYY-MM
    pub month: String,
    #[serde(default)]
    pub fixed_incomes: Vec<FixedItem>,
    #[serde(default)]
    pub fixed_expenses: Vec<FixedItem>,
    #[serde(default)]
    pub envelopes: Vec<EnvelopeRecord>,
    /// Missing on plans saved before results were persisted
    #[serde(default)]
    pub calculated_results: Option<CalculatedResults>,
    pub created_at: String,
    pub updated_at: String,
}

/// Plan payload of an export file (no ids or timestamps of the plan itself)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedPlan {
    pub month: String,
    pub fixed_incomes: Vec<FixedItem>,
    pub fixed_expenses: Vec<FixedItem>,
    pub envelopes: Vec<EnvelopeRecord>,
    pub calculated_results: CalculatedResults,
}

/// Export file holding a single plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedPlanData {
    pub version: String,
    /// RFC 3339 timestamp of the export
    pub export_date: String,
    pub plan: ExportedPlan,
}

/// Export file holding every plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedPlansData {
    pub version: String,
    pub export_date: String,
    pub plans: Vec<ExportedPlan>,
}

/// Outcome of a single field validation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ValidationResult {
    pub fn ok() -> Self {
        Self {
            valid: true,
            error: None,
        }
    }

    pub fn invalid(error: impl Into<String>) -> Self {
        Self {
            valid: false,
            error: Some(error.into()),
        }
    }
}

/// Outcome of a whole-plan consistency check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanValidation {
    pub valid: bool,
    pub errors: Vec<String>,
}

/// Severity of a plan status notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationType {
    Error,
    Warning,
    Info,
    Success,
}

impl fmt::Display for NotificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotificationType::Error => write!(f, "error"),
            NotificationType::Warning => write!(f, "warning"),
            NotificationType::Info => write!(f, "info"),
            NotificationType::Success => write!(f, "success"),
        }
    }
}

/// Suggested follow-up for a notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationAction {
    pub label: String,
    /// Screen or command the action points to
    pub target: String,
}

/// Status message about the current month's plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub title: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<NotificationAction>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_record_without_type_deserializes() {
        let json = r#"{"id":"env-1","name":"Loisirs","percentage":40,"amount":720}"#;
        let record: EnvelopeRecord = serde_json::from_str(json).unwrap();

        assert_eq!(record.envelope_type, None);
        assert_eq!(record.percentage, 40.0);
        assert_eq!(record.amount, 720.0);
    }

    #[test]
    fn test_plan_record_uses_camel_case() {
        let record = PlanRecord {
            id: "plan::1".to_string(),
            month: "2025-01".to_string(),
            fixed_incomes: vec![FixedItem {
                id: "income::1".to_string(),
                name: "Salaire".to_string(),
                amount: 2500.0,
            }],
            fixed_expenses: Vec::new(),
            envelopes: vec![EnvelopeRecord {
                id: "envelope::1".to_string(),
                name: "Epargne".to_string(),
                envelope_type: Some(EnvelopeType::Fixed),
                percentage: 0.0,
                amount: 300.0,
            }],
            calculated_results: None,
            created_at: "2025-01-01T00:00:00Z".to_string(),
            updated_at: "2025-01-01T00:00:00Z".to_string(),
        };

        let value = serde_json::to_value(&record).unwrap();
        assert!(value.get("fixedIncomes").is_some());
        assert!(value.get("createdAt").is_some());
        assert_eq!(value["envelopes"][0]["type"], "fixed");
    }
}
