//! Export and import of monthly plans as JSON files.
//!
//! Export files carry a format version, the export date and either one plan
//! (`plan`) or several (`plans`). Plan payloads never include the plan's own
//! id or timestamps.
//!
//! Imports are validated structurally on the raw JSON before anything is
//! built: every problem of a plan is reported, and a plan with any problem
//! is rejected whole. Accepted plans get fresh ids for the plan, its items
//! and its envelopes, and are recalculated before they are returned.

use anyhow::Result;
use chrono::{NaiveDate, Utc};
use log::{info, warn};
use serde::Serialize;
use serde_json::{Map, Value};
use shared::{
    CalculatedResults, EnvelopeRecord, ExportedPlan, ExportedPlanData, ExportedPlansData,
    FixedItem, EXPORT_FORMAT_VERSION,
};

use crate::domain::models::{Envelope, FixedItemList, MonthlyPlan};
use crate::domain::plan_calculator::{create_plan, recalculate_plan};
use crate::domain::validation::is_month_format;

pub const MALFORMED_JSON: &str = "The JSON file is malformed";
pub const INVALID_JSON: &str = "The JSON file is invalid";
pub const MISSING_VERSION: &str = "Missing version in file";
pub const MISSING_PLAN: &str = "Missing plan data";
pub const NO_PLAN_LIST: &str = "The file does not contain a list of plans";
pub const NO_VALID_PLAN: &str = "No valid plan found";

/// Result of an import: the plans ready to be stored, and every message
#[derive(Debug, Clone, Default)]
pub struct ImportOutcome {
    pub success: bool,
    pub errors: Vec<String>,
    pub plans: Vec<MonthlyPlan>,
}

impl ImportOutcome {
    fn rejected(errors: Vec<String>) -> Self {
        Self {
            success: false,
            errors,
            plans: Vec::new(),
        }
    }
}

/// Export service that handles export and import of plans
#[derive(Clone, Default)]
pub struct ExportService {}

impl ExportService {
    pub fn new() -> Self {
        Self {}
    }

    /// Export file for a single plan
    pub fn export_plan(&self, plan: &MonthlyPlan) -> ExportedPlanData {
        info!("Exporting plan {} ({})", plan.id, plan.month);
        ExportedPlanData {
            version: EXPORT_FORMAT_VERSION.to_string(),
            export_date: Utc::now().to_rfc3339(),
            plan: exported_plan(plan),
        }
    }

    /// Export file for several plans, in the given order
    pub fn export_all_plans(&self, plans: &[MonthlyPlan]) -> ExportedPlansData {
        info!("Exporting {} plan(s)", plans.len());
        ExportedPlansData {
            version: EXPORT_FORMAT_VERSION.to_string(),
            export_date: Utc::now().to_rfc3339(),
            plans: plans.iter().map(exported_plan).collect(),
        }
    }

    /// `moneto-plan-<month>.json`
    pub fn plan_filename(&self, plan: &MonthlyPlan) -> String {
        format!("moneto-plan-{}.json", plan.month)
    }

    /// `moneto-all-plans-<YYYY-MM-DD>.json`
    pub fn all_plans_filename(&self, date: NaiveDate) -> String {
        format!("moneto-all-plans-{}.json", date.format("%Y-%m-%d"))
    }

    /// Pretty-printed JSON of an export file
    pub fn to_json<T: Serialize>(&self, data: &T) -> Result<String> {
        Ok(serde_json::to_string_pretty(data)?)
    }

    /// Import a single-plan export file
    pub fn import_plan_from_json(&self, text: &str) -> ImportOutcome {
        let data = match serde_json::from_str::<Value>(text) {
            Ok(data) => data,
            Err(e) => {
                warn!("Import rejected, malformed JSON: {}", e);
                return ImportOutcome::rejected(vec![MALFORMED_JSON.to_string()]);
            }
        };

        let Some(root) = data.as_object() else {
            return ImportOutcome::rejected(vec![INVALID_JSON.to_string()]);
        };

        let errors = validate_exported_plan(root.get("version"), root.get("plan"));
        if !errors.is_empty() {
            warn!("Import rejected with {} error(s)", errors.len());
            return ImportOutcome::rejected(errors);
        }

        let plans = root.get("plan").map(build_plan).into_iter().collect();
        info!("Imported 1 plan");
        ImportOutcome {
            success: true,
            errors: Vec::new(),
            plans,
        }
    }

    /// Import a multi-plan export file. Valid plans are kept even when others
    /// are rejected; the import fails only when no plan is valid.
    pub fn import_all_plans_from_json(&self, text: &str) -> ImportOutcome {
        let data = match serde_json::from_str::<Value>(text) {
            Ok(data) => data,
            Err(e) => {
                warn!("Import rejected, malformed JSON: {}", e);
                return ImportOutcome::rejected(vec![MALFORMED_JSON.to_string()]);
            }
        };

        let Some(root) = data.as_object() else {
            return ImportOutcome::rejected(vec![INVALID_JSON.to_string()]);
        };
        let Some(entries) = root.get("plans").and_then(Value::as_array) else {
            return ImportOutcome::rejected(vec![NO_PLAN_LIST.to_string()]);
        };

        let mut plans = Vec::new();
        let mut errors = Vec::new();
        for (index, entry) in entries.iter().enumerate() {
            let plan_errors = validate_exported_plan(root.get("version"), Some(entry));
            if plan_errors.is_empty() {
                plans.push(build_plan(entry));
            } else {
                errors.push(format!("Plan {}: {}", index + 1, plan_errors.join(", ")));
            }
        }

        if plans.is_empty() {
            if errors.is_empty() {
                errors.push(NO_VALID_PLAN.to_string());
            }
            warn!("Import rejected, no valid plan among {}", entries.len());
            return ImportOutcome::rejected(errors);
        }

        info!(
            "Imported {} plan(s), rejected {}",
            plans.len(),
            entries.len() - plans.len()
        );
        ImportOutcome {
            success: true,
            errors,
            plans,
        }
    }
}

fn exported_plan(plan: &MonthlyPlan) -> ExportedPlan {
    ExportedPlan {
        month: plan.month.clone(),
        fixed_incomes: plan.fixed_incomes.clone(),
        fixed_expenses: plan.fixed_expenses.clone(),
        envelopes: plan.envelopes.iter().map(EnvelopeRecord::from).collect(),
        calculated_results: CalculatedResults::from(&plan.results),
    }
}

fn is_present(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) | Some(Value::Bool(false)) => false,
        Some(Value::String(text)) => !text.is_empty(),
        Some(_) => true,
    }
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|text| !text.is_empty())
}

fn non_negative_number(value: Option<&Value>) -> Option<f64> {
    value.and_then(Value::as_f64).filter(|number| *number >= 0.0)
}

fn validate_items(
    items: Option<&Value>,
    label: &str,
    list_error: &str,
    errors: &mut Vec<String>,
) {
    let Some(items) = items.and_then(Value::as_array) else {
        errors.push(list_error.to_string());
        return;
    };

    for (index, item) in items.iter().enumerate() {
        if non_empty_str(item.get("name")).is_none() {
            errors.push(format!("{} {}: invalid name", label, index + 1));
        }
        if non_negative_number(item.get("amount")).is_none() {
            errors.push(format!("{} {}: invalid amount", label, index + 1));
        }
    }
}

fn validate_envelopes(envelopes: Option<&Value>, errors: &mut Vec<String>) {
    let Some(envelopes) = envelopes.and_then(Value::as_array) else {
        errors.push("Invalid envelope list".to_string());
        return;
    };

    for (index, envelope) in envelopes.iter().enumerate() {
        let position = index + 1;
        if non_empty_str(envelope.get("name")).is_none() {
            errors.push(format!("Envelope {}: invalid name", position));
        }
        if non_negative_number(envelope.get("percentage")).is_none() {
            errors.push(format!("Envelope {}: invalid percentage", position));
        }
        if non_negative_number(envelope.get("amount")).is_none() {
            errors.push(format!("Envelope {}: invalid amount", position));
        }
        match envelope.get("type") {
            None | Some(Value::Null) => {}
            Some(Value::String(kind)) if kind == "percentage" || kind == "fixed" => {}
            Some(_) => errors.push(format!("Envelope {}: invalid type", position)),
        }
    }
}

/// Every structural problem of one exported plan, in file order
fn validate_exported_plan(version: Option<&Value>, plan: Option<&Value>) -> Vec<String> {
    let mut errors = Vec::new();

    if !is_present(version) {
        errors.push(MISSING_VERSION.to_string());
    }

    let Some(plan) = plan.and_then(Value::as_object) else {
        errors.push(MISSING_PLAN.to_string());
        return errors;
    };

    match non_empty_str(plan.get("month")) {
        None => errors.push("Invalid or missing month".to_string()),
        Some(month) if !is_month_format(month) => {
            errors.push("Invalid month format (expected YYYY-MM)".to_string())
        }
        Some(_) => {}
    }

    validate_items(plan.get("fixedIncomes"), "Income", "Invalid income list", &mut errors);
    validate_items(plan.get("fixedExpenses"), "Expense", "Invalid expense list", &mut errors);
    validate_envelopes(plan.get("envelopes"), &mut errors);

    if !plan.get("calculatedResults").is_some_and(Value::is_object) {
        errors.push("Missing calculated results".to_string());
    }

    errors
}

fn build_items(plan: &Map<String, Value>, key: &str, list: FixedItemList) -> Vec<FixedItem> {
    plan.get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .map(|item| {
                    list.new_item(
                        non_empty_str(item.get("name")).unwrap_or_default(),
                        non_negative_number(item.get("amount")).unwrap_or_default(),
                    )
                })
                .collect()
        })
        .unwrap_or_default()
}

fn build_envelope(envelope: &Value) -> Envelope {
    let name = non_empty_str(envelope.get("name")).unwrap_or_default();
    let amount = non_negative_number(envelope.get("amount")).unwrap_or_default();

    match envelope.get("type").and_then(Value::as_str) {
        Some("fixed") => Envelope::new_fixed(name, amount),
        // No type: exported before fixed envelopes existed
        _ => Envelope::new_percentage(
            name,
            non_negative_number(envelope.get("percentage")).unwrap_or_default(),
        ),
    }
}

/// Fresh plan from a validated payload, recalculated
fn build_plan(payload: &Value) -> MonthlyPlan {
    let empty = Map::new();
    let plan = payload.as_object().unwrap_or(&empty);
    let month = non_empty_str(plan.get("month")).unwrap_or_default();

    let mut imported = create_plan(month);
    imported.fixed_incomes = build_items(plan, "fixedIncomes", FixedItemList::Incomes);
    imported.fixed_expenses = build_items(plan, "fixedExpenses", FixedItemList::Expenses);
    imported.envelopes = plan
        .get("envelopes")
        .and_then(Value::as_array)
        .map(|envelopes| envelopes.iter().map(build_envelope).collect())
        .unwrap_or_default();

    recalculate_plan(imported)
}
