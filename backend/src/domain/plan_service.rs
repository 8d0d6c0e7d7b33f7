//! Plan service domain logic for the envelope planner.
//!
//! Every edit is one transaction over the plan aggregate: load the plan,
//! apply the edit, recalculate, store. A rejected edit leaves the stored plan
//! untouched.
//!
//! ## Business Rules
//!
//! - Names are sanitized, then validated (non-empty, at most 50 characters)
//! - Amounts are validated (finite, 0 to 999,999,999)
//! - New percentage envelopes get whatever percentage is left to allocate
//! - Removing an envelope never rescales the others
//! - Normalization only runs when the configuration allows it
//! - Copies and imports never share ids with their source

use anyhow::Result;
use chrono::{NaiveDate, Utc};
use log::{info, warn};
use serde_json::Value;
use shared::{EnvelopeType, ExportedPlanData, ExportedPlansData, PlanValidation, ValidationResult};

use crate::domain::allocation::{
    available_for_percentage, normalize_percentages, seed_percentage, toggle_kind,
};
use crate::domain::commands::plan::{
    AddEnvelopeCommand, AddFixedItemCommand, EnvelopeDraft, UpdateFixedItemCommand,
};
use crate::domain::export_service::{ExportService, ImportOutcome};
use crate::domain::fixed_items::available_amount;
use crate::domain::models::{Envelope, EnvelopeKind, FixedItemList, MonthlyPlan, PlannerConfig};
use crate::domain::notification_service::{MonthStatus, NotificationService};
use crate::domain::plan_calculator::{create_plan, recalculate_plan};
use crate::domain::plan_validation::validate_plan;
use crate::domain::validation::{
    sanitize_string, validate_amount, validate_month, validate_multiple, validate_name,
    validate_percentage,
};
use crate::storage::{ConfigStorage, Connection, PlanStorage};

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum PlanServiceError {
    #[error("Plan not found: {0}")]
    PlanNotFound(String),
    #[error("No {0} with id {1}")]
    ItemNotFound(&'static str, String),
    #[error("Envelope not found: {0}")]
    EnvelopeNotFound(String),
    #[error("Envelope {0} is not a {1} envelope")]
    WrongEnvelopeKind(String, EnvelopeType),
    #[error("{0}")]
    InvalidInput(String),
}

fn check(result: ValidationResult) -> Result<(), PlanServiceError> {
    if result.valid {
        Ok(())
    } else {
        Err(PlanServiceError::InvalidInput(result.error.unwrap_or_default()))
    }
}

/// Same plan with fresh derived figures; `updated_at` is kept
fn refreshed(plan: MonthlyPlan) -> MonthlyPlan {
    let updated_at = plan.updated_at.clone();
    MonthlyPlan {
        updated_at,
        ..recalculate_plan(plan)
    }
}

/// Service for managing monthly plans
pub struct PlanService<C: Connection> {
    plan_repository: C::PlanRepository,
    config_repository: C::ConfigRepository,
    export_service: ExportService,
    notification_service: NotificationService,
}

impl<C: Connection> PlanService<C> {
    pub fn new(connection: &C) -> Self {
        Self {
            plan_repository: connection.create_plan_repository(),
            config_repository: connection.create_config_repository(),
            export_service: ExportService::new(),
            notification_service: NotificationService::new(),
        }
    }

    pub fn export_service(&self) -> &ExportService {
        &self.export_service
    }

    pub fn config(&self) -> Result<PlannerConfig> {
        self.config_repository.get_config()
    }

    pub fn update_config(&self, config: &PlannerConfig) -> Result<()> {
        self.config_repository.update_config(config)
    }

    fn load(&self, plan_id: &str) -> Result<MonthlyPlan> {
        match self.plan_repository.get_plan(plan_id)? {
            Some(plan) => Ok(plan),
            None => Err(PlanServiceError::PlanNotFound(plan_id.to_string()).into()),
        }
    }

    /// Load, edit, recalculate and store a plan
    fn apply<F>(&self, plan_id: &str, edit: F) -> Result<MonthlyPlan>
    where
        F: FnOnce(&mut MonthlyPlan) -> Result<()>,
    {
        let mut plan = self.load(plan_id)?;
        edit(&mut plan)?;
        let plan = recalculate_plan(plan);
        self.plan_repository.store_plan(&plan)?;
        Ok(plan)
    }

    /// Create and store an empty plan for `month` (`YYYY-MM`)
    pub fn create_plan(&self, month: &str) -> Result<MonthlyPlan> {
        check(validate_month(month))?;

        let plan = create_plan(month);
        self.plan_repository.store_plan(&plan)?;
        info!("Created plan {} for {}", plan.id, month);
        Ok(plan)
    }

    pub fn get_plan(&self, plan_id: &str) -> Result<Option<MonthlyPlan>> {
        Ok(self.plan_repository.get_plan(plan_id)?.map(refreshed))
    }

    /// Every plan, oldest month first
    pub fn list_plans(&self) -> Result<Vec<MonthlyPlan>> {
        let mut plans: Vec<MonthlyPlan> = self
            .plan_repository
            .list_plans()?
            .into_iter()
            .map(refreshed)
            .collect();
        plans.sort_by(|a, b| a.month.cmp(&b.month).then_with(|| a.created_at.cmp(&b.created_at)));
        Ok(plans)
    }

    pub fn delete_plan(&self, plan_id: &str) -> Result<bool> {
        self.plan_repository.delete_plan(plan_id)
    }

    pub fn add_fixed_item(&self, command: AddFixedItemCommand) -> Result<MonthlyPlan> {
        let name = sanitize_string(&command.name);
        check(validate_multiple([
            validate_name(&name),
            validate_amount(command.amount),
        ]))?;

        let plan = self.apply(&command.plan_id, |plan| {
            let item = command.list.new_item(&name, command.amount);
            plan.items_mut(command.list).push(item);
            Ok(())
        })?;
        info!("Added {} '{}' to plan {}", command.list.label(), name, plan.id);
        Ok(plan)
    }

    pub fn update_fixed_item(&self, command: UpdateFixedItemCommand) -> Result<MonthlyPlan> {
        let name = command.name.as_deref().map(sanitize_string);
        check(validate_multiple(
            name.as_deref()
                .map(validate_name)
                .into_iter()
                .chain(command.amount.map(validate_amount)),
        ))?;

        self.apply(&command.plan_id, |plan| {
            let item = plan
                .items_mut(command.list)
                .iter_mut()
                .find(|item| item.id == command.item_id)
                .ok_or_else(|| {
                    PlanServiceError::ItemNotFound(command.list.label(), command.item_id.clone())
                })?;
            if let Some(name) = name {
                item.name = name;
            }
            if let Some(amount) = command.amount {
                item.amount = amount;
            }
            Ok(())
        })
    }

    pub fn remove_fixed_item(
        &self,
        plan_id: &str,
        list: FixedItemList,
        item_id: &str,
    ) -> Result<MonthlyPlan> {
        self.apply(plan_id, |plan| {
            let items = plan.items_mut(list);
            let before = items.len();
            items.retain(|item| item.id != item_id);
            if items.len() == before {
                return Err(PlanServiceError::ItemNotFound(list.label(), item_id.to_string()).into());
            }
            Ok(())
        })
    }

    pub fn add_envelope(&self, command: AddEnvelopeCommand) -> Result<MonthlyPlan> {
        let name = sanitize_string(&command.name);
        check(validate_name(&name))?;
        if let EnvelopeDraft::Fixed { amount } = command.draft {
            check(validate_amount(amount))?;
        }

        self.apply(&command.plan_id, |plan| {
            let envelope = match command.draft {
                EnvelopeDraft::Percentage => {
                    Envelope::new_percentage(&name, seed_percentage(&plan.envelopes))
                }
                EnvelopeDraft::Fixed { amount } => Envelope::new_fixed(&name, amount),
            };
            info!(
                "Adding {} envelope '{}' to plan {}",
                envelope.kind.envelope_type(),
                envelope.name,
                plan.id
            );
            plan.envelopes.push(envelope);
            Ok(())
        })
    }

    fn envelope_mut<'a>(plan: &'a mut MonthlyPlan, envelope_id: &str) -> Result<&'a mut Envelope> {
        plan.envelope_mut(envelope_id)
            .ok_or_else(|| PlanServiceError::EnvelopeNotFound(envelope_id.to_string()).into())
    }

    pub fn set_envelope_percentage(
        &self,
        plan_id: &str,
        envelope_id: &str,
        percentage: f64,
    ) -> Result<MonthlyPlan> {
        check(validate_percentage(percentage))?;

        self.apply(plan_id, |plan| {
            let envelope = Self::envelope_mut(plan, envelope_id)?;
            match &mut envelope.kind {
                EnvelopeKind::Percentage { percentage: current, .. } => {
                    *current = percentage;
                    Ok(())
                }
                EnvelopeKind::Fixed { .. } => Err(PlanServiceError::WrongEnvelopeKind(
                    envelope_id.to_string(),
                    EnvelopeType::Percentage,
                )
                .into()),
            }
        })
    }

    pub fn set_envelope_amount(
        &self,
        plan_id: &str,
        envelope_id: &str,
        amount: f64,
    ) -> Result<MonthlyPlan> {
        check(validate_amount(amount))?;

        self.apply(plan_id, |plan| {
            let envelope = Self::envelope_mut(plan, envelope_id)?;
            match &mut envelope.kind {
                EnvelopeKind::Fixed { amount: current } => {
                    *current = amount;
                    Ok(())
                }
                EnvelopeKind::Percentage { .. } => Err(PlanServiceError::WrongEnvelopeKind(
                    envelope_id.to_string(),
                    EnvelopeType::Fixed,
                )
                .into()),
            }
        })
    }

    pub fn rename_envelope(&self, plan_id: &str, envelope_id: &str, name: &str) -> Result<MonthlyPlan> {
        let name = sanitize_string(name);
        check(validate_name(&name))?;

        self.apply(plan_id, |plan| {
            Self::envelope_mut(plan, envelope_id)?.name = name;
            Ok(())
        })
    }

    /// Switch an envelope between percentage and fixed allocation
    pub fn toggle_envelope_kind(&self, plan_id: &str, envelope_id: &str) -> Result<MonthlyPlan> {
        self.apply(plan_id, |plan| {
            let available = available_amount(&plan.fixed_incomes, &plan.fixed_expenses);
            let pool = available_for_percentage(available, &plan.envelopes);
            let envelope = Self::envelope_mut(plan, envelope_id)?;
            let toggled = toggle_kind(envelope, pool);
            *envelope = toggled;
            info!(
                "Envelope '{}' is now a {} envelope",
                envelope.name,
                envelope.kind.envelope_type()
            );
            Ok(())
        })
    }

    /// Remove an envelope; remaining percentages are left as they are
    pub fn remove_envelope(&self, plan_id: &str, envelope_id: &str) -> Result<MonthlyPlan> {
        self.apply(plan_id, |plan| {
            let before = plan.envelopes.len();
            plan.envelopes.retain(|envelope| envelope.id != envelope_id);
            if plan.envelopes.len() == before {
                return Err(PlanServiceError::EnvelopeNotFound(envelope_id.to_string()).into());
            }
            Ok(())
        })
    }

    /// Rescale percentage envelopes to 100%, unless the configuration
    /// disables auto-adjustment, in which case the plan is returned as is
    pub fn normalize_envelopes(&self, plan_id: &str) -> Result<MonthlyPlan> {
        let config = self.config_repository.get_config()?;
        if !config.auto_adjust_percentages {
            warn!("Percentage auto-adjustment is disabled, plan {} left unchanged", plan_id);
            return self.load(plan_id).map(refreshed);
        }

        let plan = self.apply(plan_id, |plan| {
            plan.envelopes = normalize_percentages(&plan.envelopes);
            Ok(())
        })?;
        info!("Normalized envelope percentages of plan {}", plan.id);
        Ok(plan)
    }

    /// Deep copy of a plan for another month, with fresh ids
    pub fn copy_plan(&self, source_id: &str, month: &str) -> Result<MonthlyPlan> {
        check(validate_month(month))?;

        let source = self.load(source_id)?;
        let copy = recalculate_plan(source.duplicate_for_month(month, &Utc::now().to_rfc3339()));
        self.plan_repository.store_plan(&copy)?;
        info!("Copied plan {} ({}) to {} ({})", source.id, source.month, copy.id, month);
        Ok(copy)
    }

    /// Import a single-plan or multi-plan export file and store the
    /// accepted plans
    pub fn import_plans(&self, json: &str) -> Result<ImportOutcome> {
        let has_plan_list = serde_json::from_str::<Value>(json)
            .map(|data| data.get("plans").is_some())
            .unwrap_or(false);

        let outcome = if has_plan_list {
            self.export_service.import_all_plans_from_json(json)
        } else {
            self.export_service.import_plan_from_json(json)
        };

        for plan in &outcome.plans {
            self.plan_repository.store_plan(plan)?;
            info!("Stored imported plan {} ({})", plan.id, plan.month);
        }
        Ok(outcome)
    }

    pub fn export_plan(&self, plan_id: &str) -> Result<ExportedPlanData> {
        let plan = self.load(plan_id).map(refreshed)?;
        Ok(self.export_service.export_plan(&plan))
    }

    pub fn export_all(&self) -> Result<ExportedPlansData> {
        let plans = self.list_plans()?;
        Ok(self.export_service.export_all_plans(&plans))
    }

    pub fn validate(&self, plan_id: &str) -> Result<PlanValidation> {
        let plan = self.load(plan_id)?;
        Ok(validate_plan(&plan))
    }

    pub fn current_month_status(&self, today: NaiveDate) -> Result<MonthStatus> {
        let plans = self.list_plans()?;
        Ok(self.notification_service.current_month_status(&plans, today))
    }
}
