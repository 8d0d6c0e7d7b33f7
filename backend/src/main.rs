//! `moneto` command line entry point.

use anyhow::{anyhow, Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

use moneto_backend::domain::commands::plan::{
    AddEnvelopeCommand, AddFixedItemCommand, EnvelopeDraft,
};
use moneto_backend::domain::formatting::{format_currency, format_percentage};
use moneto_backend::domain::models::{FixedItemList, MonthlyPlan, PlannerConfig};
use moneto_backend::domain::plan_validation::validate_plan;
use moneto_backend::Backend;

#[derive(Parser, Debug)]
#[command(name = "moneto", about = "Monthly budget planning with envelopes.")]
struct Args {
    /// Data directory; defaults to $MONETO_DATA_DIR, else <documents>/Moneto
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List every plan
    List,
    /// Show a plan with its figures and diagnostics
    Show { plan_id: String },
    /// Create an empty plan for a month (YYYY-MM)
    Create { month: String },
    /// Import a single-plan or multi-plan export file
    Import { file: PathBuf },
    /// Export a plan to JSON
    Export {
        plan_id: String,
        /// Output path; defaults to moneto-plan-<month>.json
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Export every plan to one JSON file
    ExportAll {
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Rescale percentage envelopes to 100%
    Normalize { plan_id: String },
    /// Copy a plan to another month
    Copy { plan_id: String, month: String },
    /// Status of the current month's plan
    Status,
    /// Add a fixed income
    AddIncome {
        plan_id: String,
        name: String,
        amount: f64,
    },
    /// Add a fixed expense
    AddExpense {
        plan_id: String,
        name: String,
        amount: f64,
    },
    /// Add an envelope; percentage envelopes get the percentage left
    AddEnvelope {
        plan_id: String,
        name: String,
        /// Make it a fixed envelope with this amount
        #[arg(long)]
        fixed: Option<f64>,
    },
    /// Set the percentage of a percentage envelope
    SetPercentage {
        plan_id: String,
        envelope_id: String,
        percentage: f64,
    },
    /// Switch an envelope between percentage and fixed
    Toggle { plan_id: String, envelope_id: String },
    /// Remove an envelope
    RemoveEnvelope { plan_id: String, envelope_id: String },
}

fn print_plan(plan: &MonthlyPlan, config: &PlannerConfig) {
    let money = |amount: f64| format_currency(amount, config);

    println!("Plan {} ({})", plan.month, plan.id);
    println!("  Incomes:");
    for item in &plan.fixed_incomes {
        println!("    {:<30} {:>16}  {}", item.name, money(item.amount), item.id);
    }
    println!("  Expenses:");
    for item in &plan.fixed_expenses {
        println!("    {:<30} {:>16}  {}", item.name, money(item.amount), item.id);
    }
    println!("  Envelopes:");
    for envelope in &plan.envelopes {
        let share = envelope
            .percentage()
            .map(format_percentage)
            .unwrap_or_else(|| "fixed".to_string());
        println!(
            "    {:<30} {:>8} {:>16}  {}",
            envelope.name,
            share,
            money(envelope.amount()),
            envelope.id
        );
    }

    let results = &plan.results;
    println!("  Total income:     {}", money(results.total_income));
    println!("  Total expenses:   {}", money(results.total_expenses));
    println!("  Available:        {}", money(results.available_amount));
    println!("  Allocated:        {}", money(results.total_envelopes));
    println!("  Final balance:    {}", money(results.final_balance));

    let validation = validate_plan(plan);
    for error in &validation.errors {
        println!("  ! {}", error);
    }
}

fn write_json(path: &Path, json: &str) -> Result<()> {
    fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    println!("Exported to {}", path.display());
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let backend = match &args.data_dir {
        Some(path) => Backend::new(path)?,
        None => Backend::new_default()?,
    };
    info!("Using data directory {}", backend.connection.base_directory().display());

    let service = &backend.plan_service;
    let config = service.config()?;

    match args.command {
        Command::List => {
            for plan in service.list_plans()? {
                println!(
                    "{}  {}  balance {}",
                    plan.month,
                    plan.id,
                    format_currency(plan.results.final_balance, &config)
                );
            }
        }
        Command::Show { plan_id } => {
            let plan = service
                .get_plan(&plan_id)?
                .ok_or_else(|| anyhow!("Plan not found: {}", plan_id))?;
            print_plan(&plan, &config);
        }
        Command::Create { month } => {
            let plan = service.create_plan(&month)?;
            println!("{}", plan.id);
        }
        Command::Import { file } => {
            let json = fs::read_to_string(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            let outcome = service.import_plans(&json)?;
            for error in &outcome.errors {
                eprintln!("{}", error);
            }
            if !outcome.success {
                return Err(anyhow!("Import of {} failed", file.display()));
            }
            for plan in &outcome.plans {
                println!("Imported {} as {}", plan.month, plan.id);
            }
        }
        Command::Export { plan_id, out } => {
            let plan = service
                .get_plan(&plan_id)?
                .ok_or_else(|| anyhow!("Plan not found: {}", plan_id))?;
            let exporter = service.export_service();
            let path = out.unwrap_or_else(|| PathBuf::from(exporter.plan_filename(&plan)));
            write_json(&path, &exporter.to_json(&exporter.export_plan(&plan))?)?;
        }
        Command::ExportAll { out } => {
            let data = service.export_all()?;
            let path = out.unwrap_or_else(|| {
                PathBuf::from(
                    service
                        .export_service()
                        .all_plans_filename(Local::now().date_naive()),
                )
            });
            write_json(&path, &service.export_service().to_json(&data)?)?;
        }
        Command::Normalize { plan_id } => {
            print_plan(&service.normalize_envelopes(&plan_id)?, &config);
        }
        Command::Copy { plan_id, month } => {
            let plan = service.copy_plan(&plan_id, &month)?;
            println!("{}", plan.id);
        }
        Command::Status => {
            let status = service.current_month_status(Local::now().date_naive())?;
            for notification in &status.notifications {
                println!(
                    "[{}] {}: {}",
                    notification.notification_type, notification.title, notification.message
                );
            }
        }
        Command::AddIncome { plan_id, name, amount } => {
            let plan = service.add_fixed_item(AddFixedItemCommand {
                plan_id,
                list: FixedItemList::Incomes,
                name,
                amount,
            })?;
            print_plan(&plan, &config);
        }
        Command::AddExpense { plan_id, name, amount } => {
            let plan = service.add_fixed_item(AddFixedItemCommand {
                plan_id,
                list: FixedItemList::Expenses,
                name,
                amount,
            })?;
            print_plan(&plan, &config);
        }
        Command::AddEnvelope { plan_id, name, fixed } => {
            let draft = match fixed {
                Some(amount) => EnvelopeDraft::Fixed { amount },
                None => EnvelopeDraft::Percentage,
            };
            let plan = service.add_envelope(AddEnvelopeCommand {
                plan_id,
                name,
                draft,
            })?;
            print_plan(&plan, &config);
        }
        Command::SetPercentage {
            plan_id,
            envelope_id,
            percentage,
        } => {
            let plan = service.set_envelope_percentage(&plan_id, &envelope_id, percentage)?;
            print_plan(&plan, &config);
        }
        Command::Toggle {
            plan_id,
            envelope_id,
        } => {
            let plan = service.toggle_envelope_kind(&plan_id, &envelope_id)?;
            print_plan(&plan, &config);
        }
        Command::RemoveEnvelope {
            plan_id,
            envelope_id,
        } => {
            let plan = service.remove_envelope(&plan_id, &envelope_id)?;
            print_plan(&plan, &config);
        }
    }

    Ok(())
}
