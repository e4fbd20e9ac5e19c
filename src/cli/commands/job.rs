//! `shopfloor job` command - Job cards from creation to QC settlement

use chrono::Utc;
use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::filters::{CliCategory, CliJobStatus, JobStatusFilter};
use crate::cli::helpers::{format_money, open_session, truncate_str};
use crate::cli::output::{
    effective_format, output_created, output_done, print_list, print_record, print_serialized,
};
use crate::cli::table::Table;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::directory::Directory;
use crate::core::error::ShopError;
use crate::core::ledger::Ledger;
use crate::core::lifecycle::{allowed_transitions, JobLifecycle, NewJob};
use crate::core::settlement::{SettlementEngine, SettlementReport};
use crate::entities::item::ItemCategory;
use crate::entities::job::{Consumable, JobCard, JobStatus};

#[derive(Subcommand, Debug)]
pub enum JobCommands {
    /// Create a new job card
    New(NewArgs),

    /// List job cards
    List(ListArgs),

    /// Show a job card
    Show(JobRef),

    /// Start work on a job (also restarts a job sent back from QC)
    Start(JobRef),

    /// Pause work on a job
    Pause(JobRef),

    /// Resume a paused job
    Resume(JobRef),

    /// Submit a job for quality control
    Submit(JobRef),

    /// Set a job's status directly
    Status(StatusArgs),

    /// Record material used by a job
    Consume(ConsumeArgs),

    /// Approve a job at QC: finalize cost and deduct consumed stock
    Approve(JobRef),

    /// Reject a job at QC with a reason
    Reject(RejectArgs),

    /// Archive a completed or rejected job
    Archive(JobRef),

    /// Cost report for settled jobs
    Report(ReportArgs),
}

#[derive(clap::Args, Debug)]
pub struct JobRef {
    /// Job ID or job code (e.g., JC-0007)
    pub job: String,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Number of units to produce
    #[arg(long, short = 'q', default_value_t = 1)]
    pub qty: u32,

    /// Part being produced
    #[arg(long, short = 'p')]
    pub part: Option<String>,

    /// Department doing the work
    #[arg(long, short = 'd')]
    pub department: Option<String>,

    /// Assigned employee (ID or name)
    #[arg(long, short = 'e')]
    pub employee: Option<String>,

    /// Estimated work time in minutes
    #[arg(long)]
    pub estimate: Option<u32>,

    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Filter by status
    #[arg(long, short = 's', value_enum, default_value = "open")]
    pub status: JobStatusFilter,

    /// Show only count
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug)]
pub struct StatusArgs {
    /// Job ID or job code
    pub job: String,

    /// New status
    #[arg(value_enum)]
    pub status: CliJobStatus,
}

#[derive(clap::Args, Debug)]
pub struct ConsumeArgs {
    /// Job ID or job code
    pub job: String,

    /// Inventory item (ID or code), or a free-text description with --price
    pub item: String,

    /// Quantity used
    #[arg(long, short = 'q', default_value_t = 1)]
    pub qty: u32,

    /// Unit price for a free-text consumable
    #[arg(long)]
    pub price: Option<f64>,

    /// Inventory store to look in
    #[arg(long, short = 'c', value_enum)]
    pub category: Option<CliCategory>,
}

#[derive(clap::Args, Debug)]
pub struct RejectArgs {
    /// Job ID or job code
    pub job: String,

    /// Why the job failed QC
    #[arg(long, short = 'r')]
    pub reason: String,
}

#[derive(clap::Args, Debug)]
pub struct ReportArgs {
    /// Include rejected and archived jobs
    #[arg(long)]
    pub all: bool,
}

/// Run a job subcommand
pub fn run(cmd: JobCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        JobCommands::New(args) => run_new(args, global),
        JobCommands::List(args) => run_list(args, global),
        JobCommands::Show(args) => run_show(args, global),
        JobCommands::Start(args) => run_transition(&args.job, JobStatus::InProgress, global),
        JobCommands::Pause(args) => run_transition(&args.job, JobStatus::Paused, global),
        JobCommands::Resume(args) => run_transition(&args.job, JobStatus::InProgress, global),
        JobCommands::Submit(args) => run_transition(&args.job, JobStatus::AwaitingQc, global),
        JobCommands::Status(args) => run_transition(&args.job, args.status.into(), global),
        JobCommands::Consume(args) => run_consume(args, global),
        JobCommands::Approve(args) => run_approve(args, global),
        JobCommands::Reject(args) => run_reject(args, global),
        JobCommands::Archive(args) => run_transition(&args.job, JobStatus::Archived, global),
        JobCommands::Report(args) => run_report(args, global),
    }
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let session = open_session(global)?;

    let employee_id = match &args.employee {
        Some(who) => Some(Directory::new(&session.store).find_employee(who)?.id),
        None => None,
    };

    let job = JobLifecycle::new(&session.store).create_job(
        NewJob {
            quantity: args.qty,
            part_id: args.part,
            department_id: args.department,
            employee_id,
            estimated_time: args.estimate,
            notes: args.notes,
            consumables: Vec::new(),
        },
        Utc::now(),
    )?;

    output_created(&job, "job", global);
    Ok(())
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let session = open_session(global)?;
    let jobs: Vec<JobCard> = JobLifecycle::new(&session.store)
        .list_jobs(None)?
        .into_iter()
        .filter(|job| args.status.matches(job.status))
        .collect();

    if args.count {
        println!("{}", jobs.len());
        return Ok(());
    }

    let mut table = Table::new(&["CODE", "STATUS", "QTY", "PART", "STARTED", "TOTAL"]);
    for job in &jobs {
        table.row(
            job.id,
            vec![
                job.job_code.clone(),
                job.status.to_string(),
                job.quantity.to_string(),
                job.part_id
                    .as_deref()
                    .map(|p| truncate_str(p, 24))
                    .unwrap_or_else(|| "-".to_string()),
                job.started_at
                    .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_else(|| "-".to_string()),
                format_money(job.total_cost),
            ],
        );
    }
    print_list(&jobs, table, "jobs", global)
}

fn run_show(args: JobRef, global: &GlobalOpts) -> Result<()> {
    let session = open_session(global)?;
    let job = JobLifecycle::new(&session.store).find_job(&args.job)?;
    print_record(&job, global)
}

fn run_transition(job_ref: &str, status: JobStatus, global: &GlobalOpts) -> Result<()> {
    let session = open_session(global)?;
    let lifecycle = JobLifecycle::new(&session.store);
    let job = lifecycle.find_job(job_ref)?;
    let job = match lifecycle.set_status(&job.id, status, Utc::now()) {
        Ok(job) => job,
        Err(ShopError::InvalidTransition { from, to }) => {
            return Err(invalid_transition(from, to));
        }
        Err(e) => return Err(e.into()),
    };

    output_done(
        &job.id,
        &format!("{} → {}", style(&job.job_code).cyan(), style(job.status).yellow()),
        global,
    );
    Ok(())
}

/// Explain a rejected transition with the moves that are open from `from`
fn invalid_transition(from: JobStatus, to: JobStatus) -> miette::Report {
    let allowed = allowed_transitions(from);
    let help = if allowed.is_empty() {
        format!("{} jobs cannot change status", from)
    } else {
        let names: Vec<String> = allowed.iter().map(|s| s.to_string()).collect();
        format!("From {} a job can move to: {}", from, names.join(", "))
    };
    miette::miette!(help = help, "Invalid status transition: {} → {}", from, to)
}

fn run_consume(args: ConsumeArgs, global: &GlobalOpts) -> Result<()> {
    let session = open_session(global)?;
    let lifecycle = JobLifecycle::new(&session.store);
    let job = lifecycle.find_job(&args.job)?;

    let hint: Option<ItemCategory> = args.category.map(Into::into);
    let consumable = match Ledger::new(&session.store).find_item(&args.item) {
        Ok(item) => {
            if hint.is_some_and(|h| h != item.category) {
                return Err(ShopError::ItemNotFound(args.item).into());
            }
            Consumable::new(item.id.to_string(), args.qty)
                .with_category(item.category.as_str())
                .with_name(item.name)
        }
        Err(ShopError::ItemNotFound(_)) => {
            let price = args.price.ok_or_else(|| {
                miette::miette!(
                    help = "Pass --price to record a free-text consumable",
                    "No inventory item matches '{}'",
                    args.item
                )
            })?;
            Consumable::new(args.item.clone(), args.qty)
                .with_unit_price(price)
                .with_name(args.item.clone())
        }
        Err(e) => return Err(e.into()),
    };

    let label = consumable
        .name
        .clone()
        .unwrap_or_else(|| consumable.item_id.clone());
    let job = lifecycle.add_consumable(&job.id, consumable)?;

    output_done(
        &job.id,
        &format!(
            "{} uses {} × {}",
            style(&job.job_code).cyan(),
            args.qty,
            style(label).yellow()
        ),
        global,
    );
    Ok(())
}

fn run_approve(args: JobRef, global: &GlobalOpts) -> Result<()> {
    let session = open_session(global)?;
    let job = JobLifecycle::new(&session.store).find_job(&args.job)?;
    let report = SettlementEngine::new(&session.store).approve(&job.id, Utc::now())?;
    print_settlement(&report, global)
}

fn run_reject(args: RejectArgs, global: &GlobalOpts) -> Result<()> {
    let session = open_session(global)?;
    let job = JobLifecycle::new(&session.store).find_job(&args.job)?;
    let report =
        SettlementEngine::new(&session.store).reject(&job.id, args.reason, Utc::now())?;
    print_settlement(&report, global)
}

fn print_settlement(report: &SettlementReport, global: &GlobalOpts) -> Result<()> {
    match global.format {
        OutputFormat::Id => {
            println!("{}", report.job.id);
            return Ok(());
        }
        OutputFormat::Json | OutputFormat::Yaml => {
            return print_serialized(report, global.format);
        }
        _ => {}
    }

    let job = &report.job;
    let Some(costs) = &report.costs else {
        println!(
            "{} {} rejected: {}",
            style("✗").red(),
            style(&job.job_code).cyan(),
            job.issue_reason.as_deref().unwrap_or("")
        );
        return Ok(());
    };

    println!(
        "{} {} approved",
        style("✓").green(),
        style(&job.job_code).cyan()
    );
    println!("   Material: {:.2}", costs.material_cost);
    println!(
        "   Labor:    {:.2} ({:.2} h)",
        costs.labor_cost, costs.active_hours
    );
    println!("   Total:    {}", style(format!("{:.2}", costs.total_cost)).bold());

    for deduction in &report.deductions {
        let short = if deduction.is_short() {
            style(" (short)").red().to_string()
        } else {
            String::new()
        };
        println!(
            "   {} {}: {} → {}{}",
            style("−").dim(),
            deduction.item_code,
            deduction.before,
            deduction.after,
            short
        );
    }
    for entry in &report.reorders {
        println!(
            "   {} queued reorder for {} ({})",
            style("→").dim(),
            style(&entry.item_code).yellow(),
            entry.id
        );
    }
    Ok(())
}

fn run_report(args: ReportArgs, global: &GlobalOpts) -> Result<()> {
    let session = open_session(global)?;
    let jobs: Vec<JobCard> = JobLifecycle::new(&session.store)
        .list_jobs(None)?
        .into_iter()
        .filter(|job| match job.status {
            JobStatus::Complete => true,
            JobStatus::Issue | JobStatus::Archived => args.all,
            _ => false,
        })
        .collect();

    let mut table = Table::new(&[
        "CODE", "STATUS", "QTY", "HOURS", "MATERIAL", "LABOR", "TOTAL",
    ]);
    let (mut material, mut labor, mut total) = (0.0, 0.0, 0.0);
    for job in &jobs {
        material += job.material_cost.unwrap_or(0.0);
        labor += job.labor_cost.unwrap_or(0.0);
        total += job.total_cost.unwrap_or(0.0);

        let hours = job
            .active_time()
            .map(|d| format!("{:.2}", d.num_seconds() as f64 / 3600.0))
            .unwrap_or_else(|| "-".to_string());
        table.row(
            job.id,
            vec![
                job.job_code.clone(),
                job.status.to_string(),
                job.quantity.to_string(),
                hours,
                format_money(job.material_cost),
                format_money(job.labor_cost),
                format_money(job.total_cost),
            ],
        );
    }

    if effective_format(global.format, true) == OutputFormat::Table && !table.is_empty() {
        table.row(
            "",
            vec![
                "TOTAL".to_string(),
                String::new(),
                String::new(),
                String::new(),
                format!("{:.2}", material),
                format!("{:.2}", labor),
                format!("{:.2}", total),
            ],
        );
    }
    print_list(&jobs, table, "settled jobs", global)
}
