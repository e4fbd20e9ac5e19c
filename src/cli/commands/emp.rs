//! `shopfloor emp` command - Employees and labor rates

use chrono::Utc;
use clap::Subcommand;
use miette::Result;

use crate::cli::helpers::{format_money, open_session};
use crate::cli::output::{output_created, print_list, print_record};
use crate::cli::table::Table;
use crate::cli::GlobalOpts;
use crate::core::directory::Directory;
use crate::entities::employee::Employee;

#[derive(Subcommand, Debug)]
pub enum EmpCommands {
    /// List employees
    List,

    /// Register an employee
    New(NewArgs),

    /// Show an employee
    Show(ShowArgs),
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    #[arg(long, short = 'n')]
    pub name: String,

    #[arg(long, short = 'd')]
    pub department: Option<String>,

    /// Labor rate per hour
    #[arg(long)]
    pub rate: Option<f64>,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Employee ID or name
    pub employee: String,
}

/// Run an employee subcommand
pub fn run(cmd: EmpCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        EmpCommands::List => run_list(global),
        EmpCommands::New(args) => run_new(args, global),
        EmpCommands::Show(args) => run_show(args, global),
    }
}

fn run_list(global: &GlobalOpts) -> Result<()> {
    let session = open_session(global)?;
    let employees = Directory::new(&session.store).list_employees()?;

    let mut table = Table::new(&["NAME", "DEPARTMENT", "RATE"]);
    for employee in &employees {
        table.row(
            employee.id,
            vec![
                employee.name.clone(),
                employee.department_id.clone().unwrap_or_default(),
                format_money(employee.hourly_rate),
            ],
        );
    }
    print_list(&employees, table, "employees", global)
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let session = open_session(global)?;

    let mut employee = Employee::new(args.name, Utc::now());
    employee.department_id = args.department;
    employee.hourly_rate = args.rate;
    Directory::new(&session.store).create_employee(&employee)?;

    output_created(&employee, "employee", global);
    Ok(())
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let session = open_session(global)?;
    let employee = Directory::new(&session.store).find_employee(&args.employee)?;
    print_record(&employee, global)
}
