//! `shopfloor sup` command - Supplier management

use chrono::Utc;
use clap::Subcommand;
use miette::Result;

use crate::cli::helpers::open_session;
use crate::cli::output::{output_created, print_list, print_record};
use crate::cli::table::Table;
use crate::cli::GlobalOpts;
use crate::core::directory::Directory;
use crate::entities::supplier::Supplier;

#[derive(Subcommand, Debug)]
pub enum SupCommands {
    /// List suppliers
    List,

    /// Create a new supplier
    New(NewArgs),

    /// Show a supplier's details
    Show(ShowArgs),
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Company name
    #[arg(long, short = 'n')]
    pub name: String,

    /// Days from order to expected arrival
    #[arg(long, default_value_t = 0)]
    pub eta: u32,

    /// Contact person, email or phone
    #[arg(long)]
    pub contact: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Supplier ID or name
    pub supplier: String,
}

/// Run a supplier subcommand
pub fn run(cmd: SupCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        SupCommands::List => run_list(global),
        SupCommands::New(args) => run_new(args, global),
        SupCommands::Show(args) => run_show(args, global),
    }
}

fn run_list(global: &GlobalOpts) -> Result<()> {
    let session = open_session(global)?;
    let suppliers = Directory::new(&session.store).list_suppliers()?;

    let mut table = Table::new(&["NAME", "ETA DAYS", "CONTACT"]);
    for supplier in &suppliers {
        table.row(
            supplier.id,
            vec![
                supplier.name.clone(),
                supplier.eta_days.to_string(),
                supplier.contact.clone().unwrap_or_default(),
            ],
        );
    }
    print_list(&suppliers, table, "suppliers", global)
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let session = open_session(global)?;

    let mut supplier = Supplier::new(args.name, args.eta, Utc::now());
    supplier.contact = args.contact;
    Directory::new(&session.store).create_supplier(&supplier)?;

    output_created(&supplier, "supplier", global);
    Ok(())
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let session = open_session(global)?;
    let supplier = Directory::new(&session.store).find_supplier(&args.supplier)?;
    print_record(&supplier, global)
}
