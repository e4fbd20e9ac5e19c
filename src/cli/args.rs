//! Command-line argument definitions

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::cli::commands::{
    completions::CompletionsArgs, emp::EmpCommands, init::InitArgs, inv::InvCommands,
    job::JobCommands, queue::QueueCommands, sup::SupCommands,
};

/// Workshop job tracking, inventory and purchasing from the command line
#[derive(Parser, Debug)]
#[command(name = "shopfloor", version, about, propagate_version = true)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options accepted by every command
#[derive(clap::Args, Debug, Clone)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, value_enum, default_value_t = OutputFormat::Auto)]
    pub format: OutputFormat,

    /// Increase log detail (-v info, -vv debug)
    #[arg(long, short = 'v', global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Workshop directory (default: search upward from the current directory)
    #[arg(long, short = 'C', global = true, env = "SHOPFLOOR_WORKSHOP")]
    pub workshop: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a new workshop in the current (or given) directory
    Init(InitArgs),

    /// Job cards: create, track, submit for QC and settle
    #[command(subcommand)]
    Job(JobCommands),

    /// Inventory items and stock levels
    #[command(subcommand)]
    Inv(InvCommands),

    /// Purchase queue: replenishment requests, orders and receipts
    #[command(subcommand)]
    Queue(QueueCommands),

    /// Suppliers and their lead times
    #[command(subcommand)]
    Sup(SupCommands),

    /// Employees and their labor rates
    #[command(subcommand)]
    Emp(EmpCommands),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Output format for command results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Table on a terminal, TSV when piped
    #[default]
    Auto,
    /// Aligned table
    Table,
    Yaml,
    Json,
    /// Tab-separated values
    Tsv,
    /// Comma-separated values
    Csv,
    /// Record IDs only, one per line
    Id,
}
