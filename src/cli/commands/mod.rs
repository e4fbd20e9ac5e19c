//! CLI command implementations

pub mod completions;
pub mod emp;
pub mod init;
pub mod inv;
pub mod job;
pub mod queue;
pub mod sup;

use miette::Result;

use crate::cli::{Cli, Commands};

/// Dispatch a parsed command line to its command
pub fn run(cli: Cli) -> Result<()> {
    let global = &cli.global;
    match cli.command {
        Commands::Init(args) => init::run(args),
        Commands::Job(cmd) => job::run(cmd, global),
        Commands::Inv(cmd) => inv::run(cmd, global),
        Commands::Queue(cmd) => queue::run(cmd, global),
        Commands::Sup(cmd) => sup::run(cmd, global),
        Commands::Emp(cmd) => emp::run(cmd, global),
        Commands::Completions(args) => completions::run(args),
    }
}
