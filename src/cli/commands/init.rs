//! `shopfloor init` command - Create a workshop

use std::path::PathBuf;

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::core::config::Config;
use crate::core::workshop::Workshop;

#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Directory to initialize (defaults to the current directory)
    pub path: Option<PathBuf>,
}

pub fn run(args: InitArgs) -> Result<()> {
    let root = match args.path {
        Some(path) => path,
        None => std::env::current_dir().into_diagnostic()?,
    };

    let workshop = Workshop::init(&root)?;
    let config = Config::load_for(&workshop);
    // Opening the store creates the schema
    workshop.open_store(&config)?;

    println!(
        "{} Initialized shopfloor workshop at {}",
        style("✓").green(),
        style(workshop.root().display()).cyan()
    );
    println!();
    println!("Next steps:");
    println!("  shopfloor sup new --name \"Timber Co\" --eta 5");
    println!("  shopfloor inv new --code OAK --name \"Oak board\" --category raw-material");
    println!("  shopfloor job new --qty 1");
    Ok(())
}
