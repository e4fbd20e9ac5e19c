//! Output formatting utilities

use std::io::IsTerminal;

use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;

use crate::cli::table::Table;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::entity::Entity;
use crate::core::identity::EntityId;

/// Determine the effective output format based on context
///
/// Lists default to an aligned table on a terminal and TSV when piped;
/// single records default to YAML.
pub fn effective_format(format: OutputFormat, is_list: bool) -> OutputFormat {
    match format {
        OutputFormat::Auto if is_list => {
            if std::io::stdout().is_terminal() {
                OutputFormat::Table
            } else {
                OutputFormat::Tsv
            }
        }
        OutputFormat::Auto => OutputFormat::Yaml,
        other => other,
    }
}

/// Print a value as JSON or YAML
pub fn print_serialized<T: Serialize + ?Sized>(value: &T, format: OutputFormat) -> Result<()> {
    if format == OutputFormat::Json {
        let json = serde_json::to_string_pretty(value).into_diagnostic()?;
        println!("{}", json);
    } else {
        let yaml = serde_yml::to_string(value).into_diagnostic()?;
        print!("{}", yaml);
    }
    Ok(())
}

/// Print a list either as full records (JSON/YAML) or through `table`
pub fn print_list<T: Serialize>(
    records: &[T],
    table: Table,
    name_plural: &str,
    global: &GlobalOpts,
) -> Result<()> {
    let format = effective_format(global.format, true);
    match format {
        OutputFormat::Json | OutputFormat::Yaml => print_serialized(records, format),
        _ if table.is_empty() => {
            if format != OutputFormat::Id {
                println!("No {} found.", name_plural);
            }
            Ok(())
        }
        _ => table.print(format),
    }
}

/// Print a single record, or just its ID with `--format id`
pub fn print_record<E: Entity>(record: &E, global: &GlobalOpts) -> Result<()> {
    match effective_format(global.format, false) {
        OutputFormat::Id => {
            println!("{}", record.id());
            Ok(())
        }
        OutputFormat::Json => print_serialized(record, OutputFormat::Json),
        _ => print_serialized(record, OutputFormat::Yaml),
    }
}

/// Report a newly created record
pub fn output_created<E: Entity>(record: &E, kind: &str, global: &GlobalOpts) {
    match global.format {
        OutputFormat::Id => println!("{}", record.id()),
        _ => {
            println!(
                "{} Created {} {}",
                style("✓").green(),
                kind,
                style(record.id()).cyan()
            );
            println!("   {}", style(record.title()).yellow());
        }
    }
}

/// Report a completed action on a record
pub fn output_done(id: &EntityId, message: &str, global: &GlobalOpts) {
    match global.format {
        OutputFormat::Id => println!("{}", id),
        _ => println!("{} {}", style("✓").green(), message),
    }
}
