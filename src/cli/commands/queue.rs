//! `shopfloor queue` command - Replenishment requests, orders and receipts

use std::collections::HashMap;
use std::fs::File;
use std::io;
use std::path::PathBuf;

use chrono::Utc;
use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::filters::QueueStatusFilter;
use crate::cli::helpers::{
    confirm, format_short_id, open_session, read_ids_from_stdin, truncate_str, Session,
};
use crate::cli::output::{output_created, output_done, print_list};
use crate::cli::table::Table;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::directory::Directory;
use crate::core::error::ShopError;
use crate::core::entity::Entity;
use crate::core::identity::EntityId;
use crate::core::ledger::Ledger;
use crate::core::purchasing::{CancelOutcome, Enqueued, PurchaseQueue};
use crate::entities::purchase::{PurchaseQueueItem, QueueStatus};

#[derive(Subcommand, Debug)]
pub enum QueueCommands {
    /// List purchase requests
    List(ListArgs),

    /// Request replenishment for an item
    Add(AddArgs),

    /// Place pending requests with a supplier
    Order(OrderArgs),

    /// Record goods received for a request
    Receive(ReceiveArgs),

    /// Return a request to pending if its item is still low, else drop it
    Cancel(CancelArgs),

    /// Delete a pending request
    Remove(CancelArgs),

    /// Export requests as CSV
    Export(ExportArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Filter by status
    #[arg(long, short = 's', value_enum, default_value = "active")]
    pub status: QueueStatusFilter,

    /// Show only count
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug)]
pub struct AddArgs {
    /// Item ID or item code
    pub item: String,
}

#[derive(clap::Args, Debug)]
pub struct OrderArgs {
    /// Request IDs or item codes (reads IDs from stdin when piped)
    pub entries: Vec<String>,

    /// Order every pending request
    #[arg(long, conflicts_with = "entries")]
    pub all: bool,

    /// Supplier to order from (ID or name)
    #[arg(long, short = 's')]
    pub supplier: Option<String>,

    /// Order quantity for one request, overriding the recommendation (ENTRY=QTY)
    #[arg(long = "qty", short = 'q', value_name = "ENTRY=QTY")]
    pub quantities: Vec<String>,
}

#[derive(clap::Args, Debug)]
pub struct ReceiveArgs {
    /// Request ID or item code
    pub entry: String,

    /// Quantity received
    #[arg(allow_hyphen_values = true)]
    pub qty: i64,
}

#[derive(clap::Args, Debug)]
pub struct CancelArgs {
    /// Request ID or item code
    pub entry: String,

    /// Skip confirmation
    #[arg(long, short = 'y')]
    pub yes: bool,
}

#[derive(clap::Args, Debug)]
pub struct ExportArgs {
    /// Filter by status
    #[arg(long, short = 's', value_enum, default_value = "all")]
    pub status: QueueStatusFilter,

    /// Write to a file instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

/// Run a purchase queue subcommand
pub fn run(cmd: QueueCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        QueueCommands::List(args) => run_list(args, global),
        QueueCommands::Add(args) => run_add(args, global),
        QueueCommands::Order(args) => run_order(args, global),
        QueueCommands::Receive(args) => run_receive(args, global),
        QueueCommands::Cancel(args) => run_cancel(args, global),
        QueueCommands::Remove(args) => run_remove(args, global),
        QueueCommands::Export(args) => run_export(args, global),
    }
}

/// Resolve a request by its ID, or by the code of an item with an open request
fn resolve_entry(session: &Session, entry: &str) -> Result<PurchaseQueueItem> {
    let queue = PurchaseQueue::new(&session.store);

    if let Ok(id) = EntityId::parse_with_prefix(entry, PurchaseQueueItem::PREFIX) {
        return queue
            .get(&id)?
            .ok_or_else(|| ShopError::QueueItemNotFound(entry.to_string()).into());
    }

    let item = match Ledger::new(&session.store).find_item(entry) {
        Ok(item) => item,
        Err(ShopError::ItemNotFound(_)) => {
            return Err(ShopError::QueueItemNotFound(entry.to_string()).into())
        }
        Err(e) => return Err(e.into()),
    };
    queue
        .active_for_item(&item.id)?
        .ok_or_else(|| ShopError::QueueItemNotFound(entry.to_string()).into())
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let session = open_session(global)?;
    let entries: Vec<PurchaseQueueItem> = PurchaseQueue::new(&session.store)
        .list(args.status.as_status())?
        .into_iter()
        .filter(|e| args.status.matches(e.status))
        .collect();

    if args.count {
        println!("{}", entries.len());
        return Ok(());
    }

    let mut table = Table::new(&[
        "ID", "ITEM", "NAME", "STATUS", "STOCK", "REORDER", "RECOMMENDED", "ORDERED", "ARRIVAL",
    ]);
    for entry in &entries {
        table.row(
            entry.id,
            vec![
                format_short_id(&entry.id),
                entry.item_code.clone(),
                truncate_str(&entry.item_name, 30),
                entry.status.to_string(),
                entry.current_stock.to_string(),
                entry.reorder_level.to_string(),
                entry.recommended_quantity().to_string(),
                entry
                    .ordered_qty
                    .map(|q| q.to_string())
                    .unwrap_or_else(|| "-".to_string()),
                entry
                    .expected_arrival_date
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_else(|| "-".to_string()),
            ],
        );
    }
    print_list(&entries, table, "purchase requests", global)
}

fn run_add(args: AddArgs, global: &GlobalOpts) -> Result<()> {
    let session = open_session(global)?;
    let item = Ledger::new(&session.store).find_item(&args.item)?;
    let queue = PurchaseQueue::with_config(&session.store, &session.config.purchasing);

    match queue.enqueue(&item.id, Utc::now())? {
        Enqueued::Created(entry) => {
            output_created(&entry, "purchase request", global);
            if global.format != OutputFormat::Id {
                println!(
                    "   Recommended order: {} {}",
                    entry.recommended_quantity(),
                    entry.unit
                );
            }
        }
        Enqueued::Existing(entry) => output_done(
            &entry.id,
            &format!(
                "{} already has an open request ({})",
                style(&entry.item_code).cyan(),
                entry.status
            ),
            global,
        ),
    }
    Ok(())
}

fn parse_quantity(arg: &str) -> Result<(&str, i64)> {
    let (entry, qty) = arg
        .rsplit_once('=')
        .ok_or_else(|| miette::miette!("Expected ENTRY=QTY, got '{}'", arg))?;
    let qty = qty
        .trim()
        .parse::<i64>()
        .map_err(|_| miette::miette!("Invalid quantity in '{}'", arg))?;
    Ok((entry.trim(), qty))
}

fn run_order(args: OrderArgs, global: &GlobalOpts) -> Result<()> {
    let session = open_session(global)?;
    let queue = PurchaseQueue::with_config(&session.store, &session.config.purchasing);

    let supplier = match &args.supplier {
        Some(s) => Some(Directory::new(&session.store).find_supplier(s)?),
        None => None,
    };

    let ids: Vec<EntityId> = if args.all {
        queue
            .list(Some(QueueStatus::Pending))?
            .into_iter()
            .map(|e| e.id)
            .collect()
    } else {
        let refs = if args.entries.is_empty() {
            read_ids_from_stdin().unwrap_or_default()
        } else {
            args.entries.clone()
        };
        refs.iter()
            .map(|r| resolve_entry(&session, r).map(|e| e.id))
            .collect::<Result<Vec<_>>>()?
    };

    if ids.is_empty() {
        println!("No purchase requests to order.");
        return Ok(());
    }

    let mut overrides = HashMap::new();
    for arg in &args.quantities {
        let (entry, qty) = parse_quantity(arg)?;
        overrides.insert(resolve_entry(&session, entry)?.id, qty);
    }

    let ordered = queue.mark_ordered(
        supplier.as_ref().map(|s| &s.id),
        &ids,
        &overrides,
        Utc::now(),
    )?;

    for entry in &ordered {
        output_done(
            &entry.id,
            &format!(
                "Ordered {} × {}{}",
                entry.ordered_qty.unwrap_or(0),
                style(&entry.item_code).cyan(),
                entry
                    .expected_arrival_date
                    .map(|d| format!(" (expected {})", d.format("%Y-%m-%d")))
                    .unwrap_or_default()
            ),
            global,
        );
    }
    Ok(())
}

fn run_receive(args: ReceiveArgs, global: &GlobalOpts) -> Result<()> {
    let session = open_session(global)?;
    let entry = resolve_entry(&session, &args.entry)?;
    let entry = PurchaseQueue::new(&session.store).receive(&entry.id, args.qty, Utc::now())?;

    output_done(
        &entry.id,
        &format!(
            "Received {} × {}",
            args.qty,
            style(&entry.item_code).cyan()
        ),
        global,
    );
    Ok(())
}

fn run_cancel(args: CancelArgs, global: &GlobalOpts) -> Result<()> {
    let session = open_session(global)?;
    let entry = resolve_entry(&session, &args.entry)?;

    if !confirm(&format!("Cancel request for {}", entry.item_code), args.yes)? {
        println!("Cancelled.");
        return Ok(());
    }

    match PurchaseQueue::new(&session.store).requeue_or_cancel(&entry.id)? {
        CancelOutcome::Requeued(entry) => output_done(
            &entry.id,
            &format!(
                "{} is still low; request returned to pending",
                style(&entry.item_code).cyan()
            ),
            global,
        ),
        CancelOutcome::Deleted => output_done(
            &entry.id,
            &format!("Request for {} removed", style(&entry.item_code).cyan()),
            global,
        ),
    }
    Ok(())
}

fn run_remove(args: CancelArgs, global: &GlobalOpts) -> Result<()> {
    let session = open_session(global)?;
    let entry = resolve_entry(&session, &args.entry)?;

    if !confirm(&format!("Remove request for {}", entry.item_code), args.yes)? {
        println!("Cancelled.");
        return Ok(());
    }

    let entry = PurchaseQueue::new(&session.store).remove(&entry.id)?;
    output_done(
        &entry.id,
        &format!("Request for {} removed", style(&entry.item_code).cyan()),
        global,
    );
    Ok(())
}

fn run_export(args: ExportArgs, global: &GlobalOpts) -> Result<()> {
    let session = open_session(global)?;
    let queue = PurchaseQueue::new(&session.store);
    let keep = |e: &PurchaseQueueItem| args.status.matches(e.status);

    match &args.output {
        Some(path) => {
            let file = File::create(path).into_diagnostic()?;
            let count = queue.export_csv(file, keep)?;
            eprintln!(
                "{} Exported {} request(s) to {}",
                style("✓").green(),
                count,
                path.display()
            );
        }
        None => {
            queue.export_csv(io::stdout(), keep)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity("OAK=12").unwrap(), ("OAK", 12));
        assert_eq!(parse_quantity(" PQ-1 = 3 ").unwrap(), ("PQ-1", 3));
        assert!(parse_quantity("OAK").is_err());
        assert!(parse_quantity("OAK=lots").is_err());
    }
}
