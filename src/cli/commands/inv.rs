//! `shopfloor inv` command - Inventory items and stock levels

use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::filters::CliCategory;
use crate::cli::helpers::{confirm, open_session, truncate_str};
use crate::cli::output::{output_created, output_done, print_list, print_record};
use crate::cli::table::Table;
use crate::cli::GlobalOpts;
use crate::core::directory::Directory;
use crate::core::identity::EntityId;
use crate::core::ledger::Ledger;
use crate::core::store::Store;
use crate::entities::item::{InventoryItem, ItemCategory};

#[derive(Subcommand, Debug)]
pub enum InvCommands {
    /// Add an inventory item
    New(NewArgs),

    /// List inventory items
    List(ListArgs),

    /// Show an inventory item
    Show(ItemRef),

    /// Change an item's attributes (stock is changed with `adjust`)
    Edit(EditArgs),

    /// Correct an item's stock count by a signed amount
    Adjust(AdjustArgs),

    /// Delete an inventory item
    Delete(DeleteArgs),

    /// List items below their reorder level
    Low,
}

#[derive(clap::Args, Debug)]
pub struct ItemRef {
    /// Item ID or item code
    pub item: String,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Item code, unique across all categories
    #[arg(long)]
    pub code: String,

    #[arg(long, short = 'n')]
    pub name: String,

    #[arg(long, short = 'c', value_enum)]
    pub category: CliCategory,

    /// Opening stock
    #[arg(long, default_value_t = 0)]
    pub stock: i64,

    /// Reorder when stock drops below this level
    #[arg(long, default_value_t = 0)]
    pub reorder: i64,

    /// Target stock level for recommended order quantities
    #[arg(long)]
    pub standard: Option<i64>,

    /// Unit price
    #[arg(long, default_value_t = 0.0)]
    pub price: f64,

    #[arg(long, default_value = "pcs")]
    pub unit: String,

    /// Preferred supplier (ID or name)
    #[arg(long)]
    pub supplier: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Only items in this category
    #[arg(long, short = 'c', value_enum)]
    pub category: Option<CliCategory>,

    /// Show only count
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Item ID or item code
    pub item: String,

    #[arg(long)]
    pub code: Option<String>,

    #[arg(long, short = 'n')]
    pub name: Option<String>,

    #[arg(long)]
    pub reorder: Option<i64>,

    #[arg(long)]
    pub standard: Option<i64>,

    #[arg(long)]
    pub price: Option<f64>,

    #[arg(long)]
    pub unit: Option<String>,

    /// Preferred supplier (ID or name)
    #[arg(long)]
    pub supplier: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct AdjustArgs {
    /// Item ID or item code
    pub item: String,

    /// Signed stock change (e.g. 5 or -2)
    #[arg(allow_hyphen_values = true)]
    pub delta: i64,
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    /// Item ID or item code
    pub item: String,

    /// Skip confirmation
    #[arg(long, short = 'y')]
    pub yes: bool,
}

/// Run an inventory subcommand
pub fn run(cmd: InvCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        InvCommands::New(args) => run_new(args, global),
        InvCommands::List(args) => run_list(args, global),
        InvCommands::Show(args) => run_show(args, global),
        InvCommands::Edit(args) => run_edit(args, global),
        InvCommands::Adjust(args) => run_adjust(args, global),
        InvCommands::Delete(args) => run_delete(args, global),
        InvCommands::Low => run_low(global),
    }
}

fn resolve_supplier(store: &Store, supplier: Option<&str>) -> Result<Option<EntityId>> {
    match supplier {
        Some(s) => Ok(Some(Directory::new(store).find_supplier(s)?.id)),
        None => Ok(None),
    }
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let session = open_session(global)?;

    let mut item = InventoryItem::new(args.code, args.name, args.category.into());
    item.current_stock = args.stock;
    item.reorder_level = args.reorder;
    item.standard_stock_level = args.standard.unwrap_or(args.reorder);
    item.price = args.price;
    item.unit = args.unit;
    item.supplier_id = resolve_supplier(&session.store, args.supplier.as_deref())?;

    Ledger::new(&session.store).create_item(&item)?;

    output_created(&item, &item.category.as_str().to_lowercase(), global);
    Ok(())
}

fn item_table(items: &[InventoryItem]) -> Table {
    let mut table = Table::new(&[
        "CODE", "NAME", "CATEGORY", "STOCK", "REORDER", "STANDARD", "PRICE", "UNIT",
    ]);
    for item in items {
        let stock = if item.is_low() {
            style(item.current_stock).red().to_string()
        } else {
            item.current_stock.to_string()
        };
        table.row(
            item.id,
            vec![
                item.code.clone(),
                truncate_str(&item.name, 30),
                item.category.to_string(),
                stock,
                item.reorder_level.to_string(),
                item.standard_stock_level.to_string(),
                format!("{:.2}", item.price),
                item.unit.clone(),
            ],
        );
    }
    table
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let session = open_session(global)?;
    let category: Option<ItemCategory> = args.category.map(Into::into);
    let items = Ledger::new(&session.store).list_items(category)?;

    if args.count {
        println!("{}", items.len());
        return Ok(());
    }
    print_list(&items, item_table(&items), "items", global)
}

fn run_show(args: ItemRef, global: &GlobalOpts) -> Result<()> {
    let session = open_session(global)?;
    let item = Ledger::new(&session.store).find_item(&args.item)?;
    print_record(&item, global)
}

fn run_edit(args: EditArgs, global: &GlobalOpts) -> Result<()> {
    let session = open_session(global)?;
    let ledger = Ledger::new(&session.store);
    let mut item = ledger.find_item(&args.item)?;

    if let Some(code) = args.code {
        item.code = code;
    }
    if let Some(name) = args.name {
        item.name = name;
    }
    if let Some(reorder) = args.reorder {
        item.reorder_level = reorder;
    }
    if let Some(standard) = args.standard {
        item.standard_stock_level = standard;
    }
    if let Some(price) = args.price {
        item.price = price;
    }
    if let Some(unit) = args.unit {
        item.unit = unit;
    }
    if args.supplier.is_some() {
        item.supplier_id = resolve_supplier(&session.store, args.supplier.as_deref())?;
    }

    let item = ledger.update_item(&item)?;
    output_done(
        &item.id,
        &format!("Updated {}", style(&item.code).cyan()),
        global,
    );
    Ok(())
}

fn run_adjust(args: AdjustArgs, global: &GlobalOpts) -> Result<()> {
    let session = open_session(global)?;
    let ledger = Ledger::new(&session.store);
    let item = ledger.find_item(&args.item)?;
    let change = ledger.adjust_stock(&item.id, Some(item.category), args.delta)?;

    output_done(
        &item.id,
        &format!(
            "{} stock {} → {}",
            style(&item.code).cyan(),
            change.before,
            style(change.after).yellow()
        ),
        global,
    );
    Ok(())
}

fn run_delete(args: DeleteArgs, global: &GlobalOpts) -> Result<()> {
    let session = open_session(global)?;
    let ledger = Ledger::new(&session.store);
    let item = ledger.find_item(&args.item)?;

    if !confirm(&format!("Delete {} ({})", item.code, item.name), args.yes)? {
        println!("Cancelled.");
        return Ok(());
    }

    ledger.delete_item(&item.id)?;
    output_done(
        &item.id,
        &format!("Deleted {}", style(&item.code).cyan()),
        global,
    );
    Ok(())
}

fn run_low(global: &GlobalOpts) -> Result<()> {
    let session = open_session(global)?;
    let items = Ledger::new(&session.store).low_stock()?;
    print_list(&items, item_table(&items), "low-stock items", global)
}
