//! Shared helper functions for CLI commands

use std::io::{self, BufRead, IsTerminal};

use miette::{IntoDiagnostic, Result};

use crate::cli::GlobalOpts;
use crate::core::config::Config;
use crate::core::identity::EntityId;
use crate::core::store::Store;
use crate::core::workshop::Workshop;

/// An opened workshop: its root, effective config and record store
pub struct Session {
    pub workshop: Workshop,
    pub config: Config,
    pub store: Store,
}

/// Locate the workshop named by `--workshop` (or the current directory)
pub fn discover_workshop(global: &GlobalOpts) -> Result<Workshop> {
    let workshop = match &global.workshop {
        Some(path) => Workshop::discover_from(path)?,
        None => Workshop::discover()?,
    };
    Ok(workshop)
}

/// Configuration for the selected workshop, or user-level config outside one
pub fn load_config(global: &GlobalOpts) -> Config {
    match discover_workshop(global) {
        Ok(workshop) => Config::load_for(&workshop),
        Err(_) => Config::load(),
    }
}

/// Discover the workshop and open its store
pub fn open_session(global: &GlobalOpts) -> Result<Session> {
    let workshop = discover_workshop(global)?;
    let config = Config::load_for(&workshop);
    let store = workshop.open_store(&config)?;
    Ok(Session {
        workshop,
        config,
        store,
    })
}

/// Format an EntityId for table display, truncating the ULID
///
/// Full IDs are 30 characters; tables show the prefix and first 8 ULID chars.
pub fn format_short_id(id: &EntityId) -> String {
    truncate_str(&id.to_string(), 16)
}

/// Truncate a string to `max_len` characters, adding "..." if truncated
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Format a money amount with two decimals, or "-" when unset
pub fn format_money(amount: Option<f64>) -> String {
    amount
        .map(|a| format!("{:.2}", a))
        .unwrap_or_else(|| "-".to_string())
}

/// Read IDs from stdin when it is piped
///
/// Enables pipelines like `shopfloor queue list -f id | shopfloor queue order`.
pub fn read_ids_from_stdin() -> Option<Vec<String>> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        return None;
    }

    let ids: Vec<String> = stdin
        .lock()
        .lines()
        .map_while(|line| line.ok())
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
        .collect();

    if ids.is_empty() {
        None
    } else {
        Some(ids)
    }
}

/// Ask before a destructive action unless `--yes` was given
///
/// Without a terminal to ask on, the action is refused.
pub fn confirm(prompt: &str, assume_yes: bool) -> Result<bool> {
    if assume_yes {
        return Ok(true);
    }
    if !io::stdin().is_terminal() {
        return Err(miette::miette!(
            help = "Pass --yes to confirm non-interactively",
            "Refusing to {} without confirmation",
            prompt.to_lowercase()
        ));
    }
    dialoguer::Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .into_diagnostic()
}
