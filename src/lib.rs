//! Shopfloor: workshop job cards, inventory settlement and replenishment
//!
//! Job cards move through a status workflow; approving a finished job at QC
//! deducts the materials it consumed, costs the work, and queues purchase
//! requests for anything that dropped below its reorder level. All of it runs
//! against a single SQLite store with atomic multi-record transactions.

pub mod cli;
pub mod core;
pub mod entities;
