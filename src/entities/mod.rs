//! Entity type definitions
//!
//! Shopfloor tracks the following record types:
//!
//! **Production:**
//! - [`JobCard`] - Units of work moving through the workshop pipeline
//! - [`Employee`] - Staff with hourly labor rates
//!
//! **Inventory & Purchasing:**
//! - [`InventoryItem`] - Components, raw materials, workshop supplies and products
//! - [`PurchaseQueueItem`] - Replenishment requests
//! - [`Supplier`] - Vendors with delivery lead times

pub mod employee;
pub mod item;
pub mod job;
pub mod purchase;
pub mod supplier;

pub use employee::Employee;
pub use item::{InventoryItem, ItemCategory};
pub use job::{Consumable, JobCard, JobStatus};
pub use purchase::{PurchaseQueueItem, QueueStatus};
pub use supplier::Supplier;
