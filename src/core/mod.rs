//! Core module - record store, workshop engines and shared types

pub mod config;
pub mod directory;
pub mod entity;
pub mod error;
pub mod identity;
pub mod ledger;
pub mod lifecycle;
pub mod logging;
pub mod purchasing;
pub mod settlement;
pub mod store;
pub mod workshop;

pub use config::Config;
pub use directory::Directory;
pub use entity::Entity;
pub use error::{ShopError, ShopResult};
pub use identity::{EntityId, EntityPrefix, IdParseError};
pub use ledger::{Ledger, StockChange};
pub use lifecycle::{allowed_transitions, is_valid_transition, JobLifecycle, NewJob};
pub use purchasing::{CancelOutcome, Enqueued, PurchaseQueue};
pub use settlement::{JobCosts, QcDecision, SettlementEngine, SettlementReport, StockDeduction};
pub use store::{ChangeEvent, Collection, Store, StoreError, Subscription};
pub use workshop::{Workshop, WorkshopError};
