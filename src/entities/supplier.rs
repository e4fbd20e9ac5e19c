//! Supplier entity type - Vendors that fulfil purchase orders

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::Entity;
use crate::core::identity::{EntityId, EntityPrefix};

/// A Supplier record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Supplier {
    /// Unique identifier
    pub id: EntityId,

    /// Company name
    pub name: String,

    /// Days from order placement to expected arrival
    #[serde(default)]
    pub eta_days: u32,

    /// Contact person, email or phone
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Supplier {
    pub fn new(name: impl Into<String>, eta_days: u32, now: DateTime<Utc>) -> Self {
        Self {
            id: EntityId::new(EntityPrefix::Sup),
            name: name.into(),
            eta_days,
            contact: None,
            created_at: now,
        }
    }
}

impl Entity for Supplier {
    const PREFIX: EntityPrefix = EntityPrefix::Sup;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn title(&self) -> &str {
        &self.name
    }
}
