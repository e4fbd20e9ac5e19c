//! Entity trait - common interface for all stored record types

use serde::{de::DeserializeOwned, Serialize};

use crate::core::identity::{EntityId, EntityPrefix};

/// Common trait for all workshop records
pub trait Entity: Serialize + DeserializeOwned {
    /// The ID prefix for this record type (e.g., JOB, ITM)
    const PREFIX: EntityPrefix;

    /// Get the record's unique ID
    fn id(&self) -> &EntityId;

    /// Get a human-readable title
    fn title(&self) -> &str;
}
