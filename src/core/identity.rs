//! Entity identity - prefixed ULID identifiers
//!
//! Every record in the workshop store carries an ID of the form
//! `PREFIX-ULID` (e.g. `JOB-01J5M2Y4ZQ8W0V9X3T6R7S1P2N`). The prefix names the
//! collection; the ULID keeps IDs sortable by creation time.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;
use ulid::Ulid;

/// Collection prefix for an entity ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityPrefix {
    /// Job card
    Job,
    /// Inventory item (any category)
    Itm,
    /// Purchase queue entry
    Pq,
    /// Supplier
    Sup,
    /// Employee
    Emp,
}

impl EntityPrefix {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityPrefix::Job => "JOB",
            EntityPrefix::Itm => "ITM",
            EntityPrefix::Pq => "PQ",
            EntityPrefix::Sup => "SUP",
            EntityPrefix::Emp => "EMP",
        }
    }

    pub fn all() -> &'static [EntityPrefix] {
        &[
            EntityPrefix::Job,
            EntityPrefix::Itm,
            EntityPrefix::Pq,
            EntityPrefix::Sup,
            EntityPrefix::Emp,
        ]
    }
}

impl fmt::Display for EntityPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityPrefix {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntityPrefix::all()
            .iter()
            .copied()
            .find(|p| p.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| IdParseError::UnknownPrefix(s.to_string()))
    }
}

/// Errors from parsing an entity ID string
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdParseError {
    #[error("Invalid ID format '{0}': expected PREFIX-ULID")]
    MissingSeparator(String),

    #[error("Unknown ID prefix: {0}")]
    UnknownPrefix(String),

    #[error("Invalid ULID in ID '{0}'")]
    InvalidUlid(String),
}

/// A unique, prefixed entity identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId {
    prefix: EntityPrefix,
    ulid: Ulid,
}

impl EntityId {
    /// Generate a fresh ID for the given collection
    pub fn new(prefix: EntityPrefix) -> Self {
        Self {
            prefix,
            ulid: Ulid::new(),
        }
    }

    /// Parse an ID, requiring a specific prefix
    pub fn parse_with_prefix(s: &str, expected: EntityPrefix) -> Result<Self, IdParseError> {
        let id: EntityId = s.parse()?;
        if id.prefix != expected {
            return Err(IdParseError::UnknownPrefix(id.prefix.to_string()));
        }
        Ok(id)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.prefix, self.ulid)
    }
}

impl FromStr for EntityId {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (prefix, ulid) = s
            .trim()
            .split_once('-')
            .ok_or_else(|| IdParseError::MissingSeparator(s.to_string()))?;
        let prefix: EntityPrefix = prefix.parse()?;
        let ulid = Ulid::from_string(ulid).map_err(|_| IdParseError::InvalidUlid(s.to_string()))?;
        Ok(Self { prefix, ulid })
    }
}

impl Serialize for EntityId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for EntityId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_display_and_parse() {
        let id = EntityId::new(EntityPrefix::Job);
        let s = id.to_string();
        assert!(s.starts_with("JOB-"));
        assert_eq!(s.len(), 4 + 26);

        let parsed: EntityId = s.parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_prefix_is_case_insensitive() {
        let id = EntityId::new(EntityPrefix::Itm);
        let lower = id.to_string().replacen("ITM", "itm", 1);
        assert_eq!(lower.parse::<EntityId>().unwrap(), id);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            "nodash".parse::<EntityId>(),
            Err(IdParseError::MissingSeparator(_))
        ));
        assert!(matches!(
            "FOO-01J5M2Y4ZQ8W0V9X3T6R7S1P2N".parse::<EntityId>(),
            Err(IdParseError::UnknownPrefix(_))
        ));
        assert!(matches!(
            "JOB-notaulid".parse::<EntityId>(),
            Err(IdParseError::InvalidUlid(_))
        ));
    }

    #[test]
    fn test_parse_with_prefix() {
        let id = EntityId::new(EntityPrefix::Sup);
        assert!(EntityId::parse_with_prefix(&id.to_string(), EntityPrefix::Sup).is_ok());
        assert!(EntityId::parse_with_prefix(&id.to_string(), EntityPrefix::Emp).is_err());
    }

    #[test]
    fn test_serde_as_string() {
        let id = EntityId::new(EntityPrefix::Pq);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id));
        let back: EntityId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
