//! Person domain model.
//!
//! # Responsibility
//! - Define the canonical person record stored in the `people` collection.
//! - Enforce write-time validation before any persistence call.
//!
//! # Invariants
//! - `id` is assigned by the store on insert and never changes afterwards.
//! - `name` is non-empty (whitespace-only counts as empty).
//! - `favorite_foods` keeps insertion order; the store does not deduplicate.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for a stored person record.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type PersonId = Uuid;

/// Validation failure raised before a write reaches the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersonValidationError {
    /// `name` is required and must contain at least one non-whitespace char.
    EmptyName,
}

impl Display for PersonValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "person name must not be empty"),
        }
    }
}

impl Error for PersonValidationError {}

/// Insert draft for a person record: everything but the store-assigned id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPerson {
    /// Required display name.
    pub name: String,
    /// Optional age in years.
    pub age: Option<u32>,
    /// Ordered list of favorite foods. Serialized as `favoriteFoods`.
    #[serde(default)]
    pub favorite_foods: Vec<String>,
}

impl NewPerson {
    /// Creates a draft with only a name set.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            age: None,
            favorite_foods: Vec::new(),
        }
    }

    /// Checks the draft against write-time invariants.
    pub fn validate(&self) -> Result<(), PersonValidationError> {
        validate_name(&self.name)
    }

    /// Promotes the draft into a stored record under the given id.
    ///
    /// Used only by store implementations once the id has been assigned.
    pub fn with_id(self, id: PersonId) -> Person {
        Person {
            id,
            name: self.name,
            age: self.age,
            favorite_foods: self.favorite_foods,
        }
    }
}

/// A person record as persisted in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    /// Store-assigned stable id. Immutable for the record lifetime.
    pub id: PersonId,
    /// Required display name.
    pub name: String,
    /// Optional age in years. `None` when unknown or projected out by a query.
    pub age: Option<u32>,
    /// Ordered list of favorite foods. Serialized as `favoriteFoods`.
    #[serde(default)]
    pub favorite_foods: Vec<String>,
}

impl Person {
    /// Checks the record against write-time invariants.
    ///
    /// Full-document saves must call this before hitting the store, the same
    /// way inserts validate their draft.
    pub fn validate(&self) -> Result<(), PersonValidationError> {
        validate_name(&self.name)
    }

    /// Returns whether `favorite_foods` already contains `food`.
    pub fn likes(&self, food: &str) -> bool {
        self.favorite_foods.iter().any(|item| item == food)
    }
}

fn validate_name(name: &str) -> Result<(), PersonValidationError> {
    if name.trim().is_empty() {
        return Err(PersonValidationError::EmptyName);
    }
    Ok(())
}
