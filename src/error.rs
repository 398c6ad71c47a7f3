//! Error types for constraint validation and solving
//!
//! Validation failures are gathered into a single [`ValidationError`]
//! carrying every offending key at once, so callers see the whole batch
//! of problems rather than just the first. Cycle detection fails fast
//! with a [`CycleError`] naming one node on the cycle.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// The role an offending key was playing when validation rejected it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyType {
    /// An item id, either positional or from the `ids` list.
    Id,
    /// An entry in a `before` constraint list.
    Before,
    /// An entry in an `after` constraint list.
    After,
    /// A group key.
    Group,
}

impl KeyType {
    /// Display subject for error messages, e.g. `Id 'foo'` or
    /// `Before key 'foo'`.
    fn subject(&self, key: &str) -> String {
        match self {
            KeyType::Id => format!("Id '{key}'"),
            KeyType::Before => format!("Before key '{key}'"),
            KeyType::After => format!("After key '{key}'"),
            KeyType::Group => format!("Group key '{key}'"),
        }
    }
}

/// What went wrong with a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyErrorKind {
    /// The key is not a non-empty string.
    InvalidKey,
    /// The key appears more than once within a single add batch.
    Duplication,
    /// The key collides with an id already registered in the problem.
    IdCollision,
    /// The key collides with a group key already registered in the problem.
    GroupCollision,
    /// A constraint references a key that resolves to nothing at solve time.
    MissingTarget,
}

/// A single key validation failure.
///
/// Carries the offending key and its role as structured data so calling
/// code can react programmatically instead of parsing the message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyError {
    pub kind: KeyErrorKind,
    pub key_type: KeyType,
    pub key: String,
}

impl KeyError {
    pub(crate) fn new(kind: KeyErrorKind, key_type: KeyType, key: impl Into<String>) -> Self {
        Self {
            kind,
            key_type,
            key: key.into(),
        }
    }
}

impl fmt::Display for KeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let subject = self.key_type.subject(&self.key);
        match (self.kind, self.key_type) {
            (KeyErrorKind::InvalidKey, _) => {
                write!(f, "{subject} must be a non-empty string")
            }
            (KeyErrorKind::Duplication, KeyType::Group) => {
                write!(f, "{subject} also appears in ids")
            }
            (KeyErrorKind::Duplication, _) => write!(f, "Duplicate id '{}'", self.key),
            (KeyErrorKind::IdCollision, KeyType::Group) => {
                write!(f, "{subject} is already in use as an id")
            }
            (KeyErrorKind::IdCollision, _) => write!(f, "{subject} has already been added"),
            (KeyErrorKind::GroupCollision, _) => {
                write!(f, "{subject} is already in use as a group key")
            }
            (KeyErrorKind::MissingTarget, _) => write!(f, "{subject} does not exist"),
        }
    }
}

impl std::error::Error for KeyError {}

/// Aggregate failure raised by `Problem::add` and solve-time validation.
///
/// Holds every [`KeyError`] found in the batch or problem state, in
/// detection order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    errors: Vec<KeyError>,
}

impl ValidationError {
    /// Wraps the given errors, or returns `None` if there are none.
    pub(crate) fn from_errors(errors: Vec<KeyError>) -> Option<Self> {
        if errors.is_empty() {
            None
        } else {
            Some(Self { errors })
        }
    }

    /// The individual key errors behind this failure.
    pub fn errors(&self) -> &[KeyError] {
        &self.errors
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Key validation failed")?;
        for error in &self.errors {
            write!(f, "\n    - {error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// Errors raised by direct [`Graph`](crate::Graph) manipulation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("Id '{0}' is already in the graph")]
    NodeExists(String),

    #[error("Id '{0}' is not in the graph")]
    NodeMissing(String),
}

/// Raised when the constraint graph has no valid linear order.
///
/// Carries the id of one node on the offending cycle, not necessarily
/// the first cause.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("Cycle detected at node with id '{id}'")]
pub struct CycleError {
    pub id: String,
}

/// Top-level error returned by [`Problem::solve`](crate::Problem::solve).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Cycle(#[from] CycleError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_key_messages() {
        let error = KeyError::new(KeyErrorKind::InvalidKey, KeyType::Id, "");
        assert_eq!(error.to_string(), "Id '' must be a non-empty string");

        let error = KeyError::new(KeyErrorKind::InvalidKey, KeyType::Before, "");
        assert_eq!(error.to_string(), "Before key '' must be a non-empty string");

        let error = KeyError::new(KeyErrorKind::InvalidKey, KeyType::Group, "");
        assert_eq!(error.to_string(), "Group key '' must be a non-empty string");
    }

    #[test]
    fn duplication_messages() {
        let error = KeyError::new(KeyErrorKind::Duplication, KeyType::Id, "foo");
        assert_eq!(error.to_string(), "Duplicate id 'foo'");

        let error = KeyError::new(KeyErrorKind::Duplication, KeyType::Group, "foo");
        assert_eq!(error.to_string(), "Group key 'foo' also appears in ids");
    }

    #[test]
    fn collision_messages() {
        let error = KeyError::new(KeyErrorKind::IdCollision, KeyType::Id, "foo");
        assert_eq!(error.to_string(), "Id 'foo' has already been added");

        let error = KeyError::new(KeyErrorKind::IdCollision, KeyType::Group, "foo");
        assert_eq!(error.to_string(), "Group key 'foo' is already in use as an id");

        let error = KeyError::new(KeyErrorKind::GroupCollision, KeyType::Id, "foo");
        assert_eq!(error.to_string(), "Id 'foo' is already in use as a group key");
    }

    #[test]
    fn missing_target_messages() {
        let error = KeyError::new(KeyErrorKind::MissingTarget, KeyType::Before, "ghost");
        assert_eq!(error.to_string(), "Before key 'ghost' does not exist");

        let error = KeyError::new(KeyErrorKind::MissingTarget, KeyType::After, "ghost");
        assert_eq!(error.to_string(), "After key 'ghost' does not exist");
    }

    #[test]
    fn validation_error_lists_all_causes() {
        let errors = vec![
            KeyError::new(KeyErrorKind::Duplication, KeyType::Id, "foo"),
            KeyError::new(KeyErrorKind::IdCollision, KeyType::Id, "bar"),
        ];
        let error = ValidationError::from_errors(errors).unwrap();

        assert_eq!(
            error.to_string(),
            "Key validation failed\n    - Duplicate id 'foo'\n    - Id 'bar' has already been added"
        );
        assert_eq!(error.errors().len(), 2);
    }

    #[test]
    fn validation_error_requires_at_least_one_cause() {
        assert_eq!(ValidationError::from_errors(vec![]), None);
    }

    #[test]
    fn cycle_error_message() {
        let error = CycleError { id: "foo".into() };
        assert_eq!(error.to_string(), "Cycle detected at node with id 'foo'");
    }

    #[test]
    fn key_error_serializes_with_structured_payload() {
        let error = KeyError::new(KeyErrorKind::MissingTarget, KeyType::After, "ghost");
        let json = serde_json::to_value(&error).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "kind": "missing_target",
                "key_type": "after",
                "key": "ghost",
            })
        );
    }
}
