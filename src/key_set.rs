//! Add-batch normalization and validation
//!
//! A [`KeySet`] is the canonical shape of one `Problem::add` call: item
//! ids, optional `before`/`after` constraint lists, and an optional
//! group key. It is built fresh per call, validated against the
//! problem's existing registry, and discarded once applied.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::{KeyError, KeyErrorKind, KeyType, ValidationError};

/// One batch of additions to a [`Problem`](crate::Problem).
///
/// Constructed through the builder methods or converted from bare ids:
///
/// ```
/// use ordo::{KeySet, Problem};
///
/// let mut problem = Problem::new();
/// problem.add(KeySet::new().ids(["a", "b"]).group("setup"))?;
/// problem.add(KeySet::new().id("c").after("setup"))?;
/// problem.add("d")?; // plain ids convert directly
/// # Ok::<(), ordo::ValidationError>(())
/// ```
///
/// `before` and `after` are always lists after normalization; `group`
/// distinguishes "no group" (`None`) from a bad group key (`Some("")`),
/// which validation flags rather than silently dropping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeySet {
    /// Item ids to register.
    pub ids: Vec<String>,
    /// Ids or group keys that must come after every id in this batch.
    pub before: Vec<String>,
    /// Ids or group keys that must come before every id in this batch.
    pub after: Vec<String>,
    /// Group to create or append this batch's ids to.
    pub group: Option<String>,
}

impl KeySet {
    /// Creates an empty key set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a single item id.
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.ids.push(id.into());
        self
    }

    /// Appends several item ids.
    pub fn ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ids.extend(ids.into_iter().map(Into::into));
        self
    }

    /// Appends a single `before` constraint target.
    pub fn before(mut self, key: impl Into<String>) -> Self {
        self.before.push(key.into());
        self
    }

    /// Appends several `before` constraint targets.
    pub fn before_all<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.before.extend(keys.into_iter().map(Into::into));
        self
    }

    /// Appends a single `after` constraint target.
    pub fn after(mut self, key: impl Into<String>) -> Self {
        self.after.push(key.into());
        self
    }

    /// Appends several `after` constraint targets.
    pub fn after_all<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.after.extend(keys.into_iter().map(Into::into));
        self
    }

    /// Sets the group key.
    pub fn group(mut self, key: impl Into<String>) -> Self {
        self.group = Some(key.into());
        self
    }

    /// Checks this batch against itself and against the problem's
    /// existing keys, reporting every offending key at once.
    pub(crate) fn validate(&self, existing: &ExistingKeys<'_>) -> Result<(), ValidationError> {
        match ValidationError::from_errors(self.error_info(existing)) {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    /// Collects error records in a fixed order: invalid keys, then
    /// intra-batch duplication, then collisions with existing keys.
    fn error_info(&self, existing: &ExistingKeys<'_>) -> Vec<KeyError> {
        let mut info = self.invalid_key_info();
        info.extend(self.duplication_info());
        info.extend(self.collision_info(existing));
        info
    }

    fn invalid_key_info(&self) -> Vec<KeyError> {
        let lists = [
            (KeyType::Id, &self.ids),
            (KeyType::Before, &self.before),
            (KeyType::After, &self.after),
        ];

        let mut info = Vec::new();
        for (key_type, keys) in lists {
            for key in keys.iter().filter(|key| is_invalid_key(key)) {
                info.push(KeyError::new(KeyErrorKind::InvalidKey, key_type, key));
            }
        }

        // A null group is fine; an empty group key is not.
        if let Some(group) = &self.group {
            if is_invalid_key(group) {
                info.push(KeyError::new(
                    KeyErrorKind::InvalidKey,
                    KeyType::Group,
                    group,
                ));
            }
        }

        info
    }

    fn duplication_info(&self) -> Vec<KeyError> {
        let mut info: Vec<KeyError> = duplicates(&self.ids)
            .into_iter()
            .map(|key| KeyError::new(KeyErrorKind::Duplication, KeyType::Id, key))
            .collect();

        if let Some(group) = &self.group {
            if self.ids.iter().any(|id| id == group) {
                info.push(KeyError::new(
                    KeyErrorKind::Duplication,
                    KeyType::Group,
                    group,
                ));
            }
        }

        info
    }

    fn collision_info(&self, existing: &ExistingKeys<'_>) -> Vec<KeyError> {
        let mut info: Vec<KeyError> = intersection(&self.ids, &existing.ids)
            .into_iter()
            .map(|key| KeyError::new(KeyErrorKind::IdCollision, KeyType::Id, key))
            .collect();

        info.extend(
            intersection(&self.ids, &existing.groups)
                .into_iter()
                .map(|key| KeyError::new(KeyErrorKind::GroupCollision, KeyType::Id, key)),
        );

        // A group key matching an existing group means "append to it",
        // but a group key matching an existing id is a collision.
        if let Some(group) = &self.group {
            if existing.ids.contains(&group.as_str()) {
                info.push(KeyError::new(
                    KeyErrorKind::IdCollision,
                    KeyType::Group,
                    group,
                ));
            }
        }

        info
    }
}

impl From<&str> for KeySet {
    fn from(id: &str) -> Self {
        KeySet::new().id(id)
    }
}

impl From<String> for KeySet {
    fn from(id: String) -> Self {
        KeySet::new().id(id)
    }
}

impl<S: Into<String>, const N: usize> From<[S; N]> for KeySet {
    fn from(ids: [S; N]) -> Self {
        KeySet::new().ids(ids)
    }
}

impl<S: Into<String>> From<Vec<S>> for KeySet {
    fn from(ids: Vec<S>) -> Self {
        KeySet::new().ids(ids)
    }
}

/// The problem's current registry, split by key role.
pub(crate) struct ExistingKeys<'a> {
    pub ids: Vec<&'a str>,
    pub groups: Vec<&'a str>,
}

/// Only empty strings are representable invalid keys; the type system
/// excludes non-string keys.
fn is_invalid_key(key: &str) -> bool {
    key.is_empty()
}

/// Values appearing more than once, each reported once, in first-occurrence
/// order.
fn duplicates(keys: &[String]) -> Vec<&str> {
    let mut seen = HashSet::new();
    let mut result = Vec::new();
    for key in keys {
        if !seen.insert(key.as_str()) && !result.contains(&key.as_str()) {
            result.push(key.as_str());
        }
    }
    result
}

/// Unique entries of `keys` that also appear in `existing`, in
/// first-occurrence order.
fn intersection<'a>(keys: &'a [String], existing: &[&str]) -> Vec<&'a str> {
    let mut seen = HashSet::new();
    keys.iter()
        .map(String::as_str)
        .filter(|key| existing.contains(key) && seen.insert(*key))
        .collect()
}
