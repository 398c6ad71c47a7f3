//! Constraint registry and graph compiler
//!
//! A [`Problem`] collects items and groups through validated add
//! batches, then compiles its state into a [`Graph`] and solves it.
//! Items and groups share one namespace: the registry is a single map
//! of tagged entries, so a key can never be both at once.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::{Error, KeyError, KeyErrorKind, KeyType, ValidationError};
use crate::graph::Graph;
use crate::key_set::{ExistingKeys, KeySet};

/// One registered key: either an item with its constraints, or a group
/// with its members in insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
enum Entry {
    Item {
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        before: Vec<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        after: Vec<String>,
    },
    Group(Vec<String>),
}

/// A set of named items plus ordering constraints, solvable into a
/// deterministic linear order.
///
/// ```
/// use ordo::{KeySet, Problem};
///
/// let mut problem = Problem::new();
/// problem.add(KeySet::new().id("install").before("build"))?;
/// problem.add("build")?;
/// problem.add(KeySet::new().id("test").after("build"))?;
///
/// assert_eq!(problem.solve()?, ["install", "build", "test"]);
/// # Ok::<(), ordo::Error>(())
/// ```
///
/// Constraints may be forward references: a `before`/`after` target
/// only has to exist by the time [`solve`](Problem::solve) is called.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Problem {
    entries: BTreeMap<String, Entry>,
}

impl Problem {
    /// Creates an empty problem.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a batch of items, with optional constraints and group.
    ///
    /// The batch is validated as a whole before any of it is applied;
    /// on failure the problem is left unchanged and the error reports
    /// every offending key at once.
    pub fn add(&mut self, keys: impl Into<KeySet>) -> Result<(), ValidationError> {
        let key_set = keys.into();
        key_set.validate(&self.existing_keys())?;
        self.apply(key_set);
        Ok(())
    }

    /// Compiles the current state into a constraint graph.
    ///
    /// Fails if any `before`/`after` reference does not resolve to a
    /// known item or group, reporting every dangling target at once.
    pub fn to_graph(&self) -> Result<Graph, ValidationError> {
        if let Some(error) = ValidationError::from_errors(self.missing_target_info()) {
            return Err(error);
        }
        Ok(self.full_graph())
    }

    /// Compiles and solves in one step, returning the ordered item ids.
    pub fn solve(&self) -> Result<Vec<String>, Error> {
        let graph = self.to_graph()?;
        Ok(graph.solve()?)
    }

    /// Returns true if no items or groups have been added.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the number of registered keys (items plus groups).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the given key is registered, as an item or group.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Iterates over all registered item ids, alphabetically.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().filter_map(|(key, entry)| match entry {
            Entry::Item { .. } => Some(key.as_str()),
            Entry::Group(_) => None,
        })
    }

    /// Iterates over all registered group keys, alphabetically.
    pub fn group_keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().filter_map(|(key, entry)| match entry {
            Entry::Group(_) => Some(key.as_str()),
            Entry::Item { .. } => None,
        })
    }

    fn existing_keys(&self) -> ExistingKeys<'_> {
        ExistingKeys {
            ids: self.ids().collect(),
            groups: self.group_keys().collect(),
        }
    }

    /// Applies a validated batch: items first, then group bookkeeping.
    fn apply(&mut self, key_set: KeySet) {
        let KeySet {
            ids,
            before,
            after,
            group,
        } = key_set;

        for id in &ids {
            self.entries.insert(
                id.clone(),
                Entry::Item {
                    before: before.clone(),
                    after: after.clone(),
                },
            );
        }

        if let Some(group) = group {
            // Validation has ruled out item/group key collisions, so an
            // existing entry under this key can only be a group.
            if let Some(Entry::Group(members)) = self.entries.get_mut(&group) {
                members.extend(ids);
            } else {
                self.entries.insert(group, Entry::Group(ids));
            }
        }
    }

    /// Collects a missing-target record for every constraint entry that
    /// names neither an item nor a group.
    fn missing_target_info(&self) -> Vec<KeyError> {
        let mut info = Vec::new();
        for entry in self.entries.values() {
            if let Entry::Item { before, after } = entry {
                let lists = [(KeyType::Before, before), (KeyType::After, after)];
                for (key_type, keys) in lists {
                    for key in keys.iter().filter(|key| !self.entries.contains_key(*key)) {
                        info.push(KeyError::new(KeyErrorKind::MissingTarget, key_type, key));
                    }
                }
            }
        }
        info
    }

    /// Builds the graph: one node per item, then one edge per resolved
    /// constraint target. `before` makes an item→target edge, `after`
    /// makes a target→item edge.
    fn full_graph(&self) -> Graph {
        let mut graph = self.graph_with_nodes();
        for (id, entry) in &self.entries {
            if let Entry::Item { before, after } = entry {
                for target in self.apply_groups(before) {
                    graph
                        .add_edge(id, target)
                        .expect("constraint targets resolve after validation");
                }
                for source in self.apply_groups(after) {
                    graph
                        .add_edge(source, id)
                        .expect("constraint targets resolve after validation");
                }
            }
        }
        graph
    }

    fn graph_with_nodes(&self) -> Graph {
        let mut graph = Graph::new();
        for id in self.ids() {
            graph.add_node(id).expect("registry keys are unique");
        }
        graph
    }

    /// Expands a constraint list: entries naming a group are replaced
    /// by that group's members (flattened, in insertion order); entries
    /// naming an item pass through unchanged.
    fn apply_groups<'a>(&'a self, keys: &'a [String]) -> Vec<&'a str> {
        let mut applied = Vec::new();
        for key in keys {
            match self.entries.get(key) {
                Some(Entry::Group(members)) => {
                    applied.extend(members.iter().map(String::as_str));
                }
                _ => applied.push(key.as_str()),
            }
        }
        applied
    }
}

/// Debug dump of ids, constraints, and groups. Not a stable machine
/// format.
impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "Empty problem");
        }

        let mut sections = Vec::new();

        let mut ids_section = String::new();
        for (id, entry) in &self.entries {
            if let Entry::Item { before, after } = entry {
                if !ids_section.is_empty() {
                    ids_section.push('\n');
                }
                ids_section.push_str(id);
                for key in before {
                    ids_section.push_str("\n    before: ");
                    ids_section.push_str(key);
                }
                for key in after {
                    ids_section.push_str("\n    after: ");
                    ids_section.push_str(key);
                }
            }
        }
        if !ids_section.is_empty() {
            sections.push(format!("ids\n---\n{ids_section}"));
        }

        let mut groups_section = String::new();
        for (key, entry) in &self.entries {
            if let Entry::Group(members) = entry {
                if !groups_section.is_empty() {
                    groups_section.push('\n');
                }
                groups_section.push_str(key);
                for member in members {
                    groups_section.push_str("\n    ");
                    groups_section.push_str(member);
                }
            }
        }
        if !groups_section.is_empty() {
            sections.push(format!("groups\n------\n{groups_section}"));
        }

        write!(f, "{}", sections.join("\n\n"))
    }
}
