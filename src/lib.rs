//! Strict, deterministic topological ordering with groups.
//!
//! Declare named items plus ordering constraints ("A before B", "A
//! after group G") and solve for a linear order satisfying every
//! constraint. Contradictory constraints (a cycle), dangling
//! references, and malformed keys fail with structured errors that
//! carry the offending keys as data.
//!
//! ```
//! use ordo::{KeySet, Problem};
//!
//! let mut problem = Problem::new();
//! problem.add(KeySet::new().ids(["migrate", "seed"]).group("db"))?;
//! problem.add(KeySet::new().id("serve").after("db"))?;
//! problem.add(KeySet::new().id("config").before("db"))?;
//!
//! assert_eq!(problem.solve()?, ["config", "migrate", "seed", "serve"]);
//! # Ok::<(), ordo::Error>(())
//! ```
//!
//! Solving is strict and reproducible: ties are broken the same way on
//! every run, so an unchanged problem always solves to the same order.
//! Batches are validated before they are applied, so a failed
//! [`Problem::add`] never leaves partial state behind.

mod error;
mod graph;
mod key_set;
mod problem;
mod search;

pub use error::{CycleError, Error, GraphError, KeyError, KeyErrorKind, KeyType, ValidationError};
pub use graph::Graph;
pub use key_set::KeySet;
pub use problem::Problem;
