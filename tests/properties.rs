//! Property tests for solve determinism and order validity

use proptest::prelude::*;
use std::collections::HashSet;

use ordo::{KeySet, Problem};

/// A random acyclic constraint set: `count` items named by index, plus
/// "lower index before higher index" edges. Orienting every edge along
/// the index order guarantees the generated problem is solvable.
fn acyclic_problems() -> impl Strategy<Value = (usize, Vec<(usize, usize)>)> {
    (2..12usize).prop_flat_map(|count| {
        let edges = proptest::collection::vec((0..count, 0..count), 0..24);
        (Just(count), edges)
    })
}

fn item_name(index: usize) -> String {
    format!("item{index:02}")
}

fn build_problem(count: usize, edges: &[(usize, usize)]) -> Problem {
    let mut problem = Problem::new();
    for index in 0..count {
        let befores: Vec<String> = edges
            .iter()
            .filter(|(a, b)| a.min(b) == &index && a != b)
            .map(|(a, b)| item_name(*a.max(b)))
            .collect();
        problem
            .add(KeySet::new().id(item_name(index)).before_all(befores))
            .unwrap();
    }
    problem
}

proptest! {
    #[test]
    fn solve_emits_every_item_exactly_once((count, edges) in acyclic_problems()) {
        let problem = build_problem(count, &edges);
        let order = problem.solve().unwrap();

        prop_assert_eq!(order.len(), count);
        let unique: HashSet<&str> = order.iter().map(String::as_str).collect();
        prop_assert_eq!(unique.len(), count);
        for index in 0..count {
            prop_assert!(unique.contains(item_name(index).as_str()));
        }
    }

    #[test]
    fn solve_satisfies_every_constraint((count, edges) in acyclic_problems()) {
        let problem = build_problem(count, &edges);
        let order = problem.solve().unwrap();

        let position = |name: &str| order.iter().position(|id| id == name).unwrap();
        for (a, b) in &edges {
            if a == b {
                continue;
            }
            let (earlier, later) = (*a.min(b), *a.max(b));
            prop_assert!(
                position(&item_name(earlier)) < position(&item_name(later)),
                "{} must precede {}",
                item_name(earlier),
                item_name(later),
            );
        }
    }

    #[test]
    fn solve_is_deterministic((count, edges) in acyclic_problems()) {
        let problem = build_problem(count, &edges);
        prop_assert_eq!(problem.solve().unwrap(), problem.solve().unwrap());
    }

    #[test]
    fn duplicated_constraints_are_harmless((count, edges) in acyclic_problems()) {
        let problem = build_problem(count, &edges);

        let mut doubled_edges = edges.clone();
        doubled_edges.extend_from_slice(&edges);
        let doubled = build_problem(count, &doubled_edges);

        prop_assert_eq!(problem.solve().unwrap(), doubled.solve().unwrap());
    }
}
