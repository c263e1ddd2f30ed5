//! Unions of relation classes that give regular graphs.

use super::{Classification, RelationClass};
use crate::graph::Graph;
use rayon::prelude::*;
use tracing::{info, warn};

/// A regular union graph and the classes it was built from.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub mask: u64,
    pub classes: Vec<RelationClass>,
    pub degree: usize,
    pub graph: Graph,
}

#[derive(Debug, Clone)]
pub struct CombineOutcome {
    /// Regular candidates in increasing mask order.
    pub candidates: Vec<Candidate>,
    pub evaluated: u64,
    /// Non-empty subsets that exist.
    pub total: u64,
}

impl CombineOutcome {
    pub fn is_complete(&self) -> bool {
        self.evaluated == self.total
    }
}

/// Evaluate class subsets by bitmask, stopping after `max_subsets` masks.
///
/// Regularity is decided from per-class degree vectors before any union
/// graph is built.
pub fn combine(classification: &Classification, max_subsets: u64) -> CombineOutcome {
    let m = classification.edge_count();
    let degrees: Vec<Vec<usize>> = classification
        .classes
        .iter()
        .map(|members| {
            let mut d = vec![0; m];
            for &(i, j) in &members.pairs {
                d[i] += 1;
                d[j] += 1;
            }
            d
        })
        .collect();

    let total = (1u64 << degrees.len()) - 1;
    let evaluated = total.min(max_subsets);
    if evaluated < total {
        warn!(total, evaluated, "subset cap reached");
    }
    let masks: Vec<u64> = (1..=evaluated).collect();
    let candidates: Vec<Candidate> = masks
        .par_iter()
        .filter_map(|&mask| {
            let mut sum = vec![0; m];
            for (c, d) in degrees.iter().enumerate() {
                if mask & (1 << c) != 0 {
                    for (s, x) in sum.iter_mut().zip(d) {
                        *s += x;
                    }
                }
            }
            let degree = *sum.first()?;
            if sum.iter().any(|&d| d != degree) {
                return None;
            }
            Some(Candidate {
                mask,
                classes: classification.classes_in(mask),
                degree,
                graph: classification.union_graph(mask),
            })
        })
        .collect();
    info!(
        evaluated,
        regular = candidates.len(),
        "class subsets combined"
    );
    CombineOutcome {
        candidates,
        evaluated,
        total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::correspond::classify;

    fn path(n: usize) -> Graph {
        let edges: Vec<_> = (0..n - 1).map(|i| (i, i + 1)).collect();
        Graph::from_edges(n, &edges).unwrap()
    }

    #[test]
    fn test_k4_unions_are_all_regular() {
        let k4 = Graph::from_edges(4, &[(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)]).unwrap();
        let outcome = combine(&classify(&k4), 1 << 16);
        assert!(outcome.is_complete());
        let degrees: Vec<_> = outcome.candidates.iter().map(|c| (c.mask, c.degree)).collect();
        assert_eq!(degrees, vec![(1, 1), (2, 4), (3, 5)]);
    }

    #[test]
    fn test_path_unions_are_irregular() {
        // P5 edges: consecutive ones share a vertex, ends do not
        let outcome = combine(&classify(&path(5)), 1 << 16);
        assert!(outcome.candidates.iter().all(|c| c.graph.regular_degree() == Some(c.degree)));
        assert!(outcome.candidates.iter().all(|c| c.mask != 1));
    }

    #[test]
    fn test_cap_stops_early() {
        let outcome = combine(&classify(&path(5)), 1);
        assert_eq!(outcome.evaluated, 1);
        assert!(!outcome.is_complete());
    }
}
