//! Relation classes of edge pairs.

use crate::graph::Graph;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::info;

/// How two distinct edges sit relative to each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RelationClass {
    /// Endpoints in common (0 or 1).
    pub shared: u8,
    /// Adjacent pairs (x, y) with x only in the first edge and y only in
    /// the second.
    pub cross: u8,
}

impl fmt::Display for RelationClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.shared, self.cross)
    }
}

pub fn relation(graph: &Graph, e: (usize, usize), f: (usize, usize)) -> RelationClass {
    let in_e = |x: usize| x == e.0 || x == e.1;
    let in_f = |x: usize| x == f.0 || x == f.1;
    let mut shared = 0;
    let mut cross = 0;
    for x in [e.0, e.1] {
        if in_f(x) {
            shared += 1;
            continue;
        }
        for y in [f.0, f.1] {
            if !in_e(y) && graph.adjacent(x, y) {
                cross += 1;
            }
        }
    }
    RelationClass { shared, cross }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassMembers {
    pub class: RelationClass,
    /// Edge index pairs (i, j), i < j, in lexicographic order.
    pub pairs: Vec<(usize, usize)>,
}

/// Every unordered pair of edges, grouped by relation class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub edges: Vec<(usize, usize)>,
    /// Classes in increasing order.
    pub classes: Vec<ClassMembers>,
}

impl Classification {
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn pair_count(&self) -> usize {
        self.classes.iter().map(|c| c.pairs.len()).sum()
    }

    pub fn counts(&self) -> Vec<(RelationClass, usize)> {
        self.classes
            .iter()
            .map(|c| (c.class, c.pairs.len()))
            .collect()
    }

    /// The graph on edges whose adjacency is the union of the classes
    /// selected by `mask` (bit c selects `classes[c]`).
    pub fn union_graph(&self, mask: u64) -> Graph {
        let mut neighbors = vec![Vec::new(); self.edges.len()];
        for (c, members) in self.classes.iter().enumerate() {
            if mask & (1 << c) == 0 {
                continue;
            }
            for &(i, j) in &members.pairs {
                neighbors[i].push(j);
                neighbors[j].push(i);
            }
        }
        for list in &mut neighbors {
            list.sort_unstable();
        }
        Graph::from_neighbors(neighbors)
    }

    pub fn classes_in(&self, mask: u64) -> Vec<RelationClass> {
        self.classes
            .iter()
            .enumerate()
            .filter(|(c, _)| mask & (1 << c) != 0)
            .map(|(_, m)| m.class)
            .collect()
    }
}

/// Classify all edge pairs. Rows are computed in parallel and merged in
/// edge order, so the result does not depend on scheduling.
pub fn classify(graph: &Graph) -> Classification {
    let edges = graph.edges();
    let rows: Vec<Vec<(RelationClass, usize)>> = (0..edges.len())
        .into_par_iter()
        .map(|i| {
            ((i + 1)..edges.len())
                .map(|j| (relation(graph, edges[i], edges[j]), j))
                .collect()
        })
        .collect();

    let mut by_class: BTreeMap<RelationClass, Vec<(usize, usize)>> = BTreeMap::new();
    for (i, row) in rows.into_iter().enumerate() {
        for (class, j) in row {
            by_class.entry(class).or_default().push((i, j));
        }
    }
    let classes: Vec<ClassMembers> = by_class
        .into_iter()
        .map(|(class, pairs)| ClassMembers { class, pairs })
        .collect();
    info!(
        edges = edges.len(),
        classes = classes.len(),
        "edge pairs classified"
    );
    Classification { edges, classes }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn k4() -> Graph {
        Graph::from_edges(4, &[(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)]).unwrap()
    }

    #[test]
    fn test_relation_of_edge_pairs() {
        let path = Graph::from_edges(4, &[(0, 1), (1, 2), (2, 3)]).unwrap();
        assert_eq!(
            relation(&path, (0, 1), (1, 2)),
            RelationClass { shared: 1, cross: 0 }
        );
        assert_eq!(
            relation(&path, (0, 1), (2, 3)),
            RelationClass { shared: 0, cross: 1 }
        );
        assert_eq!(
            relation(&k4(), (0, 1), (2, 3)),
            RelationClass { shared: 0, cross: 4 }
        );
    }

    #[test]
    fn test_k4_classes() {
        let c = classify(&k4());
        assert_eq!(c.edge_count(), 6);
        assert_eq!(c.pair_count(), 15);
        assert_eq!(
            c.counts(),
            vec![
                (RelationClass { shared: 0, cross: 4 }, 3),
                (RelationClass { shared: 1, cross: 1 }, 12),
            ]
        );
        // the line graph of K4 is the octahedron
        let line_graph = c.union_graph(0b10);
        assert_eq!(line_graph.regular_degree(), Some(4));
        assert_eq!(c.union_graph(0b11).regular_degree(), Some(5));
        assert_eq!(c.classes_in(0b01), vec![RelationClass { shared: 0, cross: 4 }]);
    }
}
