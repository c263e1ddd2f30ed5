//! Ordered vertex partitions and equitable refinement.

use crate::graph::Graph;

/// An ordered partition, stored as the cell index of every vertex.
///
/// Cell indices are assigned from sorted structural signatures only, never
/// from vertex labels, so isomorphic inputs refine to corresponding
/// partitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    cell_of: Vec<usize>,
    cells: usize,
}

/// Rank keys densely, preserving their order.
fn rerank<K: Ord + Clone>(keys: &[K]) -> (Vec<usize>, usize) {
    let mut distinct: Vec<K> = keys.to_vec();
    distinct.sort();
    distinct.dedup();
    let cell_of = keys
        .iter()
        .map(|k| distinct.binary_search(k).unwrap_or(0))
        .collect();
    (cell_of, distinct.len())
}

impl Partition {
    /// Cells are colour classes, ordered by colour.
    pub fn from_colours(colours: &[u32]) -> Self {
        let (cell_of, cells) = rerank(colours);
        Self { cell_of, cells }
    }

    pub fn unit(n: usize) -> Self {
        Self {
            cell_of: vec![0; n],
            cells: usize::from(n > 0),
        }
    }

    pub fn len(&self) -> usize {
        self.cell_of.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cell_of.is_empty()
    }

    pub fn cell_count(&self) -> usize {
        self.cells
    }

    pub fn cell_of(&self, v: usize) -> usize {
        self.cell_of[v]
    }

    pub fn is_discrete(&self) -> bool {
        self.cells == self.cell_of.len()
    }

    pub fn cell_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.cells];
        for &c in &self.cell_of {
            sizes[c] += 1;
        }
        sizes
    }

    pub fn members(&self, cell: usize) -> Vec<usize> {
        (0..self.cell_of.len())
            .filter(|&v| self.cell_of[v] == cell)
            .collect()
    }

    /// The first cell with more than one vertex.
    pub fn first_non_singleton(&self) -> Option<usize> {
        self.cell_sizes().iter().position(|&s| s > 1)
    }

    /// Split `v` out of its cell, just before the rest of that cell.
    pub fn individualize(&self, v: usize) -> Self {
        let keys: Vec<usize> = self
            .cell_of
            .iter()
            .enumerate()
            .map(|(u, &c)| 2 * c + usize::from(u != v))
            .collect();
        let (cell_of, cells) = rerank(&keys);
        Self { cell_of, cells }
    }

    /// Refine until equitable: every vertex of a cell has the same number of
    /// neighbours in every cell.
    pub fn refine(&mut self, graph: &Graph) {
        loop {
            let signatures: Vec<(usize, Vec<(usize, usize)>)> = (0..self.cell_of.len())
                .map(|v| {
                    let mut counts: Vec<(usize, usize)> = Vec::new();
                    let mut cells: Vec<usize> =
                        graph.neighbors(v).iter().map(|&w| self.cell_of[w]).collect();
                    cells.sort_unstable();
                    for c in cells {
                        match counts.last_mut() {
                            Some((last, n)) if *last == c => *n += 1,
                            _ => counts.push((c, 1)),
                        }
                    }
                    (self.cell_of[v], counts)
                })
                .collect();
            let (cell_of, cells) = rerank(&signatures);
            let stable = cells == self.cells;
            self.cell_of = cell_of;
            self.cells = cells;
            if stable {
                return;
            }
        }
    }

    /// For a discrete partition, the vertex in each cell.
    pub fn labelling(&self) -> Option<Vec<usize>> {
        if !self.is_discrete() {
            return None;
        }
        let mut at = vec![0; self.cell_of.len()];
        for (v, &c) in self.cell_of.iter().enumerate() {
            at[c] = v;
        }
        Some(at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(n: usize) -> Graph {
        let edges: Vec<_> = (0..n - 1).map(|i| (i, i + 1)).collect();
        Graph::from_edges(n, &edges).unwrap()
    }

    #[test]
    fn test_path_refines_by_distance_from_ends() {
        let g = path(5);
        let mut p = Partition::unit(5);
        p.refine(&g);
        // ends, their neighbours, centre
        assert_eq!(p.cell_sizes(), vec![2, 2, 1]);
        assert_eq!(p.cell_of(0), p.cell_of(4));
        assert_eq!(p.cell_of(1), p.cell_of(3));
    }

    #[test]
    fn test_individualize_then_refine_is_discrete_on_path() {
        let g = path(5);
        let mut p = Partition::unit(5);
        p.refine(&g);
        let mut q = p.individualize(0);
        q.refine(&g);
        assert!(q.is_discrete());
        let labels = q.labelling().unwrap();
        assert_eq!(labels.len(), 5);
    }

    #[test]
    fn test_colours_order_cells() {
        let p = Partition::from_colours(&[5, 1, 5, 1]);
        assert_eq!(p.cell_count(), 2);
        assert_eq!(p.members(0), vec![1, 3]);
        assert_eq!(p.first_non_singleton(), Some(0));
    }

    #[test]
    fn test_regular_graph_is_already_equitable() {
        let edges: Vec<_> = (0..6).map(|i| (i, (i + 1) % 6)).collect();
        let g = Graph::from_edges(6, &edges).unwrap();
        let mut p = Partition::unit(6);
        p.refine(&g);
        assert_eq!(p.cell_count(), 1);
    }
}
