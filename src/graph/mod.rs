//! Simple undirected graphs and their invariants.
//!
//! A [`Graph`] keeps sorted neighbour lists for iteration and packed `u64`
//! rows for adjacency tests and common-neighbour counts. Graphs are built
//! once and never mutated.

mod invariants;
mod spectrum;

pub use invariants::{NotSrgReason, SrgParameters, SrgVerdict};
pub use spectrum::{DEFAULT_TOLERANCE, Eigenvalue, Spectrum};

use crate::field::{Field, Fq};
use crate::geometry::IncidenceStructure;
use crate::linalg::Matrix;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("vertex {vertex} out of range for a graph on {order} vertices")]
    VertexOutOfRange { vertex: usize, order: usize },
    #[error("self-loop at vertex {0}")]
    SelfLoop(usize),
    #[error("adjacency is not symmetric at ({row}, {col})")]
    Asymmetric { row: usize, col: usize },
    #[error("adjacency matrix is {rows}x{cols}, expected square")]
    NotSquare { rows: usize, cols: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Graph {
    neighbors: Vec<Vec<usize>>,
    rows: Vec<Vec<u64>>,
    edge_count: usize,
}

impl Graph {
    /// Graph on `order` vertices. Duplicate edges collapse; loops are rejected.
    pub fn from_edges(order: usize, edges: &[(usize, usize)]) -> Result<Self, GraphError> {
        let mut neighbors = vec![Vec::new(); order];
        for &(u, v) in edges {
            for vertex in [u, v] {
                if vertex >= order {
                    return Err(GraphError::VertexOutOfRange { vertex, order });
                }
            }
            if u == v {
                return Err(GraphError::SelfLoop(u));
            }
            neighbors[u].push(v);
            neighbors[v].push(u);
        }
        for list in &mut neighbors {
            list.sort_unstable();
            list.dedup();
        }
        Ok(Self::from_neighbors(neighbors))
    }

    /// Graph whose edges are the nonzero off-diagonal entries of `matrix`.
    pub fn from_matrix<F: Field>(matrix: &Matrix<F>) -> Result<Self, GraphError> {
        let (rows, cols) = matrix.shape();
        if rows != cols {
            return Err(GraphError::NotSquare { rows, cols });
        }
        let mut edges = Vec::new();
        for r in 0..rows {
            if !matrix.get(r, r).is_zero() {
                return Err(GraphError::SelfLoop(r));
            }
            for c in (r + 1)..cols {
                let (a, b) = (matrix.get(r, c), matrix.get(c, r));
                if a != b {
                    return Err(GraphError::Asymmetric { row: r, col: c });
                }
                if !a.is_zero() {
                    edges.push((r, c));
                }
            }
        }
        Self::from_edges(rows, &edges)
    }

    /// Collinearity graph: points adjacent when distinct and on a common line.
    pub fn collinearity(geometry: &IncidenceStructure) -> Self {
        let mut neighbors = vec![Vec::new(); geometry.point_count()];
        for line in geometry.lines() {
            for &p in line {
                neighbors[p].extend(line.iter().copied().filter(|&q| q != p));
            }
        }
        for list in &mut neighbors {
            list.sort_unstable();
            list.dedup();
        }
        Self::from_neighbors(neighbors)
    }

    /// Bipartite point–line graph; points come first, line j is vertex
    /// `point_count + j`.
    pub fn incidence(geometry: &IncidenceStructure) -> Self {
        let offset = geometry.point_count();
        let mut neighbors = vec![Vec::new(); offset + geometry.line_count()];
        for (j, line) in geometry.lines().iter().enumerate() {
            for &p in line {
                neighbors[p].push(offset + j);
                neighbors[offset + j].push(p);
            }
        }
        for list in &mut neighbors {
            list.sort_unstable();
        }
        Self::from_neighbors(neighbors)
    }

    /// Lists must be sorted, loop-free and symmetric.
    pub(crate) fn from_neighbors(neighbors: Vec<Vec<usize>>) -> Self {
        let n = neighbors.len();
        let words = n.div_ceil(64);
        let mut rows = vec![vec![0u64; words]; n];
        let mut degree_sum = 0;
        for (u, list) in neighbors.iter().enumerate() {
            degree_sum += list.len();
            for &v in list {
                rows[u][v / 64] |= 1 << (v % 64);
            }
        }
        Self {
            neighbors,
            rows,
            edge_count: degree_sum / 2,
        }
    }

    pub fn order(&self) -> usize {
        self.neighbors.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    pub fn neighbors(&self, v: usize) -> &[usize] {
        &self.neighbors[v]
    }

    pub fn degree(&self, v: usize) -> usize {
        self.neighbors[v].len()
    }

    #[inline]
    pub fn adjacent(&self, u: usize, v: usize) -> bool {
        (self.rows[u][v / 64] >> (v % 64)) & 1 == 1
    }

    pub fn common_neighbors(&self, u: usize, v: usize) -> usize {
        self.rows[u]
            .iter()
            .zip(&self.rows[v])
            .map(|(a, b)| (a & b).count_ones() as usize)
            .sum()
    }

    /// Packed adjacency row of `v`.
    pub fn row_bits(&self, v: usize) -> &[u64] {
        &self.rows[v]
    }

    /// Edges as `(u, v)` with `u < v`, in lexicographic order.
    pub fn edges(&self) -> Vec<(usize, usize)> {
        let mut out = Vec::with_capacity(self.edge_count);
        for (u, list) in self.neighbors.iter().enumerate() {
            out.extend(list.iter().filter(|&&v| v > u).map(|&v| (u, v)));
        }
        out
    }

    pub fn adjacency_matrix<F: Field>(&self) -> Matrix<F> {
        Matrix::from_fn(self.order(), self.order(), |u, v| {
            if self.adjacent(u, v) { Fq::ONE } else { Fq::ZERO }
        })
    }
}
