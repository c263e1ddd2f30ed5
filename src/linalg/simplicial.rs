//! Abstract simplicial complexes and their signed boundary matrices.

use super::{LinalgError, Matrix};
use crate::field::{Field, Fq};
use crate::graph::Graph;
use std::collections::{BTreeSet, HashMap};

/// Largest facet accepted by [`SimplicialComplex::from_facets`]; its closure
/// already has 2³² − 1 faces.
pub const MAX_FACET_VERTICES: usize = 32;

/// Simplices grouped by dimension, each a sorted vertex list, each level
/// sorted lexicographically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimplicialComplex {
    levels: Vec<Vec<Vec<usize>>>,
}

impl SimplicialComplex {
    /// Clique complex of `graph`: every clique of size k+1 is a k-simplex,
    /// truncated at `max_dim`.
    pub fn clique_complex(graph: &Graph, max_dim: usize) -> Self {
        let mut levels = Vec::new();
        for k in 0..=max_dim {
            let cliques = graph.cliques(k + 1);
            if cliques.is_empty() {
                break;
            }
            levels.push(cliques);
        }
        Self { levels }
    }

    /// Downward closure of the given facets. Facets with more than
    /// [`MAX_FACET_VERTICES`] distinct vertices are rejected.
    pub fn from_facets(facets: &[Vec<usize>]) -> Result<Self, LinalgError> {
        let mut by_dim: Vec<BTreeSet<Vec<usize>>> = Vec::new();
        for facet in facets {
            let mut facet = facet.clone();
            facet.sort_unstable();
            facet.dedup();
            if facet.is_empty() {
                continue;
            }
            let n = facet.len();
            if n > MAX_FACET_VERTICES {
                return Err(LinalgError::FacetTooLarge {
                    size: n,
                    limit: MAX_FACET_VERTICES,
                });
            }
            // every nonempty subset of the facet
            for mask in 1u64..(1u64 << n) {
                let face: Vec<usize> = (0..n)
                    .filter(|&i| mask & (1u64 << i) != 0)
                    .map(|i| facet[i])
                    .collect();
                let dim = face.len() - 1;
                if by_dim.len() <= dim {
                    by_dim.resize_with(dim + 1, BTreeSet::new);
                }
                by_dim[dim].insert(face);
            }
        }
        Ok(Self {
            levels: by_dim.into_iter().map(|s| s.into_iter().collect()).collect(),
        })
    }

    /// Top dimension, or `None` for the empty complex.
    pub fn dimension(&self) -> Option<usize> {
        self.levels.len().checked_sub(1)
    }

    pub fn simplices(&self, k: usize) -> &[Vec<usize>] {
        self.levels.get(k).map_or(&[], Vec::as_slice)
    }

    /// Number of simplices in each dimension.
    pub fn f_vector(&self) -> Vec<usize> {
        self.levels.iter().map(Vec::len).collect()
    }

    pub fn euler_characteristic(&self) -> i64 {
        self.levels
            .iter()
            .enumerate()
            .map(|(k, s)| if k % 2 == 0 { s.len() as i64 } else { -(s.len() as i64) })
            .sum()
    }

    /// ∂_k : C_k → C_{k-1}, rows indexed by (k-1)-simplices.
    ///
    /// ∂_0 is the zero map with no rows. Removing vertex i contributes (-1)^i.
    pub fn boundary_matrix<F: Field>(&self, k: usize) -> Matrix<F> {
        let cols = self.simplices(k);
        if k == 0 {
            return Matrix::zeros(0, cols.len());
        }
        let rows = self.simplices(k - 1);
        let index: HashMap<&[usize], usize> = rows
            .iter()
            .enumerate()
            .map(|(i, s)| (s.as_slice(), i))
            .collect();
        let mut m = Matrix::zeros(rows.len(), cols.len());
        for (c, simplex) in cols.iter().enumerate() {
            for i in 0..simplex.len() {
                let mut face = simplex.clone();
                face.remove(i);
                if let Some(&r) = index.get(face.as_slice()) {
                    let sign = if i % 2 == 0 { Fq::ONE } else { -Fq::ONE };
                    m.set(r, c, sign);
                }
            }
        }
        m
    }
}
