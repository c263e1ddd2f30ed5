//! Combinatorial invariants: degrees, components, cliques, SRG parameters.

use super::{Graph, Spectrum};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, VecDeque};

/// Parameters (v, k, λ, μ) of a strongly regular graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SrgParameters {
    pub v: usize,
    pub k: usize,
    pub lambda: usize,
    pub mu: usize,
}

impl SrgParameters {
    /// Restricted eigenvalues (r, s) with r > s, from the parameters alone.
    pub fn eigenvalues(&self) -> (f64, f64) {
        let d = self.lambda as f64 - self.mu as f64;
        let disc = (d * d + 4.0 * (self.k as f64 - self.mu as f64)).sqrt();
        ((d + disc) / 2.0, (d - disc) / 2.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NotSrgReason {
    Empty,
    Irregular { degrees: Vec<usize> },
    Disconnected { components: usize },
    /// Needs exactly two distinct eigenvalues besides the degree.
    EigenvalueCount { non_principal: usize },
    AdjacentCounts { values: Vec<usize> },
    NonAdjacentCounts { values: Vec<usize> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum SrgVerdict {
    StronglyRegular(SrgParameters),
    NotStronglyRegular { reason: NotSrgReason },
}

impl SrgVerdict {
    pub fn parameters(&self) -> Option<SrgParameters> {
        match self {
            Self::StronglyRegular(p) => Some(*p),
            Self::NotStronglyRegular { .. } => None,
        }
    }
}

impl Graph {
    /// Degree of each vertex in vertex order.
    pub fn degrees(&self) -> Vec<usize> {
        (0..self.order()).map(|v| self.degree(v)).collect()
    }

    /// Degrees sorted non-increasing.
    pub fn degree_sequence(&self) -> Vec<usize> {
        let mut seq = self.degrees();
        seq.sort_unstable_by(|a, b| b.cmp(a));
        seq
    }

    pub fn degree_set(&self) -> BTreeSet<usize> {
        self.degrees().into_iter().collect()
    }

    /// The common degree, if every vertex has the same one.
    pub fn regular_degree(&self) -> Option<usize> {
        let set = self.degree_set();
        match set.len() {
            1 => set.first().copied(),
            _ => None,
        }
    }

    /// Connected components, each sorted, ordered by smallest vertex.
    pub fn components(&self) -> Vec<Vec<usize>> {
        let n = self.order();
        let mut seen = vec![false; n];
        let mut out = Vec::new();
        for start in 0..n {
            if seen[start] {
                continue;
            }
            seen[start] = true;
            let mut component = vec![start];
            let mut queue = VecDeque::from([start]);
            while let Some(u) = queue.pop_front() {
                for &w in self.neighbors(u) {
                    if !seen[w] {
                        seen[w] = true;
                        component.push(w);
                        queue.push_back(w);
                    }
                }
            }
            component.sort_unstable();
            out.push(component);
        }
        out
    }

    pub fn is_connected(&self) -> bool {
        self.components().len() <= 1
    }

    pub fn triangle_count(&self) -> u64 {
        let mut total = 0u64;
        for (u, v) in self.edges() {
            total += self.common_neighbors(u, v) as u64;
        }
        total / 3
    }

    /// All cliques with exactly `size` vertices, sorted, in lexicographic order.
    pub fn cliques(&self, size: usize) -> Vec<Vec<usize>> {
        let mut out = Vec::new();
        if size == 0 {
            return out;
        }
        let mut current = Vec::with_capacity(size);
        for v in 0..self.order() {
            let candidates: Vec<usize> = self
                .neighbors(v)
                .iter()
                .copied()
                .filter(|&w| w > v)
                .collect();
            current.push(v);
            self.extend_clique(&mut current, &candidates, size, &mut out);
            current.pop();
        }
        out
    }

    fn extend_clique(
        &self,
        current: &mut Vec<usize>,
        candidates: &[usize],
        size: usize,
        out: &mut Vec<Vec<usize>>,
    ) {
        if current.len() == size {
            out.push(current.clone());
            return;
        }
        if current.len() + candidates.len() < size {
            return;
        }
        for (i, &w) in candidates.iter().enumerate() {
            let next: Vec<usize> = candidates[i + 1..]
                .iter()
                .copied()
                .filter(|&x| self.adjacent(w, x))
                .collect();
            current.push(w);
            self.extend_clique(current, &next, size, out);
            current.pop();
        }
    }

    /// Number of cliques of each size 1..=max_size.
    pub fn clique_counts(&self, max_size: usize) -> Vec<usize> {
        (1..=max_size).map(|k| self.cliques(k).len()).collect()
    }

    /// Decide strong regularity.
    ///
    /// Parameters are only reported for a regular connected graph with two
    /// non-principal eigenvalues whose λ and μ are confirmed by counting
    /// common neighbours over every pair.
    pub fn srg_verdict(&self, spectrum: &Spectrum) -> SrgVerdict {
        let not = |reason| SrgVerdict::NotStronglyRegular { reason };
        let n = self.order();
        if n == 0 {
            return not(NotSrgReason::Empty);
        }
        let Some(k) = self.regular_degree() else {
            return not(NotSrgReason::Irregular {
                degrees: self.degree_set().into_iter().collect(),
            });
        };
        let components = self.components().len();
        if components > 1 {
            return not(NotSrgReason::Disconnected { components });
        }
        let non_principal = spectrum.distinct_count().saturating_sub(1);
        if non_principal != 2 {
            return not(NotSrgReason::EigenvalueCount { non_principal });
        }

        let mut adjacent = BTreeSet::new();
        let mut non_adjacent = BTreeSet::new();
        for u in 0..n {
            for v in (u + 1)..n {
                let c = self.common_neighbors(u, v);
                if self.adjacent(u, v) {
                    adjacent.insert(c);
                } else {
                    non_adjacent.insert(c);
                }
            }
        }
        if adjacent.len() > 1 {
            return not(NotSrgReason::AdjacentCounts {
                values: adjacent.into_iter().collect(),
            });
        }
        if non_adjacent.len() > 1 {
            return not(NotSrgReason::NonAdjacentCounts {
                values: non_adjacent.into_iter().collect(),
            });
        }
        SrgVerdict::StronglyRegular(SrgParameters {
            v: n,
            k,
            lambda: adjacent.first().copied().unwrap_or(0),
            mu: non_adjacent.first().copied().unwrap_or(0),
        })
    }
}
