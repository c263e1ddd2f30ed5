//! Adjacency spectra via nalgebra's symmetric eigenvalue routine.

use super::Graph;
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Eigenvalues closer than this are treated as one.
pub const DEFAULT_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Eigenvalue {
    pub value: f64,
    pub multiplicity: usize,
    /// Set when `value` is within tolerance of an integer.
    pub integral: Option<i64>,
}

/// Distinct eigenvalues, largest first, with multiplicities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spectrum {
    pub eigenvalues: Vec<Eigenvalue>,
    pub tolerance: f64,
}

impl Spectrum {
    pub fn compute(graph: &Graph, tolerance: f64) -> Self {
        let n = graph.order();
        if n == 0 {
            return Self::from_values(&[], tolerance);
        }
        let adjacency = DMatrix::<f64>::from_fn(n, n, |i, j| {
            if graph.adjacent(i, j) { 1.0 } else { 0.0 }
        });
        let mut values: Vec<f64> = adjacency.symmetric_eigenvalues().iter().copied().collect();
        values.sort_by(|a, b| b.total_cmp(a));
        let spectrum = Self::from_values(&values, tolerance);
        debug!(n, distinct = spectrum.distinct_count(), "spectrum computed");
        spectrum
    }

    /// Cluster sorted (descending) eigenvalues; a value joins the current
    /// cluster when within `tolerance` of its previous member.
    pub fn from_values(sorted: &[f64], tolerance: f64) -> Self {
        let mut clusters: Vec<Vec<f64>> = Vec::new();
        for &x in sorted {
            match clusters.last_mut() {
                Some(cluster) if cluster.last().is_some_and(|&prev| (prev - x).abs() <= tolerance) => {
                    cluster.push(x)
                }
                _ => clusters.push(vec![x]),
            }
        }
        let eigenvalues = clusters
            .into_iter()
            .map(|cluster| {
                let mean = cluster.iter().sum::<f64>() / cluster.len() as f64;
                let rounded = mean.round();
                let integral = ((mean - rounded).abs() <= tolerance).then_some(rounded as i64);
                Eigenvalue {
                    // snap integral values so records print cleanly
                    value: if integral.is_some() { rounded } else { mean },
                    multiplicity: cluster.len(),
                    integral,
                }
            })
            .collect();
        Self {
            eigenvalues,
            tolerance,
        }
    }

    pub fn distinct_count(&self) -> usize {
        self.eigenvalues.len()
    }

    pub fn is_integral(&self) -> bool {
        self.eigenvalues.iter().all(|e| e.integral.is_some())
    }

    pub fn largest(&self) -> Option<f64> {
        self.eigenvalues.first().map(|e| e.value)
    }

    /// Total multiplicity, which equals the graph order.
    pub fn dimension(&self) -> usize {
        self.eigenvalues.iter().map(|e| e.multiplicity).sum()
    }

    /// Same multiplicities and values within the looser of the two tolerances.
    pub fn approx_eq(&self, other: &Self) -> bool {
        let tol = self.tolerance.max(other.tolerance);
        self.eigenvalues.len() == other.eigenvalues.len()
            && self
                .eigenvalues
                .iter()
                .zip(&other.eigenvalues)
                .all(|(a, b)| a.multiplicity == b.multiplicity && (a.value - b.value).abs() <= tol)
    }

    /// (value, multiplicity) pairs for integral spectra.
    pub fn integral_pairs(&self) -> Option<Vec<(i64, usize)>> {
        self.eigenvalues
            .iter()
            .map(|e| e.integral.map(|v| (v, e.multiplicity)))
            .collect()
    }
}

impl fmt::Display for Spectrum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .eigenvalues
            .iter()
            .map(|e| match e.integral {
                Some(v) => format!("{v}^{}", e.multiplicity),
                None => format!("{:.6}^{}", e.value, e.multiplicity),
            })
            .collect();
        write!(f, "{{{}}}", parts.join(", "))
    }
}
