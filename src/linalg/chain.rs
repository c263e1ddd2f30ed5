//! Chain complexes, homology and cohomology over a finite field.
//!
//! Homology is read off boundary ranks. Cohomology is computed separately
//! from the transposed (coboundary) maps as ker δ^k / im δ^(k-1), using
//! explicit kernel and image bases, so the two agree only if the linear
//! algebra is right. Comparing the same complex over two fields detects
//! torsion, which is how RP² is told apart from a point.

use super::{LinalgError, Matrix, SimplicialComplex, quotient_dimension};
use crate::error::{InconsistencyError, KernelError};
use crate::field::Field;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Boundary maps ∂_k : C_k → C_{k-1} for k = 0..=top, with ∂_0 = 0.
#[derive(Debug, Clone)]
pub struct ChainComplex<F: Field> {
    boundaries: Vec<Matrix<F>>,
}

/// Homology and cohomology dimensions of one chain complex over one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CohomologyResult {
    pub field: String,
    pub field_order: u32,
    pub chain_dimensions: Vec<usize>,
    pub boundary_ranks: Vec<usize>,
    pub homology: Vec<usize>,
    pub cohomology: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionDifference {
    pub degree: usize,
    pub first: usize,
    pub second: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CohomologyComparison {
    pub first_field: String,
    pub second_field: String,
    pub differences: Vec<DimensionDifference>,
}

impl CohomologyComparison {
    pub fn agrees(&self) -> bool {
        self.differences.is_empty()
    }
}

impl<F: Field> ChainComplex<F> {
    /// Validate shapes and ∂_(k-1)∘∂_k = 0.
    pub fn new(boundaries: Vec<Matrix<F>>) -> Result<Self, KernelError> {
        for k in 1..boundaries.len() {
            let (lower, upper) = (&boundaries[k - 1], &boundaries[k]);
            if upper.rows() != lower.cols() {
                return Err(LinalgError::ShapeMismatch {
                    op: "chain",
                    left: lower.shape(),
                    right: upper.shape(),
                }
                .into());
            }
            let composite = lower.mul(upper)?;
            if !composite.is_zero() {
                return Err(InconsistencyError::ChainComplex {
                    lower: k - 1,
                    upper: k,
                    nonzero: composite.nonzero_count(),
                }
                .into());
            }
        }
        Ok(Self { boundaries })
    }

    pub fn from_simplicial(complex: &SimplicialComplex) -> Result<Self, KernelError> {
        let top = complex.dimension().map_or(0, |d| d + 1);
        Self::new((0..top).map(|k| complex.boundary_matrix(k)).collect())
    }

    pub fn chain_dimensions(&self) -> Vec<usize> {
        self.boundaries.iter().map(Matrix::cols).collect()
    }

    /// dim H_k = dim C_k − rank ∂_k − rank ∂_(k+1).
    pub fn homology(&self) -> Vec<usize> {
        let ranks: Vec<usize> = self.boundaries.iter().map(Matrix::rank).collect();
        self.homology_from_ranks(&ranks)
    }

    fn homology_from_ranks(&self, ranks: &[usize]) -> Vec<usize> {
        let dims = self.chain_dimensions();
        (0..dims.len())
            .map(|k| dims[k] - ranks[k] - ranks.get(k + 1).copied().unwrap_or(0))
            .collect()
    }

    /// dim H^k = dim(ker δ^k / im δ^(k-1)) with δ^k = ∂_(k+1)ᵀ.
    pub fn cohomology(&self) -> Result<Vec<usize>, LinalgError> {
        let dims = self.chain_dimensions();
        let mut out = Vec::with_capacity(dims.len());
        for k in 0..dims.len() {
            let cocycles = match self.boundaries.get(k + 1) {
                Some(upper) => upper.transpose().kernel_basis(),
                None => Matrix::<F>::identity(dims[k]).row_space_basis(),
            };
            let coboundaries = if k == 0 {
                Vec::new()
            } else {
                self.boundaries[k].transpose().image_basis()
            };
            out.push(quotient_dimension(&cocycles, &coboundaries)?);
        }
        Ok(out)
    }

    pub fn compute(&self) -> Result<CohomologyResult, KernelError> {
        let boundary_ranks: Vec<usize> = self.boundaries.iter().map(Matrix::rank).collect();
        let homology = self.homology_from_ranks(&boundary_ranks);
        let cohomology = self.cohomology()?;
        debug!(field = %F::name(), ?homology, ?cohomology, "chain complex");
        Ok(CohomologyResult {
            field: F::name(),
            field_order: F::ORDER,
            chain_dimensions: self.chain_dimensions(),
            boundary_ranks,
            homology,
            cohomology,
        })
    }
}

impl SimplicialComplex {
    pub fn cohomology<F: Field>(&self) -> Result<CohomologyResult, KernelError> {
        ChainComplex::<F>::from_simplicial(self)?.compute()
    }
}

/// Per-degree differences between the cohomology over two fields.
pub fn compare_fields(first: &CohomologyResult, second: &CohomologyResult) -> CohomologyComparison {
    let len = first.cohomology.len().max(second.cohomology.len());
    let differences = (0..len)
        .filter_map(|degree| {
            let a = first.cohomology.get(degree).copied().unwrap_or(0);
            let b = second.cohomology.get(degree).copied().unwrap_or(0);
            (a != b).then_some(DimensionDifference {
                degree,
                first: a,
                second: b,
            })
        })
        .collect();
    CohomologyComparison {
        first_field: first.field.clone(),
        second_field: second.field.clone(),
        differences,
    }
}

/// Like [`compare_fields`], but any difference is an inconsistency.
pub fn cross_check(
    first: &CohomologyResult,
    second: &CohomologyResult,
) -> Result<CohomologyComparison, InconsistencyError> {
    let comparison = compare_fields(first, second);
    match comparison.differences.first() {
        None => Ok(comparison),
        Some(d) => Err(InconsistencyError::FieldDependentDimension {
            degree: d.degree,
            first_field: comparison.first_field.clone(),
            first: d.first,
            second_field: comparison.second_field.clone(),
            second: d.second,
        }),
    }
}
