//! Dense linear algebra over a finite field.
//!
//! [`Matrix<F>`] owns its field through the type parameter, so a GF(2)
//! matrix and a GF(3) matrix cannot be multiplied together. Everything here is
//! exact Gaussian elimination; the matrices in this kernel have at most a few
//! thousand rows and columns.

pub mod chain;
pub mod code;
pub mod simplicial;

pub use chain::{
    ChainComplex, CohomologyComparison, CohomologyResult, DimensionDifference, compare_fields,
    cross_check,
};
pub use code::{LinearCode, WeightEnumeration};
pub use simplicial::SimplicialComplex;

use crate::field::{Field, FieldError, Fq};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LinalgError {
    #[error("shape mismatch in {op}: {left:?} vs {right:?}")]
    ShapeMismatch {
        op: &'static str,
        left: (usize, usize),
        right: (usize, usize),
    },
    #[error("ragged row {row}: expected {expected} entries, found {found}")]
    Ragged {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("subspace is not contained in the ambient space ({excess} independent vectors outside)")]
    NotASubspace { excess: usize },
    #[error("facet has {size} vertices, at most {limit} allowed")]
    FacetTooLarge { size: usize, limit: usize },
    #[error(transparent)]
    Field(#[from] FieldError),
}

/// A dense row-major matrix over `F`.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Matrix<F: Field> {
    rows: usize,
    cols: usize,
    data: Vec<Fq<F>>,
}

/// Reduced row echelon form with its pivot columns.
#[derive(Debug, Clone)]
pub struct Echelon<F: Field> {
    pub reduced: Matrix<F>,
    pub pivots: Vec<usize>,
}

impl<F: Field> Echelon<F> {
    pub fn rank(&self) -> usize {
        self.pivots.len()
    }
}

impl<F: Field> Matrix<F> {
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![Fq::ZERO; rows * cols],
        }
    }

    pub fn identity(n: usize) -> Self {
        let mut m = Self::zeros(n, n);
        for i in 0..n {
            m.set(i, i, Fq::ONE);
        }
        m
    }

    pub fn from_fn(rows: usize, cols: usize, mut f: impl FnMut(usize, usize) -> Fq<F>) -> Self {
        let mut data = Vec::with_capacity(rows * cols);
        for r in 0..rows {
            for c in 0..cols {
                data.push(f(r, c));
            }
        }
        Self { rows, cols, data }
    }

    /// Build from rows of elements; every row must have the same length.
    pub fn from_rows(rows: Vec<Vec<Fq<F>>>) -> Result<Self, LinalgError> {
        let cols = rows.first().map_or(0, Vec::len);
        let n = rows.len();
        let mut data = Vec::with_capacity(n * cols);
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != cols {
                return Err(LinalgError::Ragged {
                    row: i,
                    expected: cols,
                    found: row.len(),
                });
            }
            data.extend(row);
        }
        Ok(Self {
            rows: n,
            cols,
            data,
        })
    }

    /// Build from raw encodings, validating shape and field range.
    pub fn from_raw_rows(rows: &[Vec<u32>]) -> Result<Self, LinalgError> {
        let converted = rows
            .iter()
            .map(|row| row.iter().map(|&v| Fq::new(v)).collect::<Result<Vec<_>, _>>())
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_rows(converted)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    #[inline]
    pub fn get(&self, r: usize, c: usize) -> Fq<F> {
        self.data[r * self.cols + c]
    }

    #[inline]
    pub fn set(&mut self, r: usize, c: usize, v: Fq<F>) {
        self.data[r * self.cols + c] = v;
    }

    pub fn row(&self, r: usize) -> &[Fq<F>] {
        &self.data[r * self.cols..(r + 1) * self.cols]
    }

    pub fn column(&self, c: usize) -> Vec<Fq<F>> {
        (0..self.rows).map(|r| self.get(r, c)).collect()
    }

    pub fn to_raw_rows(&self) -> Vec<Vec<u32>> {
        (0..self.rows)
            .map(|r| self.row(r).iter().map(|v| v.raw() as u32).collect())
            .collect()
    }

    pub fn transpose(&self) -> Self {
        Self::from_fn(self.cols, self.rows, |r, c| self.get(c, r))
    }

    pub fn is_zero(&self) -> bool {
        self.data.iter().all(|v| v.is_zero())
    }

    pub fn nonzero_count(&self) -> usize {
        self.data.iter().filter(|v| !v.is_zero()).count()
    }

    pub fn add(&self, other: &Self) -> Result<Self, LinalgError> {
        if self.shape() != other.shape() {
            return Err(LinalgError::ShapeMismatch {
                op: "add",
                left: self.shape(),
                right: other.shape(),
            });
        }
        let data = self
            .data
            .iter()
            .zip(&other.data)
            .map(|(&a, &b)| a + b)
            .collect();
        Ok(Self {
            rows: self.rows,
            cols: self.cols,
            data,
        })
    }

    pub fn mul(&self, other: &Self) -> Result<Self, LinalgError> {
        if self.cols != other.rows {
            return Err(LinalgError::ShapeMismatch {
                op: "mul",
                left: self.shape(),
                right: other.shape(),
            });
        }
        let mut out = Self::zeros(self.rows, other.cols);
        for r in 0..self.rows {
            for k in 0..self.cols {
                let a = self.get(r, k);
                if a.is_zero() {
                    continue;
                }
                for c in 0..other.cols {
                    let b = other.get(k, c);
                    if !b.is_zero() {
                        let idx = r * out.cols + c;
                        out.data[idx] += a * b;
                    }
                }
            }
        }
        Ok(out)
    }

    /// Matrix–vector product `A·x`.
    pub fn apply(&self, x: &[Fq<F>]) -> Result<Vec<Fq<F>>, LinalgError> {
        if x.len() != self.cols {
            return Err(LinalgError::ShapeMismatch {
                op: "apply",
                left: self.shape(),
                right: (x.len(), 1),
            });
        }
        Ok((0..self.rows)
            .map(|r| {
                self.row(r)
                    .iter()
                    .zip(x)
                    .fold(Fq::ZERO, |acc, (&a, &b)| acc + a * b)
            })
            .collect())
    }

    fn swap_rows(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        for c in 0..self.cols {
            self.data.swap(a * self.cols + c, b * self.cols + c);
        }
    }

    fn scale_row(&mut self, r: usize, factor: Fq<F>) {
        for v in &mut self.data[r * self.cols..(r + 1) * self.cols] {
            *v *= factor;
        }
    }

    /// row[target] -= factor * row[source]
    fn eliminate(&mut self, target: usize, source: usize, factor: Fq<F>) {
        for c in 0..self.cols {
            let s = self.data[source * self.cols + c];
            if !s.is_zero() {
                self.data[target * self.cols + c] -= factor * s;
            }
        }
    }

    pub fn echelon(&self) -> Echelon<F> {
        let mut m = self.clone();
        let mut pivots = Vec::new();
        let mut r = 0;
        for c in 0..m.cols {
            if r == m.rows {
                break;
            }
            let Some(p) = (r..m.rows).find(|&i| !m.get(i, c).is_zero()) else {
                continue;
            };
            m.swap_rows(p, r);
            let Ok(inv) = m.get(r, c).inv() else {
                continue;
            };
            m.scale_row(r, inv);
            for i in 0..m.rows {
                if i != r {
                    let factor = m.get(i, c);
                    if !factor.is_zero() {
                        m.eliminate(i, r, factor);
                    }
                }
            }
            pivots.push(c);
            r += 1;
        }
        Echelon { reduced: m, pivots }
    }

    pub fn rank(&self) -> usize {
        self.echelon().rank()
    }

    /// Basis of the right kernel {x : A·x = 0}.
    pub fn kernel_basis(&self) -> Vec<Vec<Fq<F>>> {
        let ech = self.echelon();
        let mut is_pivot = vec![false; self.cols];
        for &p in &ech.pivots {
            is_pivot[p] = true;
        }
        (0..self.cols)
            .filter(|&c| !is_pivot[c])
            .map(|free| {
                let mut v = vec![Fq::ZERO; self.cols];
                v[free] = Fq::ONE;
                for (i, &p) in ech.pivots.iter().enumerate() {
                    v[p] = -ech.reduced.get(i, free);
                }
                v
            })
            .collect()
    }

    /// Basis of the column space, taken from the original pivot columns.
    pub fn image_basis(&self) -> Vec<Vec<Fq<F>>> {
        self.echelon()
            .pivots
            .iter()
            .map(|&c| self.column(c))
            .collect()
    }

    /// Basis of the row space (nonzero rows of the reduced form).
    pub fn row_space_basis(&self) -> Vec<Vec<Fq<F>>> {
        let ech = self.echelon();
        (0..ech.rank())
            .map(|i| ech.reduced.row(i).to_vec())
            .collect()
    }

    pub fn nullity(&self) -> usize {
        self.cols - self.rank()
    }
}

impl<F: Field> fmt::Debug for Matrix<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Matrix<{}> {}x{}", F::name(), self.rows, self.cols)?;
        for r in 0..self.rows {
            let row: Vec<String> = self.row(r).iter().map(|v| v.to_string()).collect();
            writeln!(f, "  [{}]", row.join(" "))?;
        }
        Ok(())
    }
}

/// Rank of a list of vectors of equal length.
pub fn span_rank<F: Field>(vectors: &[Vec<Fq<F>>]) -> Result<usize, LinalgError> {
    if vectors.is_empty() {
        return Ok(0);
    }
    Ok(Matrix::from_rows(vectors.to_vec())?.rank())
}

/// dim(V / W) for W = span(`sub`) inside V = span(`ambient`).
///
/// Fails with [`LinalgError::NotASubspace`] when `sub` leaves V.
pub fn quotient_dimension<F: Field>(
    ambient: &[Vec<Fq<F>>],
    sub: &[Vec<Fq<F>>],
) -> Result<usize, LinalgError> {
    let dim_v = span_rank(ambient)?;
    let dim_w = span_rank(sub)?;
    let mut joined = ambient.to_vec();
    joined.extend_from_slice(sub);
    let dim_sum = span_rank(&joined)?;
    if dim_sum != dim_v {
        return Err(LinalgError::NotASubspace {
            excess: dim_sum - dim_v,
        });
    }
    Ok(dim_v - dim_w)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{Gf2, Gf3, Gf9};

    fn raw<F: Field>(rows: &[&[u32]]) -> Matrix<F> {
        let rows: Vec<Vec<u32>> = rows.iter().map(|r| r.to_vec()).collect();
        Matrix::from_raw_rows(&rows).unwrap()
    }

    #[test]
    fn test_rank_depends_on_field() {
        // det = 3
        assert_eq!(raw::<Gf2>(&[&[0, 1], &[1, 0]]).rank(), 2);
        assert_eq!(raw::<Gf3>(&[&[2, 1], &[1, 2]]).rank(), 1);
    }

    #[test]
    fn test_kernel_vectors_are_annihilated() {
        let m = raw::<Gf3>(&[&[1, 2, 0, 1], &[0, 1, 1, 2], &[1, 0, 1, 0]]);
        let kernel = m.kernel_basis();
        assert_eq!(kernel.len(), m.nullity());
        for v in &kernel {
            assert!(m.apply(v).unwrap().iter().all(|x| x.is_zero()));
        }
        assert_eq!(kernel.len() + m.rank(), 4);
    }

    #[test]
    fn test_image_basis_spans_columns() {
        let m = raw::<Gf2>(&[&[1, 1, 0], &[0, 1, 1], &[1, 0, 1]]);
        let image = m.image_basis();
        assert_eq!(image.len(), 2);
        let mut all_cols: Vec<Vec<Fq<Gf2>>> = (0..3).map(|c| m.column(c)).collect();
        all_cols.extend(image.clone());
        assert_eq!(span_rank(&all_cols).unwrap(), 2);
    }

    #[test]
    fn test_shape_mismatch_reported() {
        let a = Matrix::<Gf2>::zeros(2, 3);
        let b = Matrix::<Gf2>::zeros(2, 3);
        assert!(matches!(
            a.mul(&b),
            Err(LinalgError::ShapeMismatch { op: "mul", .. })
        ));
    }

    #[test]
    fn test_out_of_field_entry_rejected() {
        let rows = vec![vec![0, 1], vec![2, 0]];
        assert!(matches!(
            Matrix::<Gf2>::from_raw_rows(&rows),
            Err(LinalgError::Field(FieldError::OutOfRange { value: 2, order: 2 }))
        ));
        assert!(Matrix::<Gf9>::from_raw_rows(&rows).is_ok());
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let rows = vec![vec![0, 1], vec![1]];
        assert!(matches!(
            Matrix::<Gf3>::from_raw_rows(&rows),
            Err(LinalgError::Ragged { row: 1, .. })
        ));
    }

    #[test]
    fn test_quotient_dimension() {
        let e = |v: &[u32]| v.iter().map(|&x| Fq::<Gf3>::new(x).unwrap()).collect::<Vec<_>>();
        let ambient = vec![e(&[1, 0, 0]), e(&[0, 1, 0]), e(&[0, 0, 1])];
        let sub = vec![e(&[1, 1, 0]), e(&[2, 2, 0])];
        assert_eq!(quotient_dimension(&ambient, &sub).unwrap(), 2);

        let plane = vec![e(&[1, 0, 0]), e(&[0, 1, 0])];
        let outside = vec![e(&[0, 0, 1])];
        assert_eq!(
            quotient_dimension(&plane, &outside),
            Err(LinalgError::NotASubspace { excess: 1 })
        );
    }

    #[test]
    fn test_identity_is_multiplicative_unit() {
        let m = raw::<Gf9>(&[&[1, 5, 7], &[3, 0, 8]]);
        assert_eq!(Matrix::identity(2).mul(&m).unwrap(), m);
        assert_eq!(m.mul(&Matrix::identity(3)).unwrap(), m);
        assert_eq!(m.transpose().transpose(), m);
    }
}
