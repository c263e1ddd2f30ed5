//! Linear codes and their weight enumeration.

use super::Matrix;
use crate::error::InconsistencyError;
use crate::field::{Field, Fq};
use std::collections::BTreeMap;
use tracing::debug;

/// A linear [n, k] code over `F`, held as a full-rank generator matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinearCode<F: Field> {
    generator: Matrix<F>,
    length: usize,
}

/// Result of a weight enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WeightEnumeration {
    /// Number of codewords per Hamming weight; weights with no codewords are absent.
    Complete { distribution: BTreeMap<usize, u64> },
    /// q^k exceeds the budget (`codewords` is `None` when it overflows u64).
    OverBudget { codewords: Option<u64>, budget: u64 },
}

impl WeightEnumeration {
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Complete { .. })
    }

    /// Smallest nonzero weight, if the enumeration completed and the code is nonzero.
    pub fn minimum_weight(&self) -> Option<usize> {
        match self {
            Self::Complete { distribution } => distribution.keys().copied().find(|&w| w > 0),
            Self::OverBudget { .. } => None,
        }
    }

    pub fn count(&self, weight: usize) -> Option<u64> {
        match self {
            Self::Complete { distribution } => Some(distribution.get(&weight).copied().unwrap_or(0)),
            Self::OverBudget { .. } => None,
        }
    }
}

impl<F: Field> LinearCode<F> {
    /// Code spanned by `generators`. Dependent rows are reduced away; a
    /// declared dimension must match the computed rank.
    pub fn from_generators(
        generators: &Matrix<F>,
        declared_dimension: Option<usize>,
    ) -> Result<Self, InconsistencyError> {
        let basis = generators.row_space_basis();
        if let Some(declared) = declared_dimension
            && declared != basis.len()
        {
            return Err(InconsistencyError::CodeDimension {
                declared,
                computed: basis.len(),
            });
        }
        Ok(Self::from_basis(basis, generators.cols()))
    }

    fn from_basis(basis: Vec<Vec<Fq<F>>>, length: usize) -> Self {
        let k = basis.len();
        let generator = Matrix::from_fn(k, length, |r, c| basis[r][c]);
        Self { generator, length }
    }

    /// The code {x : A·x = 0}.
    pub fn kernel_code(matrix: &Matrix<F>) -> Self {
        Self::from_basis(matrix.kernel_basis(), matrix.cols())
    }

    /// The dual code C⊥ under the standard dot product.
    pub fn dual(&self) -> Self {
        Self::kernel_code(&self.generator)
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn dimension(&self) -> usize {
        self.generator.rows()
    }

    pub fn generator(&self) -> &Matrix<F> {
        &self.generator
    }

    pub fn contains(&self, word: &[Fq<F>]) -> bool {
        if word.len() != self.length {
            return false;
        }
        let mut rows: Vec<Vec<Fq<F>>> = (0..self.dimension())
            .map(|r| self.generator.row(r).to_vec())
            .collect();
        rows.push(word.to_vec());
        match Matrix::from_rows(rows) {
            Ok(m) => m.rank() == self.dimension(),
            Err(_) => false,
        }
    }

    /// Whether C ⊆ C⊥.
    pub fn is_self_orthogonal(&self) -> bool {
        self.generator
            .mul(&self.generator.transpose())
            .map(|g| g.is_zero())
            .unwrap_or(false)
    }

    /// Complete weight distribution when q^k codewords fit within `budget`.
    pub fn weight_distribution(&self, budget: u64) -> WeightEnumeration {
        let k = self.dimension() as u32;
        let total = match (F::ORDER as u64).checked_pow(k) {
            Some(total) if total <= budget => total,
            codewords => return WeightEnumeration::OverBudget { codewords, budget },
        };
        debug!(field = %F::name(), n = self.length, k, total, "enumerating codewords");
        let counts = if F::ORDER == 2 {
            self.enumerate_binary(total)
        } else {
            self.enumerate_qary(total)
        };
        let distribution = counts
            .into_iter()
            .enumerate()
            .filter(|&(_, c)| c > 0)
            .map(|(w, c)| (w, c as u64))
            .collect();
        WeightEnumeration::Complete { distribution }
    }

    /// Check a claimed minimum weight (and optionally its codeword count).
    ///
    /// An over-budget code is returned unverified rather than failing.
    pub fn verify_minimum_weight(
        &self,
        claimed: usize,
        claimed_count: Option<u64>,
        budget: u64,
    ) -> Result<WeightEnumeration, InconsistencyError> {
        let enumeration = self.weight_distribution(budget);
        if !enumeration.is_complete() {
            return Ok(enumeration);
        }
        let found = enumeration.minimum_weight();
        if found != Some(claimed) {
            return Err(InconsistencyError::MinimumWeight { claimed, found });
        }
        if let Some(count) = claimed_count {
            let actual = enumeration.count(claimed).unwrap_or(0);
            if actual != count {
                return Err(InconsistencyError::MinimumWeightCount {
                    weight: claimed,
                    claimed: count,
                    found: actual,
                });
            }
        }
        Ok(enumeration)
    }

    /// Gray enumeration over GF(2) with bit-packed words.
    ///
    /// Step t adds generator `trailing_zeros(t)`, visiting every codeword once.
    fn enumerate_binary(&self, total: u64) -> Vec<usize> {
        let limbs = self.length.div_ceil(64).max(1);
        let rows: Vec<Vec<u64>> = (0..self.dimension())
            .map(|r| {
                let mut packed = vec![0u64; limbs];
                for (c, v) in self.generator.row(r).iter().enumerate() {
                    if !v.is_zero() {
                        packed[c / 64] |= 1 << (c % 64);
                    }
                }
                packed
            })
            .collect();

        let mut counts = vec![0usize; self.length + 1];
        counts[0] = 1;
        let mut word = vec![0u64; limbs];
        for t in 1..total {
            let i = t.trailing_zeros() as usize;
            for (w, g) in word.iter_mut().zip(&rows[i]) {
                *w ^= g;
            }
            let weight: u32 = word.iter().map(|w| w.count_ones()).sum();
            counts[weight as usize] += 1;
        }
        counts
    }

    /// q-ary Gray enumeration: step t adds generator v_q(t), the number of
    /// trailing zero digits of t in base q.
    fn enumerate_qary(&self, total: u64) -> Vec<usize> {
        let q = F::ORDER as u64;
        let supports: Vec<Vec<(usize, Fq<F>)>> = (0..self.dimension())
            .map(|r| {
                self.generator
                    .row(r)
                    .iter()
                    .enumerate()
                    .filter(|(_, v)| !v.is_zero())
                    .map(|(c, &v)| (c, v))
                    .collect()
            })
            .collect();

        let mut counts = vec![0usize; self.length + 1];
        counts[0] = 1;
        let mut word = vec![Fq::<F>::ZERO; self.length];
        let mut weight = 0usize;
        for t in 1..total {
            let mut i = 0;
            let mut s = t;
            while s % q == 0 {
                s /= q;
                i += 1;
            }
            for &(c, g) in &supports[i] {
                let was_zero = word[c].is_zero();
                word[c] += g;
                match (was_zero, word[c].is_zero()) {
                    (true, false) => weight += 1,
                    (false, true) => weight -= 1,
                    _ => {}
                }
            }
            counts[weight] += 1;
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{Gf2, Gf3};

    fn hamming() -> LinearCode<Gf2> {
        let rows = vec![
            vec![1, 0, 0, 0, 1, 1, 0],
            vec![0, 1, 0, 0, 1, 0, 1],
            vec![0, 0, 1, 0, 0, 1, 1],
            vec![0, 0, 0, 1, 1, 1, 1],
        ];
        LinearCode::from_generators(&Matrix::from_raw_rows(&rows).unwrap(), Some(4)).unwrap()
    }

    fn distribution(pairs: &[(usize, u64)]) -> WeightEnumeration {
        WeightEnumeration::Complete {
            distribution: pairs.iter().copied().collect(),
        }
    }

    #[test]
    fn test_hamming_weight_distribution() {
        let code = hamming();
        assert_eq!(
            code.weight_distribution(1 << 10),
            distribution(&[(0, 1), (3, 7), (4, 7), (7, 1)])
        );
    }

    #[test]
    fn test_simplex_code_is_self_orthogonal_dual() {
        let simplex = hamming().dual();
        assert_eq!(simplex.dimension(), 3);
        assert!(simplex.is_self_orthogonal());
        assert!(!hamming().is_self_orthogonal());
        assert_eq!(simplex.weight_distribution(64), distribution(&[(0, 1), (4, 7)]));
    }

    #[test]
    fn test_tetracode_is_mds() {
        let rows = vec![vec![1, 0, 1, 1], vec![0, 1, 1, 2]];
        let code = LinearCode::<Gf3>::from_generators(&Matrix::from_raw_rows(&rows).unwrap(), None)
            .unwrap();
        assert_eq!(code.weight_distribution(100), distribution(&[(0, 1), (3, 8)]));
        assert!(code.verify_minimum_weight(3, Some(8), 100).is_ok());
    }

    #[test]
    fn test_declared_dimension_checked() {
        let rows = vec![vec![1, 1, 0], vec![0, 1, 1], vec![1, 0, 1]];
        let m = Matrix::<Gf2>::from_raw_rows(&rows).unwrap();
        assert_eq!(
            LinearCode::from_generators(&m, Some(3)),
            Err(InconsistencyError::CodeDimension {
                declared: 3,
                computed: 2
            })
        );
    }

    #[test]
    fn test_wrong_minimum_weight_claim_fails() {
        let code = hamming();
        assert_eq!(
            code.verify_minimum_weight(4, None, 1 << 10),
            Err(InconsistencyError::MinimumWeight {
                claimed: 4,
                found: Some(3)
            })
        );
        assert!(matches!(
            code.verify_minimum_weight(3, Some(6), 1 << 10),
            Err(InconsistencyError::MinimumWeightCount { found: 7, .. })
        ));
    }

    #[test]
    fn test_over_budget_is_not_an_error() {
        let code = hamming();
        let result = code.verify_minimum_weight(5, None, 8).unwrap();
        assert_eq!(
            result,
            WeightEnumeration::OverBudget {
                codewords: Some(16),
                budget: 8
            }
        );
        assert_eq!(result.minimum_weight(), None);
    }

    #[test]
    fn test_contains_codewords_only() {
        let code = hamming();
        let word = |v: &[u32]| v.iter().map(|&x| Fq::<Gf2>::new(x).unwrap()).collect::<Vec<_>>();
        assert!(code.contains(&word(&[1, 1, 0, 0, 0, 1, 1])));
        assert!(!code.contains(&word(&[1, 0, 0, 0, 0, 0, 0])));
        assert!(!code.contains(&word(&[1, 0])));
    }
}
