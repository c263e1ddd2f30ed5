//! The symplectic quadrangle W(q).
//!
//! Points are all points of PG(3,q); lines are the totally isotropic lines of
//! a non-degenerate alternating form. The standard form is
//!
//! ```text
//! B(x, y) = x0·y2 − x2·y0 + x1·y3 − x3·y1
//! ```
//!
//! For the standard form the space also supplies collineations (symplectic
//! transvections, a similitude and the Frobenius map) whose closure is the
//! full collineation group, independent of any graph search.

use super::projective::{self, Vector};
use super::{ConstructionError, IncidenceStructure};
use crate::field::{Field, Fq};
use crate::linalg::Matrix;

/// F^4 with an alternating form given by its Gram matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymplecticSpace<F: Field> {
    gram: Matrix<F>,
}

/// A collineation of PG(3,q): linear, or the coordinatewise Frobenius map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Collineation<F: Field> {
    Linear(Matrix<F>),
    Frobenius,
}

impl<F: Field> Collineation<F> {
    pub fn apply(&self, x: &[Fq<F>]) -> Option<Vec<Fq<F>>> {
        match self {
            Self::Linear(m) => m.apply(x).ok(),
            Self::Frobenius => Some(x.iter().map(|v| v.frobenius()).collect()),
        }
    }
}

impl<F: Field> SymplecticSpace<F> {
    pub fn standard_gram() -> Matrix<F> {
        let mut g = Matrix::zeros(4, 4);
        g.set(0, 2, Fq::ONE);
        g.set(2, 0, -Fq::ONE);
        g.set(1, 3, Fq::ONE);
        g.set(3, 1, -Fq::ONE);
        g
    }

    pub fn standard() -> Self {
        Self {
            gram: Self::standard_gram(),
        }
    }

    /// Accept a 4×4 Gram matrix that is alternating and non-degenerate.
    pub fn new(gram: Matrix<F>) -> Result<Self, ConstructionError> {
        let (rows, cols) = gram.shape();
        if (rows, cols) != (4, 4) {
            return Err(ConstructionError::FormDimension {
                expected: 4,
                rows,
                cols,
            });
        }
        for r in 0..4 {
            if !gram.get(r, r).is_zero() {
                return Err(ConstructionError::NotAlternating { row: r, col: r });
            }
            for c in (r + 1)..4 {
                if gram.get(r, c) != -gram.get(c, r) {
                    return Err(ConstructionError::NotAlternating { row: r, col: c });
                }
            }
        }
        let rank = gram.rank();
        if rank != 4 {
            return Err(ConstructionError::Degenerate { rank, dimension: 4 });
        }
        Ok(Self { gram })
    }

    pub fn gram(&self) -> &Matrix<F> {
        &self.gram
    }

    pub fn is_standard(&self) -> bool {
        self.gram == Self::standard_gram()
    }

    /// B(x, y) = xᵀ·G·y.
    pub fn form(&self, x: &[Fq<F>], y: &[Fq<F>]) -> Fq<F> {
        let mut acc = Fq::ZERO;
        for (r, &xr) in x.iter().enumerate() {
            if xr.is_zero() {
                continue;
            }
            for (c, &yc) in y.iter().enumerate() {
                acc += xr * self.gram.get(r, c) * yc;
            }
        }
        acc
    }

    pub fn build(&self) -> Result<IncidenceStructure, ConstructionError> {
        let q = F::ORDER as usize;
        let points = projective::points::<F>(4);
        let lines = projective::spanned_lines(&points, |x, y| self.form(x, y).is_zero())?;
        let structure = IncidenceStructure::new(format!("W({q})"), points.len(), lines, (q, q))?;
        Ok(structure.with_coordinates(projective::coordinates(&points)))
    }

    /// x ↦ x + c·B(x, v)·v, an isometry of the form.
    pub fn transvection(&self, v: &[Fq<F>], c: Fq<F>) -> Matrix<F> {
        let mut m = Matrix::identity(4);
        for j in 0..4 {
            let mut e = vec![Fq::ZERO; 4];
            e[j] = Fq::ONE;
            let scale = c * self.form(&e, v);
            for (i, &vi) in v.iter().enumerate() {
                m.set(i, j, m.get(i, j) + scale * vi);
            }
        }
        m
    }

    /// Generators of the collineation group, for the standard form only.
    ///
    /// Transvections along e0..e3 and e0+e1 with scalars 1 and a primitive
    /// element ω, the similitude diag(1, 1, ω, ω) and, over GF(p²), the
    /// Frobenius map.
    pub fn collineation_generators(&self) -> Option<Vec<Collineation<F>>> {
        if !self.is_standard() {
            return None;
        }
        let omega = Fq::<F>::primitive_element();
        let mut scalars = vec![Fq::ONE];
        if !omega.is_one() {
            scalars.push(omega);
        }
        let mut directions: Vec<Vector<F>> = (0..4)
            .map(|i| {
                let mut e = vec![Fq::ZERO; 4];
                e[i] = Fq::ONE;
                e
            })
            .collect();
        directions.push(vec![Fq::ONE, Fq::ONE, Fq::ZERO, Fq::ZERO]);

        let mut out = Vec::new();
        for v in &directions {
            for &c in &scalars {
                out.push(Collineation::Linear(self.transvection(v, c)));
            }
        }
        if !omega.is_one() {
            let mut d = Matrix::identity(4);
            d.set(2, 2, omega);
            d.set(3, 3, omega);
            out.push(Collineation::Linear(d));
        }
        if F::DEGREE > 1 {
            out.push(Collineation::Frobenius);
        }
        Some(out)
    }

    /// Point permutations induced by [`Self::collineation_generators`], in
    /// the point order used by [`Self::build`].
    pub fn collineation_permutations(&self) -> Option<Vec<Vec<usize>>> {
        let generators = self.collineation_generators()?;
        let points = projective::points::<F>(4);
        let index = projective::point_index(&points);
        generators
            .iter()
            .map(|g| {
                points
                    .iter()
                    .map(|p| {
                        let image = projective::normalize(&g.apply(p)?);
                        index.get(&image).copied()
                    })
                    .collect::<Option<Vec<usize>>>()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{Gf3, Gf4, Gf9};

    #[test]
    fn test_standard_form_values() {
        let w = SymplecticSpace::<Gf3>::standard();
        let e = |i: usize| {
            let mut v = vec![Fq::<Gf3>::ZERO; 4];
            v[i] = Fq::ONE;
            v
        };
        assert!(w.form(&e(0), &e(2)).is_one());
        assert_eq!(w.form(&e(2), &e(0)), -Fq::ONE);
        assert!(w.form(&e(0), &e(1)).is_zero());
    }

    #[test]
    fn test_symmetric_form_rejected() {
        let gram = Matrix::<Gf3>::from_raw_rows(&[
            vec![0, 0, 1, 0],
            vec![0, 0, 0, 1],
            vec![1, 0, 0, 0],
            vec![0, 1, 0, 0],
        ])
        .unwrap();
        assert_eq!(
            SymplecticSpace::new(gram),
            Err(ConstructionError::NotAlternating { row: 0, col: 2 })
        );
    }

    #[test]
    fn test_degenerate_form_rejected() {
        let gram = Matrix::<Gf3>::from_raw_rows(&[
            vec![0, 1, 0, 0],
            vec![2, 0, 0, 0],
            vec![0, 0, 0, 0],
            vec![0, 0, 0, 0],
        ])
        .unwrap();
        assert_eq!(
            SymplecticSpace::new(gram),
            Err(ConstructionError::Degenerate {
                rank: 2,
                dimension: 4
            })
        );
    }

    #[test]
    fn test_alternative_gram_still_gives_gq() {
        // B(x, y) = x0·y1 − x1·y0 + x2·y3 − x3·y2
        let gram = Matrix::<Gf3>::from_raw_rows(&[
            vec![0, 1, 0, 0],
            vec![2, 0, 0, 0],
            vec![0, 0, 0, 1],
            vec![0, 0, 2, 0],
        ])
        .unwrap();
        let space = SymplecticSpace::new(gram).unwrap();
        assert!(!space.is_standard());
        assert!(space.collineation_generators().is_none());
        let w = space.build().unwrap();
        assert_eq!((w.point_count(), w.line_count()), (40, 40));
    }

    #[test]
    fn test_transvections_preserve_form() {
        let w = SymplecticSpace::<Gf9>::standard();
        let v: Vec<Fq<Gf9>> = [1, 5, 0, 7].iter().map(|&r| Fq::new(r).unwrap()).collect();
        let t = w.transvection(&v, Fq::new(3).unwrap());
        let gram_image = t.transpose().mul(w.gram()).unwrap().mul(&t).unwrap();
        assert_eq!(&gram_image, w.gram());
    }

    #[test]
    fn test_generator_permutations_are_bijections() {
        let w = SymplecticSpace::<Gf4>::standard();
        let perms = w.collineation_permutations().unwrap();
        // 5 directions x 2 scalars, similitude, Frobenius
        assert_eq!(perms.len(), 12);
        for perm in perms {
            let mut sorted = perm.clone();
            sorted.sort_unstable();
            assert_eq!(sorted, (0..85).collect::<Vec<_>>());
        }
    }
}
