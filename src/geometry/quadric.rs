//! The parabolic quadric Q(4,q).
//!
//! For the standard form the isometry group is generated by reflections
//! x ↦ x − B(x, v)·Q(v)⁻¹·v in nonsingular vectors v, which also works in
//! characteristic 2. Over GF(p²) the Frobenius map is added. The dimension
//! is odd, so every similitude acts on points like an isometry.

use super::projective::{self, Vector};
use super::{Collineation, ConstructionError, IncidenceStructure};
use crate::field::{Field, Fq};
use crate::linalg::Matrix;

/// A quadratic form Q(x) = xᵀ·C·x on F^5.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParabolicQuadric<F: Field> {
    coefficients: Matrix<F>,
}

impl<F: Field> ParabolicQuadric<F> {
    /// x0² + x1·x2 + x3·x4
    pub fn standard() -> Self {
        let mut c = Matrix::zeros(5, 5);
        c.set(0, 0, Fq::ONE);
        c.set(1, 2, Fq::ONE);
        c.set(3, 4, Fq::ONE);
        Self { coefficients: c }
    }

    /// Accept a form whose polar form has a radical of dimension 0 (odd q),
    /// or of dimension 1 on which Q does not vanish (even q).
    pub fn new(coefficients: Matrix<F>) -> Result<Self, ConstructionError> {
        let (rows, cols) = coefficients.shape();
        if (rows, cols) != (5, 5) {
            return Err(ConstructionError::FormDimension {
                expected: 5,
                rows,
                cols,
            });
        }
        let quadric = Self { coefficients };
        let polar = quadric.polar_matrix();
        let rank = polar.rank();
        let nonsingular = if F::CHARACTERISTIC == 2 {
            rank == 4
                && polar
                    .kernel_basis()
                    .first()
                    .is_some_and(|r| !quadric.value(r).is_zero())
        } else {
            rank == 5
        };
        if !nonsingular {
            return Err(ConstructionError::Degenerate { rank, dimension: 5 });
        }
        Ok(quadric)
    }

    pub fn is_standard(&self) -> bool {
        self.coefficients == Self::standard().coefficients
    }

    fn polar_matrix(&self) -> Matrix<F> {
        let c = &self.coefficients;
        Matrix::from_fn(5, 5, |r, s| c.get(r, s) + c.get(s, r))
    }

    pub fn value(&self, x: &[Fq<F>]) -> Fq<F> {
        let mut acc = Fq::ZERO;
        for (r, &xr) in x.iter().enumerate() {
            for (s, &xs) in x.iter().enumerate() {
                acc += xr * self.coefficients.get(r, s) * xs;
            }
        }
        acc
    }

    /// B(x, y) = Q(x + y) − Q(x) − Q(y).
    pub fn polar(&self, x: &[Fq<F>], y: &[Fq<F>]) -> Fq<F> {
        let sum: Vec<Fq<F>> = x.iter().zip(y).map(|(&a, &b)| a + b).collect();
        self.value(&sum) - self.value(x) - self.value(y)
    }

    pub fn build(&self) -> Result<IncidenceStructure, ConstructionError> {
        let q = F::ORDER as usize;
        let points = self.points();
        let lines = projective::spanned_lines(&points, |x, y| self.polar(x, y).is_zero())?;
        let structure = IncidenceStructure::new(format!("Q(4,{q})"), points.len(), lines, (q, q))?;
        Ok(structure.with_coordinates(projective::coordinates(&points)))
    }

    fn points(&self) -> Vec<Vector<F>> {
        projective::points::<F>(5)
            .into_iter()
            .filter(|p| self.value(p).is_zero())
            .collect()
    }

    /// The reflection in `v`, or `None` when Q(v) = 0.
    pub fn reflection(&self, v: &[Fq<F>]) -> Option<Matrix<F>> {
        let scale = self.value(v).inv().ok()?;
        let mut m = Matrix::identity(5);
        for j in 0..5 {
            let mut e = vec![Fq::ZERO; 5];
            e[j] = Fq::ONE;
            let c = self.polar(&e, v) * scale;
            for (i, &vi) in v.iter().enumerate() {
                m.set(i, j, m.get(i, j) - c * vi);
            }
        }
        Some(m)
    }

    /// Generators of the collineation group, for the standard form only.
    ///
    /// Reflections in whichever of e0, e1+e2, e3+e4, e0+e1, e1+e3+e4,
    /// e0+e3, e1−e2 and e1+ω·e2 are nonsingular, plus the Frobenius map
    /// over GF(p²).
    pub fn collineation_generators(&self) -> Option<Vec<Collineation<F>>> {
        if !self.is_standard() {
            return None;
        }
        let vector = |terms: &[(usize, Fq<F>)]| {
            let mut v = vec![Fq::ZERO; 5];
            for &(i, c) in terms {
                v[i] = c;
            }
            v
        };
        let one = Fq::ONE;
        let directions = [
            vector(&[(0, one)]),
            vector(&[(1, one), (2, one)]),
            vector(&[(3, one), (4, one)]),
            vector(&[(0, one), (1, one)]),
            vector(&[(1, one), (3, one), (4, one)]),
            vector(&[(0, one), (3, one)]),
            vector(&[(1, one), (2, -one)]),
            vector(&[(1, one), (2, Fq::primitive_element())]),
        ];
        let mut out: Vec<Collineation<F>> = Vec::new();
        for v in &directions {
            if let Some(m) = self.reflection(v) {
                let g = Collineation::Linear(m);
                if !out.contains(&g) {
                    out.push(g);
                }
            }
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
        let points = self.points();
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
    use crate::field::{Gf2, Gf3, Gf4};
    use crate::graph::Graph;
    use crate::group::PermutationGroup;

    #[test]
    fn test_q42_has_fifteen_points() {
        let q = ParabolicQuadric::<Gf2>::standard().build().unwrap();
        assert_eq!((q.point_count(), q.line_count()), (15, 15));
        assert_eq!(q.name(), "Q(4,2)");
    }

    #[test]
    fn test_standard_form_is_accepted_in_both_characteristics() {
        let c2 = ParabolicQuadric::<Gf2>::standard().coefficients;
        assert!(ParabolicQuadric::new(c2).is_ok());
        let c3 = ParabolicQuadric::<Gf3>::standard().coefficients;
        assert!(ParabolicQuadric::new(c3).is_ok());
    }

    #[test]
    fn test_cone_is_degenerate() {
        // x1·x2 + x3·x4 has x0 in its radical
        let mut c = Matrix::<Gf3>::zeros(5, 5);
        c.set(1, 2, Fq::ONE);
        c.set(3, 4, Fq::ONE);
        assert_eq!(
            ParabolicQuadric::new(c),
            Err(ConstructionError::Degenerate {
                rank: 4,
                dimension: 5
            })
        );
    }

    #[test]
    fn test_singular_points_have_zero_value() {
        let quadric = ParabolicQuadric::<Gf3>::standard();
        let q = quadric.build().unwrap();
        let coords = q.coordinates().unwrap();
        for raw in &coords.points {
            let x: Vec<Fq<Gf3>> = raw.iter().map(|&r| Fq::new(r as u32).unwrap()).collect();
            assert!(quadric.value(&x).is_zero());
        }
    }

    #[test]
    fn test_reflections_preserve_the_form() {
        let quadric = ParabolicQuadric::<Gf3>::standard();
        let generators = quadric.collineation_generators().unwrap();
        // over GF(3), e1+ω·e2 is e1−e2
        assert_eq!(generators.len(), 7);
        for point in quadric.points() {
            for g in &generators {
                let image = g.apply(&point).unwrap();
                assert!(quadric.value(&image).is_zero());
            }
        }
        let isotropic = vec![Fq::ZERO, Fq::ONE, Fq::ZERO, Fq::ZERO, Fq::ZERO];
        assert_eq!(quadric.reflection(&isotropic), None);
    }

    #[test]
    fn test_q42_collineations_are_s6() {
        let quadric = ParabolicQuadric::<Gf2>::standard();
        let q = quadric.build().unwrap();
        let images = quadric.collineation_permutations().unwrap();
        let group = PermutationGroup::from_images(15, images).unwrap();
        assert_eq!(group.order(200_000).unwrap(), 720);
        assert_eq!(group.orbits().len(), 1);
        let graph = Graph::collinearity(&q);
        for g in group.generators() {
            for (u, v) in graph.edges() {
                assert!(graph.adjacent(g.apply(u), g.apply(v)));
            }
        }
    }

    #[test]
    fn test_q43_collineation_order() {
        let images = ParabolicQuadric::<Gf3>::standard()
            .collineation_permutations()
            .unwrap();
        let group = PermutationGroup::from_images(40, images).unwrap();
        assert_eq!(group.order(200_000).unwrap(), 51_840);
    }

    #[test]
    fn test_gf4_adds_frobenius() {
        let generators = ParabolicQuadric::<Gf4>::standard()
            .collineation_generators()
            .unwrap();
        assert_eq!(generators.last(), Some(&Collineation::Frobenius));
        let images = ParabolicQuadric::<Gf4>::standard()
            .collineation_permutations()
            .unwrap();
        assert!(images.iter().all(|p| p.len() == 85));
    }

    #[test]
    fn test_other_forms_have_no_generators() {
        let mut c = Matrix::<Gf3>::zeros(5, 5);
        c.set(0, 0, Fq::ONE);
        c.set(1, 1, Fq::ONE);
        c.set(2, 2, Fq::ONE);
        c.set(3, 4, Fq::ONE);
        let quadric = ParabolicQuadric::new(c).unwrap();
        assert_eq!(quadric.collineation_generators(), None);
    }
}
