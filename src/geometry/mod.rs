//! Finite incidence geometries and the generalized quadrangle builders.
//!
//! A generalized quadrangle GQ(s,t) has s+1 points on every line, t+1 lines
//! through every point, and satisfies the quadrangle axiom: for a point p
//! not on a line L there is exactly one point of L collinear with p.
//!
//! Families built here:
//!
//! - W(q), the symplectic quadrangle: totally isotropic lines of an
//!   alternating form on F_q^4. GQ(q,q).
//! - Q(4,q), the parabolic quadric: totally singular lines of a quadratic
//!   form on F_q^5. GQ(q,q), dual to W(q).
//! - The (s+1)×(s+1) grid GQ(s,1) and its dual GQ(1,t).
//!
//! Every builder goes through [`IncidenceStructure::new`], which validates
//! the axioms and rejects the structure instead of filtering it.

mod axioms;
mod grid;
mod projective;
mod quadric;
mod symplectic;

pub use axioms::Axiom;
pub use quadric::ParabolicQuadric;
pub use symplectic::{Collineation, SymplecticSpace};

use crate::field::FieldError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConstructionError {
    #[error("line {line} has {found} points, expected {expected}")]
    LineSize {
        line: usize,
        expected: usize,
        found: usize,
    },
    #[error("point {point} is on {found} lines, expected {expected}")]
    PointDegree {
        point: usize,
        expected: usize,
        found: usize,
    },
    #[error("points {first} and {second} are joined by more than one line")]
    UniqueJoin { first: usize, second: usize },
    #[error("point {point} is collinear with {collinear} points of line {line}, expected 1")]
    Quadrangle {
        point: usize,
        line: usize,
        collinear: usize,
    },
    #[error("{found} points, expected (s+1)(st+1) = {expected}")]
    PointCount { expected: usize, found: usize },
    #[error("{found} lines, expected (t+1)(st+1) = {expected}")]
    LineCount { expected: usize, found: usize },
    #[error("line {line} is malformed: {detail}")]
    MalformedLine { line: usize, detail: String },
    #[error("form must be {expected}x{expected}, got {rows}x{cols}")]
    FormDimension {
        expected: usize,
        rows: usize,
        cols: usize,
    },
    #[error("form is not alternating at ({row}, {col})")]
    NotAlternating { row: usize, col: usize },
    #[error("form is degenerate: rank {rank} on a {dimension}-dimensional space")]
    Degenerate { rank: usize, dimension: usize },
    #[error("no generalized quadrangle family for (s, t) = ({s}, {t})")]
    UnsupportedParameters { s: usize, t: usize },
    #[error(transparent)]
    Field(#[from] FieldError),
}

impl ConstructionError {
    /// The axiom a validation failure refers to, if any.
    pub fn axiom(&self) -> Option<Axiom> {
        match self {
            Self::LineSize { .. } => Some(Axiom::LineSize),
            Self::PointDegree { .. } => Some(Axiom::PointDegree),
            Self::UniqueJoin { .. } => Some(Axiom::UniqueJoin),
            Self::Quadrangle { .. } => Some(Axiom::Quadrangle),
            Self::PointCount { .. } => Some(Axiom::PointCount),
            Self::LineCount { .. } => Some(Axiom::LineCount),
            _ => None,
        }
    }
}

/// Projective coordinates of the points, as raw field encodings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coordinates {
    pub field_order: u32,
    pub points: Vec<Vec<u8>>,
}

/// Points `0..point_count`, lines as sorted point lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncidenceStructure {
    name: String,
    s: usize,
    t: usize,
    point_count: usize,
    lines: Vec<Vec<usize>>,
    point_lines: Vec<Vec<usize>>,
    coordinates: Option<Coordinates>,
}

impl IncidenceStructure {
    /// Validate `lines` as a GQ(s,t) on `point_count` points.
    pub fn new(
        name: impl Into<String>,
        point_count: usize,
        lines: Vec<Vec<usize>>,
        (s, t): (usize, usize),
    ) -> Result<Self, ConstructionError> {
        let mut lines = lines;
        for line in &mut lines {
            line.sort_unstable();
        }
        let point_lines = axioms::validate(point_count, &lines, s, t)?;
        Ok(Self {
            name: name.into(),
            s,
            t,
            point_count,
            lines,
            point_lines,
            coordinates: None,
        })
    }

    pub(crate) fn with_coordinates(mut self, coordinates: Coordinates) -> Self {
        self.coordinates = Some(coordinates);
        self
    }

    /// Standard symplectic quadrangle W(q) for a supported field order.
    pub fn symplectic(q: u32) -> Result<Self, ConstructionError> {
        crate::with_field!(q, F => SymplecticSpace::<F>::standard().build())
    }

    /// Parabolic quadric Q(4,q) with the standard form.
    pub fn parabolic(q: u32) -> Result<Self, ConstructionError> {
        crate::with_field!(q, F => ParabolicQuadric::<F>::standard().build())
    }

    /// The (s+1)×(s+1) grid, GQ(s,1).
    pub fn grid(s: usize) -> Result<Self, ConstructionError> {
        grid::build(s)
    }

    /// The dual grid GQ(1,t), i.e. K_{t+1,t+1} with edges as lines.
    pub fn dual_grid(t: usize) -> Result<Self, ConstructionError> {
        let dual = grid::build(t)?.dual();
        Ok(Self {
            name: format!("dual grid GQ(1,{t})"),
            ..dual
        })
    }

    /// Pick a family from (s,t): W(q) for s = t = q, grids for s or t = 1.
    pub fn from_parameters(s: usize, t: usize) -> Result<Self, ConstructionError> {
        let unsupported = ConstructionError::UnsupportedParameters { s, t };
        if s == t && s > 1 {
            let q = u32::try_from(s).map_err(|_| unsupported.clone())?;
            return match Self::symplectic(q) {
                Err(ConstructionError::Field(FieldError::Unsupported(_))) => Err(unsupported),
                other => other,
            };
        }
        match (s, t) {
            (s, 1) if s >= 1 => Self::grid(s),
            (1, t) if t >= 1 => Self::dual_grid(t),
            _ => Err(unsupported),
        }
    }

    /// Swap the roles of points and lines.
    pub fn dual(&self) -> Self {
        let lines = self.point_lines.clone();
        let mut point_lines = vec![Vec::new(); self.lines.len()];
        for (j, line) in lines.iter().enumerate() {
            for &p in line {
                point_lines[p].push(j);
            }
        }
        Self {
            name: format!("dual of {}", self.name),
            s: self.t,
            t: self.s,
            point_count: self.lines.len(),
            lines,
            point_lines,
            coordinates: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The order (s, t).
    pub fn parameters(&self) -> (usize, usize) {
        (self.s, self.t)
    }

    pub fn point_count(&self) -> usize {
        self.point_count
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn lines(&self) -> &[Vec<usize>] {
        &self.lines
    }

    pub fn line(&self, index: usize) -> &[usize] {
        &self.lines[index]
    }

    /// Lines through `point`, ascending.
    pub fn lines_through(&self, point: usize) -> &[usize] {
        &self.point_lines[point]
    }

    /// The line joining two distinct collinear points.
    pub fn line_through(&self, p: usize, q: usize) -> Option<usize> {
        if p == q {
            return None;
        }
        self.point_lines[p]
            .iter()
            .copied()
            .find(|&l| self.lines[l].binary_search(&q).is_ok())
    }

    pub fn collinear(&self, p: usize, q: usize) -> bool {
        self.line_through(p, q).is_some()
    }

    pub fn coordinates(&self) -> Option<&Coordinates> {
        self.coordinates.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_w3_counts() {
        let w3 = IncidenceStructure::symplectic(3).unwrap();
        assert_eq!(w3.parameters(), (3, 3));
        assert_eq!(w3.point_count(), 40);
        assert_eq!(w3.line_count(), 40);
        assert!(w3.lines().iter().all(|l| l.len() == 4));
        assert!((0..40).all(|p| w3.lines_through(p).len() == 4));
        assert_eq!(w3.coordinates().map(|c| c.points.len()), Some(40));
    }

    #[test]
    fn test_from_parameters_families() {
        assert_eq!(IncidenceStructure::from_parameters(2, 2).unwrap().point_count(), 15);
        let grid = IncidenceStructure::from_parameters(3, 1).unwrap();
        assert_eq!((grid.point_count(), grid.line_count()), (16, 8));
        let dual = IncidenceStructure::from_parameters(1, 3).unwrap();
        assert_eq!((dual.point_count(), dual.line_count()), (8, 16));
        assert_eq!(dual.parameters(), (1, 3));
        assert_eq!(
            IncidenceStructure::from_parameters(6, 6),
            Err(ConstructionError::UnsupportedParameters { s: 6, t: 6 })
        );
        assert_eq!(
            IncidenceStructure::from_parameters(2, 4),
            Err(ConstructionError::UnsupportedParameters { s: 2, t: 4 })
        );
    }

    #[test]
    fn test_dual_of_dual_restores_incidence() {
        let w2 = IncidenceStructure::symplectic(2).unwrap();
        let back = w2.dual().dual();
        assert_eq!(back.lines(), w2.lines());
        assert_eq!(back.parameters(), (2, 2));
    }

    #[test]
    fn test_line_through_collinear_points() {
        let w3 = IncidenceStructure::symplectic(3).unwrap();
        let line = w3.line(0).to_vec();
        assert_eq!(w3.line_through(line[0], line[3]), Some(0));
        assert_eq!(w3.line_through(line[1], line[1]), None);
        let collinear_with_0 = (1..40).filter(|&q| w3.collinear(0, q)).count();
        assert_eq!(collinear_with_0, 12);
    }

    #[test]
    fn test_parabolic_quadric_is_gq33() {
        let q43 = IncidenceStructure::parabolic(3).unwrap();
        assert_eq!((q43.point_count(), q43.line_count()), (40, 40));
        assert_eq!(q43.parameters(), (3, 3));
    }
}
