//! Generalized quadrangle axiom checks.

use super::ConstructionError;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axiom {
    LineSize,
    PointDegree,
    UniqueJoin,
    Quadrangle,
    PointCount,
    LineCount,
}

impl fmt::Display for Axiom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::LineSize => "line size",
            Self::PointDegree => "point degree",
            Self::UniqueJoin => "unique join",
            Self::Quadrangle => "quadrangle",
            Self::PointCount => "point count",
            Self::LineCount => "line count",
        };
        f.write_str(name)
    }
}

/// Check every GQ(s,t) axiom and return the lines through each point.
///
/// Lines must already be sorted. Checks run in a fixed order so the first
/// failing axiom is reported deterministically.
pub(super) fn validate(
    point_count: usize,
    lines: &[Vec<usize>],
    s: usize,
    t: usize,
) -> Result<Vec<Vec<usize>>, ConstructionError> {
    for (i, line) in lines.iter().enumerate() {
        if let Some(&p) = line.iter().find(|&&p| p >= point_count) {
            return Err(ConstructionError::MalformedLine {
                line: i,
                detail: format!("point {p} out of range"),
            });
        }
        if line.windows(2).any(|w| w[0] == w[1]) {
            return Err(ConstructionError::MalformedLine {
                line: i,
                detail: "repeated point".into(),
            });
        }
    }

    for (line, points) in lines.iter().enumerate() {
        if points.len() != s + 1 {
            return Err(ConstructionError::LineSize {
                line,
                expected: s + 1,
                found: points.len(),
            });
        }
    }

    let mut point_lines = vec![Vec::new(); point_count];
    for (j, line) in lines.iter().enumerate() {
        for &p in line {
            point_lines[p].push(j);
        }
    }
    for (point, through) in point_lines.iter().enumerate() {
        if through.len() != t + 1 {
            return Err(ConstructionError::PointDegree {
                point,
                expected: t + 1,
                found: through.len(),
            });
        }
    }

    // join[p * n + q] holds the joining line + 1, or 0
    let n = point_count;
    let mut join = vec![0usize; n * n];
    for (j, line) in lines.iter().enumerate() {
        for (a, &p) in line.iter().enumerate() {
            for &q in &line[a + 1..] {
                if join[p * n + q] != 0 {
                    return Err(ConstructionError::UniqueJoin {
                        first: p,
                        second: q,
                    });
                }
                join[p * n + q] = j + 1;
                join[q * n + p] = j + 1;
            }
        }
    }

    for point in 0..n {
        for (line, points) in lines.iter().enumerate() {
            if points.binary_search(&point).is_ok() {
                continue;
            }
            let collinear = points.iter().filter(|&&q| join[point * n + q] != 0).count();
            if collinear != 1 {
                return Err(ConstructionError::Quadrangle {
                    point,
                    line,
                    collinear,
                });
            }
        }
    }

    let expected_points = (s + 1) * (s * t + 1);
    if point_count != expected_points {
        return Err(ConstructionError::PointCount {
            expected: expected_points,
            found: point_count,
        });
    }
    let expected_lines = (t + 1) * (s * t + 1);
    if lines.len() != expected_lines {
        return Err(ConstructionError::LineCount {
            expected: expected_lines,
            found: lines.len(),
        });
    }

    Ok(point_lines)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Vec<Vec<usize>> {
        // GQ(1,1): the 4-cycle
        vec![vec![0, 1], vec![1, 2], vec![2, 3], vec![0, 3]]
    }

    #[test]
    fn test_square_is_gq11() {
        let point_lines = validate(4, &square(), 1, 1).unwrap();
        assert_eq!(point_lines[0], vec![0, 3]);
    }

    #[test]
    fn test_wrong_line_size_reported() {
        let err = validate(4, &square(), 2, 1).unwrap_err();
        assert_eq!(err.axiom(), Some(Axiom::LineSize));
    }

    #[test]
    fn test_wrong_point_degree_reported() {
        let mut lines = square();
        lines.pop();
        let err = validate(4, &lines, 1, 1).unwrap_err();
        assert_eq!(
            err,
            ConstructionError::PointDegree {
                point: 0,
                expected: 2,
                found: 1
            }
        );
    }

    #[test]
    fn test_doubled_line_breaks_unique_join() {
        let lines = vec![vec![0, 1], vec![0, 1], vec![2, 3], vec![2, 3]];
        let err = validate(4, &lines, 1, 1).unwrap_err();
        assert_eq!(err, ConstructionError::UniqueJoin { first: 0, second: 1 });
    }

    #[test]
    fn test_triangle_violates_quadrangle_axiom() {
        // K3 with lines as edges: every point is on two lines of size 2, but
        // the point opposite an edge sees both of its ends.
        let lines = vec![vec![0, 1], vec![1, 2], vec![0, 2]];
        let err = validate(3, &lines, 1, 1).unwrap_err();
        assert_eq!(
            err,
            ConstructionError::Quadrangle {
                point: 0,
                line: 1,
                collinear: 2
            }
        );
    }

    #[test]
    fn test_out_of_range_point_rejected() {
        let lines = vec![vec![0, 7]];
        assert!(matches!(
            validate(4, &lines, 1, 1),
            Err(ConstructionError::MalformedLine { line: 0, .. })
        ));
    }
}
