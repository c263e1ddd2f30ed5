//! Grids GQ(s,1).

use super::{ConstructionError, IncidenceStructure};

/// Point (i, j) of the (s+1)×(s+1) grid is `i·(s+1) + j`; rows come first,
/// then columns.
pub(super) fn build(s: usize) -> Result<IncidenceStructure, ConstructionError> {
    if s == 0 {
        return Err(ConstructionError::UnsupportedParameters { s, t: 1 });
    }
    let n = s + 1;
    let rows = (0..n).map(|i| (0..n).map(|j| i * n + j).collect::<Vec<usize>>());
    let cols = (0..n).map(|j| (0..n).map(|i| i * n + j).collect());
    let lines: Vec<Vec<usize>> = rows.chain(cols).collect();
    IncidenceStructure::new(format!("grid GQ({s},1)"), n * n, lines, (s, 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{DEFAULT_TOLERANCE, Graph, Spectrum, SrgParameters};

    #[test]
    fn test_three_by_three_grid() {
        let g = build(2).unwrap();
        assert_eq!((g.point_count(), g.line_count()), (9, 6));
        let graph = Graph::collinearity(&g);
        let spectrum = Spectrum::compute(&graph, DEFAULT_TOLERANCE);
        assert_eq!(
            graph.srg_verdict(&spectrum).parameters(),
            Some(SrgParameters {
                v: 9,
                k: 4,
                lambda: 1,
                mu: 2
            })
        );
    }

    #[test]
    fn test_zero_grid_rejected() {
        assert!(build(0).is_err());
    }
}
