//! Validation of external inputs: adjacency tables, JSON records, generator
//! lists and root-system definitions.
//!
//! Tables are rows of integers separated by whitespace or commas; blank lines
//! and lines starting with `#` are skipped. Every failure names the offending
//! row, column or generator.

use crate::field::{Field, FieldError};
use crate::graph::{Graph, GraphError};
use crate::group::{GroupError, Permutation, PermutationGroup};
use crate::linalg::{LinalgError, Matrix};
use crate::roots::{RootSystem, RootSystemError, RootSystemGraph};
use crate::schema::{GeneratorRecord, MatrixRecord, RootSystemRecord};
use camino::{Utf8Path, Utf8PathBuf};
use serde::de::DeserializeOwned;
use std::fs;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Failed to read {path}: {source}")]
    ReadError {
        path: Utf8PathBuf,
        source: std::io::Error,
    },
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("line {line}: {token:?} is not a non-negative integer")]
    Parse { line: usize, token: String },
    #[error("table has no rows")]
    Empty,
    #[error("line {line}: expected {expected} entries, found {found}")]
    Ragged {
        line: usize,
        expected: usize,
        found: usize,
    },
    #[error("matrix is {rows}x{cols}, expected square")]
    NotSquare { rows: usize, cols: usize },
    #[error("nonzero diagonal entry at vertex {0}")]
    NonzeroDiagonal(usize),
    #[error("matrix is not symmetric at ({row}, {col})")]
    Asymmetric { row: usize, col: usize },
    #[error("entry ({row}, {col}) is {value}, expected 0 or 1")]
    NotBinary { row: usize, col: usize, value: u32 },
    #[error(transparent)]
    Field(#[from] FieldError),
    #[error("generator {index}: {source}")]
    Generator { index: usize, source: GroupError },
    #[error(transparent)]
    Roots(#[from] RootSystemError),
    #[error(transparent)]
    Graph(#[from] GraphError),
    #[error(transparent)]
    Linalg(#[from] LinalgError),
}

/// Rows of integers from a whitespace- or comma-separated table.
pub fn parse_table(text: &str) -> Result<Vec<Vec<u32>>, IngestError> {
    let mut rows: Vec<Vec<u32>> = Vec::new();
    for (index, raw) in text.lines().enumerate() {
        let line = index + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let row = trimmed
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|t| !t.is_empty())
            .map(|token| {
                token.parse::<u32>().map_err(|_| IngestError::Parse {
                    line,
                    token: token.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        if let Some(first) = rows.first()
            && first.len() != row.len()
        {
            return Err(IngestError::Ragged {
                line,
                expected: first.len(),
                found: row.len(),
            });
        }
        rows.push(row);
    }
    if rows.is_empty() {
        return Err(IngestError::Empty);
    }
    Ok(rows)
}

/// A simple graph from a square, symmetric 0/1 table with zero diagonal.
pub fn adjacency_graph(rows: &[Vec<u32>]) -> Result<Graph, IngestError> {
    let n = rows.len();
    if n == 0 {
        return Err(IngestError::Empty);
    }
    let cols = rows[0].len();
    if cols != n {
        return Err(IngestError::NotSquare { rows: n, cols });
    }
    let mut edges = Vec::new();
    for (r, row) in rows.iter().enumerate() {
        if row.len() != n {
            return Err(IngestError::Ragged {
                line: r + 1,
                expected: n,
                found: row.len(),
            });
        }
        if row[r] != 0 {
            return Err(IngestError::NonzeroDiagonal(r));
        }
        for c in (r + 1)..n {
            let value = row[c];
            if value > 1 {
                return Err(IngestError::NotBinary { row: r, col: c, value });
            }
            if rows[c][r] != value {
                return Err(IngestError::Asymmetric { row: r, col: c });
            }
            if value == 1 {
                edges.push((r, c));
            }
        }
    }
    Ok(Graph::from_edges(n, &edges)?)
}

pub fn adjacency_graph_from_str(text: &str) -> Result<Graph, IngestError> {
    adjacency_graph(&parse_table(text)?)
}

/// A matrix over `F` from a record tagged with the same field order.
pub fn matrix<F: Field>(record: &MatrixRecord) -> Result<Matrix<F>, IngestError> {
    if record.field_order != F::ORDER {
        return Err(FieldError::OrderMismatch {
            expected: F::ORDER,
            found: record.field_order,
        }
        .into());
    }
    let mut rows = Vec::with_capacity(record.rows.len());
    for (line, row) in record.rows.iter().enumerate() {
        if let Some(expected) = record.rows.first().map(Vec::len)
            && row.len() != expected
        {
            return Err(IngestError::Ragged {
                line: line + 1,
                expected,
                found: row.len(),
            });
        }
        let converted = row
            .iter()
            .map(|&v| crate::field::Fq::<F>::new(v))
            .collect::<Result<Vec<_>, _>>()?;
        rows.push(converted);
    }
    Ok(Matrix::from_rows(rows)?)
}

/// Validate every generator as a bijection of `0..degree`.
pub fn generator_group(record: &GeneratorRecord) -> Result<PermutationGroup, IngestError> {
    let mut generators = Vec::with_capacity(record.generators.len());
    for (index, images) in record.generators.iter().enumerate() {
        if images.len() != record.degree {
            return Err(IngestError::Generator {
                index,
                source: GroupError::DegreeMismatch {
                    expected: record.degree,
                    found: images.len(),
                },
            });
        }
        let p = Permutation::new(images.clone())
            .map_err(|source| IngestError::Generator { index, source })?;
        generators.push(p);
    }
    PermutationGroup::new(record.degree, generators).map_err(|source| IngestError::Generator {
        index: 0,
        source,
    })
}

pub fn root_system_graph(record: &RootSystemRecord) -> Result<RootSystemGraph, IngestError> {
    let system = RootSystem::custom(&record.name, record.denominator, record.vectors.clone())?;
    Ok(RootSystemGraph::new(system, record.rule.clone()))
}

pub fn read_json<T: DeserializeOwned>(path: &Utf8Path) -> Result<T, IngestError> {
    let text = read_text(path)?;
    Ok(serde_json::from_str(&text)?)
}

pub fn read_text(path: &Utf8Path) -> Result<String, IngestError> {
    fs::read_to_string(path).map_err(|e| IngestError::ReadError {
        path: path.to_owned(),
        source: e,
    })
}

/// A matrix file is JSON when it starts with `{`, a table otherwise.
pub fn read_matrix_record(path: &Utf8Path, field_order: u32) -> Result<MatrixRecord, IngestError> {
    let text = read_text(path)?;
    if text.trim_start().starts_with('{') {
        return Ok(serde_json::from_str(&text)?);
    }
    Ok(MatrixRecord {
        field_order,
        rows: parse_table(&text)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{Gf2, Gf3};
    use crate::roots::InnerProductRule;

    const TRIANGLE: &str = "# K3\n0 1 1\n1,0,1\n\n1, 1, 0\n";

    #[test]
    fn test_table_accepts_spaces_commas_and_comments() {
        let rows = parse_table(TRIANGLE).unwrap();
        assert_eq!(rows, vec![vec![0, 1, 1], vec![1, 0, 1], vec![1, 1, 0]]);
        let g = adjacency_graph(&rows).unwrap();
        assert_eq!(g.edge_count(), 3);
        assert_eq!(g.triangle_count(), 1);
    }

    #[test]
    fn test_table_errors_name_the_line() {
        assert!(matches!(
            parse_table("0 1\n1 x"),
            Err(IngestError::Parse { line: 2, .. })
        ));
        assert!(matches!(
            parse_table("0 1\n1 0 0"),
            Err(IngestError::Ragged { line: 2, expected: 2, found: 3 })
        ));
        assert!(matches!(parse_table("# nothing\n"), Err(IngestError::Empty)));
    }

    #[test]
    fn test_adjacency_validation() {
        let cases: [(&str, fn(&IngestError) -> bool); 4] = [
            ("0 1 0\n1 0 1", |e| matches!(e, IngestError::NotSquare { rows: 2, cols: 3 })),
            ("1 1\n1 0", |e| matches!(e, IngestError::NonzeroDiagonal(0))),
            ("0 1\n0 0", |e| matches!(e, IngestError::Asymmetric { row: 0, col: 1 })),
            ("0 2\n2 0", |e| matches!(e, IngestError::NotBinary { value: 2, .. })),
        ];
        for (text, check) in cases {
            let err = adjacency_graph_from_str(text).unwrap_err();
            assert!(check(&err), "{text}: {err}");
        }
    }

    #[test]
    fn test_matrix_record_field_checks() {
        let record = MatrixRecord {
            field_order: 3,
            rows: vec![vec![0, 2], vec![2, 0]],
        };
        assert_eq!(matrix::<Gf3>(&record).unwrap().rank(), 2);
        assert!(matches!(
            matrix::<Gf2>(&record),
            Err(IngestError::Field(FieldError::OrderMismatch { expected: 2, found: 3 }))
        ));
        let out_of_range = MatrixRecord {
            field_order: 2,
            rows: vec![vec![0, 2], vec![2, 0]],
        };
        assert!(matches!(
            matrix::<Gf2>(&out_of_range),
            Err(IngestError::Field(FieldError::OutOfRange { value: 2, order: 2 }))
        ));
    }

    #[test]
    fn test_generator_validation() {
        let good = GeneratorRecord {
            degree: 3,
            generators: vec![vec![1, 2, 0], vec![1, 0, 2]],
        };
        assert_eq!(generator_group(&good).unwrap().order(100).unwrap(), 6);
        let repeated = GeneratorRecord {
            degree: 3,
            generators: vec![vec![1, 2, 0], vec![0, 0, 2]],
        };
        assert!(matches!(
            generator_group(&repeated),
            Err(IngestError::Generator { index: 1, .. })
        ));
        let short = GeneratorRecord {
            degree: 4,
            generators: vec![vec![1, 0, 2]],
        };
        assert!(matches!(
            generator_group(&short),
            Err(IngestError::Generator { index: 0, source: GroupError::DegreeMismatch { .. } })
        ));
    }

    #[test]
    fn test_root_system_record() {
        let record = RootSystemRecord {
            name: "A2".into(),
            denominator: 1,
            vectors: vec![
                vec![1, -1, 0],
                vec![-1, 1, 0],
                vec![0, 1, -1],
                vec![0, -1, 1],
                vec![1, 0, -1],
                vec![-1, 0, 1],
            ],
            rule: InnerProductRule::Abs(1),
        };
        let graph = root_system_graph(&record).unwrap();
        assert_eq!(graph.graph.regular_degree(), Some(4));
        let broken = RootSystemRecord {
            vectors: record.vectors[..5].to_vec(),
            ..record
        };
        assert!(matches!(
            root_system_graph(&broken),
            Err(IngestError::Roots(RootSystemError::NotClosedUnderNegation(_)))
        ));
    }
}
