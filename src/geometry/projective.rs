//! Projective points over F and lines spanned by orthogonal pairs.

use super::{ConstructionError, Coordinates};
use crate::field::{Field, Fq};
use std::collections::{BTreeSet, HashMap};

pub(super) type Vector<F> = Vec<Fq<F>>;

/// Scale so the first nonzero coordinate is 1. Zero stays zero.
pub(super) fn normalize<F: Field>(v: &[Fq<F>]) -> Vector<F> {
    match v.iter().find(|x| !x.is_zero()).map(|x| x.inv()) {
        Some(Ok(inv)) => v.iter().map(|&x| x * inv).collect(),
        _ => v.to_vec(),
    }
}

/// Canonical representatives of PG(dim-1, q), in lexicographic raw order.
pub(super) fn points<F: Field>(dim: usize) -> Vec<Vector<F>> {
    let q = F::ORDER as usize;
    let total = q.pow(dim as u32);
    (1..total)
        .map(|mut index| {
            let mut v = vec![Fq::ZERO; dim];
            for slot in v.iter_mut().rev() {
                *slot = Fq::from_raw((index % q) as u8);
                index /= q;
            }
            v
        })
        .filter(|v| v.iter().find(|x| !x.is_zero()).is_some_and(|x| x.is_one()))
        .collect()
}

/// Lines spanned by the `orthogonal` pairs of `points`.
///
/// For each such pair p, r the projective line {r} ∪ {p + c·r} is formed.
/// Fails if a point of some line is missing from `points`, which means the
/// pairs do not span totally isotropic lines.
pub(super) fn spanned_lines<F: Field>(
    points: &[Vector<F>],
    orthogonal: impl Fn(&[Fq<F>], &[Fq<F>]) -> bool,
) -> Result<Vec<Vec<usize>>, ConstructionError> {
    let index: HashMap<&[Fq<F>], usize> = points
        .iter()
        .enumerate()
        .map(|(i, p)| (p.as_slice(), i))
        .collect();
    let n = points.len();
    let mut joined = vec![false; n * n];
    let mut lines = BTreeSet::new();
    for a in 0..n {
        for b in (a + 1)..n {
            if joined[a * n + b] || !orthogonal(&points[a], &points[b]) {
                continue;
            }
            let mut line = vec![b];
            for c in Fq::<F>::elements() {
                let v: Vector<F> = points[a]
                    .iter()
                    .zip(&points[b])
                    .map(|(&x, &y)| x + c * y)
                    .collect();
                let Some(&i) = index.get(normalize(&v).as_slice()) else {
                    return Err(ConstructionError::MalformedLine {
                        line: lines.len(),
                        detail: format!("span of points {a} and {b} leaves the point set"),
                    });
                };
                line.push(i);
            }
            line.sort_unstable();
            line.dedup();
            for &x in &line {
                for &y in &line {
                    joined[x * n + y] = true;
                }
            }
            lines.insert(line);
        }
    }
    Ok(lines.into_iter().collect())
}

pub(super) fn coordinates<F: Field>(points: &[Vector<F>]) -> Coordinates {
    Coordinates {
        field_order: F::ORDER,
        points: points
            .iter()
            .map(|p| p.iter().map(|x| x.raw()).collect())
            .collect(),
    }
}

/// Lookup from canonical point to index.
pub(super) fn point_index<F: Field>(points: &[Vector<F>]) -> HashMap<Vector<F>, usize> {
    points
        .iter()
        .enumerate()
        .map(|(i, p)| (p.clone(), i))
        .collect()
}
