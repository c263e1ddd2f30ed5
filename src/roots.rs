//! Reference root systems and their inner-product graphs.
//!
//! Roots are integer vectors over a common denominator d, so the actual root
//! is `v / d` and exact inner products are `dot / d²`. E8 uses d = 2 so the
//! half-integer roots stay integral; its ADE subsystems are cut out of it:
//! E7 is the set of roots orthogonal to θ = e1 + e2, and E6 is the set
//! orthogonal to both θ and φ = −e1 + e3, which together span an A2.

use crate::graph::Graph;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RootSystemError {
    #[error("{family}{rank} is not a supported root system")]
    InvalidRank { family: char, rank: usize },
    #[error("unknown root system name {0:?}")]
    UnknownName(String),
    #[error("root system has no roots")]
    Empty,
    #[error("denominator must be positive")]
    Denominator,
    #[error("root {index} has {found} coordinates, expected {expected}")]
    DimensionMismatch {
        index: usize,
        expected: usize,
        found: usize,
    },
    #[error("root {0} is zero")]
    ZeroVector(usize),
    #[error("root {0} is repeated")]
    Duplicate(usize),
    #[error("the negative of root {0} is missing")]
    NotClosedUnderNegation(usize),
    #[error("2(α,β)/(β,β) is not an integer for roots {alpha} and {beta}")]
    NotCrystallographic { alpha: usize, beta: usize },
    #[error("reflecting root {root} in root {mirror} leaves the system")]
    NotClosedUnderReflection { root: usize, mirror: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootSystem {
    name: String,
    denominator: i64,
    roots: Vec<Vec<i64>>,
}

/// Which inner products make two roots adjacent. Values are in the units of
/// the actual (undivided) roots and must be integers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InnerProductRule {
    /// |⟨α, β⟩| = k
    Abs(i64),
    /// ⟨α, β⟩ ∈ the listed values
    AnyOf(Vec<i64>),
}

impl InnerProductRule {
    fn admits(&self, dot: i64, scale: i64) -> bool {
        match self {
            Self::Abs(k) => dot.abs() == k * scale,
            Self::AnyOf(values) => values.iter().any(|k| dot == k * scale),
        }
    }
}

impl fmt::Display for InnerProductRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Abs(k) => write!(f, "|<a,b>| = {k}"),
            Self::AnyOf(values) => write!(f, "<a,b> in {values:?}"),
        }
    }
}

fn dot(a: &[i64], b: &[i64]) -> i64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn unit(dim: usize, i: usize, scale: i64) -> Vec<i64> {
    let mut v = vec![0; dim];
    v[i] = scale;
    v
}

/// ±s·e_i ± s·e_j for i < j.
fn d_type(n: usize, scale: i64) -> Vec<Vec<i64>> {
    let mut roots = Vec::new();
    for i in 0..n {
        for j in (i + 1)..n {
            for si in [1, -1] {
                for sj in [1, -1] {
                    let mut v = vec![0; n];
                    v[i] = si * scale;
                    v[j] = sj * scale;
                    roots.push(v);
                }
            }
        }
    }
    roots
}

impl RootSystem {
    /// A_n: e_i − e_j in R^(n+1).
    pub fn a(n: usize) -> Result<Self, RootSystemError> {
        if n == 0 {
            return Err(RootSystemError::InvalidRank { family: 'A', rank: n });
        }
        let dim = n + 1;
        let mut roots = Vec::new();
        for i in 0..dim {
            for j in 0..dim {
                if i != j {
                    let mut v = unit(dim, i, 1);
                    v[j] = -1;
                    roots.push(v);
                }
            }
        }
        Ok(Self::sorted(format!("A{n}"), 1, roots))
    }

    /// D_n: ±e_i ± e_j in R^n.
    pub fn d(n: usize) -> Result<Self, RootSystemError> {
        if n < 2 {
            return Err(RootSystemError::InvalidRank { family: 'D', rank: n });
        }
        Ok(Self::sorted(format!("D{n}"), 1, d_type(n, 1)))
    }

    /// E8 in doubled coordinates: ±2e_i ± 2e_j and (±1, …, ±1) with an even
    /// number of minus signs.
    pub fn e8() -> Self {
        let mut roots = d_type(8, 2);
        for mask in 0u32..256 {
            if mask.count_ones() % 2 == 0 {
                roots.push((0..8).map(|i| if mask & (1 << i) != 0 { -1 } else { 1 }).collect());
            }
        }
        Self::sorted("E8".into(), 2, roots)
    }

    pub fn e7() -> Self {
        let theta = [2, 2, 0, 0, 0, 0, 0, 0];
        let roots = Self::e8()
            .roots
            .into_iter()
            .filter(|r| dot(r, &theta) == 0)
            .collect();
        Self::sorted("E7".into(), 2, roots)
    }

    pub fn e6() -> Self {
        let theta = [2, 2, 0, 0, 0, 0, 0, 0];
        let phi = [-2, 0, 2, 0, 0, 0, 0, 0];
        let roots = Self::e8()
            .roots
            .into_iter()
            .filter(|r| dot(r, &theta) == 0 && dot(r, &phi) == 0)
            .collect();
        Self::sorted("E6".into(), 2, roots)
    }

    /// Parse names like `A3`, `D4`, `E8`.
    pub fn by_name(name: &str) -> Result<Self, RootSystemError> {
        let unknown = || RootSystemError::UnknownName(name.to_string());
        let mut chars = name.trim().chars();
        let family = chars.next().ok_or_else(unknown)?.to_ascii_uppercase();
        let rank: usize = chars.as_str().parse().map_err(|_| unknown())?;
        match (family, rank) {
            ('A', n) => Self::a(n),
            ('D', n) => Self::d(n),
            ('E', 6) => Ok(Self::e6()),
            ('E', 7) => Ok(Self::e7()),
            ('E', 8) => Ok(Self::e8()),
            ('E', n) => Err(RootSystemError::InvalidRank { family: 'E', rank: n }),
            _ => Err(unknown()),
        }
    }

    /// Validate a user-supplied system: equal dimensions, no zero or repeated
    /// roots, closed under negation and reflections, and crystallographic.
    pub fn custom(
        name: impl Into<String>,
        denominator: i64,
        roots: Vec<Vec<i64>>,
    ) -> Result<Self, RootSystemError> {
        if denominator <= 0 {
            return Err(RootSystemError::Denominator);
        }
        let Some(dim) = roots.first().map(Vec::len) else {
            return Err(RootSystemError::Empty);
        };
        let mut seen = HashSet::new();
        for (index, r) in roots.iter().enumerate() {
            if r.len() != dim {
                return Err(RootSystemError::DimensionMismatch {
                    index,
                    expected: dim,
                    found: r.len(),
                });
            }
            if r.iter().all(|&x| x == 0) {
                return Err(RootSystemError::ZeroVector(index));
            }
            if !seen.insert(r.as_slice()) {
                return Err(RootSystemError::Duplicate(index));
            }
        }
        for (index, r) in roots.iter().enumerate() {
            let neg: Vec<i64> = r.iter().map(|x| -x).collect();
            if !seen.contains(neg.as_slice()) {
                return Err(RootSystemError::NotClosedUnderNegation(index));
            }
        }
        for (alpha, a) in roots.iter().enumerate() {
            for (beta, b) in roots.iter().enumerate() {
                let (ab, bb) = (dot(a, b), dot(b, b));
                if (2 * ab) % bb != 0 {
                    return Err(RootSystemError::NotCrystallographic { alpha, beta });
                }
                let k = 2 * ab / bb;
                let reflected: Vec<i64> = a.iter().zip(b).map(|(x, y)| x - k * y).collect();
                if !seen.contains(reflected.as_slice()) {
                    return Err(RootSystemError::NotClosedUnderReflection {
                        root: alpha,
                        mirror: beta,
                    });
                }
            }
        }
        Ok(Self {
            name: name.into(),
            denominator,
            roots,
        })
    }

    fn sorted(name: String, denominator: i64, mut roots: Vec<Vec<i64>>) -> Self {
        roots.sort();
        Self {
            name,
            denominator,
            roots,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.roots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    pub fn denominator(&self) -> i64 {
        self.denominator
    }

    pub fn roots(&self) -> &[Vec<i64>] {
        &self.roots
    }

    pub fn dimension(&self) -> usize {
        self.roots.first().map_or(0, Vec::len)
    }

    /// ⟨α_i, α_j⟩ scaled by d², exact.
    pub fn scaled_inner_product(&self, i: usize, j: usize) -> i64 {
        dot(&self.roots[i], &self.roots[j])
    }
}

/// Roots as vertices, adjacent when their inner product satisfies a rule.
#[derive(Debug, Clone)]
pub struct RootSystemGraph {
    pub system: RootSystem,
    pub rule: InnerProductRule,
    pub graph: Graph,
}

impl RootSystemGraph {
    pub fn new(system: RootSystem, rule: InnerProductRule) -> Self {
        let n = system.len();
        let scale = system.denominator * system.denominator;
        let mut neighbors = vec![Vec::new(); n];
        for i in 0..n {
            for j in (i + 1)..n {
                if rule.admits(system.scaled_inner_product(i, j), scale) {
                    neighbors[i].push(j);
                    neighbors[j].push(i);
                }
            }
        }
        let graph = Graph::from_neighbors(neighbors);
        Self {
            system,
            rule,
            graph,
        }
    }

    pub fn label(&self) -> String {
        format!("{} ({})", self.system.name, self.rule)
    }
}
