//! Crate-wide error taxonomy.
//!
//! Each stage owns its own error enum; [`KernelError`] aggregates them for
//! callers that drive the whole pipeline. [`InconsistencyError`] is special:
//! it means two computations of the same fact disagreed, and is always fatal.

use crate::cache::CacheError;
use crate::config::ConfigError;
use crate::field::FieldError;
use crate::geometry::ConstructionError;
use crate::graph::GraphError;
use crate::group::{CheckError, GroupError};
use crate::ingest::IngestError;
use crate::linalg::LinalgError;
use crate::roots::RootSystemError;
use thiserror::Error;

/// Two independent computations of one invariant disagree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InconsistencyError {
    #[error("boundary maps are not a chain complex: ∂{lower}∘∂{upper} has {nonzero} nonzero entries")]
    ChainComplex {
        lower: usize,
        upper: usize,
        nonzero: usize,
    },
    #[error("automorphism group order mismatch: search found {search}, generator closure found {closure}")]
    GroupOrderMismatch { search: u128, closure: u128 },
    #[error(
        "degree {degree} dimension depends on the field: {first_field} gives {first}, {second_field} gives {second}"
    )]
    FieldDependentDimension {
        degree: usize,
        first_field: String,
        first: usize,
        second_field: String,
        second: usize,
    },
    #[error("orbit-stabilizer fails at point {point}: {orbit} x {stabilizer} != {order}")]
    OrbitStabilizer {
        point: usize,
        orbit: usize,
        stabilizer: u128,
        order: u128,
    },
    #[error("code dimension mismatch: declared {declared}, generator rank {computed}")]
    CodeDimension { declared: usize, computed: usize },
    #[error("minimum weight mismatch: claimed {claimed}, enumeration found {found:?}")]
    MinimumWeight { claimed: usize, found: Option<usize> },
    #[error("minimum weight {weight}: claimed {claimed} codewords, enumeration found {found}")]
    MinimumWeightCount {
        weight: usize,
        claimed: u64,
        found: u64,
    },
}

#[derive(Debug, Error)]
pub enum KernelError {
    #[error("construction failed: {0}")]
    Construction(#[from] ConstructionError),
    #[error("field error: {0}")]
    Field(#[from] FieldError),
    #[error("linear algebra error: {0}")]
    Linalg(#[from] LinalgError),
    #[error("graph error: {0}")]
    Graph(#[from] GraphError),
    #[error("group error: {0}")]
    Group(#[from] GroupError),
    #[error("root system error: {0}")]
    Roots(#[from] RootSystemError),
    #[error("inconsistency: {0}")]
    Inconsistency(#[from] InconsistencyError),
    #[error("ingest error: {0}")]
    Ingest(#[from] IngestError),
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("cache error: {0}")]
    Cache(#[from] CacheError),
    #[error("thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl From<CheckError> for KernelError {
    fn from(err: CheckError) -> Self {
        match err {
            CheckError::Group(e) => e.into(),
            CheckError::Inconsistent(e) => e.into(),
        }
    }
}

pub type KernelResult<T> = Result<T, KernelError>;
