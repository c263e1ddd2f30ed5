//! Invariant records: the kernel's interchange format.
//!
//! Every record names the field order or tolerance it was computed with.
//! Collections are ordered (vectors or `BTreeMap`), never hashed, and no
//! record carries a timestamp, so equal inputs serialize to equal bytes.

use crate::correspond::CorrespondenceReport;
use crate::graph::{Graph, SrgVerdict, Spectrum};
use crate::geometry::IncidenceStructure;
use crate::group::{AutomorphismGroup, ExhaustedBy};
use crate::linalg::{CohomologyComparison, CohomologyResult};
use crate::roots::InnerProductRule;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Everything one pipeline run establishes about a geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineReport {
    pub format_version: u32,
    pub geometry: GeometryRecord,
    pub graph: GraphRecord,
    pub spectrum: SpectrumRecord,
    pub srg: SrgRecord,
    pub codes: Vec<CodeRecord>,
    pub cohomology: CohomologyRecord,
    pub group: GroupRecord,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correspondence: Option<CorrespondenceReport>,
}

impl PipelineReport {
    pub const CURRENT_VERSION: u32 = 1;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeometryRecord {
    pub name: String,
    pub s: usize,
    pub t: usize,
    pub points: usize,
    pub lines: usize,
    /// Field the points have coordinates over; absent for grids.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_order: Option<u32>,
}

impl GeometryRecord {
    pub fn of(geometry: &IncidenceStructure) -> Self {
        let (s, t) = geometry.parameters();
        Self {
            name: geometry.name().to_string(),
            s,
            t,
            points: geometry.point_count(),
            lines: geometry.line_count(),
            field_order: geometry.coordinates().map(|c| c.field_order),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphRecord {
    pub order: usize,
    pub edges: usize,
    pub degree_set: Vec<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regular_degree: Option<usize>,
    pub components: usize,
    pub triangles: u64,
    /// Number of cliques with 1, 2, ... vertices.
    pub clique_counts: Vec<usize>,
}

impl GraphRecord {
    pub fn of(graph: &Graph, max_clique: usize) -> Self {
        Self {
            order: graph.order(),
            edges: graph.edge_count(),
            degree_set: graph.degree_set().into_iter().collect(),
            regular_degree: graph.regular_degree(),
            components: graph.components().len(),
            triangles: graph.triangle_count(),
            clique_counts: graph.clique_counts(max_clique),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpectrumRecord {
    pub tolerance: f64,
    /// Compact form, e.g. `{12^1, 2^24, -4^15}`.
    pub display: String,
    pub integral: bool,
    pub spectrum: Spectrum,
}

impl SpectrumRecord {
    pub fn of(spectrum: &Spectrum) -> Self {
        Self {
            tolerance: spectrum.tolerance,
            display: spectrum.to_string(),
            integral: spectrum.is_integral(),
            spectrum: spectrum.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SrgRecord {
    pub tolerance: f64,
    pub verdict: SrgVerdict,
}

/// A weight distribution, or why there isn't one.
///
/// Externally tagged: the integer-keyed distribution cannot be read back
/// through an internal tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightRecord {
    Complete {
        distribution: BTreeMap<usize, u64>,
        minimum_weight: Option<usize>,
    },
    OverBudget {
        codewords: Option<u64>,
        budget: u64,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeRecord {
    pub field_order: u32,
    pub length: usize,
    pub adjacency_rank: usize,
    /// Whether A² vanishes over this field.
    pub square_vanishes: bool,
    pub kernel_dimension: usize,
    pub self_orthogonal: bool,
    pub weights: WeightRecord,
    /// A minimum-weight claim that was checked against the enumeration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verified_claim: Option<(usize, Option<u64>)>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CohomologyRecord {
    pub f_vector: Vec<usize>,
    pub euler_characteristic: i64,
    pub results: Vec<CohomologyResult>,
    pub comparison: CohomologyComparison,
}

/// Where the independent group order came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClosureSource {
    /// Collineations of the standard symplectic form.
    Collineations,
    /// The search's own generators, closed breadth-first.
    SearchGenerators,
}

/// Externally tagged: internally tagged enums cannot read back `u128`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupRecord {
    Complete {
        order: u128,
        base: Vec<usize>,
        orbit_lengths: Vec<usize>,
        generators: usize,
        nodes: u64,
        closure_order: u128,
        closure_source: ClosureSource,
        /// Sizes of the point orbits, largest first.
        point_orbits: Vec<usize>,
        stabilizer_order: u128,
    },
    Exhausted {
        by: ExhaustedBy,
        nodes: u64,
    },
}

impl GroupRecord {
    pub fn order(&self) -> Option<u128> {
        match self {
            Self::Complete { order, .. } => Some(*order),
            Self::Exhausted { .. } => None,
        }
    }
}

/// Permutations of `0..degree`, as image lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorRecord {
    pub degree: usize,
    pub generators: Vec<Vec<usize>>,
}

impl From<&AutomorphismGroup> for GeneratorRecord {
    fn from(group: &AutomorphismGroup) -> Self {
        Self {
            degree: group.degree,
            generators: group.generators.iter().map(|g| g.images().to_vec()).collect(),
        }
    }
}

/// A square matrix of raw field values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatrixRecord {
    #[serde(default = "MatrixRecord::default_field")]
    pub field_order: u32,
    pub rows: Vec<Vec<u32>>,
}

impl MatrixRecord {
    fn default_field() -> u32 {
        2
    }
}

/// Integer root vectors over a common denominator, with an adjacency rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootSystemRecord {
    pub name: String,
    #[serde(default = "RootSystemRecord::default_denominator")]
    pub denominator: i64,
    pub vectors: Vec<Vec<i64>>,
    pub rule: InnerProductRule,
}

impl RootSystemRecord {
    fn default_denominator() -> i64 {
        1
    }
}
