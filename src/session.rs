//! An immutable analysis session and the full invariant pipeline.
//!
//! A [`Session`] is built once from a [`SessionConfig`]: the geometry, its
//! collinearity graph and, for Q(4,q) and the standard W(q) form, an
//! independent set of collineation generators. Every stage reads from it and
//! nothing writes back, so running the pipeline twice gives the same report.

use crate::cache::{CacheKey, RecordCache};
use crate::config::{CacheConfig, ConfigError, Family, GeometryConfig, SessionConfig, WeightClaim};
use crate::correspond::{CorrespondenceReport, Target, search};
use crate::error::KernelResult;
use crate::field::Field;
use crate::geometry::{IncidenceStructure, ParabolicQuadric, SymplecticSpace};
use crate::graph::{Graph, Spectrum};
use crate::group::{AutomorphismOutcome, PermutationGroup, automorphisms, cross_check_order};
use crate::linalg::{LinearCode, Matrix, SimplicialComplex, WeightEnumeration, cross_check};
use crate::roots::{RootSystem, RootSystemGraph};
use crate::schema::{
    ClosureSource, CodeRecord, CohomologyRecord, GeometryRecord, GraphRecord, GroupRecord,
    PipelineReport, SpectrumRecord, SrgRecord, WeightRecord,
};
use std::time::Instant;
use tracing::{info, warn};

/// Largest clique size counted in graph records.
const MAX_CLIQUE: usize = 4;

pub struct Session {
    config: SessionConfig,
    geometry: IncidenceStructure,
    graph: Graph,
    /// Point permutations of independently known collineations.
    collineations: Option<Vec<Vec<usize>>>,
}

type Built = (IncidenceStructure, Option<Vec<Vec<usize>>>);

fn symplectic<F: Field>(gram: Option<&[Vec<u32>]>) -> KernelResult<Built> {
    let space = match gram {
        Some(rows) => SymplecticSpace::new(Matrix::<F>::from_raw_rows(rows)?)?,
        None => SymplecticSpace::<F>::standard(),
    };
    Ok((space.build()?, space.collineation_permutations()))
}

fn parabolic<F: Field>() -> KernelResult<Built> {
    let quadric = ParabolicQuadric::<F>::standard();
    Ok((quadric.build()?, quadric.collineation_permutations()))
}

fn build_geometry(config: &GeometryConfig) -> KernelResult<Built> {
    match config.family {
        Family::Symplectic => {
            crate::with_field!(config.order, F => symplectic::<F>(config.gram.as_deref()))
        }
        Family::Parabolic => crate::with_field!(config.order, F => parabolic::<F>()),
        Family::Grid => Ok((IncidenceStructure::grid(config.order as usize)?, None)),
        Family::DualGrid => Ok((IncidenceStructure::dual_grid(config.order as usize)?, None)),
    }
}

fn weight_record(enumeration: &WeightEnumeration) -> WeightRecord {
    match enumeration {
        WeightEnumeration::Complete { distribution } => WeightRecord::Complete {
            distribution: distribution.clone(),
            minimum_weight: enumeration.minimum_weight(),
        },
        WeightEnumeration::OverBudget { codewords, budget } => WeightRecord::OverBudget {
            codewords: *codewords,
            budget: *budget,
        },
    }
}

/// Kernel code of a square adjacency matrix, with its weight distribution
/// and an optional minimum-weight claim checked against it.
pub fn code_record<F: Field>(
    adjacency: &Matrix<F>,
    claim: Option<&WeightClaim>,
    budget: u64,
) -> KernelResult<CodeRecord> {
    let square_vanishes = adjacency.mul(adjacency)?.is_zero();
    let code = LinearCode::kernel_code(adjacency);
    let (enumeration, verified_claim) = match claim {
        Some(c) => {
            let enumeration = code.verify_minimum_weight(c.weight, c.count, budget)?;
            let verified = enumeration.is_complete().then_some((c.weight, c.count));
            (enumeration, verified)
        }
        None => (code.weight_distribution(budget), None),
    };
    let adjacency_rank = adjacency.rank();
    info!(
        field = F::ORDER,
        rank = adjacency_rank,
        kernel = code.dimension(),
        complete = enumeration.is_complete(),
        "kernel code computed"
    );
    Ok(CodeRecord {
        field_order: F::ORDER,
        length: code.length(),
        adjacency_rank,
        square_vanishes,
        kernel_dimension: code.dimension(),
        self_orthogonal: code.is_self_orthogonal(),
        weights: weight_record(&enumeration),
        verified_claim,
    })
}

impl Session {
    pub fn new(config: SessionConfig) -> KernelResult<Self> {
        config.validate()?;
        let started = Instant::now();
        let (geometry, collineations) = build_geometry(&config.geometry)?;
        let graph = Graph::collinearity(&geometry);
        info!(
            geometry = geometry.name(),
            points = geometry.point_count(),
            lines = geometry.line_count(),
            edges = graph.edge_count(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "geometry built"
        );
        Ok(Self {
            config,
            geometry,
            graph,
            collineations,
        })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn geometry(&self) -> &IncidenceStructure {
        &self.geometry
    }

    /// The collinearity graph.
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn spectrum(&self) -> Spectrum {
        Spectrum::compute(&self.graph, self.config.spectrum.tolerance)
    }

    pub fn srg(&self, spectrum: &Spectrum) -> SrgRecord {
        SrgRecord {
            tolerance: spectrum.tolerance,
            verdict: self.graph.srg_verdict(spectrum),
        }
    }

    fn code_over<F: Field>(&self, claim: Option<&WeightClaim>) -> KernelResult<CodeRecord> {
        let adjacency = self.graph.adjacency_matrix::<F>();
        code_record(&adjacency, claim, self.config.code.enumeration_budget)
    }

    /// Kernel codes of the adjacency matrix over each configured field.
    pub fn codes(&self) -> KernelResult<Vec<CodeRecord>> {
        self.config
            .code
            .fields
            .iter()
            .map(|&q| {
                let claim = self.config.code.claims.iter().find(|c| c.field == q);
                crate::with_field!(q, F => self.code_over::<F>(claim))
            })
            .collect()
    }

    /// Clique-complex cohomology over every configured field; any
    /// field-dependent dimension is fatal.
    pub fn cohomology(&self) -> KernelResult<CohomologyRecord> {
        let complex = SimplicialComplex::clique_complex(&self.graph, self.config.cohomology.max_dimension);
        let results = self
            .config
            .cohomology
            .fields
            .iter()
            .map(|&q| crate::with_field!(q, F => complex.cohomology::<F>()))
            .collect::<KernelResult<Vec<_>>>()?;
        let [first, second, rest @ ..] = results.as_slice() else {
            return Err(ConfigError::Invalid {
                field: "cohomology.fields",
                reason: "need two fields to cross-check".into(),
            }
            .into());
        };
        let comparison = cross_check(first, second)?;
        for other in rest {
            cross_check(first, other)?;
        }
        info!(
            f_vector = ?complex.f_vector(),
            cohomology = ?first.cohomology,
            "cohomology agrees across fields"
        );
        Ok(CohomologyRecord {
            f_vector: complex.f_vector(),
            euler_characteristic: complex.euler_characteristic(),
            results,
            comparison,
        })
    }

    /// Automorphism search, cross-checked against an independent closure
    /// and the orbit-stabilizer relation.
    pub fn group(&self) -> KernelResult<GroupRecord> {
        let automorphism = &self.config.automorphism;
        let outcome = automorphisms(&self.graph, None, automorphism.budget())?;
        let found = match &outcome {
            AutomorphismOutcome::Complete(group) => group,
            AutomorphismOutcome::Exhausted { by, nodes } => {
                warn!(?by, nodes, "automorphism search exhausted, skipping group checks");
                return Ok(GroupRecord::Exhausted {
                    by: *by,
                    nodes: *nodes,
                });
            }
        };

        let n = self.graph.order();
        let (independent, closure_source) = match &self.collineations {
            Some(images) => (
                PermutationGroup::from_images(n, images.clone())?,
                ClosureSource::Collineations,
            ),
            None => (
                PermutationGroup::new(n, found.generators.clone())?,
                ClosureSource::SearchGenerators,
            ),
        };
        let limit = automorphism.closure_limit;
        let closure_order = cross_check_order(found, &independent, limit)?;

        let mut point_orbits: Vec<usize> = independent.orbits().iter().map(Vec::len).collect();
        point_orbits.sort_unstable_by(|a, b| b.cmp(a));
        let stabilizer_order = if n == 0 {
            closure_order
        } else {
            independent.check_orbit_stabilizer(0, limit)?;
            closure_order / independent.orbit(0)?.len() as u128
        };
        info!(
            order = %found.order,
            closure = ?closure_source,
            stabilizer = %stabilizer_order,
            "automorphism group cross-checked"
        );
        Ok(GroupRecord::Complete {
            order: found.order,
            base: found.base.clone(),
            orbit_lengths: found.orbit_lengths.clone(),
            generators: found.generators.len(),
            nodes: found.nodes,
            closure_order,
            closure_source,
            point_orbits,
            stabilizer_order,
        })
    }

    /// Search the collinearity graph's edges against the configured root
    /// systems, or `None` when the search is disabled.
    pub fn correspondence(&self) -> KernelResult<Option<CorrespondenceReport>> {
        let search_config = &self.config.search;
        if !search_config.enabled || search_config.targets.is_empty() {
            return Ok(None);
        }
        let options = self.config.search_options();
        let targets = search_config
            .targets
            .iter()
            .map(|t| {
                let system = RootSystem::by_name(&t.system)?;
                let roots = RootSystemGraph::new(system, t.rule.clone());
                Ok(Target::from_roots(&roots, options.tolerance))
            })
            .collect::<KernelResult<Vec<_>>>()?;
        Ok(Some(search(self.geometry.name(), &self.graph, &targets, &options)))
    }

    /// Run every stage, on a dedicated pool when `search.threads` is set.
    pub fn pipeline(&self) -> KernelResult<PipelineReport> {
        match self.config.search.threads {
            0 => self.run_pipeline(),
            threads => {
                let pool = rayon::ThreadPoolBuilder::new().num_threads(threads).build()?;
                pool.install(|| self.run_pipeline())
            }
        }
    }

    /// [`Self::pipeline`], memoised by configuration in `cache`.
    pub fn pipeline_cached(&self, cache: &RecordCache) -> KernelResult<PipelineReport> {
        let mut input = self.config.clone();
        input.cache = CacheConfig::default();
        input.search.threads = 0;
        let operation = concat!("pipeline@", env!("CARGO_PKG_VERSION"));
        let key = CacheKey::new(operation, self.field_order(), &input)?;
        cache.get_or_compute(&key, || self.pipeline())
    }

    pub fn field_order(&self) -> Option<u32> {
        self.geometry.coordinates().map(|c| c.field_order)
    }

    fn run_pipeline(&self) -> KernelResult<PipelineReport> {
        let started = Instant::now();
        let geometry = GeometryRecord::of(&self.geometry);
        let graph = GraphRecord::of(&self.graph, MAX_CLIQUE);
        let spectrum = self.spectrum();
        info!(spectrum = %spectrum, "spectrum computed");
        let srg = self.srg(&spectrum);
        let codes = self.codes()?;
        let cohomology = self.cohomology()?;
        let group = self.group()?;
        let correspondence = self.correspondence()?;
        info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            "pipeline finished"
        );
        Ok(PipelineReport {
            format_version: PipelineReport::CURRENT_VERSION,
            geometry,
            graph,
            spectrum: SpectrumRecord::of(&spectrum),
            srg,
            codes,
            cohomology,
            group,
            correspondence,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RootTarget;
    use crate::error::KernelError;
    use crate::roots::InnerProductRule;

    fn w2_config() -> SessionConfig {
        let mut config = SessionConfig::default();
        config.geometry.order = 2;
        config.search.targets = vec![RootTarget {
            system: "A2".into(),
            rule: InnerProductRule::Abs(1),
        }];
        config
    }

    #[test]
    fn test_w2_pipeline() {
        let session = Session::new(w2_config()).unwrap();
        let report = session.pipeline().unwrap();
        assert_eq!(report.geometry.points, 15);
        assert_eq!(report.graph.regular_degree, Some(6));
        assert_eq!(report.srg.verdict.parameters().map(|p| (p.v, p.k, p.lambda, p.mu)), Some((15, 6, 1, 3)));
        assert_eq!(report.cohomology.f_vector, vec![15, 45, 15]);
        assert_eq!(report.cohomology.results[0].cohomology, vec![1, 16, 0]);
        assert_eq!(report.group.order(), Some(720));
        match &report.group {
            GroupRecord::Complete { closure_source, point_orbits, stabilizer_order, .. } => {
                assert_eq!(*closure_source, ClosureSource::Collineations);
                assert_eq!(point_orbits, &vec![15]);
                assert_eq!(*stabilizer_order, 48);
            }
            other => panic!("unexpected {other:?}"),
        }
        let correspondence = report.correspondence.unwrap();
        assert_eq!(correspondence.edges, 45);
        assert_eq!(correspondence.verdict, crate::correspond::Verdict::NoCorrespondence);
    }

    #[test]
    fn test_grid_uses_search_generators() {
        let mut config = SessionConfig::default();
        config.geometry.family = Family::Grid;
        config.geometry.order = 2;
        config.search.enabled = false;
        let session = Session::new(config).unwrap();
        assert_eq!(session.field_order(), None);
        match session.group().unwrap() {
            GroupRecord::Complete { order, closure_source, .. } => {
                // (3!)² · 2 for the 3×3 rook graph
                assert_eq!(order, 72);
                assert_eq!(closure_source, ClosureSource::SearchGenerators);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(session.correspondence().unwrap().is_none());
    }

    #[test]
    fn test_parabolic_uses_collineations() {
        let mut config = SessionConfig::default();
        config.geometry.family = Family::Parabolic;
        config.geometry.order = 2;
        config.search.enabled = false;
        let session = Session::new(config).unwrap();
        match session.group().unwrap() {
            GroupRecord::Complete { order, closure_order, closure_source, stabilizer_order, .. } => {
                assert_eq!(order, 720);
                assert_eq!(closure_order, 720);
                assert_eq!(closure_source, ClosureSource::Collineations);
                assert_eq!(stabilizer_order, 48);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_exhausted_budget_is_recorded() {
        let mut config = w2_config();
        config.automorphism.max_nodes = 2;
        let session = Session::new(config).unwrap();
        assert!(matches!(session.group().unwrap(), GroupRecord::Exhausted { .. }));
    }

    #[test]
    fn test_degenerate_gram_is_rejected() {
        let mut config = w2_config();
        config.geometry.gram = Some(vec![vec![0; 4]; 4]);
        assert!(matches!(Session::new(config), Err(KernelError::Construction(_))));
    }
}
