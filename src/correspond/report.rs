//! Signature comparison and the final verdict.

use super::{Candidate, RelationClass, classify, combine};
use crate::graph::{Graph, Spectrum};
use crate::roots::RootSystemGraph;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

/// When candidate spectra are computed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpectrumPolicy {
    /// Every regular candidate.
    #[default]
    Always,
    /// Only candidates whose order and degree match some target.
    OnDegreeMatch,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchOptions {
    pub max_subsets: u64,
    pub spectrum: SpectrumPolicy,
    pub tolerance: f64,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            max_subsets: 1 << 16,
            spectrum: SpectrumPolicy::Always,
            tolerance: crate::graph::DEFAULT_TOLERANCE,
        }
    }
}

/// A graph to compare candidates against, with its signature.
#[derive(Debug, Clone)]
pub struct Target {
    pub label: String,
    pub graph: Graph,
    pub degree: Option<usize>,
    pub triangles: u64,
    pub spectrum: Spectrum,
}

impl Target {
    pub fn new(label: impl Into<String>, graph: Graph, tolerance: f64) -> Self {
        let spectrum = Spectrum::compute(&graph, tolerance);
        Self {
            label: label.into(),
            degree: graph.regular_degree(),
            triangles: graph.triangle_count(),
            spectrum,
            graph,
        }
    }

    pub fn from_roots(roots: &RootSystemGraph, tolerance: f64) -> Self {
        Self::new(roots.label(), roots.graph.clone(), tolerance)
    }

    fn summary(&self) -> TargetSummary {
        TargetSummary {
            label: self.label.clone(),
            order: self.graph.order(),
            degree: self.degree,
            triangles: self.triangles,
            spectrum: self.spectrum.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetSummary {
    pub label: String,
    pub order: usize,
    pub degree: Option<usize>,
    pub triangles: u64,
    pub spectrum: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassCount {
    pub class: RelationClass,
    pub pairs: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateSummary {
    pub mask: u64,
    pub classes: Vec<RelationClass>,
    pub degree: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spectrum: Option<String>,
}

/// Same order, degree and spectrum as a target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub classes: Vec<RelationClass>,
    pub target: String,
    pub spectrum: String,
}

/// Same order and degree as a target but a different spectrum. Not a match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NearMatch {
    pub classes: Vec<RelationClass>,
    pub target: String,
    pub degree: usize,
    pub triangles: u64,
    pub target_triangles: u64,
    pub spectrum: String,
    pub target_spectrum: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum Verdict {
    Correspondence { matches: usize },
    /// Every subset was evaluated and none matched.
    NoCorrespondence,
    /// The subset cap was hit before a match was found.
    Incomplete { evaluated: u64, total: u64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrespondenceReport {
    /// Label of the graph whose edges were classified.
    pub source: String,
    pub edges: usize,
    pub classes: Vec<ClassCount>,
    pub subsets_total: u64,
    pub subsets_evaluated: u64,
    pub spectrum_policy: SpectrumPolicy,
    pub tolerance: f64,
    pub targets: Vec<TargetSummary>,
    pub candidates: Vec<CandidateSummary>,
    pub matches: Vec<Match>,
    pub near_matches: Vec<NearMatch>,
    pub verdict: Verdict,
}

/// Matches and near-matches of the candidates against the targets, with
/// per-candidate summaries, all in candidate then target order.
pub fn compare(
    candidates: &[Candidate],
    targets: &[Target],
    options: &SearchOptions,
) -> (Vec<CandidateSummary>, Vec<Match>, Vec<NearMatch>) {
    let comparable = |c: &Candidate, t: &Target| {
        t.graph.order() == c.graph.order() && t.degree == Some(c.degree)
    };
    let results: Vec<(CandidateSummary, Vec<Match>, Vec<NearMatch>)> = candidates
        .par_iter()
        .map(|c| {
            let wanted = match options.spectrum {
                SpectrumPolicy::Always => true,
                SpectrumPolicy::OnDegreeMatch => targets.iter().any(|t| comparable(c, t)),
            };
            let spectrum = wanted.then(|| Spectrum::compute(&c.graph, options.tolerance));
            let mut matches = Vec::new();
            let mut near = Vec::new();
            if let Some(spectrum) = &spectrum {
                for t in targets.iter().filter(|t| comparable(c, t)) {
                    if spectrum.approx_eq(&t.spectrum) {
                        matches.push(Match {
                            classes: c.classes.clone(),
                            target: t.label.clone(),
                            spectrum: spectrum.to_string(),
                        });
                    } else {
                        near.push(NearMatch {
                            classes: c.classes.clone(),
                            target: t.label.clone(),
                            degree: c.degree,
                            triangles: c.graph.triangle_count(),
                            target_triangles: t.triangles,
                            spectrum: spectrum.to_string(),
                            target_spectrum: t.spectrum.to_string(),
                        });
                    }
                }
            }
            let summary = CandidateSummary {
                mask: c.mask,
                classes: c.classes.clone(),
                degree: c.degree,
                spectrum: spectrum.map(|s| s.to_string()),
            };
            (summary, matches, near)
        })
        .collect();

    let mut summaries = Vec::with_capacity(results.len());
    let mut matches = Vec::new();
    let mut near_matches = Vec::new();
    for (summary, m, n) in results {
        summaries.push(summary);
        matches.extend(m);
        near_matches.extend(n);
    }
    (summaries, matches, near_matches)
}

/// Classify, combine, compare and report.
pub fn search(
    source: &str,
    graph: &Graph,
    targets: &[Target],
    options: &SearchOptions,
) -> CorrespondenceReport {
    let classification = classify(graph);
    let combined = combine(&classification, options.max_subsets);
    let (candidates, matches, near_matches) = compare(&combined.candidates, targets, options);

    let verdict = if !matches.is_empty() {
        Verdict::Correspondence {
            matches: matches.len(),
        }
    } else if !combined.is_complete() {
        Verdict::Incomplete {
            evaluated: combined.evaluated,
            total: combined.total,
        }
    } else {
        Verdict::NoCorrespondence
    };
    info!(
        source,
        matches = matches.len(),
        near = near_matches.len(),
        ?verdict,
        "correspondence search finished"
    );

    CorrespondenceReport {
        source: source.to_string(),
        edges: classification.edge_count(),
        classes: classification
            .counts()
            .into_iter()
            .map(|(class, pairs)| ClassCount { class, pairs })
            .collect(),
        subsets_total: combined.total,
        subsets_evaluated: combined.evaluated,
        spectrum_policy: options.spectrum,
        tolerance: options.tolerance,
        targets: targets.iter().map(Target::summary).collect(),
        candidates,
        matches,
        near_matches,
        verdict,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roots::{InnerProductRule, RootSystem};

    fn k4() -> Graph {
        Graph::from_edges(4, &[(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)]).unwrap()
    }

    fn a2(rule: InnerProductRule) -> Target {
        let roots = RootSystemGraph::new(RootSystem::a(2).unwrap(), rule);
        Target::from_roots(&roots, 1e-6)
    }

    #[test]
    fn test_line_graph_of_k4_matches_a2() {
        // A2 at |ip| = 1 is the octahedron, as is the line graph of K4
        let report = search("K4", &k4(), &[a2(InnerProductRule::Abs(1))], &SearchOptions::default());
        assert_eq!(report.verdict, Verdict::Correspondence { matches: 1 });
        assert_eq!(
            report.matches[0].classes,
            vec![RelationClass { shared: 1, cross: 1 }]
        );
        assert_eq!(report.candidates.len(), 3);
        assert!(report.candidates.iter().all(|c| c.spectrum.is_some()));
    }

    #[test]
    fn test_no_correspondence_is_a_verdict() {
        // A2 at ip = +1 is a hexagon; K4 unions have degrees 1, 4 and 5
        let options = SearchOptions {
            spectrum: SpectrumPolicy::OnDegreeMatch,
            ..SearchOptions::default()
        };
        let report = search("K4", &k4(), &[a2(InnerProductRule::AnyOf(vec![1]))], &options);
        assert_eq!(report.verdict, Verdict::NoCorrespondence);
        assert!(report.near_matches.is_empty());
        assert!(report.candidates.iter().all(|c| c.spectrum.is_none()));
    }

    #[test]
    fn test_same_degree_different_spectrum_is_near_match() {
        let hexagon = Graph::from_edges(6, &[(0, 1), (1, 2), (2, 3), (3, 4), (4, 5), (5, 0)]).unwrap();
        let triangles =
            Graph::from_edges(6, &[(0, 1), (1, 2), (2, 0), (3, 4), (4, 5), (5, 3)]).unwrap();
        let candidate = Candidate {
            mask: 1,
            classes: vec![RelationClass { shared: 1, cross: 0 }],
            degree: 2,
            graph: triangles,
        };
        let target = Target::new("C6", hexagon, 1e-6);
        let (_, matches, near) = compare(&[candidate], &[target], &SearchOptions::default());
        assert!(matches.is_empty());
        assert_eq!(near.len(), 1);
        assert_eq!(near[0].triangles, 2);
        assert_eq!(near[0].target_triangles, 0);
    }

    #[test]
    fn test_capped_search_without_match_is_incomplete() {
        let path = Graph::from_edges(5, &[(0, 1), (1, 2), (2, 3), (3, 4)]).unwrap();
        let options = SearchOptions {
            max_subsets: 2,
            ..SearchOptions::default()
        };
        let report = search("P5", &path, &[a2(InnerProductRule::Abs(1))], &options);
        assert_eq!(report.verdict, Verdict::Incomplete { evaluated: 2, total: 7 });
    }
}
