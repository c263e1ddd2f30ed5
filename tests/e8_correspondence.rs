//! Edge relations of W(3) against the E8 root graph.

use quadrangle::correspond::{SearchOptions, SpectrumPolicy, Target, Verdict, classify, search};
use quadrangle::geometry::IncidenceStructure;
use quadrangle::graph::{DEFAULT_TOLERANCE, Graph};
use quadrangle::roots::{InnerProductRule, RootSystem, RootSystemGraph};

fn w3_graph() -> Graph {
    Graph::collinearity(&IncidenceStructure::symplectic(3).unwrap())
}

#[test]
fn test_w3_edge_classes() {
    let classification = classify(&w3_graph());
    assert_eq!(classification.edge_count(), 240);
    let counts: Vec<(String, usize)> = classification
        .counts()
        .into_iter()
        .map(|(class, pairs)| (class.to_string(), pairs))
        .collect();
    assert_eq!(
        counts,
        vec![
            ("(0,0)".to_string(), 5400),
            ("(0,1)".to_string(), 12960),
            ("(0,2)".to_string(), 7560),
            ("(0,4)".to_string(), 120),
            ("(1,0)".to_string(), 2160),
            ("(1,1)".to_string(), 480),
        ]
    );
    assert_eq!(classification.pair_count(), 240 * 239 / 2);
}

#[test]
fn test_e8_at_unit_inner_product_has_no_correspondence() {
    let e8 = RootSystemGraph::new(RootSystem::e8(), InnerProductRule::Abs(1));
    assert_eq!(e8.graph.order(), 240);
    assert_eq!(e8.graph.regular_degree(), Some(112));

    let options = SearchOptions {
        spectrum: SpectrumPolicy::OnDegreeMatch,
        ..SearchOptions::default()
    };
    let target = Target::from_roots(&e8, DEFAULT_TOLERANCE);
    assert_eq!(target.triangles, 250_880);

    let report = search("W(3)", &w3_graph(), &[target], &options);
    assert_eq!(report.edges, 240);
    assert_eq!(report.classes.len(), 6);
    assert_eq!(report.subsets_total, 63);
    assert_eq!(report.subsets_evaluated, 63);
    assert!(report.matches.is_empty());
    assert_eq!(report.verdict, Verdict::NoCorrespondence);

    let mut near: Vec<u64> = report.near_matches.iter().map(|n| n.triangles).collect();
    near.sort_unstable();
    assert_eq!(near, vec![216_320, 244_400]);
    assert!(report.near_matches.iter().all(|n| n.degree == 112));
    assert!(report.near_matches.iter().all(|n| n.target_triangles == 250_880));
}

#[test]
fn test_subset_cap_reports_incomplete() {
    let e8 = RootSystemGraph::new(RootSystem::e8(), InnerProductRule::Abs(1));
    let options = SearchOptions {
        max_subsets: 10,
        spectrum: SpectrumPolicy::OnDegreeMatch,
        ..SearchOptions::default()
    };
    let target = Target::from_roots(&e8, DEFAULT_TOLERANCE);
    let report = search("W(3)", &w3_graph(), &[target], &options);
    assert_eq!(report.subsets_evaluated, 10);
    assert_eq!(
        report.verdict,
        Verdict::Incomplete {
            evaluated: 10,
            total: 63
        }
    );
}
