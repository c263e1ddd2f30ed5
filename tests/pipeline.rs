//! Whole-pipeline runs: determinism, configuration and the record cache.

use camino::Utf8PathBuf;
use quadrangle::Session;
use quadrangle::cache::RecordCache;
use quadrangle::config::{Family, RootTarget, SessionConfig};
use quadrangle::correspond::Verdict;
use quadrangle::roots::InnerProductRule;
use quadrangle::schema::{ClosureSource, GroupRecord, PipelineReport, WeightRecord};

fn w2_config() -> SessionConfig {
    SessionConfig::from_toml_str(
        r#"
        [geometry]
        order = 2

        [[search.targets]]
        system = "A2"
        rule = { abs = 1 }

        [[search.targets]]
        system = "D4"
        rule = { abs = 1 }
        "#,
    )
    .unwrap()
}

#[test]
fn test_rerun_gives_identical_json() {
    let first = Session::new(w2_config()).unwrap().pipeline().unwrap();
    let second = Session::new(w2_config()).unwrap().pipeline().unwrap();
    assert_eq!(
        serde_json::to_string_pretty(&first).unwrap(),
        serde_json::to_string_pretty(&second).unwrap()
    );
}

#[test]
fn test_thread_count_does_not_change_the_report() {
    let default = Session::new(w2_config()).unwrap().pipeline().unwrap();
    let mut config = w2_config();
    config.search.threads = 2;
    let pooled = Session::new(config).unwrap().pipeline().unwrap();
    assert_eq!(
        serde_json::to_string(&default).unwrap(),
        serde_json::to_string(&pooled).unwrap()
    );
}

#[test]
fn test_report_survives_json() {
    let report = Session::new(w2_config()).unwrap().pipeline().unwrap();
    let json = serde_json::to_string(&report).unwrap();
    let back: PipelineReport = serde_json::from_str(&json).unwrap();
    assert_eq!(back, report);
    assert_eq!(back.format_version, PipelineReport::CURRENT_VERSION);
    let correspondence = back.correspondence.unwrap();
    assert_eq!(correspondence.targets.len(), 2);
    assert_eq!(correspondence.verdict, Verdict::NoCorrespondence);
}

#[test]
fn test_w3_study_with_claim() {
    let mut config = SessionConfig::from_toml_str(
        r#"
        [[code.claims]]
        field = 2
        weight = 6
        count = 240
        "#,
    )
    .unwrap();
    config.search.enabled = false;
    let report = Session::new(config).unwrap().pipeline().unwrap();

    assert_eq!(report.geometry.points, 40);
    assert_eq!(report.spectrum.display, "{12^1, 2^24, -4^15}");
    let binary = &report.codes[0];
    assert!(binary.square_vanishes);
    assert_eq!(binary.kernel_dimension, 24);
    assert_eq!(binary.verified_claim, Some((6, Some(240))));
    assert!(matches!(
        &binary.weights,
        WeightRecord::Complete { minimum_weight: Some(6), .. }
    ));
    assert_eq!(report.codes[1].kernel_dimension, 1);
    assert_eq!(report.cohomology.results[1].cohomology, vec![1, 81, 0, 0]);
    assert!(report.cohomology.comparison.agrees());
    assert_eq!(report.group.order(), Some(51_840));
    if let GroupRecord::Complete { stabilizer_order, .. } = report.group {
        assert_eq!(stabilizer_order, 1296);
    }
    assert!(report.correspondence.is_none());
}

#[test]
fn test_parabolic_search_respects_cap() {
    let mut config = SessionConfig::default();
    config.geometry.family = Family::Parabolic;
    config.search.targets = vec![RootTarget {
        system: "E6".into(),
        rule: InnerProductRule::Abs(1),
    }];
    config.search.max_subsets = 4;
    config.code.fields = vec![2];
    let session = Session::new(config).unwrap();
    assert_eq!(session.geometry().point_count(), 40);
    let correspondence = session.correspondence().unwrap().unwrap();
    assert_eq!(correspondence.subsets_evaluated, 4);
    assert!(matches!(correspondence.verdict, Verdict::Incomplete { .. }));
}

#[test]
fn test_q43_group_is_checked_against_reflections() {
    let mut config = SessionConfig::default();
    config.geometry.family = Family::Parabolic;
    config.search.enabled = false;
    let session = Session::new(config).unwrap();
    match session.group().unwrap() {
        GroupRecord::Complete {
            order,
            closure_order,
            closure_source,
            point_orbits,
            stabilizer_order,
            ..
        } => {
            assert_eq!(order, 51_840);
            assert_eq!(closure_order, 51_840);
            assert_eq!(closure_source, ClosureSource::Collineations);
            assert_eq!(point_orbits, vec![40]);
            assert_eq!(stabilizer_order, 1296);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_grids_fall_back_to_search_generators() {
    // no independent generators are known for grids, so the closure only
    // re-checks the search's own output
    for family in [Family::Grid, Family::DualGrid] {
        let mut config = SessionConfig::default();
        config.geometry.family = family;
        config.geometry.order = 3;
        config.search.enabled = false;
        let session = Session::new(config).unwrap();
        match session.group().unwrap() {
            GroupRecord::Complete { closure_source, order, closure_order, .. } => {
                assert_eq!(closure_source, ClosureSource::SearchGenerators);
                assert_eq!(order, closure_order);
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}

#[test]
fn test_cached_pipeline_round_trip() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = Utf8PathBuf::from_path_buf(tmp.path().join("cache")).unwrap();
    let session = Session::new(w2_config()).unwrap();

    let fresh = {
        let cache = RecordCache::open(&dir).unwrap();
        session.pipeline_cached(&cache).unwrap()
    };
    let cache = RecordCache::open_existing(&dir).unwrap();
    assert_eq!(cache.stats().unwrap().record_count, 1);
    let cached = session.pipeline_cached(&cache).unwrap();
    assert_eq!(
        serde_json::to_string(&fresh).unwrap(),
        serde_json::to_string(&cached).unwrap()
    );

    // the cache section itself is not part of the key
    let mut config = w2_config();
    config.cache.enabled = true;
    let same = Session::new(config).unwrap();
    same.pipeline_cached(&cache).unwrap();
    assert_eq!(cache.stats().unwrap().record_count, 1);

    let mut config = w2_config();
    config.search.max_subsets = 3;
    Session::new(config).unwrap().pipeline_cached(&cache).unwrap();
    assert_eq!(cache.stats().unwrap().record_count, 2);
}
