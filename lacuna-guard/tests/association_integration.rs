//! Integration tests for the association sweep and its caching behavior,
//! exercised through the feature store.

use arrow::array::{Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use std::sync::Arc;

use lacuna_guard::prelude::*;

/// 20 rows: y = 2x exactly, "band" tracks x's half, and x has a few holes so
/// recommendations can see it.
fn linear_dataset() -> Dataset {
    let schema = Arc::new(Schema::new(vec![
        Field::new("x", DataType::Float64, true),
        Field::new("y", DataType::Float64, true),
        Field::new("band", DataType::Utf8, true),
    ]));
    let xs: Vec<Option<f64>> = (0..20)
        .map(|i| if i == 3 || i == 17 { None } else { Some(i as f64) })
        .collect();
    let ys: Vec<Option<f64>> = (0..20).map(|i| Some(2.0 * i as f64)).collect();
    let bands: Vec<Option<String>> = (0..20)
        .map(|i| Some(if i < 10 { "low" } else { "high" }.to_string()))
        .collect();
    Dataset::new(
        RecordBatch::try_new(
            schema,
            vec![
                Arc::new(Float64Array::from(xs)),
                Arc::new(Float64Array::from(ys)),
                Arc::new(StringArray::from(bands)),
            ],
        )
        .unwrap(),
    )
}

#[test]
fn test_perfect_linear_pair_is_retained() {
    let ds = linear_dataset();
    let mut store = FeatureStore::new();
    store.rebuild(&ds).unwrap();

    store
        .refresh_correlations(&ds, "x", &CorrelationThresholds::default())
        .unwrap();
    let x = store.get("x").unwrap();
    assert!(x.correlations_computed());

    let pearson = x
        .correlations()
        .iter()
        .find(|a| a.partner == "y")
        .expect("y should be retained at the default threshold");
    assert_eq!(pearson.kind, AssociationKind::Pearson);
    assert!((pearson.value - 1.0).abs() < 1e-9);
    assert!(pearson.p_value < 0.001);
}

#[test]
fn test_threshold_sweep_narrows_results() {
    let ds = linear_dataset();
    let mut store = FeatureStore::new();
    store.rebuild(&ds).unwrap();

    // At 0.99 only the exact linear partner survives.
    store
        .refresh_correlations(&ds, "x", &CorrelationThresholds::uniform(0.99))
        .unwrap();
    let retained: Vec<String> = store
        .get("x")
        .unwrap()
        .correlations()
        .iter()
        .map(|a| a.partner.clone())
        .collect();
    assert!(retained.contains(&"y".to_string()));

    // A threshold above 1 excludes everything; the sweep succeeds with an
    // empty result rather than erroring.
    store
        .refresh_correlations(&ds, "x", &CorrelationThresholds::uniform(1.5))
        .unwrap();
    assert!(store.get("x").unwrap().correlations().is_empty());
    assert!(store.get("x").unwrap().correlations_computed());
}

#[test]
fn test_cache_gate_on_thresholds() {
    let ds = linear_dataset();
    let mut store = FeatureStore::new();
    store.rebuild(&ds).unwrap();

    let defaults = CorrelationThresholds::default();
    assert!(store.refresh_correlations(&ds, "x", &defaults).unwrap());
    // Same thresholds: served from cache, no recompute.
    assert!(!store.refresh_correlations(&ds, "x", &defaults).unwrap());

    // Any per-kind change busts the gate.
    let mut changed = defaults;
    changed.eta = 0.5;
    assert!(store.refresh_correlations(&ds, "x", &changed).unwrap());
}

#[test]
fn test_results_sorted_by_strength() {
    let ds = linear_dataset();
    let mut store = FeatureStore::new();
    store.rebuild(&ds).unwrap();

    store
        .refresh_correlations(&ds, "x", &CorrelationThresholds::uniform(0.3))
        .unwrap();
    let values: Vec<f64> = store
        .get("x")
        .unwrap()
        .correlations()
        .iter()
        .map(|a| a.value.abs())
        .collect();
    assert!(values.len() >= 2, "expected y and band both retained");
    assert!(values.windows(2).all(|w| w[0] >= w[1]));
}

#[test]
fn test_type_override_switches_dispatch() {
    let ds = linear_dataset();
    let mut store = FeatureStore::new();
    store.rebuild(&ds).unwrap();

    let loose = CorrelationThresholds::uniform(0.3);
    store.refresh_correlations(&ds, "x", &loose).unwrap();
    assert!(store
        .get("x")
        .unwrap()
        .correlations()
        .iter()
        .any(|a| a.partner == "y" && a.kind == AssociationKind::Pearson));

    // Retype y as categorical: the x–y pair becomes a mixed pair, and with
    // every y value distinct each group is a singleton, so the Eta test
    // degenerates and the pair drops out of the sweep. Retyping only clears
    // y's own cache, so x is refreshed explicitly.
    store
        .set_semantic_type("y", SemanticType::Categorical)
        .unwrap();
    assert!(store.get("x").unwrap().correlations_computed());
    store.invalidate_all_correlations();
    store.refresh_correlations(&ds, "x", &loose).unwrap();
    let x = store.get("x").unwrap();
    assert!(x.correlations().iter().all(|a| a.partner != "y"));
    // The band partner is unaffected by y's retype.
    assert!(x
        .correlations()
        .iter()
        .any(|a| a.partner == "band" && a.kind == AssociationKind::Eta));
}

#[test]
fn test_small_paired_sample_is_skipped() {
    // 12 rows but only 10 rows where both columns are present: at the
    // boundary the pair is skipped, not scored.
    let schema = Arc::new(Schema::new(vec![
        Field::new("a", DataType::Float64, true),
        Field::new("b", DataType::Float64, true),
    ]));
    let a: Vec<Option<f64>> = (0..12)
        .map(|i| if i < 2 { None } else { Some(i as f64) })
        .collect();
    let b: Vec<Option<f64>> = (0..12).map(|i| Some(3.0 * i as f64)).collect();
    let ds = Dataset::new(
        RecordBatch::try_new(
            schema,
            vec![
                Arc::new(Float64Array::from(a)),
                Arc::new(Float64Array::from(b)),
            ],
        )
        .unwrap(),
    );

    let mut store = FeatureStore::new();
    store.rebuild(&ds).unwrap();
    store
        .refresh_correlations(&ds, "a", &CorrelationThresholds::uniform(0.1))
        .unwrap();
    assert!(store.get("a").unwrap().correlations().is_empty());
}

#[test]
fn test_informative_scan_through_store() {
    // "probe" is missing exactly where the target is large: informative.
    let n = 40;
    let schema = Arc::new(Schema::new(vec![
        Field::new("target", DataType::Float64, true),
        Field::new("probe", DataType::Float64, true),
    ]));
    let target: Vec<Option<f64>> = (0..n).map(|i| Some(i as f64)).collect();
    let probe: Vec<Option<f64>> = (0..n)
        .map(|i| if i >= 30 { None } else { Some(1.0 + (i % 3) as f64) })
        .collect();
    let ds = Dataset::new(
        RecordBatch::try_new(
            schema,
            vec![
                Arc::new(Float64Array::from(target)),
                Arc::new(Float64Array::from(probe)),
            ],
        )
        .unwrap(),
    );

    let mut store = FeatureStore::new();
    store.rebuild(&ds).unwrap();
    let informative = store.refresh_informative(&ds, "target", 0.05).unwrap();
    assert_eq!(informative, 1);

    let probe = store.get("probe").unwrap();
    assert!(probe.informative_computed());
    assert!(probe.informative_missingness().is_informative);
    assert!(probe.informative_missingness().p_value < 0.05);

    // The informative feature now draws rule 1.
    let recs = store.recommend_all(Some(Mechanism::Mcar));
    let (_, rec) = recs.iter().find(|(n, _)| n == "probe").unwrap();
    assert_eq!(rec.rule_applied, 1);
    assert_eq!(rec.kind, RecommendationKind::MissingIndicator);
}
