//! Integration tests for the recommendation pipeline: rule precedence
//! through the store, report aggregation, and grammar adjustment.

use arrow::array::{Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use std::sync::Arc;

use lacuna_guard::prelude::*;

/// 40 rows with scattered missingness across a numeric and a categorical
/// feature, plus a complete anchor column.
fn mixed_dataset() -> Dataset {
    let schema = Arc::new(Schema::new(vec![
        Field::new("anchor", DataType::Float64, true),
        Field::new("amount", DataType::Float64, true),
        Field::new("color", DataType::Utf8, true),
    ]));
    let anchor: Vec<Option<f64>> = (0..40).map(|i| Some(((i * 7) % 13) as f64)).collect();
    let amount: Vec<Option<f64>> = (0..40)
        .map(|i| if i % 9 == 0 { None } else { Some(((i * 3) % 17) as f64) })
        .collect();
    let color: Vec<Option<String>> = (0..40)
        .map(|i| {
            if i % 11 == 0 {
                None
            } else {
                Some(["red", "green", "blue"][i % 3].to_string())
            }
        })
        .collect();
    Dataset::new(
        RecordBatch::try_new(
            schema,
            vec![
                Arc::new(Float64Array::from(anchor)),
                Arc::new(Float64Array::from(amount)),
                Arc::new(StringArray::from(color)),
            ],
        )
        .unwrap(),
    )
}

#[test]
fn test_mcar_yields_rule_5_for_numeric_and_rule_3_for_categorical() {
    let ds = mixed_dataset();
    let mut store = FeatureStore::new();
    store.rebuild(&ds).unwrap();

    let recs = store.recommend_all(Some(Mechanism::Mcar));
    let by_name: std::collections::HashMap<&str, &Recommendation> =
        recs.iter().map(|(n, r)| (n.as_str(), r)).collect();

    let amount = by_name["amount"];
    assert_eq!(amount.rule_applied, 5);
    assert_eq!(amount.kind, RecommendationKind::AllMethodsValid);
    assert!(amount.reason.contains("(Missing Completely at Random)"));

    let color = by_name["color"];
    assert_eq!(color.rule_applied, 3);
    assert_eq!(color.kind, RecommendationKind::UnknownCategory);

    // The complete column gets no recommendation.
    assert!(!by_name.contains_key("anchor"));
}

#[test]
fn test_unknown_mechanism_falls_back() {
    let ds = mixed_dataset();
    let mut store = FeatureStore::new();
    store.rebuild(&ds).unwrap();

    let recs = store.recommend_all(None);
    let (_, amount) = recs.iter().find(|(n, _)| n == "amount").unwrap();
    assert_eq!(amount.rule_applied, 4);
    assert!(amount.fallback);
    assert!(amount
        .reason
        .starts_with("Dataset missing data mechanism could not be determined."));
}

#[test]
fn test_correlated_feature_draws_removal() {
    // "copy" mirrors "anchor" and has missing values: rule 2.
    let schema = Arc::new(Schema::new(vec![
        Field::new("anchor", DataType::Float64, true),
        Field::new("copy", DataType::Float64, true),
    ]));
    let anchor: Vec<Option<f64>> = (0..30).map(|i| Some(i as f64)).collect();
    let copy: Vec<Option<f64>> = (0..30)
        .map(|i| if i % 10 == 0 { None } else { Some(2.0 * i as f64 + 1.0) })
        .collect();
    let ds = Dataset::new(
        RecordBatch::try_new(
            schema,
            vec![
                Arc::new(Float64Array::from(anchor)),
                Arc::new(Float64Array::from(copy)),
            ],
        )
        .unwrap(),
    );

    let mut store = FeatureStore::new();
    store.rebuild(&ds).unwrap();
    store
        .refresh_correlations(&ds, "copy", &CorrelationThresholds::default())
        .unwrap();

    let recs = store.recommend_all(Some(Mechanism::Mcar));
    let (_, rec) = recs.iter().find(|(n, _)| n == "copy").unwrap();
    assert_eq!(rec.rule_applied, 2);
    assert_eq!(rec.kind, RecommendationKind::RemoveFeatures);
}

#[test]
fn test_recommendations_are_cached_until_invalidated() {
    let ds = mixed_dataset();
    let mut store = FeatureStore::new();
    store.rebuild(&ds).unwrap();

    let first = store.recommend_all(Some(Mechanism::Mcar));
    // A later pass with a different mechanism reuses the cache.
    let second = store.recommend_all(Some(Mechanism::MarOrMnar));
    assert_eq!(first, second);

    // An association refresh clears the recommendation, so the next pass
    // sees the new mechanism.
    store
        .refresh_correlations(&ds, "amount", &CorrelationThresholds::default())
        .unwrap();
    let third = store.recommend_all(Some(Mechanism::MarOrMnar));
    let (_, amount) = third.iter().find(|(n, _)| n == "amount").unwrap();
    assert_eq!(amount.rule_applied, 4);
}

#[test]
fn test_aggregation_groups_and_orders() {
    let ds = mixed_dataset();
    let mut store = FeatureStore::new();
    store.rebuild(&ds).unwrap();

    let groups = aggregate(&store.recommend_all(Some(Mechanism::Mcar)));
    assert_eq!(groups.len(), 2);
    // Rule 3 (categorical) leads rule 5 (MCAR).
    assert_eq!(groups[0].rule_applied, 3);
    assert_eq!(groups[0].features, vec!["color"]);
    assert_eq!(groups[1].rule_applied, 5);
    assert_eq!(groups[1].features, vec!["amount"]);
    // Every reason ends with a period, including rule 3's, which is
    // authored without one.
    assert!(groups.iter().all(|g| g.reason.ends_with('.')));
}

#[test]
fn test_single_feature_group_is_singularized() {
    let input = vec![(
        "copy".to_string(),
        Recommendation {
            kind: RecommendationKind::RemoveFeatures,
            reason: "These features with missing data are strongly correlated with features with complete data. Missing values can be predicted from correlated features, making removal viable.".to_string(),
            rule_applied: 2,
            fallback: false,
        },
    )];
    let groups = aggregate(&input);
    assert_eq!(groups.len(), 1);
    assert!(groups[0]
        .reason
        .starts_with("This feature with missing data is strongly correlated"));
    assert!(groups[0].reason.ends_with('.'));
}

#[test]
fn test_report_serializes_to_json() {
    let ds = mixed_dataset();
    let mut store = FeatureStore::new();
    store.rebuild(&ds).unwrap();

    let groups = aggregate(&store.recommend_all(Some(Mechanism::Mcar)));
    let json = serde_json::to_value(&groups).unwrap();
    let arr = json.as_array().unwrap();
    assert_eq!(arr.len(), 2);
    assert_eq!(arr[0]["features"][0], "color");
    assert_eq!(arr[0]["rule_applied"], 3);

    let mut oracle = MechanismOracle::new();
    let verdict = serde_json::to_value(oracle.evaluate(&ds)).unwrap();
    assert!(verdict["outcome"].is_string());
}

#[test]
fn test_multi_feature_group_keeps_plural_reason() {
    let reason = "These numerical features likely have informative missingness.";
    let input = vec![
        (
            "a".to_string(),
            Recommendation {
                kind: RecommendationKind::MissingIndicator,
                reason: reason.to_string(),
                rule_applied: 1,
                fallback: false,
            },
        ),
        (
            "b".to_string(),
            Recommendation {
                kind: RecommendationKind::MissingIndicator,
                reason: reason.to_string(),
                rule_applied: 1,
                fallback: false,
            },
        ),
    ];
    let groups = aggregate(&input);
    assert_eq!(groups[0].features.len(), 2);
    assert_eq!(groups[0].reason, reason);
}
