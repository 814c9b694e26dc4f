//! The feature store: per-column records with cached analysis state.
//!
//! [`FeatureStore`] owns one [`FeatureRecord`] per usable dataset column and
//! is the only writer of their caches. Reads go through name lookup; bulk
//! operations (rebuild, association refresh, informative scan, the
//! recommendation pass) iterate in dataset column order so output ordering
//! is deterministic.

use std::collections::HashMap;

use tracing::{debug, info, instrument, warn};

use crate::dataset::Dataset;
use crate::error::{DatasetError, Result};
use crate::features::association::{correlate_all, CorrelationThresholds};
use crate::features::informative::informative_scan;
use crate::features::record::{FeatureRecord, FeatureSummary, InformativeMissingness, SemanticType};
use crate::features::recommend::{recommend, Recommendation};
use crate::mechanism::Mechanism;

/// Holds the per-feature analysis state for one dataset snapshot.
#[derive(Debug, Default)]
pub struct FeatureStore {
    records: Vec<FeatureRecord>,
    index: HashMap<String, usize>,
}

impl FeatureStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds the store from a dataset snapshot, replacing all records.
    ///
    /// Columns with an empty name are skipped. A duplicate column name counts
    /// as a failure (the first occurrence wins). Any failure leaves the store
    /// empty, never partially populated: a zero-row dataset, or one where no
    /// record could be built and at least one column failed, clears previous
    /// state and errors. A dataset whose every column was merely skipped
    /// leaves an empty but valid store. Returns the number of records built.
    #[instrument(skip(self, dataset))]
    pub fn rebuild(&mut self, dataset: &Dataset) -> Result<usize> {
        self.clear();
        if dataset.num_rows() == 0 {
            return Err(DatasetError::Empty.into());
        }

        let n_rows = dataset.num_rows() as f64;
        let mut records = Vec::with_capacity(dataset.num_columns());
        let mut index = HashMap::with_capacity(dataset.num_columns());
        let mut failed = 0usize;
        let mut skipped = 0usize;

        for name in dataset.column_names() {
            if name.trim().is_empty() {
                skipped += 1;
                continue;
            }
            if index.contains_key(&name) {
                warn!(column = %name, "Duplicate column name, keeping the first occurrence");
                failed += 1;
                continue;
            }
            let (Some(data_type), Some(missing_count)) =
                (dataset.data_type(&name), dataset.missing_count(&name))
            else {
                failed += 1;
                continue;
            };
            let missing_fraction = round2(missing_count as f64 / n_rows * 100.0);
            let record = FeatureRecord::new(
                name.clone(),
                SemanticType::detect(data_type),
                data_type.to_string(),
                missing_count,
                missing_fraction,
            );
            index.insert(name, records.len());
            records.push(record);
        }

        if records.is_empty() && failed > 0 {
            return Err(DatasetError::NoUsableColumns { failed, skipped }.into());
        }

        info!(
            features = records.len(),
            failed, skipped, "Feature store rebuilt"
        );
        self.records = records;
        self.index = index;
        Ok(self.records.len())
    }

    /// Looks up a record by feature name.
    pub fn get(&self, name: &str) -> Option<&FeatureRecord> {
        self.index.get(name).map(|&i| &self.records[i])
    }

    /// Mutable lookup by feature name.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut FeatureRecord> {
        self.index.get(name).map(|&i| &mut self.records[i])
    }

    /// Number of records in the store.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterates records in dataset column order.
    pub fn iter(&self) -> impl Iterator<Item = &FeatureRecord> {
        self.records.iter()
    }

    /// Drops every record.
    pub fn clear(&mut self) {
        self.records.clear();
        self.index.clear();
    }

    /// Summaries sorted by missing fraction, highest first. The sort is
    /// stable, so features tied on missing fraction keep dataset column
    /// order.
    pub fn all_sorted_by_missing_fraction_desc(&self) -> Vec<FeatureSummary> {
        let mut summaries: Vec<FeatureSummary> =
            self.records.iter().map(|r| r.summary()).collect();
        summaries.sort_by(|a, b| {
            b.missing_fraction
                .partial_cmp(&a.missing_fraction)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        summaries
    }

    /// Snapshot of every feature's current semantic type, for association
    /// dispatch.
    pub fn semantic_types(&self) -> HashMap<String, SemanticType> {
        self.records
            .iter()
            .map(|r| (r.name().to_string(), r.semantic_type()))
            .collect()
    }

    /// Sets one feature's semantic type. Only that feature's caches are
    /// invalidated; partners keep their cached associations until their own
    /// refresh. Returns whether the type actually changed.
    pub fn set_semantic_type(&mut self, name: &str, value: SemanticType) -> Result<bool> {
        let record = self
            .get_mut(name)
            .ok_or_else(|| DatasetError::unknown_column(name))?;
        Ok(record.set_semantic_type(value))
    }

    /// Drops every record's cached associations, forcing the next request to
    /// recompute them. Used after bulk type imports where per-feature
    /// invalidation would leave partners stale.
    pub fn invalidate_all_correlations(&mut self) {
        for record in &mut self.records {
            record.clear_correlations();
        }
        debug!(features = self.records.len(), "Cleared all cached associations");
    }

    /// Ensures a feature's cached associations are current for the given
    /// thresholds, recomputing only when the cache is absent or was built
    /// under different thresholds. Returns whether a recompute ran.
    #[instrument(skip(self, dataset, thresholds))]
    pub fn refresh_correlations(
        &mut self,
        dataset: &Dataset,
        name: &str,
        thresholds: &CorrelationThresholds,
    ) -> Result<bool> {
        let record = self
            .get(name)
            .ok_or_else(|| DatasetError::unknown_column(name))?;
        if !record.needs_correlation_refresh(thresholds) {
            debug!(feature = name, "Cached associations are current");
            return Ok(false);
        }

        let types = self.semantic_types();
        let associations = correlate_all(dataset, &types, name, thresholds);
        let record = self
            .get_mut(name)
            .ok_or_else(|| DatasetError::unknown_column(name))?;
        record.set_correlations(associations, *thresholds);
        Ok(true)
    }

    /// Runs the informative-missingness scan against a target column and
    /// stores each verdict on its feature record. Features the scan skipped
    /// are marked computed with the default (uninformative) verdict, so a
    /// later recommendation pass does not treat them as pending. Returns the
    /// number of features found informative.
    #[instrument(skip(self, dataset))]
    pub fn refresh_informative(
        &mut self,
        dataset: &Dataset,
        target: &str,
        alpha: f64,
    ) -> Result<usize> {
        let target_type = self
            .get(target)
            .map(|r| r.semantic_type())
            .ok_or_else(|| DatasetError::unknown_column(target))?;

        let results = informative_scan(dataset, target, target_type, alpha)?;
        let verdicts: HashMap<&str, InformativeMissingness> = results
            .iter()
            .map(|r| {
                (
                    r.feature.as_str(),
                    InformativeMissingness {
                        is_informative: r.is_informative,
                        p_value: r.p_value,
                    },
                )
            })
            .collect();

        let mut informative = 0usize;
        for record in &mut self.records {
            if record.name() == target {
                continue;
            }
            let verdict = verdicts
                .get(record.name())
                .copied()
                .unwrap_or_default();
            if verdict.is_informative {
                informative += 1;
            }
            record.set_informative(verdict);
        }
        Ok(informative)
    }

    /// Produces a recommendation for every feature with missing data, in
    /// dataset column order. Cached recommendations are reused; stale or
    /// absent ones are recomputed and cached. Complete features are not
    /// included.
    #[instrument(skip(self))]
    pub fn recommend_all(&mut self, mechanism: Option<Mechanism>) -> Vec<(String, Recommendation)> {
        let mut out = Vec::new();
        for record in &mut self.records {
            if record.missing_count() == 0 {
                continue;
            }
            if record.needs_recommendation() {
                let rec = recommend(record, mechanism);
                record.set_recommendation(rec);
            }
            if let Some(rec) = record.recommendation() {
                out.push((record.name().to_string(), rec.clone()));
            }
        }
        info!(recommended = out.len(), "Recommendation pass complete");
        out
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
