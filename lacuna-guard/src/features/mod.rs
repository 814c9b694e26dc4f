//! Feature-level analysis: per-column records, association sweeps, the
//! informative-missingness scan, and the recommendation pipeline.

pub mod aggregate;
pub mod association;
pub mod informative;
pub mod record;
pub mod recommend;
pub mod store;

pub use aggregate::{aggregate, RecommendationGroup};
pub use association::{
    correlate, correlate_all, Association, AssociationKind, CorrelationThresholds,
    MIN_PAIRED_SAMPLE,
};
pub use informative::{informative_scan, InformativeResult, DEFAULT_ALPHA};
pub use record::{FeatureRecord, FeatureSummary, InformativeMissingness, SemanticType};
pub use recommend::{recommend, Recommendation, RecommendationKind};
pub use store::FeatureStore;
