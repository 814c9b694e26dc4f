//! Prelude for commonly used types in lacuna-guard.

pub use crate::dataset::Dataset;
pub use crate::error::{DatasetError, LacunaError, Result};
pub use crate::features::{
    aggregate, Association, AssociationKind, CorrelationThresholds, FeatureRecord, FeatureStore,
    FeatureSummary, InformativeMissingness, Recommendation, RecommendationGroup,
    RecommendationKind, SemanticType,
};
pub use crate::logging::LogConfig;
pub use crate::mechanism::{Mechanism, MechanismOracle, MechanismTest, MechanismVerdict};
