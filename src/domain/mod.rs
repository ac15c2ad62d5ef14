//! Domain layer: Core business types and logic.
//!
//! This module contains pure Rust types with no external dependencies.
//! All types are serializable and implement strict validation.

mod assessment;
mod patient;

pub use assessment::{
    classify, FeatureContribution, RecommendationBundle, RiskAssessment, RiskTier, TieringError,
    HIGH_RISK_THRESHOLD, MEDIUM_RISK_THRESHOLD,
};
pub use patient::{PatientData, PatientFeatures, FEATURE_COUNT, FEATURE_NAMES};
