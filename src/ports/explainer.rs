//! Explainer port: Trait for optional feature attribution.
//!
//! Attribution is a presentation extra, not part of the core result. The
//! evaluation service invokes a configured explainer strictly after
//! classification, and a failing explainer never fails the assessment.

use crate::domain::{FeatureContribution, PatientFeatures};

/// Error from an attribution backend.
#[derive(Debug, thiserror::Error)]
pub enum ExplainError {
    /// No attribution data is available for this model.
    #[error("attribution unavailable: {0}")]
    Unavailable(String),
}

/// Strategy trait for per-feature attribution of one prediction.
pub trait Explainer: Send + Sync {
    /// Attribute a prediction to the input features.
    ///
    /// # Arguments
    /// * `features` - The feature vector that was classified
    /// * `probability` - The probability the classifier returned for it
    ///
    /// # Errors
    /// Returns `ExplainError::Unavailable` if attribution data is missing.
    fn attribute(
        &self,
        features: &PatientFeatures,
        probability: f64,
    ) -> Result<Vec<FeatureContribution>, ExplainError>;
}
