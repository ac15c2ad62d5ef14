//! Classifier port: Trait for the pre-trained risk classifier.
//!
//! This trait abstracts the model backend (the forest artifact) from the
//! application logic.

use crate::domain::PatientFeatures;

/// Error from the classifier adapter.
#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    /// The trained artifact cannot be loaded, validated, or invoked.
    /// Propagated unmodified to the caller; never recovered locally.
    #[error("model unavailable: {0}")]
    ModelUnavailable(String),
}

/// Trait for positive-class probability prediction.
///
/// Implementations must be pure: no observable state mutation across calls,
/// and the same feature vector always yields the same probability. The
/// feature order is fixed by `PatientFeatures::to_vec`; implementations
/// depend on that exact order.
pub trait RiskClassifier: Send + Sync {
    /// Predict the probability of ovarian hyper-response.
    ///
    /// # Returns
    /// A probability in [0, 1] for the positive class.
    ///
    /// # Errors
    /// Returns `ClassifierError::ModelUnavailable` if the model cannot be
    /// invoked.
    fn predict_positive_probability(
        &self,
        features: &PatientFeatures,
    ) -> Result<f64, ClassifierError>;
}
