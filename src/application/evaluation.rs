//! Evaluation service: Orchestrates one risk assessment.
//!
//! This service coordinates:
//! - Feature validation
//! - Classifier prediction
//! - Risk tiering and recommendation lookup
//! - Optional feature attribution
//!
//! Each call is a fresh, synchronous evaluation; nothing is cached or
//! persisted between calls.

use std::sync::Arc;

use crate::domain::{PatientData, RiskAssessment};
use crate::ports::{Explainer, RiskClassifier};
use crate::OvaresError;

/// Service for running risk assessments against the injected classifier.
pub struct EvaluationService<C>
where
    C: RiskClassifier,
{
    classifier: Arc<C>,
    explainer: Option<Arc<dyn Explainer>>,
}

impl<C> EvaluationService<C>
where
    C: RiskClassifier,
{
    /// Create a new evaluation service.
    pub fn new(classifier: Arc<C>) -> Self {
        Self {
            classifier,
            explainer: None,
        }
    }

    /// Attach an attribution strategy, invoked after each classification.
    #[must_use]
    pub fn with_explainer(mut self, explainer: Arc<dyn Explainer>) -> Self {
        self.explainer = Some(explainer);
        self
    }

    /// Whether an attribution panel will accompany assessments.
    #[must_use]
    pub fn has_explainer(&self) -> bool {
        self.explainer.is_some()
    }

    /// Run one assessment on patient data.
    ///
    /// Performs the full pipeline:
    /// 1. Validate feature bounds
    /// 2. Predict the positive-class probability
    /// 3. Tier the probability and look up recommendations
    /// 4. Attach attribution if an explainer is configured
    ///
    /// Any failure in steps 1-3 aborts the evaluation; there is no partial
    /// result. A failing explainer only drops the attribution panel.
    ///
    /// # Errors
    /// Returns error if validation, prediction, or tiering fails.
    pub fn evaluate(&self, patient: PatientData) -> Result<RiskAssessment, OvaresError> {
        if let Err(errors) = patient.features.validate() {
            return Err(OvaresError::Validation(errors.join(", ")));
        }

        let probability = self
            .classifier
            .predict_positive_probability(&patient.features)?;

        let mut assessment = match &patient.id {
            Some(id) => RiskAssessment::with_patient(probability, id.clone())?,
            None => RiskAssessment::new(probability)?,
        };

        if let Some(explainer) = &self.explainer {
            match explainer.attribute(&patient.features, probability) {
                Ok(contributions) => assessment.attributions = Some(contributions),
                Err(e) => {
                    // The assessment stands without its panel.
                    tracing::warn!("Attribution unavailable: {e}");
                }
            }
        }

        tracing::info!(
            "Assessment complete: probability={:.4}, tier={}",
            assessment.probability,
            assessment.tier
        );

        Ok(assessment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        FeatureContribution, PatientFeatures, RiskTier, TieringError,
    };
    use crate::ports::{ClassifierError, ExplainError};

    /// Stub classifier returning a fixed probability.
    struct FixedClassifier(f64);

    impl RiskClassifier for FixedClassifier {
        fn predict_positive_probability(
            &self,
            _features: &PatientFeatures,
        ) -> Result<f64, ClassifierError> {
            Ok(self.0)
        }
    }

    /// Stub classifier that is never reachable.
    struct UnavailableClassifier;

    impl RiskClassifier for UnavailableClassifier {
        fn predict_positive_probability(
            &self,
            _features: &PatientFeatures,
        ) -> Result<f64, ClassifierError> {
            Err(ClassifierError::ModelUnavailable("stub offline".into()))
        }
    }

    struct FixedExplainer;

    impl Explainer for FixedExplainer {
        fn attribute(
            &self,
            _features: &PatientFeatures,
            _probability: f64,
        ) -> Result<Vec<FeatureContribution>, ExplainError> {
            Ok(vec![FeatureContribution {
                feature: "AMH".into(),
                weight: 1.0,
            }])
        }
    }

    struct FailingExplainer;

    impl Explainer for FailingExplainer {
        fn attribute(
            &self,
            _features: &PatientFeatures,
            _probability: f64,
        ) -> Result<Vec<FeatureContribution>, ExplainError> {
            Err(ExplainError::Unavailable("stub".into()))
        }
    }

    fn reference_patient() -> PatientData {
        PatientData::new(PatientFeatures {
            amh: 3.0,
            afc: 15.0,
            fsh: 8.0,
            age: 30.0,
            bmi: 22.0,
        })
    }

    #[test]
    fn test_end_to_end_high_tier() {
        let service = EvaluationService::new(Arc::new(FixedClassifier(0.65)));

        let assessment = service.evaluate(reference_patient()).expect("evaluate");

        assert!((assessment.probability - 0.65).abs() < f64::EPSILON);
        assert_eq!(assessment.tier, RiskTier::High);
        assert_eq!(
            assessment.recommendations.lines(),
            [
                "reduce gonadotropin dose by >5%",
                "prefer antagonist protocol",
                "freeze all embryos, defer transfer",
            ]
        );
        assert!(assessment.attributions.is_none());
    }

    #[test]
    fn test_contract_violation_aborts_without_partial_result() {
        let service = EvaluationService::new(Arc::new(FixedClassifier(1.2)));

        let err = service.evaluate(reference_patient()).expect_err("must fail");
        match err {
            OvaresError::Tiering(TieringError::OutOfRangeInput(p)) => {
                assert!((p - 1.2).abs() < f64::EPSILON);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_invalid_features_rejected_before_prediction() {
        // The classifier would succeed; validation must fail first.
        let service = EvaluationService::new(Arc::new(FixedClassifier(0.5)));

        let patient = PatientData::new(PatientFeatures {
            amh: 42.0,
            ..Default::default()
        });
        let err = service.evaluate(patient).expect_err("must fail");
        assert!(matches!(err, OvaresError::Validation(_)));
    }

    #[test]
    fn test_classifier_error_propagated_unmodified() {
        let service = EvaluationService::new(Arc::new(UnavailableClassifier));
        let err = service.evaluate(reference_patient()).expect_err("must fail");
        assert!(matches!(
            err,
            OvaresError::Classifier(ClassifierError::ModelUnavailable(_))
        ));
    }

    #[test]
    fn test_patient_id_carried_through() {
        let service = EvaluationService::new(Arc::new(FixedClassifier(0.1)));
        let patient =
            PatientData::with_id("case-042", PatientFeatures::default());

        let assessment = service.evaluate(patient).expect("evaluate");
        assert_eq!(assessment.patient_id.as_deref(), Some("case-042"));
        assert_eq!(assessment.tier, RiskTier::Low);
    }

    #[test]
    fn test_explainer_attaches_panel() {
        let service = EvaluationService::new(Arc::new(FixedClassifier(0.4)))
            .with_explainer(Arc::new(FixedExplainer));

        let assessment = service.evaluate(reference_patient()).expect("evaluate");
        let attributions = assessment.attributions.expect("panel present");
        assert_eq!(attributions.len(), 1);
        assert_eq!(attributions[0].feature, "AMH");
    }

    #[test]
    fn test_failing_explainer_never_fails_assessment() {
        let service = EvaluationService::new(Arc::new(FixedClassifier(0.4)))
            .with_explainer(Arc::new(FailingExplainer));

        let assessment = service.evaluate(reference_patient()).expect("evaluate");
        assert_eq!(assessment.tier, RiskTier::Medium);
        assert!(assessment.attributions.is_none());
    }
}
