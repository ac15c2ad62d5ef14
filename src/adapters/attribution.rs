//! Attribution adapter: Implementation of `Explainer` from the importances
//! the training pipeline baked into the forest artifact.
//!
//! No attribution math happens here. The training pipeline computes
//! impurity-based importances when the forest is fitted and ships them
//! inside the artifact; this adapter only normalizes and orders them for
//! display.

use crate::adapters::forest::ForestClassifier;
use crate::domain::{FeatureContribution, PatientFeatures, FEATURE_NAMES};
use crate::ports::{ExplainError, Explainer};

/// Explainer backed by the artifact's precomputed feature importances.
pub struct ArtifactImportances {
    contributions: Vec<FeatureContribution>,
}

impl ArtifactImportances {
    /// Build from a loaded classifier.
    ///
    /// # Errors
    /// Returns `ExplainError::Unavailable` if the artifact carries no
    /// importances (older exports).
    pub fn from_classifier(classifier: &ForestClassifier) -> Result<Self, ExplainError> {
        let importances = classifier.feature_importances().ok_or_else(|| {
            ExplainError::Unavailable("artifact carries no feature importances".into())
        })?;

        let total: f64 = importances.iter().sum();
        if total <= 0.0 {
            return Err(ExplainError::Unavailable(
                "artifact importances sum to zero".into(),
            ));
        }

        let mut contributions: Vec<FeatureContribution> = FEATURE_NAMES
            .iter()
            .zip(importances.iter())
            .map(|(name, weight)| FeatureContribution {
                feature: (*name).to_string(),
                weight: weight / total,
            })
            .collect();
        contributions.sort_by(|a, b| {
            b.weight
                .partial_cmp(&a.weight)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        Ok(Self { contributions })
    }
}

impl Explainer for ArtifactImportances {
    fn attribute(
        &self,
        _features: &PatientFeatures,
        _probability: f64,
    ) -> Result<Vec<FeatureContribution>, ExplainError> {
        // Importances are global to the model, so the same panel is shown
        // for every prediction.
        Ok(self.contributions.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::forest::{ForestArtifact, Tree, TreeNode};
    use tempfile::tempdir;

    fn classifier_with_importances(importances: Option<Vec<f64>>) -> ForestClassifier {
        let artifact = ForestArtifact {
            version: 1,
            feature_names: FEATURE_NAMES.iter().map(|s| (*s).to_string()).collect(),
            n_classes: 2,
            positive_class: 1,
            trees: vec![Tree {
                nodes: vec![TreeNode::Leaf {
                    class_counts: vec![1.0, 1.0],
                }],
            }],
            feature_importances: importances,
        };

        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("forest.json");
        std::fs::write(&path, serde_json::to_string(&artifact).expect("serialize"))
            .expect("write");
        ForestClassifier::load(&path).expect("load")
    }

    #[test]
    fn test_contributions_normalized_and_sorted() {
        let classifier = classifier_with_importances(Some(vec![0.1, 0.4, 0.2, 0.2, 0.1]));
        let explainer = ArtifactImportances::from_classifier(&classifier).expect("explainer");

        let contributions = explainer
            .attribute(&PatientFeatures::default(), 0.5)
            .expect("attribute");

        assert_eq!(contributions.len(), 5);
        assert_eq!(contributions[0].feature, "AFC");
        assert!((contributions[0].weight - 0.4).abs() < 1e-12);

        let total: f64 = contributions.iter().map(|c| c.weight).sum();
        assert!((total - 1.0).abs() < 1e-12);

        // Sorted descending.
        for pair in contributions.windows(2) {
            assert!(pair[0].weight >= pair[1].weight);
        }
    }

    #[test]
    fn test_missing_importances_unavailable() {
        let classifier = classifier_with_importances(None);
        assert!(ArtifactImportances::from_classifier(&classifier).is_err());
    }
}
