//! Forest adapter: Implementation of `RiskClassifier` from a serialized
//! random-forest artifact.
//!
//! The training pipeline exports the fitted forest as a single JSON file.
//! This adapter loads that file once at construction, validates it against
//! the domain feature order, and answers predictions by plain tree
//! traversal.
//!
//! # Feature order
//!
//! The artifact records the feature order it was trained with. Loading
//! fails unless that order equals `domain::FEATURE_NAMES` exactly — a
//! reordered artifact would otherwise mis-predict silently.
//!
//! # Positive class
//!
//! The artifact declares `positive_class` explicitly. Leaf fractions and
//! the reported probability always use that index; nothing in this adapter
//! hard-codes class 1.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::{PatientFeatures, FEATURE_COUNT, FEATURE_NAMES};
use crate::ports::{ClassifierError, RiskClassifier};

/// Artifact schema version this adapter understands.
const ARTIFACT_VERSION: u32 = 1;

/// Default artifact file name inside a model directory.
const ARTIFACT_FILE: &str = "forest.json";

/// One node of an array-encoded binary decision tree.
///
/// Children are referenced by index into the owning tree's `nodes` vector.
/// The exporter writes nodes in preorder, so child indices are always
/// greater than the parent's; validation enforces this, which also rules
/// out cycles.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TreeNode {
    /// Internal split: go left when `x[feature] <= threshold`.
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    /// Leaf: per-class training-sample counts.
    Leaf { class_counts: Vec<f64> },
}

/// A single decision tree, rooted at node 0.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tree {
    pub nodes: Vec<TreeNode>,
}

/// Forest parameters exported by the training pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestArtifact {
    pub version: u32,
    pub feature_names: Vec<String>,
    pub n_classes: usize,
    pub positive_class: usize,
    pub trees: Vec<Tree>,
    /// Impurity-based importances computed at training time (optional).
    #[serde(default)]
    pub feature_importances: Option<Vec<f64>>,
}

/// Static summary of a loaded model, for display.
#[derive(Debug, Clone)]
pub struct ModelInfo {
    pub path: PathBuf,
    pub tree_count: usize,
    pub feature_names: Vec<String>,
    pub positive_class: usize,
}

/// Random-forest classifier backed by a JSON artifact on local disk.
///
/// The artifact is loaded once and never mutated; the classifier is pure
/// across calls.
#[derive(Debug)]
pub struct ForestClassifier {
    artifact: ForestArtifact,
    path: PathBuf,
}

impl ForestClassifier {
    /// Load and validate the artifact from `path`.
    ///
    /// `path` may be the artifact file itself or a directory containing
    /// `forest.json`.
    ///
    /// # Errors
    /// Returns `ClassifierError::ModelUnavailable` if the file cannot be
    /// read, parsed, or validated.
    pub fn load(path: &Path) -> Result<Self, ClassifierError> {
        let artifact_path = if path.is_dir() {
            path.join(ARTIFACT_FILE)
        } else {
            path.to_path_buf()
        };

        let content = std::fs::read_to_string(&artifact_path).map_err(|e| {
            ClassifierError::ModelUnavailable(format!(
                "cannot read artifact {artifact_path:?}: {e}"
            ))
        })?;
        let artifact: ForestArtifact = serde_json::from_str(&content).map_err(|e| {
            ClassifierError::ModelUnavailable(format!(
                "cannot parse artifact {artifact_path:?}: {e}"
            ))
        })?;

        Self::validate(&artifact)?;

        tracing::info!(
            "Loaded forest artifact from {:?} ({} trees, {} features, positive class {})",
            artifact_path,
            artifact.trees.len(),
            artifact.feature_names.len(),
            artifact.positive_class
        );

        Ok(Self {
            artifact,
            path: artifact_path,
        })
    }

    /// Structural validation of a parsed artifact.
    fn validate(artifact: &ForestArtifact) -> Result<(), ClassifierError> {
        if artifact.version != ARTIFACT_VERSION {
            return Err(ClassifierError::ModelUnavailable(format!(
                "unsupported artifact version {} (expected {})",
                artifact.version, ARTIFACT_VERSION
            )));
        }

        if artifact.feature_names != FEATURE_NAMES {
            return Err(ClassifierError::ModelUnavailable(format!(
                "artifact feature order {:?} does not match expected {:?}",
                artifact.feature_names, FEATURE_NAMES
            )));
        }

        if artifact.n_classes < 2 {
            return Err(ClassifierError::ModelUnavailable(format!(
                "artifact must have at least 2 classes, got {}",
                artifact.n_classes
            )));
        }
        if artifact.positive_class >= artifact.n_classes {
            return Err(ClassifierError::ModelUnavailable(format!(
                "positive_class {} out of range for {} classes",
                artifact.positive_class, artifact.n_classes
            )));
        }

        if artifact.trees.is_empty() {
            return Err(ClassifierError::ModelUnavailable(
                "artifact contains no trees".into(),
            ));
        }

        for (t, tree) in artifact.trees.iter().enumerate() {
            Self::validate_tree(t, tree, artifact.n_classes)?;
        }

        if let Some(importances) = &artifact.feature_importances {
            if importances.len() != FEATURE_COUNT {
                return Err(ClassifierError::ModelUnavailable(format!(
                    "feature_importances length {} does not match {} features",
                    importances.len(),
                    FEATURE_COUNT
                )));
            }
            if importances.iter().any(|w| !w.is_finite() || *w < 0.0) {
                return Err(ClassifierError::ModelUnavailable(
                    "feature_importances must be finite and non-negative".into(),
                ));
            }
        }

        Ok(())
    }

    fn validate_tree(index: usize, tree: &Tree, n_classes: usize) -> Result<(), ClassifierError> {
        if tree.nodes.is_empty() {
            return Err(ClassifierError::ModelUnavailable(format!(
                "tree {index} has no nodes"
            )));
        }

        for (i, node) in tree.nodes.iter().enumerate() {
            match node {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if *feature >= FEATURE_COUNT {
                        return Err(ClassifierError::ModelUnavailable(format!(
                            "tree {index} node {i} splits on unknown feature {feature}"
                        )));
                    }
                    if !threshold.is_finite() {
                        return Err(ClassifierError::ModelUnavailable(format!(
                            "tree {index} node {i} has non-finite threshold"
                        )));
                    }
                    // Preorder invariant: children come strictly after the parent.
                    if *left <= i || *right <= i || *left >= tree.nodes.len() || *right >= tree.nodes.len()
                    {
                        return Err(ClassifierError::ModelUnavailable(format!(
                            "tree {index} node {i} has invalid child indices ({left}, {right})"
                        )));
                    }
                }
                TreeNode::Leaf { class_counts } => {
                    if class_counts.len() != n_classes {
                        return Err(ClassifierError::ModelUnavailable(format!(
                            "tree {index} node {i} leaf has {} counts, expected {n_classes}",
                            class_counts.len()
                        )));
                    }
                    let total: f64 = class_counts.iter().sum();
                    if class_counts.iter().any(|c| !c.is_finite() || *c < 0.0) || total <= 0.0 {
                        return Err(ClassifierError::ModelUnavailable(format!(
                            "tree {index} node {i} leaf has invalid class counts"
                        )));
                    }
                }
            }
        }

        Ok(())
    }

    /// Positive-class fraction at the leaf reached by `x` in one tree.
    fn tree_positive_fraction(&self, tree: &Tree, x: &[f64]) -> f64 {
        let mut node = &tree.nodes[0];
        loop {
            match node {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let next = if x[*feature] <= *threshold { *left } else { *right };
                    node = &tree.nodes[next];
                }
                TreeNode::Leaf { class_counts } => {
                    let total: f64 = class_counts.iter().sum();
                    return class_counts[self.artifact.positive_class] / total;
                }
            }
        }
    }

    /// Summary of the loaded model for the dashboard.
    #[must_use]
    pub fn model_info(&self) -> ModelInfo {
        ModelInfo {
            path: self.path.clone(),
            tree_count: self.artifact.trees.len(),
            feature_names: self.artifact.feature_names.clone(),
            positive_class: self.artifact.positive_class,
        }
    }

    /// Importances precomputed by the training pipeline, if the artifact
    /// carries them.
    #[must_use]
    pub fn feature_importances(&self) -> Option<&[f64]> {
        self.artifact.feature_importances.as_deref()
    }
}

impl RiskClassifier for ForestClassifier {
    fn predict_positive_probability(
        &self,
        features: &PatientFeatures,
    ) -> Result<f64, ClassifierError> {
        let x = features.to_vec();

        let sum: f64 = self
            .artifact
            .trees
            .iter()
            .map(|tree| self.tree_positive_fraction(tree, &x))
            .sum();
        let probability = sum / self.artifact.trees.len() as f64;

        // Leaf fractions are in [0, 1] by validation; this guards the port
        // contract against a corrupted artifact slipping through.
        if !(0.0..=1.0).contains(&probability) {
            return Err(ClassifierError::ModelUnavailable(format!(
                "artifact produced probability {probability} outside [0, 1]"
            )));
        }

        tracing::debug!(
            "Forest prediction: {:.4} over {} trees",
            probability,
            self.artifact.trees.len()
        );

        Ok(probability)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn names() -> Vec<String> {
        FEATURE_NAMES.iter().map(|s| (*s).to_string()).collect()
    }

    /// Single stump: AMH <= 5.0 → [35, 65], else [80, 20].
    fn stump() -> Tree {
        Tree {
            nodes: vec![
                TreeNode::Split {
                    feature: 0,
                    threshold: 5.0,
                    left: 1,
                    right: 2,
                },
                TreeNode::Leaf {
                    class_counts: vec![35.0, 65.0],
                },
                TreeNode::Leaf {
                    class_counts: vec![80.0, 20.0],
                },
            ],
        }
    }

    fn artifact(trees: Vec<Tree>) -> ForestArtifact {
        ForestArtifact {
            version: 1,
            feature_names: names(),
            n_classes: 2,
            positive_class: 1,
            trees,
            feature_importances: None,
        }
    }

    fn write_artifact(dir: &Path, artifact: &ForestArtifact) {
        let json = serde_json::to_string_pretty(artifact).expect("serialize artifact");
        std::fs::write(dir.join(ARTIFACT_FILE), json).expect("write artifact");
    }

    fn load_from(artifact: &ForestArtifact) -> Result<ForestClassifier, ClassifierError> {
        let temp = tempdir().expect("tempdir");
        write_artifact(temp.path(), artifact);
        ForestClassifier::load(temp.path())
    }

    #[test]
    fn test_single_tree_yields_leaf_fraction() {
        let classifier = load_from(&artifact(vec![stump()])).expect("load");

        let low_amh = PatientFeatures {
            amh: 3.0,
            ..Default::default()
        };
        let p = classifier
            .predict_positive_probability(&low_amh)
            .expect("predict");
        assert!((p - 0.65).abs() < 1e-12);

        let high_amh = PatientFeatures {
            amh: 8.0,
            ..Default::default()
        };
        let p = classifier
            .predict_positive_probability(&high_amh)
            .expect("predict");
        assert!((p - 0.20).abs() < 1e-12);
    }

    #[test]
    fn test_forest_averages_trees() {
        let constant = Tree {
            nodes: vec![TreeNode::Leaf {
                class_counts: vec![1.0, 3.0],
            }],
        };
        let classifier = load_from(&artifact(vec![stump(), constant])).expect("load");

        let features = PatientFeatures {
            amh: 3.0,
            ..Default::default()
        };
        let p = classifier
            .predict_positive_probability(&features)
            .expect("predict");
        // mean(0.65, 0.75)
        assert!((p - 0.70).abs() < 1e-12);
    }

    #[test]
    fn test_prediction_is_pure() {
        let classifier = load_from(&artifact(vec![stump()])).expect("load");
        let features = PatientFeatures::default();
        let first = classifier
            .predict_positive_probability(&features)
            .expect("predict");
        for _ in 0..5 {
            let again = classifier
                .predict_positive_probability(&features)
                .expect("predict");
            assert!((first - again).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn test_positive_class_index_is_honored() {
        // Same stump, but the artifact declares class 0 as positive.
        let mut a = artifact(vec![stump()]);
        a.positive_class = 0;
        let classifier = load_from(&a).expect("load");

        let features = PatientFeatures {
            amh: 3.0,
            ..Default::default()
        };
        let p = classifier
            .predict_positive_probability(&features)
            .expect("predict");
        assert!((p - 0.35).abs() < 1e-12);
    }

    #[test]
    fn test_load_rejects_missing_file() {
        let temp = tempdir().expect("tempdir");
        let err = ForestClassifier::load(temp.path()).expect_err("must fail");
        assert!(matches!(err, ClassifierError::ModelUnavailable(_)));
    }

    #[test]
    fn test_load_rejects_malformed_json() {
        let temp = tempdir().expect("tempdir");
        std::fs::write(temp.path().join(ARTIFACT_FILE), "{ not json").expect("write");
        let err = ForestClassifier::load(temp.path()).expect_err("must fail");
        assert!(matches!(err, ClassifierError::ModelUnavailable(_)));
    }

    #[test]
    fn test_load_rejects_wrong_version() {
        let mut a = artifact(vec![stump()]);
        a.version = 2;
        assert!(load_from(&a).is_err());
    }

    #[test]
    fn test_load_rejects_reordered_features() {
        let mut a = artifact(vec![stump()]);
        a.feature_names.swap(0, 1); // AFC, AMH, ...
        let err = load_from(&a).expect_err("must fail");
        assert!(err.to_string().contains("feature order"));
    }

    #[test]
    fn test_load_rejects_bad_positive_class() {
        let mut a = artifact(vec![stump()]);
        a.positive_class = 2;
        assert!(load_from(&a).is_err());
    }

    #[test]
    fn test_load_rejects_empty_forest() {
        assert!(load_from(&artifact(vec![])).is_err());
    }

    #[test]
    fn test_load_rejects_backward_child_index() {
        let broken = Tree {
            nodes: vec![
                TreeNode::Split {
                    feature: 0,
                    threshold: 5.0,
                    left: 0, // points at itself
                    right: 1,
                },
                TreeNode::Leaf {
                    class_counts: vec![1.0, 1.0],
                },
            ],
        };
        assert!(load_from(&artifact(vec![broken])).is_err());
    }

    #[test]
    fn test_load_rejects_empty_leaf() {
        let broken = Tree {
            nodes: vec![TreeNode::Leaf {
                class_counts: vec![0.0, 0.0],
            }],
        };
        assert!(load_from(&artifact(vec![broken])).is_err());
    }

    #[test]
    fn test_load_rejects_wrong_importances_length() {
        let mut a = artifact(vec![stump()]);
        a.feature_importances = Some(vec![0.5, 0.5]);
        assert!(load_from(&a).is_err());
    }

    #[test]
    fn test_shipped_artifact_discriminates_reserve() {
        let classifier = ForestClassifier::load(Path::new("models")).expect("shipped artifact");

        let strong_reserve = PatientFeatures {
            amh: 8.0,
            afc: 30.0,
            fsh: 5.0,
            age: 28.0,
            bmi: 21.0,
        };
        let diminished_reserve = PatientFeatures {
            amh: 0.5,
            afc: 5.0,
            fsh: 12.0,
            age: 42.0,
            bmi: 30.0,
        };

        let p_strong = classifier
            .predict_positive_probability(&strong_reserve)
            .expect("predict");
        let p_weak = classifier
            .predict_positive_probability(&diminished_reserve)
            .expect("predict");

        assert!(p_strong > p_weak);
        assert!(p_strong >= 0.6, "strong reserve should tier High, got {p_strong}");
        assert!(p_weak < 0.3, "diminished reserve should tier Low, got {p_weak}");
    }

    #[test]
    fn test_model_info() {
        let mut a = artifact(vec![stump()]);
        a.feature_importances = Some(vec![0.4, 0.3, 0.15, 0.1, 0.05]);
        let classifier = load_from(&a).expect("load");

        let info = classifier.model_info();
        assert_eq!(info.tree_count, 1);
        assert_eq!(info.feature_names, names());
        assert_eq!(info.positive_class, 1);
        assert_eq!(classifier.feature_importances().map(<[f64]>::len), Some(5));
    }
}
