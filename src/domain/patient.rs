//! Patient data types for ovarian hyper-response prediction.
//!
//! Features mirror the ovarian-reserve workup collected before controlled
//! ovarian stimulation.

use serde::{Deserialize, Serialize};

/// Raw patient data input from the TUI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientData {
    /// Patient identifier (local only, never transmitted)
    pub id: Option<String>,

    /// Clinical features for prediction
    pub features: PatientFeatures,

    /// Timestamp of data entry
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Clinical features for ovarian hyper-response risk prediction.
///
/// 5 features matching the trained forest artifact (forest.json):
/// AMH, AFC, FSH, age, bmi
///
/// The trained model consumes the vector in exactly this order. `to_vec`
/// is the single place that order is written down in code; the artifact
/// loader cross-checks it against the artifact's own `feature_names`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientFeatures {
    /// Anti-Müllerian Hormone in ng/mL (0-10)
    pub amh: f64,

    /// Antral Follicle Count (0-40, whole follicles)
    pub afc: f64,

    /// Basal FSH in IU/L (1-20)
    pub fsh: f64,

    /// Age in years (18-50, whole years)
    pub age: f64,

    /// Body Mass Index in kg/m² (15-40)
    pub bmi: f64,
}

impl Default for PatientFeatures {
    /// Defaults match the input form's initial slider positions.
    fn default() -> Self {
        Self {
            amh: 3.0,
            afc: 15.0,
            fsh: 8.0,
            age: 30.0,
            bmi: 22.0,
        }
    }
}

impl PatientFeatures {
    /// Convert features to a vector for model inference.
    /// Order matches the trained artifact: AMH, AFC, FSH, age, bmi
    #[must_use]
    pub fn to_vec(&self) -> Vec<f64> {
        vec![self.amh, self.afc, self.fsh, self.age, self.bmi]
    }

    /// Create features from a vector in artifact order.
    ///
    /// # Errors
    /// Returns error if vector length is not 5.
    pub fn from_vec(v: &[f64]) -> Result<Self, String> {
        if v.len() != FEATURE_COUNT {
            return Err(format!("Expected {} features, got {}", FEATURE_COUNT, v.len()));
        }

        Ok(Self {
            amh: v[0],
            afc: v[1],
            fsh: v[2],
            age: v[3],
            bmi: v[4],
        })
    }

    /// Validate that all features are within expected ranges.
    ///
    /// Count-like fields (AFC, age) must also be whole numbers; the form
    /// steps them by 1, but data arriving through other paths is checked
    /// here too.
    ///
    /// # Errors
    /// Returns validation errors as a vector of strings.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if !(0.0..=10.0).contains(&self.amh) {
            errors.push(format!("AMH {} out of range [0, 10]", self.amh));
        }
        if !(0.0..=40.0).contains(&self.afc) {
            errors.push(format!("AFC {} out of range [0, 40]", self.afc));
        }
        if self.afc.fract() != 0.0 {
            errors.push(format!("AFC {} must be a whole count", self.afc));
        }
        if !(1.0..=20.0).contains(&self.fsh) {
            errors.push(format!("FSH {} out of range [1, 20]", self.fsh));
        }
        if !(18.0..=50.0).contains(&self.age) {
            errors.push(format!("Age {} out of range [18, 50]", self.age));
        }
        if self.age.fract() != 0.0 {
            errors.push(format!("Age {} must be whole years", self.age));
        }
        if !(15.0..=40.0).contains(&self.bmi) {
            errors.push(format!("BMI {} out of range [15, 40]", self.bmi));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl PatientData {
    /// Create new patient data with the given features.
    #[must_use]
    pub fn new(features: PatientFeatures) -> Self {
        Self {
            id: None,
            features,
            created_at: chrono::Utc::now(),
        }
    }

    /// Create new patient data with an ID.
    #[must_use]
    pub fn with_id(id: impl Into<String>, features: PatientFeatures) -> Self {
        Self {
            id: Some(id.into()),
            features,
            created_at: chrono::Utc::now(),
        }
    }
}

/// Number of model features.
pub const FEATURE_COUNT: usize = 5;

/// Feature names matching the trained artifact.
/// Order: AMH, AFC, FSH, age, bmi
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = ["AMH", "AFC", "FSH", "age", "bmi"];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_features_to_vec_order() {
        let features = PatientFeatures {
            amh: 3.2,
            afc: 15.0,
            fsh: 8.1,
            age: 30.0,
            bmi: 22.4,
        };

        let vec = features.to_vec();
        assert_eq!(vec.len(), FEATURE_COUNT);
        // AMH first, BMI last: the artifact depends on this exact order.
        assert!((vec[0] - 3.2).abs() < f64::EPSILON);
        assert!((vec[1] - 15.0).abs() < f64::EPSILON);
        assert!((vec[4] - 22.4).abs() < f64::EPSILON);
    }

    #[test]
    fn test_features_from_vec() {
        let v = vec![3.2, 15.0, 8.1, 30.0, 22.4];
        let features = PatientFeatures::from_vec(&v).expect("Should parse");
        assert!((features.amh - 3.2).abs() < f64::EPSILON);
        assert!((features.bmi - 22.4).abs() < f64::EPSILON);

        assert!(PatientFeatures::from_vec(&[1.0, 2.0]).is_err());
    }

    #[test]
    fn test_roundtrip_preserves_order() {
        let original = PatientFeatures::default();
        let back = PatientFeatures::from_vec(&original.to_vec()).expect("Should parse");
        assert_eq!(original, back);
    }

    #[test]
    fn test_validation() {
        assert!(PatientFeatures::default().validate().is_ok());

        let invalid = PatientFeatures {
            amh: 11.0, // invalid (> 10)
            age: 17.0, // invalid (< 18)
            ..Default::default()
        };
        let errors = invalid.validate().expect_err("Should reject");
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_validation_rejects_fractional_counts() {
        let invalid = PatientFeatures {
            afc: 14.5,
            ..Default::default()
        };
        assert!(invalid.validate().is_err());

        let invalid = PatientFeatures {
            age: 30.5,
            ..Default::default()
        };
        assert!(invalid.validate().is_err());
    }
}
