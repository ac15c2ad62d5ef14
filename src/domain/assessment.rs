//! Risk tiering policy and assessment result types.
//!
//! The tiering policy is the decision core of the tool: a pure mapping from
//! a classifier probability to one of three ordered risk tiers and the fixed
//! clinical-recommendation bundle for that tier.

use serde::{Deserialize, Serialize};

/// Probability at or above which an evaluation is tiered High.
pub const HIGH_RISK_THRESHOLD: f64 = 0.6;

/// Probability at or above which an evaluation is tiered Medium.
pub const MEDIUM_RISK_THRESHOLD: f64 = 0.3;

/// Error from the tiering policy.
///
/// A probability outside [0, 1] is a classifier contract violation; the
/// policy fails fast rather than clamp, since a silently repaired value
/// would corrupt the clinical output.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum TieringError {
    #[error("probability {0} is outside the valid range [0, 1]")]
    OutOfRangeInput(f64),
}

/// Risk tier for ovarian hyper-response.
///
/// Ordered: `Low < Medium < High`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskTier {
    /// Low risk of hyper-response
    Low,
    /// Medium risk, standard stimulation acceptable
    Medium,
    /// High risk, protocol adjustment recommended
    High,
}

impl RiskTier {
    /// Map a classifier probability to a tier.
    ///
    /// Thresholds are evaluated high-to-low; the first match wins. This
    /// tie-break is fixed, not configurable at runtime.
    ///
    /// # Errors
    /// Returns `TieringError::OutOfRangeInput` if the probability is not a
    /// finite value in [0, 1].
    pub fn from_probability(probability: f64) -> Result<Self, TieringError> {
        // A range check on a NaN is false, so non-finite values fail here too.
        if !(0.0..=1.0).contains(&probability) {
            return Err(TieringError::OutOfRangeInput(probability));
        }

        if probability >= HIGH_RISK_THRESHOLD {
            Ok(Self::High)
        } else if probability >= MEDIUM_RISK_THRESHOLD {
            Ok(Self::Medium)
        } else {
            Ok(Self::Low)
        }
    }

    /// Get a human-readable description.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Low => "Low risk - Standard stimulation expected",
            Self::Medium => "Medium risk - Monitor response closely",
            Self::High => "High risk - Adjust stimulation protocol",
        }
    }

    /// Get the associated color for TUI display (RGB).
    #[must_use]
    pub fn color(&self) -> (u8, u8, u8) {
        match self {
            Self::Low => (16, 185, 129),    // Emerald (#10B981)
            Self::Medium => (251, 191, 36), // Amber (#FBBF24)
            Self::High => (244, 63, 94),    // Rose (#F43F5E)
        }
    }

    /// Get the fixed clinical-recommendation bundle for this tier.
    ///
    /// Pure lookup: the bundle depends on the tier alone, never on the
    /// probability that produced it.
    #[must_use]
    pub fn recommendations(&self) -> RecommendationBundle {
        match self {
            Self::High => RecommendationBundle {
                gonadotropin_dosing: "reduce gonadotropin dose by >5%",
                stimulation_protocol: "prefer antagonist protocol",
                transfer_timing: "freeze all embryos, defer transfer",
            },
            Self::Medium | Self::Low => RecommendationBundle {
                gonadotropin_dosing: "standard gonadotropin dose",
                stimulation_protocol: "long protocol acceptable",
                transfer_timing: "fresh embryo transfer acceptable",
            },
        }
    }
}

impl std::fmt::Display for RiskTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "LOW"),
            Self::Medium => write!(f, "MEDIUM"),
            Self::High => write!(f, "HIGH"),
        }
    }
}

/// Fixed clinical recommendations for one tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendationBundle {
    /// Gonadotropin dosing adjustment
    #[serde(skip_deserializing)]
    pub gonadotropin_dosing: &'static str,

    /// Stimulation protocol choice
    #[serde(skip_deserializing)]
    pub stimulation_protocol: &'static str,

    /// Embryo transfer timing
    #[serde(skip_deserializing)]
    pub transfer_timing: &'static str,
}

impl RecommendationBundle {
    /// The three recommendation strings in display order.
    #[must_use]
    pub fn lines(&self) -> [&'static str; 3] {
        [
            self.gonadotropin_dosing,
            self.stimulation_protocol,
            self.transfer_timing,
        ]
    }
}

/// Map a probability to its tier and recommendation bundle.
///
/// Pure and deterministic: same probability in, same tier and bundle out,
/// with no hidden state.
///
/// # Errors
/// Returns `TieringError::OutOfRangeInput` for probabilities outside [0, 1].
pub fn classify(probability: f64) -> Result<(RiskTier, RecommendationBundle), TieringError> {
    let tier = RiskTier::from_probability(probability)?;
    Ok((tier, tier.recommendations()))
}

/// A single feature's contribution to one prediction, as reported by the
/// model artifact. Treated as opaque display data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureContribution {
    /// Feature name as trained
    pub feature: String,

    /// Relative weight in [0, 1]
    pub weight: f64,
}

/// Complete assessment record for one evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskAssessment {
    /// Unique identifier
    pub id: String,

    /// Reference to patient (if available)
    pub patient_id: Option<String>,

    /// Classifier probability of hyper-response (0.0 to 1.0)
    pub probability: f64,

    /// Risk classification
    pub tier: RiskTier,

    /// Clinical recommendations for the tier
    pub recommendations: RecommendationBundle,

    /// Optional per-feature attribution (absent when no explainer is configured)
    pub attributions: Option<Vec<FeatureContribution>>,

    /// Timestamp of assessment
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl RiskAssessment {
    /// Create a new assessment from a classifier probability.
    ///
    /// # Errors
    /// Returns `TieringError::OutOfRangeInput` for probabilities outside [0, 1].
    pub fn new(probability: f64) -> Result<Self, TieringError> {
        let (tier, recommendations) = classify(probability)?;
        Ok(Self {
            id: uuid_v4(),
            patient_id: None,
            probability,
            tier,
            recommendations,
            attributions: None,
            created_at: chrono::Utc::now(),
        })
    }

    /// Create an assessment with a patient reference.
    ///
    /// # Errors
    /// Returns `TieringError::OutOfRangeInput` for probabilities outside [0, 1].
    pub fn with_patient(
        probability: f64,
        patient_id: impl Into<String>,
    ) -> Result<Self, TieringError> {
        let mut assessment = Self::new(probability)?;
        assessment.patient_id = Some(patient_id.into());
        Ok(assessment)
    }
}

/// Generate a simple UUID v4 (random) using CSPRNG.
///
/// Uses ChaCha20Rng seeded from OS entropy to ensure cryptographic randomness
/// on all platforms. This prevents UUID prediction attacks.
fn uuid_v4() -> String {
    use rand::Rng;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    // Use CSPRNG instead of thread_rng() for guaranteed cryptographic security
    let mut rng = ChaCha20Rng::from_entropy();
    let bytes: [u8; 16] = rng.gen();

    format!(
        "{:02x}{:02x}{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}{:02x}{:02x}{:02x}{:02x}",
        bytes[0], bytes[1], bytes[2], bytes[3],
        bytes[4], bytes[5],
        (bytes[6] & 0x0f) | 0x40, bytes[7],
        (bytes[8] & 0x3f) | 0x80, bytes[9],
        bytes[10], bytes[11], bytes[12], bytes[13], bytes[14], bytes[15]
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_boundaries_exact() {
        assert_eq!(RiskTier::from_probability(0.6), Ok(RiskTier::High));
        assert_eq!(RiskTier::from_probability(0.599_999_9), Ok(RiskTier::Medium));
        assert_eq!(RiskTier::from_probability(0.3), Ok(RiskTier::Medium));
        assert_eq!(RiskTier::from_probability(0.299_999_9), Ok(RiskTier::Low));
        assert_eq!(RiskTier::from_probability(0.0), Ok(RiskTier::Low));
        assert_eq!(RiskTier::from_probability(1.0), Ok(RiskTier::High));
    }

    #[test]
    fn test_out_of_range_rejected() {
        assert_eq!(
            classify(-0.01),
            Err(TieringError::OutOfRangeInput(-0.01))
        );
        assert_eq!(classify(1.01), Err(TieringError::OutOfRangeInput(1.01)));
        assert!(classify(f64::NAN).is_err());
        assert!(classify(f64::INFINITY).is_err());
        assert!(classify(f64::NEG_INFINITY).is_err());
    }

    #[test]
    fn test_tier_monotonic_in_probability() {
        let mut last = RiskTier::Low;
        for step in 0..=1000 {
            let p = f64::from(step) / 1000.0;
            let tier = RiskTier::from_probability(p).expect("in range");
            assert!(tier >= last, "tier regressed at p={p}");
            last = tier;
        }
    }

    #[test]
    fn test_classify_idempotent() {
        let first = classify(0.45).expect("in range");
        for _ in 0..10 {
            assert_eq!(classify(0.45).expect("in range"), first);
        }
    }

    #[test]
    fn test_bundle_determined_by_tier_alone() {
        // Two probabilities in the same tier yield identical bundles.
        let (tier_a, bundle_a) = classify(0.61).expect("in range");
        let (tier_b, bundle_b) = classify(0.99).expect("in range");
        assert_eq!(tier_a, tier_b);
        assert_eq!(bundle_a, bundle_b);

        // Medium and Low share the non-high bundle.
        let (_, medium) = classify(0.45).expect("in range");
        let (_, low) = classify(0.1).expect("in range");
        assert_eq!(medium, low);
    }

    #[test]
    fn test_high_bundle_contents() {
        let (tier, bundle) = classify(0.65).expect("in range");
        assert_eq!(tier, RiskTier::High);
        assert_eq!(bundle.gonadotropin_dosing, "reduce gonadotropin dose by >5%");
        assert_eq!(bundle.stimulation_protocol, "prefer antagonist protocol");
        assert_eq!(bundle.transfer_timing, "freeze all embryos, defer transfer");
    }

    #[test]
    fn test_assessment_creation() {
        let assessment = RiskAssessment::new(0.75).expect("in range");
        assert_eq!(assessment.tier, RiskTier::High);
        assert!(assessment.patient_id.is_none());
        assert!(assessment.attributions.is_none());

        let err = RiskAssessment::new(1.5).expect_err("out of range");
        assert_eq!(err, TieringError::OutOfRangeInput(1.5));
    }

    #[test]
    fn test_uuid_generation() {
        let id1 = uuid_v4();
        let id2 = uuid_v4();
        assert_ne!(id1, id2);
        assert_eq!(id1.len(), 36); // UUID format with dashes
    }
}
