//! # ovares
//!
//! Ovarian hyper-response risk assessment for controlled ovarian stimulation.
//!
//! This crate provides:
//! - A pre-trained random-forest classifier over five patient measurements
//! - A fixed three-tier risk policy with clinical recommendation bundles
//! - Terminal UI for local-only use
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture:
//! - `domain`: Core business types (patient features, tiering policy, assessment)
//! - `ports`: Trait definitions for external operations
//! - `adapters`: Concrete implementations (forest artifact, attribution, log scrubbing)
//! - `application`: Use cases orchestrating domain and ports
//! - `tui`: Terminal user interface

pub mod adapters;
pub mod application;
pub mod domain;
pub mod ports;
pub mod tui;

pub use domain::{PatientData, RiskAssessment, RiskTier};

/// Result type for ovares operations
pub type Result<T> = std::result::Result<T, OvaresError>;

/// Main error type for ovares
#[derive(Debug, thiserror::Error)]
pub enum OvaresError {
    #[error("risk tiering failed: {0}")]
    Tiering(#[from] domain::TieringError),

    #[error("classifier failed: {0}")]
    Classifier(#[from] ports::ClassifierError),

    #[error("invalid patient data: {0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
