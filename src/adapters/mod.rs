//! Adapters layer: Concrete implementations of ports.
//!
//! These modules contain the actual integration with external artifacts:
//! - `forest`: pre-trained random-forest classifier from a JSON artifact
//! - `attribution`: feature-attribution panel from artifact importances
//! - `sanitize`: PHI filtering for logs

pub mod attribution;
pub mod forest;
pub mod sanitize;
