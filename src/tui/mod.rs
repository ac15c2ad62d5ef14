//! TUI module: Terminal User Interface using Ratatui.
//!
//! Provides a professional medical-themed interface for:
//! - Dashboard with model status and tier reference
//! - Patient measurement entry (slider controls)
//! - Risk assessment results with recommendations

mod app;
mod styles;
mod ui;

pub use app::App;
pub use styles::MedicalTheme;
