//! Patient measurement input form.
//!
//! Slider-style controls: each of the five measurements is a bounded value
//! adjusted by its step with the arrow keys, mirroring the bounded inputs
//! the clinic workflow expects.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
    Frame,
};
use zeroize::Zeroize;

use crate::domain::PatientFeatures;
use crate::tui::styles::MedicalTheme;

/// Slider definition for one measurement.
#[derive(Debug, Clone)]
pub struct SliderField {
    pub label: &'static str,
    pub unit: &'static str,
    pub value: f64,
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub default: f64,
    /// Decimal places shown for the value
    pub precision: usize,
}

impl SliderField {
    fn adjust(&mut self, steps: f64) {
        let raw = self.value + steps * self.step;
        // Snap to the step grid so repeated 0.1 adjustments don't drift.
        let snapped = (raw / self.step).round() * self.step;
        self.value = snapped.clamp(self.min, self.max);
    }

    /// Slider position as a ratio of its range.
    #[must_use]
    pub fn ratio(&self) -> f64 {
        ((self.value - self.min) / (self.max - self.min)).clamp(0.0, 1.0)
    }

    /// Formatted value with unit, e.g. "3.0 ng/mL".
    #[must_use]
    pub fn display(&self) -> String {
        format!("{:.*} {}", self.precision, self.value, self.unit)
    }
}

/// Patient form state
pub struct PatientFormState {
    pub fields: Vec<SliderField>,
    pub selected_field: usize,
    pub error_message: Option<String>,
}

impl Default for PatientFormState {
    fn default() -> Self {
        // Field order is the model's feature order: AMH, AFC, FSH, age, BMI.
        Self {
            fields: vec![
                SliderField {
                    label: "AMH",
                    unit: "ng/mL",
                    value: 3.0,
                    min: 0.0,
                    max: 10.0,
                    step: 0.1,
                    default: 3.0,
                    precision: 1,
                },
                SliderField {
                    label: "AFC",
                    unit: "follicles",
                    value: 15.0,
                    min: 0.0,
                    max: 40.0,
                    step: 1.0,
                    default: 15.0,
                    precision: 0,
                },
                SliderField {
                    label: "Basal FSH",
                    unit: "IU/L",
                    value: 8.0,
                    min: 1.0,
                    max: 20.0,
                    step: 0.1,
                    default: 8.0,
                    precision: 1,
                },
                SliderField {
                    label: "Age",
                    unit: "years",
                    value: 30.0,
                    min: 18.0,
                    max: 50.0,
                    step: 1.0,
                    default: 30.0,
                    precision: 0,
                },
                SliderField {
                    label: "BMI",
                    unit: "kg/m²",
                    value: 22.0,
                    min: 15.0,
                    max: 40.0,
                    step: 0.1,
                    default: 22.0,
                    precision: 1,
                },
            ],
            selected_field: 0,
            error_message: None,
        }
    }
}

impl PatientFormState {
    /// Move to the next field
    pub fn next_field(&mut self) {
        self.selected_field = (self.selected_field + 1) % self.fields.len();
    }

    /// Move to the previous field
    pub fn prev_field(&mut self) {
        if self.selected_field == 0 {
            self.selected_field = self.fields.len() - 1;
        } else {
            self.selected_field -= 1;
        }
    }

    /// Increase the selected field by one step
    pub fn increase(&mut self) {
        self.fields[self.selected_field].adjust(1.0);
        self.error_message = None;
    }

    /// Decrease the selected field by one step
    pub fn decrease(&mut self) {
        self.fields[self.selected_field].adjust(-1.0);
        self.error_message = None;
    }

    /// Increase the selected field by ten steps
    pub fn increase_coarse(&mut self) {
        self.fields[self.selected_field].adjust(10.0);
        self.error_message = None;
    }

    /// Decrease the selected field by ten steps
    pub fn decrease_coarse(&mut self) {
        self.fields[self.selected_field].adjust(-10.0);
        self.error_message = None;
    }

    /// Snap the selected field to its minimum
    pub fn set_min(&mut self) {
        let field = &mut self.fields[self.selected_field];
        field.value = field.min;
    }

    /// Snap the selected field to its maximum
    pub fn set_max(&mut self) {
        let field = &mut self.fields[self.selected_field];
        field.value = field.max;
    }

    /// Reset all sliders to their defaults
    pub fn reset(&mut self) {
        for field in self.fields.iter_mut() {
            field.value = field.default;
        }
        self.error_message = None;
    }

    /// Wipe entered measurements from memory and restore defaults.
    ///
    /// Intended to be called after an evaluation completes so entered
    /// values do not persist in the UI state.
    pub fn clear_sensitive(&mut self) {
        for field in self.fields.iter_mut() {
            field.value.zeroize();
            field.value = field.default;
        }
        self.error_message = None;
        self.selected_field = 0;
    }

    /// Convert slider values to `PatientFeatures`.
    ///
    /// # Errors
    /// Returns an error string if the values cannot form a feature vector.
    pub fn to_patient_features(&self) -> Result<PatientFeatures, String> {
        let values: Vec<f64> = self.fields.iter().map(|f| f.value).collect();
        PatientFeatures::from_vec(&values)
    }
}

/// Render the patient measurement form
pub fn render_patient_form(f: &mut Frame, area: Rect, state: &PatientFormState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Sliders
            Constraint::Length(3), // Footer/error
        ])
        .split(area);

    render_form_header(f, chunks[0]);
    render_sliders(f, chunks[1], state);
    render_form_footer(f, chunks[2], state);
}

fn render_form_header(f: &mut Frame, area: Rect) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(" ", MedicalTheme::text()),
        Span::styled("Patient Measurements", MedicalTheme::title()),
        Span::styled(
            " │ Ovarian Reserve & Baseline",
            MedicalTheme::text_secondary(),
        ),
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(header, area);
}

fn render_sliders(f: &mut Frame, area: Rect, state: &PatientFormState) {
    // Section labels mirror the source workflow: reserve markers first,
    // then baseline characteristics.
    let slider_height = 3;
    let constraints: Vec<Constraint> = vec![
        Constraint::Length(1),             // "Ovarian Reserve"
        Constraint::Length(slider_height), // AMH
        Constraint::Length(slider_height), // AFC
        Constraint::Length(slider_height), // FSH
        Constraint::Length(1),             // "Baseline"
        Constraint::Length(slider_height), // Age
        Constraint::Length(slider_height), // BMI
        Constraint::Min(0),
    ];

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .margin(1)
        .split(area);

    let section = |text: &'static str| {
        Paragraph::new(Line::from(Span::styled(text, MedicalTheme::subtitle())))
    };
    f.render_widget(section("Ovarian Reserve"), chunks[0]);
    f.render_widget(section("Baseline"), chunks[4]);

    let slots = [1usize, 2, 3, 5, 6];
    for (i, field) in state.fields.iter().enumerate() {
        render_slider(f, chunks[slots[i]], field, i == state.selected_field);
    }
}

fn render_slider(f: &mut Frame, area: Rect, field: &SliderField, is_selected: bool) {
    let border_style = if is_selected {
        MedicalTheme::border_focused()
    } else {
        MedicalTheme::border()
    };
    let title_style = if is_selected {
        MedicalTheme::focused()
    } else {
        MedicalTheme::text_secondary()
    };
    let gauge_style = if is_selected {
        MedicalTheme::focused()
    } else {
        MedicalTheme::text_secondary()
    };

    let block = Block::default()
        .title(Span::styled(format!(" {} ", field.label), title_style))
        .borders(Borders::ALL)
        .border_style(border_style);

    let gauge = Gauge::default()
        .block(block)
        .gauge_style(gauge_style)
        .ratio(field.ratio())
        .label(field.display());

    f.render_widget(gauge, area);
}

fn render_form_footer(f: &mut Frame, area: Rect, state: &PatientFormState) {
    let content = if let Some(err) = &state.error_message {
        Line::from(vec![
            Span::styled("! ", MedicalTheme::danger()),
            Span::styled(err.clone(), MedicalTheme::danger()),
        ])
    } else {
        Line::from(vec![
            Span::styled("[↑↓] ", MedicalTheme::key_hint()),
            Span::styled("Select ", MedicalTheme::key_desc()),
            Span::styled("[←→] ", MedicalTheme::key_hint()),
            Span::styled("Adjust ", MedicalTheme::key_desc()),
            Span::styled("[PgUp/PgDn] ", MedicalTheme::key_hint()),
            Span::styled("Coarse ", MedicalTheme::key_desc()),
            Span::styled("[R] ", MedicalTheme::key_hint()),
            Span::styled("Reset ", MedicalTheme::key_desc()),
            Span::styled("[Enter] ", MedicalTheme::key_hint()),
            Span::styled("Assess ", MedicalTheme::key_desc()),
            Span::styled("[Esc] ", MedicalTheme::key_hint()),
            Span::styled("Back", MedicalTheme::key_desc()),
        ])
    };

    let footer = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(footer, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_patient() {
        let state = PatientFormState::default();
        let features = state.to_patient_features().expect("convert");
        assert_eq!(features, PatientFeatures::default());
    }

    #[test]
    fn test_adjust_clamps_at_bounds() {
        let mut state = PatientFormState::default();
        // AMH: 3.0, step 0.1, max 10.0
        for _ in 0..200 {
            state.increase();
        }
        assert!((state.fields[0].value - 10.0).abs() < f64::EPSILON);

        for _ in 0..200 {
            state.decrease();
        }
        assert!((state.fields[0].value - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_adjust_snaps_to_step_grid() {
        let mut state = PatientFormState::default();
        // Thirty 0.1-steps up from 3.0 must land exactly on 6.0, with no
        // float drift that would fail whole-count validation elsewhere.
        for _ in 0..30 {
            state.increase();
        }
        let amh = state.fields[0].value;
        assert!((amh - 6.0).abs() < 1e-9, "drifted to {amh}");
    }

    #[test]
    fn test_integer_fields_stay_whole() {
        let mut state = PatientFormState::default();
        state.selected_field = 1; // AFC
        state.increase();
        state.increase();
        state.decrease();
        let features = state.to_patient_features().expect("convert");
        assert!(features.validate().is_ok());
        assert!((features.afc - 16.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_min_max_and_reset() {
        let mut state = PatientFormState::default();
        state.set_max();
        assert!((state.fields[0].value - 10.0).abs() < f64::EPSILON);
        state.set_min();
        assert!((state.fields[0].value - 0.0).abs() < f64::EPSILON);

        state.reset();
        assert!((state.fields[0].value - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_clear_sensitive_restores_defaults() {
        let mut state = PatientFormState::default();
        state.selected_field = 4;
        state.increase_coarse();
        state.clear_sensitive();

        assert_eq!(state.selected_field, 0);
        let features = state.to_patient_features().expect("convert");
        assert_eq!(features, PatientFeatures::default());
    }
}
