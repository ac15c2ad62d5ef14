//! Main TUI application state machine.
//!
//! Handles:
//! - Screen navigation
//! - Input event handling
//! - Service integration
//!
//! Evaluation is synchronous: a forest traversal is effectively instant, so
//! the submit handler runs the whole pipeline inline and the next draw shows
//! the result.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    Terminal,
};

use crate::adapters::attribution::ArtifactImportances;
use crate::adapters::forest::ForestClassifier;
use crate::application::EvaluationService;
use crate::domain::PatientData;
use crate::OvaresError;

use super::ui::{
    assessment::{render_assessment, AssessmentState},
    dashboard::{render_dashboard, DashboardState},
    form::{render_patient_form, PatientFormState},
    render_disclaimer,
};

/// Current screen/view in the application
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    Dashboard,
    PatientForm,
    Assessment,
}

/// Main application state
pub struct App {
    /// Current screen
    screen: Screen,

    /// Whether the app should quit
    should_quit: bool,

    /// Evaluation service over the loaded forest
    evaluation_service: EvaluationService<ForestClassifier>,

    /// Dashboard state
    dashboard_state: DashboardState,

    /// Patient form state
    patient_form_state: PatientFormState,

    /// Assessment state
    assessment_state: AssessmentState,
}

impl App {
    /// Create a new application instance using default adapters.
    ///
    /// This is a convenience method that constructs all adapters internally.
    /// For more control, use `with_dependencies()`.
    ///
    /// # Errors
    /// Returns error if the model artifact cannot be loaded.
    pub fn new() -> Result<Self> {
        // Load model from configured path (supports deployment flexibility)
        let model_path =
            std::env::var("OVARES_MODEL_PATH").unwrap_or_else(|_| "models".to_string());
        let model_dir = std::path::Path::new(&model_path);

        if !model_dir.exists() {
            return Err(anyhow!(
                "Model path not found at {:?}. Set OVARES_MODEL_PATH to a directory containing forest.json.",
                model_dir
            ));
        }

        // Refuse to start if the model cannot be loaded and validated.
        let classifier = ForestClassifier::load(model_dir)
            .map_err(|e| anyhow!("Failed to load model from {:?}: {}", model_dir, e))?;
        let info = classifier.model_info();

        // Attribution is optional: artifacts without importances still serve
        // assessments, just without the panel.
        let explainer = match ArtifactImportances::from_classifier(&classifier) {
            Ok(explainer) => Some(Arc::new(explainer)),
            Err(e) => {
                tracing::warn!("Attribution disabled: {e}");
                None
            }
        };

        let mut service = EvaluationService::new(Arc::new(classifier));
        if let Some(explainer) = explainer {
            service = service.with_explainer(explainer);
        }

        let dashboard_state = DashboardState {
            model_loaded: true,
            model_path: info.path.display().to_string(),
            tree_count: info.tree_count,
            feature_order: info.feature_names,
            attribution_available: service.has_explainer(),
        };

        Self::with_dependencies(service, dashboard_state)
    }

    /// Create application with injected dependencies (Composition Root pattern).
    ///
    /// This allows `main.rs` or tests to construct the service externally.
    ///
    /// # Errors
    /// Returns error if initialization fails.
    pub fn with_dependencies(
        evaluation_service: EvaluationService<ForestClassifier>,
        dashboard_state: DashboardState,
    ) -> Result<Self> {
        Ok(Self {
            screen: Screen::Dashboard,
            should_quit: false,
            evaluation_service,
            dashboard_state,
            patient_form_state: PatientFormState::default(),
            assessment_state: AssessmentState::default(),
        })
    }

    /// Run the main application loop.
    ///
    /// # Errors
    /// Returns error if terminal operations fail.
    pub fn run(&mut self) -> Result<()> {
        // Setup terminal
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        // Main loop
        let result = self.main_loop(&mut terminal);

        // Restore terminal
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;

        result
    }

    fn main_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
        loop {
            // Draw current screen
            terminal.draw(|f| {
                let area = f.area();
                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([Constraint::Min(0), Constraint::Length(3)])
                    .split(area);

                let content_area = chunks[0];
                let disclaimer_area = chunks[1];

                match self.screen {
                    Screen::Dashboard => render_dashboard(f, content_area, &self.dashboard_state),
                    Screen::PatientForm => {
                        render_patient_form(f, content_area, &self.patient_form_state)
                    }
                    Screen::Assessment => {
                        render_assessment(f, content_area, &self.assessment_state)
                    }
                }

                render_disclaimer(f, disclaimer_area);
            })?;

            // Handle input (short poll to stay responsive)
            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    self.handle_key(key.code, key.modifiers);
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) {
        // Global quit handling
        if key == KeyCode::Char('q') && modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        match self.screen {
            Screen::Dashboard => self.handle_dashboard_key(key),
            Screen::PatientForm => self.handle_patient_form_key(key),
            Screen::Assessment => self.handle_assessment_key(key),
        }
    }

    fn handle_dashboard_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('n') | KeyCode::Char('N') => {
                self.patient_form_state = PatientFormState::default();
                self.screen = Screen::PatientForm;
            }
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                self.should_quit = true;
            }
            _ => {}
        }
    }

    fn handle_patient_form_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc => {
                self.screen = Screen::Dashboard;
            }
            KeyCode::Up => {
                self.patient_form_state.prev_field();
            }
            KeyCode::Down | KeyCode::Tab => {
                self.patient_form_state.next_field();
            }
            KeyCode::Left => {
                self.patient_form_state.decrease();
            }
            KeyCode::Right => {
                self.patient_form_state.increase();
            }
            KeyCode::PageDown => {
                self.patient_form_state.decrease_coarse();
            }
            KeyCode::PageUp => {
                self.patient_form_state.increase_coarse();
            }
            KeyCode::Home => {
                self.patient_form_state.set_min();
            }
            KeyCode::End => {
                self.patient_form_state.set_max();
            }
            KeyCode::Char('r') | KeyCode::Char('R') => {
                self.patient_form_state.reset();
            }
            KeyCode::Enter => {
                self.submit_patient_form();
            }
            _ => {}
        }
    }

    fn handle_assessment_key(&mut self, key: KeyCode) {
        match &self.assessment_state {
            AssessmentState::Complete { .. } => match key {
                KeyCode::Enter | KeyCode::Esc => {
                    self.screen = Screen::Dashboard;
                }
                KeyCode::Char('n') | KeyCode::Char('N') => {
                    self.patient_form_state = PatientFormState::default();
                    self.screen = Screen::PatientForm;
                }
                _ => {}
            },
            AssessmentState::Error { .. } => match key {
                KeyCode::Enter => {
                    self.screen = Screen::PatientForm;
                }
                KeyCode::Esc => {
                    self.screen = Screen::Dashboard;
                }
                _ => {}
            },
            AssessmentState::Idle => {
                if key == KeyCode::Esc {
                    self.screen = Screen::Dashboard;
                }
            }
        }
    }

    fn submit_patient_form(&mut self) {
        let features = match self.patient_form_state.to_patient_features() {
            Ok(features) => features,
            Err(e) => {
                self.patient_form_state.error_message = Some(e);
                return;
            }
        };

        let patient = PatientData::new(features);

        // One synchronous evaluation; the result (or the failure) replaces
        // any previous assessment wholesale.
        match self.evaluation_service.evaluate(patient) {
            Ok(assessment) => {
                self.assessment_state = AssessmentState::Complete { assessment };
                self.screen = Screen::Assessment;
                // Clear entered measurements from the UI immediately.
                self.patient_form_state.clear_sensitive();
            }
            Err(OvaresError::Validation(message)) => {
                // Bounds are enforced by the sliders, so this is defensive;
                // surface it inline like any other form problem.
                self.patient_form_state.error_message = Some(message);
            }
            Err(e) => {
                self.assessment_state = AssessmentState::Error {
                    message: e.to_string(),
                };
                self.screen = Screen::Assessment;
                self.patient_form_state.clear_sensitive();
            }
        }
    }
}
