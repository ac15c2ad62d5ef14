//! Assessment result view.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
    Frame,
};

use crate::domain::{FeatureContribution, RiskAssessment};
use crate::tui::styles::MedicalTheme;

/// Assessment screen state
#[derive(Debug, Clone, Default)]
pub enum AssessmentState {
    /// Not started
    #[default]
    Idle,
    /// Completed with result
    Complete { assessment: RiskAssessment },
    /// Error occurred
    Error { message: String },
}

/// Render the assessment result screen
pub fn render_assessment(f: &mut Frame, area: Rect, state: &AssessmentState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Content
            Constraint::Length(3), // Footer
        ])
        .split(area);

    render_assessment_header(f, chunks[0]);
    render_assessment_content(f, chunks[1], state);
    render_assessment_footer(f, chunks[2], state);
}

fn render_assessment_header(f: &mut Frame, area: Rect) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(" ", MedicalTheme::text()),
        Span::styled("Risk Assessment", MedicalTheme::title()),
        Span::styled(" │ Ovarian Hyper-Response", MedicalTheme::text_secondary()),
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(header, area);
}

fn render_assessment_content(f: &mut Frame, area: Rect, state: &AssessmentState) {
    match state {
        AssessmentState::Idle => render_idle(f, area),
        AssessmentState::Complete { assessment } => render_result(f, area, assessment),
        AssessmentState::Error { message } => render_error(f, area, message),
    }
}

fn render_idle(f: &mut Frame, area: Rect) {
    let content = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            "No assessment yet",
            MedicalTheme::text_secondary(),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Enter patient measurements to begin",
            MedicalTheme::text_muted(),
        )),
    ])
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(content, area);
}

fn render_result(f: &mut Frame, area: Rect, assessment: &RiskAssessment) {
    let block = Block::default()
        .title(Span::styled(" Assessment Result ", MedicalTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(MedicalTheme::border_focused());

    let inner = block.inner(area);
    f.render_widget(block, area);

    let has_attributions = assessment
        .attributions
        .as_ref()
        .is_some_and(|a| !a.is_empty());

    let mut constraints = vec![
        Constraint::Length(3), // Tier
        Constraint::Length(3), // Probability gauge
        Constraint::Length(5), // Recommendations
    ];
    if has_attributions {
        constraints.push(Constraint::Min(4)); // Attribution bars
    }
    constraints.push(Constraint::Min(0));

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .margin(1)
        .split(inner);

    // Tier (big display)
    let tier_style = MedicalTheme::risk_tier(assessment.tier);
    let tier_display = Paragraph::new(vec![
        Line::from(Span::styled(
            format!("Risk tier: {}", assessment.tier),
            tier_style.add_modifier(ratatui::style::Modifier::BOLD),
        )),
        Line::from(Span::styled(
            assessment.tier.description(),
            MedicalTheme::text_secondary(),
        )),
    ])
    .alignment(Alignment::Center);
    f.render_widget(tier_display, chunks[0]);

    // Probability gauge (percentage-formatted)
    let prob_gauge = Gauge::default()
        .block(
            Block::default()
                .title(Span::styled(
                    " Hyper-Response Probability ",
                    MedicalTheme::text_secondary(),
                ))
                .borders(Borders::ALL)
                .border_style(MedicalTheme::border()),
        )
        .gauge_style(MedicalTheme::risk_gauge(assessment.probability))
        .ratio(assessment.probability.clamp(0.0, 1.0))
        .label(format!("{:.1}%", assessment.probability * 100.0));
    f.render_widget(prob_gauge, chunks[1]);

    // Recommendation bundle
    let recommendations: Vec<Line> = assessment
        .recommendations
        .lines()
        .iter()
        .map(|r| {
            Line::from(vec![
                Span::styled("• ", MedicalTheme::key_hint()),
                Span::styled(*r, MedicalTheme::text()),
            ])
        })
        .collect();

    let rec_block = Paragraph::new(recommendations).block(
        Block::default()
            .title(Span::styled(
                " Clinical Recommendations ",
                MedicalTheme::text_secondary(),
            ))
            .borders(Borders::ALL)
            .border_style(MedicalTheme::border()),
    );
    f.render_widget(rec_block, chunks[2]);

    // Attribution panel (optional)
    if has_attributions {
        if let Some(attributions) = &assessment.attributions {
            render_attributions(f, chunks[3], attributions);
        }
    }
}

fn render_attributions(f: &mut Frame, area: Rect, attributions: &[FeatureContribution]) {
    let block = Block::default()
        .title(Span::styled(
            " Feature Attribution (model importances) ",
            MedicalTheme::text_secondary(),
        ))
        .borders(Borders::ALL)
        .border_style(MedicalTheme::border());

    let inner = block.inner(area);
    f.render_widget(block, area);

    let bar_width = usize::from(inner.width.saturating_sub(22)).max(4);
    let lines: Vec<Line> = attributions
        .iter()
        .map(|c| {
            let filled = ((c.weight.clamp(0.0, 1.0) * bar_width as f64).round()) as usize;
            Line::from(vec![
                Span::styled(format!("{:<10}", c.feature), MedicalTheme::text_secondary()),
                Span::styled("█".repeat(filled), MedicalTheme::info()),
                Span::styled(format!(" {:>5.1}%", c.weight * 100.0), MedicalTheme::text()),
            ])
        })
        .collect();

    f.render_widget(Paragraph::new(lines), inner);
}

fn render_error(f: &mut Frame, area: Rect, message: &str) {
    let content = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled("! Evaluation failed", MedicalTheme::danger())),
        Line::from(""),
        Line::from(Span::styled(message, MedicalTheme::text())),
        Line::from(""),
        Line::from(Span::styled(
            "No tier is reported without a valid probability.",
            MedicalTheme::text_muted(),
        )),
    ])
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(MedicalTheme::danger()),
    );

    f.render_widget(content, area);
}

fn render_assessment_footer(f: &mut Frame, area: Rect, state: &AssessmentState) {
    let content = match state {
        AssessmentState::Complete { .. } => Line::from(vec![
            Span::styled("[Enter] ", MedicalTheme::key_hint()),
            Span::styled("Dashboard ", MedicalTheme::key_desc()),
            Span::styled("[N] ", MedicalTheme::key_hint()),
            Span::styled("New Assessment", MedicalTheme::key_desc()),
        ]),
        AssessmentState::Error { .. } => Line::from(vec![
            Span::styled("[Enter] ", MedicalTheme::key_hint()),
            Span::styled("Back to Form ", MedicalTheme::key_desc()),
            Span::styled("[Esc] ", MedicalTheme::key_hint()),
            Span::styled("Dashboard", MedicalTheme::key_desc()),
        ]),
        AssessmentState::Idle => Line::from(vec![Span::styled(
            "Waiting for input...",
            MedicalTheme::text_muted(),
        )]),
    };

    let footer = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(footer, area);
}
