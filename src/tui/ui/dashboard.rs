//! Dashboard view: Main overview screen.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::domain::{RiskTier, HIGH_RISK_THRESHOLD, MEDIUM_RISK_THRESHOLD};
use crate::tui::styles::MedicalTheme;

/// Dashboard state for rendering.
#[derive(Default)]
pub struct DashboardState {
    pub model_loaded: bool,
    pub model_path: String,
    pub tree_count: usize,
    pub feature_order: Vec<String>,
    pub attribution_available: bool,
}

/// Render the main dashboard view.
pub fn render_dashboard(f: &mut Frame, area: Rect, state: &DashboardState) {
    // Split into header and main content
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Main content
        ])
        .split(area);

    render_header(f, chunks[0]);
    render_main_content(f, chunks[1], state);
}

fn render_header(f: &mut Frame, area: Rect) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(" ", MedicalTheme::text()),
        Span::styled("ovares", MedicalTheme::title()),
        Span::styled(" │ ", MedicalTheme::text_muted()),
        Span::styled(
            "Ovarian Hyper-Response Risk Assessment",
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

fn render_main_content(f: &mut Frame, area: Rect, state: &DashboardState) {
    // Split into left (model status) and right (risk tiers)
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(50), // Model panel
            Constraint::Percentage(50), // Tier reference
        ])
        .split(area);

    render_model_panel(f, chunks[0], state);
    render_tier_reference(f, chunks[1]);
}

fn render_model_panel(f: &mut Frame, area: Rect, state: &DashboardState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(8), // Model status
            Constraint::Min(0),    // Quick actions
        ])
        .margin(1)
        .split(area);

    let mut status_items = vec![
        format_status_item("Model Loaded", state.model_loaded),
        format_status_item("Attribution Panel", state.attribution_available),
        Line::from(vec![
            Span::styled("  Artifact: ", MedicalTheme::text_secondary()),
            Span::styled(state.model_path.clone(), MedicalTheme::text_muted()),
        ]),
        Line::from(vec![
            Span::styled("  Trees: ", MedicalTheme::text_secondary()),
            Span::styled(state.tree_count.to_string(), MedicalTheme::text()),
        ]),
    ];
    if !state.feature_order.is_empty() {
        status_items.push(Line::from(vec![
            Span::styled("  Feature order: ", MedicalTheme::text_secondary()),
            Span::styled(state.feature_order.join(", "), MedicalTheme::text()),
        ]));
    }

    let status_block = Block::default()
        .title(Span::styled(" Model Status ", MedicalTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(MedicalTheme::border());

    let status_list = Paragraph::new(status_items).block(status_block);
    f.render_widget(status_list, chunks[0]);

    // Quick Actions
    let actions = vec![
        Line::from(vec![
            Span::styled("[N] ", MedicalTheme::key_hint()),
            Span::styled("New Assessment", MedicalTheme::key_desc()),
        ]),
        Line::from(vec![
            Span::styled("[Q] ", MedicalTheme::key_hint()),
            Span::styled("Quit", MedicalTheme::key_desc()),
        ]),
    ];

    let actions_block = Block::default()
        .title(Span::styled(" Quick Actions ", MedicalTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(MedicalTheme::border());

    let actions_list = Paragraph::new(actions).block(actions_block);
    f.render_widget(actions_list, chunks[1]);
}

fn format_status_item(label: &str, ok: bool) -> Line<'static> {
    let (icon, style) = if ok {
        ("OK", MedicalTheme::success())
    } else {
        ("--", MedicalTheme::text_muted())
    };

    Line::from(vec![
        Span::styled(format!("  {icon} "), style),
        Span::styled(label.to_string(), MedicalTheme::text()),
    ])
}

fn render_tier_reference(f: &mut Frame, area: Rect) {
    let block = Block::default()
        .title(Span::styled(" Risk Tiers ", MedicalTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(MedicalTheme::border());

    let inner = block.inner(area);
    f.render_widget(block, area);

    let lines = vec![
        Line::from(vec![
            Span::styled("LOW     ", MedicalTheme::risk_tier(RiskTier::Low)),
            Span::styled(
                format!("probability < {MEDIUM_RISK_THRESHOLD}"),
                MedicalTheme::text_secondary(),
            ),
        ]),
        Line::from(vec![
            Span::styled("MEDIUM  ", MedicalTheme::risk_tier(RiskTier::Medium)),
            Span::styled(
                format!("{MEDIUM_RISK_THRESHOLD} ≤ probability < {HIGH_RISK_THRESHOLD}"),
                MedicalTheme::text_secondary(),
            ),
        ]),
        Line::from(vec![
            Span::styled("HIGH    ", MedicalTheme::risk_tier(RiskTier::High)),
            Span::styled(
                format!("probability ≥ {HIGH_RISK_THRESHOLD}"),
                MedicalTheme::text_secondary(),
            ),
        ]),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Thresholds are fixed; the higher tier wins at a boundary.",
            MedicalTheme::text_muted(),
        )]),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Each evaluation is computed fresh from the entered measurements.",
            MedicalTheme::text_muted(),
        )]),
    ];

    let p = Paragraph::new(lines).block(Block::default());
    f.render_widget(p, inner);
}
