//! UI module: View components for the TUI.

pub mod assessment;
pub mod dashboard;
pub mod form;

use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::tui::styles::MedicalTheme;

pub fn render_disclaimer(f: &mut Frame, area: Rect) {
    let text = vec![
        Line::from(vec![Span::styled(
            "USAGE LIMITS: Not validated for patients with prior ovarian surgery.",
            MedicalTheme::text_muted(),
        )]),
        Line::from(vec![Span::styled(
            "Estimates are indicative; final decisions require clinical judgment.",
            MedicalTheme::text_muted(),
        )]),
    ];

    let block = Block::default()
        .borders(Borders::TOP)
        .border_style(MedicalTheme::border());

    let p = Paragraph::new(text).block(block).wrap(Wrap { trim: true });

    f.render_widget(p, area);
}
