use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::ledger::CompletionLedger;
use crate::tui::widgets::color::Palette;
use crate::tui::widgets::popup_area;

/// Completion history popup, newest first
pub fn render_history(f: &mut Frame, area: Rect, ledger: &CompletionLedger, scroll: usize, palette: &Palette) {
    let popup_area = popup_area(area, 70, 70);
    f.render_widget(Clear, popup_area);

    let lines: Vec<Line> = if ledger.is_empty() {
        vec![Line::from(Span::styled(
            "Nothing completed yet",
            Style::default().fg(palette.muted),
        ))]
    } else {
        ledger
            .entries()
            .iter()
            .skip(scroll)
            .map(|record| {
                Line::from(vec![
                    Span::styled(
                        format!("{}  ", record.completed_date.format("%Y-%m-%d")),
                        Style::default().fg(palette.muted),
                    ),
                    Span::styled(record.text.clone(), Style::default().fg(palette.fg)),
                ])
            })
            .collect()
    };

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Completed ({})", ledger.len()))
                .title_alignment(Alignment::Center)
                .style(Style::default().fg(palette.fg).bg(palette.bg)),
        )
        .style(Style::default().fg(palette.fg).bg(palette.bg));

    f.render_widget(paragraph, popup_area);
}
