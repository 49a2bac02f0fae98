use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::models::Workspace;
use crate::navigation::NavState;
use crate::tui::widgets::color::Palette;

/// Newest day on the right, older days to the left. The viewed day is
/// highlighted and a pending target is underlined until it settles.
pub fn render_timeline(
    f: &mut Frame,
    area: Rect,
    workspace: Option<&Workspace>,
    nav: NavState,
    palette: &Palette,
) {
    let Some(workspace) = workspace else {
        return;
    };
    let target = match nav {
        NavState::Transitioning { target, .. } => Some(target),
        NavState::Settled => None,
    };

    // Each day takes "MM-DD " (6 columns)
    let fits = (area.width as usize / 6).max(1);
    let start = workspace.current_index.saturating_sub(fits / 2);
    let end = (start + fits).min(workspace.notes.len());

    let mut spans: Vec<Span> = Vec::new();
    if end < workspace.notes.len() {
        spans.push(Span::styled("… ", Style::default().fg(palette.muted)));
    }
    for index in (start..end).rev() {
        let label = workspace.notes[index].date.format("%m-%d").to_string();
        let mut style = Style::default().fg(palette.muted);
        if index == workspace.current_index {
            style = Style::default()
                .fg(palette.highlight_fg)
                .bg(palette.highlight_bg)
                .add_modifier(Modifier::BOLD);
        }
        if Some(index) == target {
            style = style.add_modifier(Modifier::UNDERLINED);
        }
        spans.push(Span::styled(label, style));
        spans.push(Span::raw(" "));
    }

    let paragraph = Paragraph::new(Line::from(spans))
        .alignment(Alignment::Right)
        .style(Style::default().bg(palette.bg));
    f.render_widget(paragraph, area);
}
