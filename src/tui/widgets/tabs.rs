use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Tabs;

use crate::models::WorkspaceCollection;
use crate::tui::widgets::color::Palette;

/// One tab per workspace, the active one highlighted
pub fn render_tabs(f: &mut Frame, area: Rect, collection: &WorkspaceCollection, palette: &Palette) {
    let titles: Vec<Line> = collection
        .workspaces
        .iter()
        .map(|workspace| {
            Line::from(vec![
                Span::raw(" "),
                Span::raw(workspace.name.clone()),
                Span::raw(" "),
            ])
        })
        .collect();

    let selected = collection
        .position_of(&collection.active_workspace_id)
        .unwrap_or(0);

    let tabs = Tabs::new(titles)
        .select(selected)
        .style(Style::default().fg(palette.muted).bg(palette.bg))
        .highlight_style(
            Style::default()
                .fg(palette.highlight_fg)
                .bg(palette.highlight_bg)
                .add_modifier(Modifier::BOLD),
        )
        .divider(" ")
        .padding("", "");

    f.render_widget(tabs, area);
}
