use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::tui::widgets::color::Palette;
use crate::tui::widgets::popup_area;

pub fn render_confirm_close(f: &mut Frame, area: Rect, workspace_name: &str, palette: &Palette) {
    let popup_area = popup_area(area, 50, 30);
    f.render_widget(Clear, popup_area);

    let style = Style::default().fg(palette.fg).bg(palette.bg);
    let lines = vec![
        Line::from(Span::styled("Close this workspace and all of its days?", style)),
        Line::from(""),
        Line::from(Span::styled(
            workspace_name.to_string(),
            style.add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled("y: Close   n / Esc: Keep", Style::default().fg(palette.muted))),
    ];

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Close Workspace")
                .title_alignment(Alignment::Center)
                .style(style),
        )
        .style(style)
        .wrap(ratatui::widgets::Wrap { trim: true })
        .alignment(Alignment::Center);

    f.render_widget(paragraph, popup_area);
}
