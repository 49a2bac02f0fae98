use ratatui::Frame;
use ratatui::layout::{Position, Rect};
use ratatui::style::Style;
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::tui::widgets::color::Palette;

/// Single-line input box; the cursor sits after the last character
pub fn render_input(f: &mut Frame, area: Rect, prompt: &str, buffer: &str, palette: &Palette) {
    let inner_width = area.width.saturating_sub(2) as usize;
    let len = buffer.chars().count();
    // Keep the tail visible when the text is wider than the box
    let visible: String = buffer.chars().skip(len.saturating_sub(inner_width.saturating_sub(1))).collect();

    let paragraph = Paragraph::new(visible.clone())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {} ", prompt))
                .border_style(Style::default().fg(palette.highlight_bg)),
        )
        .style(Style::default().fg(palette.fg).bg(palette.bg));
    f.render_widget(paragraph, area);

    let cursor_x = area.x + 1 + visible.chars().count() as u16;
    f.set_cursor_position(Position::new(cursor_x, area.y + 1));
}
