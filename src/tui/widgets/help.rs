use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::Style;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::Config;
use crate::tui::widgets::color::Palette;
use crate::tui::widgets::popup_area;
use crate::utils::format_key_binding_for_display as show;

pub fn render_help(f: &mut Frame, area: Rect, config: &Config, scroll: u16, palette: &Palette) {
    let popup_area = popup_area(area, 60, 70);

    // Clear the background first - this prevents content from showing through
    f.render_widget(Clear, popup_area);

    let paragraph = Paragraph::new(build_help_text(config))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Help - Key Bindings")
                .title_alignment(Alignment::Center)
                .style(Style::default().fg(palette.fg).bg(palette.bg)),
        )
        .style(Style::default().fg(palette.fg).bg(palette.bg))
        .scroll((scroll, 0))
        .wrap(ratatui::widgets::Wrap { trim: false });

    f.render_widget(paragraph, popup_area);
}

fn build_help_text(config: &Config) -> String {
    let kb = &config.key_bindings;
    let mut text = String::new();

    text.push_str("Today:\n");
    text.push_str(&format!("  {}: New task\n", show(&kb.new)));
    text.push_str(&format!("  {}: Edit selected task\n", show(&kb.edit)));
    text.push_str(&format!("  {}: Delete selected task\n", show(&kb.delete)));
    text.push_str(&format!("  {}: Mark done / not done\n", show(&kb.toggle_complete)));
    text.push_str(&format!("  {}: Pin (carry over to tomorrow)\n", show(&kb.toggle_pin)));
    text.push_str(&format!("  {} / {}: Move task up/down\n", show(&kb.move_up), show(&kb.move_down)));
    text.push_str(&format!("  {} / {}: Select up/down\n", show(&kb.list_up), show(&kb.list_down)));
    text.push('\n');

    text.push_str("Days:\n");
    text.push_str(&format!("  {} / {}: Older / newer day\n", show(&kb.older), show(&kb.newer)));
    text.push_str("  Mouse wheel: Scroll through days\n");
    text.push_str(&format!("  {}: Back to today\n", show(&kb.today)));
    text.push_str(&format!("  {}: Copy unfinished tasks to today\n", show(&kb.copy_unfinished)));
    text.push_str("  Past days are read-only.\n");
    text.push('\n');

    text.push_str("Workspaces:\n");
    text.push_str(&format!(
        "  {} / {}: Next / previous workspace\n",
        show(&kb.next_workspace),
        show(&kb.prev_workspace)
    ));
    text.push_str(&format!("  {}: New workspace\n", show(&kb.new_workspace)));
    text.push_str(&format!("  {}: Rename workspace\n", show(&kb.rename_workspace)));
    text.push_str(&format!("  {}: Close workspace\n", show(&kb.close_workspace)));
    text.push('\n');

    text.push_str("General:\n");
    text.push_str(&format!("  {}: Completion history\n", show(&kb.history)));
    text.push_str(&format!("  {}: Show/hide help\n", show(&kb.help)));
    text.push_str(&format!("  {}: Quit\n", show(&kb.quit)));

    text
}
