use ratatui::Frame;
use ratatui::style::Style;
use ratatui::widgets::{Block, Borders};

use crate::tui::app::Mode;
use crate::tui::widgets::{
    color::Palette,
    confirm_close::render_confirm_close,
    help::render_help,
    history::render_history,
    input::render_input,
    note_view::{NoteViewOptions, render_note_view},
    status_bar::render_status_bar,
    tabs::render_tabs,
    timeline::render_timeline,
};
use crate::tui::{App, Layout};

pub fn render(f: &mut Frame, app: &mut App, layout: &Layout) {
    let palette = Palette::from_theme(&app.config.get_active_theme());

    let outer_block = Block::default()
        .borders(Borders::ALL)
        .title("Daynotes")
        .title_alignment(ratatui::layout::Alignment::Center)
        .style(Style::default().fg(palette.fg).bg(palette.bg));
    f.render_widget(outer_block, f.area());

    render_tabs(f, layout.tabs_area, app.daybook.collection(), &palette);
    render_timeline(
        f,
        layout.timeline_area,
        app.daybook.active_workspace(),
        app.daybook.nav_state(),
        &palette,
    );

    let options = NoteViewOptions {
        today: app.daybook.today(),
        editable: app.daybook.is_today(),
        transitioning: app.daybook.is_transitioning(),
    };
    // The note borrows the daybook while the list state is borrowed mutably from ui
    let note = app.daybook.visible_note();
    render_note_view(f, layout.main_area, note, &mut app.ui.list_state, options, &palette);

    if let Mode::Input(purpose) = &app.ui.mode {
        render_input(f, layout.input_area, purpose.prompt(), &app.input, &palette);
    }

    // Overlays go on top of the normal content
    match &app.ui.mode {
        Mode::Help => render_help(f, f.area(), &app.config, app.ui.overlay_scroll as u16, &palette),
        Mode::History => render_history(f, f.area(), app.daybook.ledger(), app.ui.overlay_scroll, &palette),
        Mode::ConfirmClose(id) => {
            let name = app
                .daybook
                .collection()
                .get(id)
                .map(|w| w.name.as_str())
                .unwrap_or_default();
            render_confirm_close(f, f.area(), name, &palette);
        }
        Mode::View | Mode::Input(_) => {}
    }

    let key_hints = app.key_hints();
    render_status_bar(f, layout.status_area, app.status.message.as_ref(), &key_hints, &palette);
}
