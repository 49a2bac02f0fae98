use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    MouseEvent, MouseEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
    size as terminal_size,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use std::io;
use std::time::{Duration, Instant};

use crate::tui::app::{App, Mode};
use crate::tui::error::TuiError;
use crate::tui::layout::Layout;
use crate::utils::ParsedKeyBinding;

/// One wheel notch, comfortably past the scroll threshold
pub const WHEEL_DELTA: f64 = 100.0;

/// Guard that ensures terminal state is restored even on panic
/// If the terminal is left in raw mode or alternate screen, the user's
/// terminal will be unusable.
struct TerminalGuard {
    raw_mode_enabled: bool,
    alternate_screen_enabled: bool,
}

impl TerminalGuard {
    fn new() -> Result<Self, TuiError> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

        Ok(Self {
            raw_mode_enabled: true,
            alternate_screen_enabled: true,
        })
    }

    /// Manually restore terminal state (called on normal exit)
    fn restore(&mut self) -> Result<(), TuiError> {
        if self.raw_mode_enabled {
            disable_raw_mode()?;
            self.raw_mode_enabled = false;
        }
        if self.alternate_screen_enabled {
            execute!(io::stdout(), DisableMouseCapture, LeaveAlternateScreen)?;
            self.alternate_screen_enabled = false;
        }
        Ok(())
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        // Ignore errors in drop - we're already in a cleanup path
        if self.raw_mode_enabled {
            let _ = disable_raw_mode();
        }
        if self.alternate_screen_enabled {
            let _ = execute!(io::stdout(), DisableMouseCapture, LeaveAlternateScreen);
        }
    }
}

pub fn run_event_loop(mut app: App) -> Result<(), TuiError> {
    // Check terminal size before entering alternate screen so the error
    // lands in the normal terminal
    let (width, height) = terminal_size()?;
    let min_width = Layout::MIN_WIDTH + 2;
    let min_height = Layout::MIN_HEIGHT + 2;
    if width < min_width || height < min_height {
        return Err(TuiError::RenderError(format!(
            "Terminal size too small. Current: {}x{}, Minimum required: {}x{}. Please resize your terminal window.",
            width, height, min_width, min_height
        )));
    }

    let mut guard = TerminalGuard::new()?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)?;

    loop {
        app.on_tick(Instant::now());

        let size = terminal.size()?;
        let terminal_rect = Rect::new(0, 0, size.width, size.height);
        terminal.draw(|f| {
            let layout = Layout::calculate(terminal_rect, matches!(app.ui.mode, Mode::Input(_)));
            crate::tui::render::render(f, &mut app, &layout);
        })?;

        if event::poll(Duration::from_millis(16))? {
            match event::read()? {
                // Only process Press events to avoid duplicate processing on Windows
                Event::Key(key_event) if key_event.kind == KeyEventKind::Press => {
                    if handle_key_event(&mut app, key_event) {
                        break;
                    }
                }
                Event::Mouse(mouse_event) => handle_mouse_event(&mut app, mouse_event),
                _ => {}
            }
        }
    }

    guard.restore()?;
    Ok(())
}

/// Wheel down scrolls toward older days, like scrolling down a page
pub fn handle_mouse_event(app: &mut App, mouse_event: MouseEvent) {
    if app.ui.mode != Mode::View {
        return;
    }
    match mouse_event.kind {
        MouseEventKind::ScrollDown => app.scroll(WHEEL_DELTA),
        MouseEventKind::ScrollUp => app.scroll(-WHEEL_DELTA),
        _ => {}
    }
}

/// Returns true when the user asked to quit
pub fn handle_key_event(app: &mut App, key_event: KeyEvent) -> bool {
    match app.ui.mode.clone() {
        Mode::Input(_) => handle_input_mode(app, key_event),
        Mode::History | Mode::Help => handle_overlay_mode(app, key_event),
        Mode::ConfirmClose(_) => handle_confirm_close(app, key_event),
        Mode::View => return handle_view_mode(app, key_event),
    }
    false
}

fn handle_input_mode(app: &mut App, key_event: KeyEvent) {
    match key_event.code {
        KeyCode::Esc => app.cancel_input(),
        KeyCode::Enter => app.submit_input(),
        KeyCode::Backspace => {
            app.input.pop();
        }
        KeyCode::Char(c) if !crate::utils::has_primary_modifier(key_event.modifiers) => {
            app.input.push(c);
        }
        _ => {}
    }
}

fn handle_overlay_mode(app: &mut App, key_event: KeyEvent) {
    let bindings = &app.bindings;
    if key_event.code == KeyCode::Esc
        || matches_key_event(key_event, &bindings.help)
        || matches_key_event(key_event, &bindings.history)
    {
        app.exit_overlay();
    } else if key_event.code == KeyCode::Down || matches_key_event(key_event, &bindings.list_down) {
        app.scroll_overlay(true);
    } else if key_event.code == KeyCode::Up || matches_key_event(key_event, &bindings.list_up) {
        app.scroll_overlay(false);
    }
}

fn handle_confirm_close(app: &mut App, key_event: KeyEvent) {
    match key_event.code {
        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => app.confirm_close_workspace(),
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => app.exit_overlay(),
        _ => {}
    }
}

fn handle_view_mode(app: &mut App, key_event: KeyEvent) -> bool {
    let b = app.bindings.clone();
    let pressed = |binding: &ParsedKeyBinding| matches_key_event(key_event, binding);

    if pressed(&b.quit) {
        return true;
    }

    if pressed(&b.list_up) || key_event.code == KeyCode::Up {
        app.move_selection_up();
    } else if pressed(&b.list_down) || key_event.code == KeyCode::Down {
        app.move_selection_down();
    } else if pressed(&b.new) {
        app.begin_new_task();
    } else if pressed(&b.edit) || key_event.code == KeyCode::Enter {
        app.begin_edit_task();
    } else if pressed(&b.delete) {
        app.delete_selected();
    } else if pressed(&b.toggle_complete) {
        app.toggle_selected_complete();
    } else if pressed(&b.toggle_pin) {
        app.toggle_selected_pin();
    } else if pressed(&b.move_up) {
        app.move_selected(-1);
    } else if pressed(&b.move_down) {
        app.move_selected(1);
    } else if pressed(&b.older) {
        app.step_day(true);
    } else if pressed(&b.newer) {
        app.step_day(false);
    } else if pressed(&b.today) {
        app.return_to_today();
    } else if pressed(&b.copy_unfinished) {
        app.copy_unfinished();
    } else if pressed(&b.next_workspace) {
        app.cycle_workspace(1);
    } else if pressed(&b.prev_workspace) {
        app.cycle_workspace(-1);
    } else if pressed(&b.new_workspace) {
        app.begin_new_workspace();
    } else if pressed(&b.rename_workspace) {
        app.begin_rename_workspace();
    } else if pressed(&b.close_workspace) {
        app.request_close_workspace();
    } else if pressed(&b.history) {
        app.enter_history_mode();
    } else if pressed(&b.help) {
        app.enter_help_mode();
    }
    false
}

fn matches_key_event(key_event: KeyEvent, binding: &ParsedKeyBinding) -> bool {
    // Primary modifier is Ctrl on Windows/Linux, Option/Alt on macOS
    let has_primary_mod = crate::utils::has_primary_modifier(key_event.modifiers);
    if binding.requires_ctrl != has_primary_mod {
        return false;
    }
    binding.key_code == key_event.code
}
