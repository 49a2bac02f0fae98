use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};

use crate::models::{Note, Task};
use crate::tui::widgets::color::Palette;
use crate::tui::widgets::truncate;
use crate::utils::format_date_label;
use chrono::NaiveDate;

/// How the note should be presented
#[derive(Debug, Clone, Copy)]
pub struct NoteViewOptions {
    pub today: NaiveDate,
    /// Past notes are read-only and drawn muted
    pub editable: bool,
    pub transitioning: bool,
}

fn task_line(task: &Task, max_width: usize, palette: &Palette) -> Line<'static> {
    let status = if task.completed { "✓" } else { "○" };
    let pin = if task.pinned { " ⚲" } else { "" };
    let text = truncate(&format!("{} {}{}", status, task.text, pin), max_width);

    let style = if task.completed {
        Style::default().fg(palette.muted).add_modifier(Modifier::CROSSED_OUT)
    } else {
        Style::default().fg(palette.fg)
    };
    Line::from(Span::styled(text, style))
}

pub fn render_note_view(
    f: &mut Frame,
    area: Rect,
    note: Option<&Note>,
    list_state: &mut ListState,
    options: NoteViewOptions,
    palette: &Palette,
) {
    let title = match note {
        Some(note) if options.editable => format!(" {} ", format_date_label(note.date, options.today)),
        Some(note) => format!(" {} (read-only) ", format_date_label(note.date, options.today)),
        None => " No notes ".to_string(),
    };
    let border_style = if options.transitioning {
        Style::default().fg(palette.muted)
    } else {
        Style::default().fg(palette.fg)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(border_style)
        .style(Style::default().fg(palette.fg).bg(palette.bg));

    let tasks = note.map(|n| n.tasks.as_slice()).unwrap_or(&[]);
    if tasks.is_empty() {
        let hint = if options.editable {
            "Nothing planned yet. Add a task to get started."
        } else {
            "No tasks on this day."
        };
        let paragraph = Paragraph::new(hint)
            .block(block)
            .style(Style::default().fg(palette.muted).bg(palette.bg));
        f.render_widget(paragraph, area);
        return;
    }

    // 2 for borders, 2 for the highlight symbol
    let max_width = area.width.saturating_sub(4) as usize;
    let items: Vec<ListItem> = tasks
        .iter()
        .map(|task| ListItem::new(task_line(task, max_width, palette)))
        .collect();

    let highlight = if options.editable {
        Style::default().fg(palette.highlight_fg).bg(palette.highlight_bg)
    } else {
        Style::default().fg(palette.fg).add_modifier(Modifier::BOLD)
    };
    let list = List::new(items)
        .block(block)
        .highlight_style(highlight)
        .highlight_symbol("> ");

    f.render_stateful_widget(list, area, list_state);
}
