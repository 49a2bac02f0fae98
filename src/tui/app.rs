use ratatui::widgets::ListState;
use std::time::{Duration, Instant};

use crate::daybook::Daybook;
use crate::error::{Outcome, Rejection};
use crate::models::{Note, Task, Workspace};
use crate::persistence::StateSource;
use crate::rollover::RolloverOutcome;
use crate::Config;
use crate::tui::error::TuiError;
use crate::utils::{ParsedKeyBinding, parse_key_binding};

const HELP_SCROLL_LIMIT: usize = 40;

/// What the input line is collecting text for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputPurpose {
    NewTask,
    EditTask(String),
    NewWorkspace,
    RenameWorkspace(String),
}

impl InputPurpose {
    pub fn prompt(&self) -> &'static str {
        match self {
            InputPurpose::NewTask => "New task",
            InputPurpose::EditTask(_) => "Edit task",
            InputPurpose::NewWorkspace => "Workspace name",
            InputPurpose::RenameWorkspace(_) => "Rename workspace",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    View,
    Input(InputPurpose),
    History,
    Help,
    /// Waiting for a yes/no before closing this workspace
    ConfirmClose(String),
}

#[derive(Debug, Clone)]
pub struct UiState {
    pub mode: Mode,
    pub selected_index: usize,
    pub list_state: ListState,
    pub overlay_scroll: usize,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            mode: Mode::View,
            selected_index: 0,
            list_state: ListState::default(),
            overlay_scroll: 0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct StatusState {
    pub message: Option<String>,
    pub message_time: Option<Instant>,
}

/// Key bindings from config, parsed once at startup
#[derive(Debug, Clone)]
pub struct Bindings {
    pub quit: ParsedKeyBinding,
    pub new: ParsedKeyBinding,
    pub edit: ParsedKeyBinding,
    pub delete: ParsedKeyBinding,
    pub toggle_complete: ParsedKeyBinding,
    pub toggle_pin: ParsedKeyBinding,
    pub list_up: ParsedKeyBinding,
    pub list_down: ParsedKeyBinding,
    pub move_up: ParsedKeyBinding,
    pub move_down: ParsedKeyBinding,
    pub older: ParsedKeyBinding,
    pub newer: ParsedKeyBinding,
    pub today: ParsedKeyBinding,
    pub copy_unfinished: ParsedKeyBinding,
    pub next_workspace: ParsedKeyBinding,
    pub prev_workspace: ParsedKeyBinding,
    pub new_workspace: ParsedKeyBinding,
    pub rename_workspace: ParsedKeyBinding,
    pub close_workspace: ParsedKeyBinding,
    pub history: ParsedKeyBinding,
    pub help: ParsedKeyBinding,
}

impl Bindings {
    pub fn from_config(config: &Config) -> Result<Self, TuiError> {
        let kb = &config.key_bindings;
        let parse = |s: &str| parse_key_binding(s).map_err(TuiError::KeyBindingError);
        Ok(Self {
            quit: parse(&kb.quit)?,
            new: parse(&kb.new)?,
            edit: parse(&kb.edit)?,
            delete: parse(&kb.delete)?,
            toggle_complete: parse(&kb.toggle_complete)?,
            toggle_pin: parse(&kb.toggle_pin)?,
            list_up: parse(&kb.list_up)?,
            list_down: parse(&kb.list_down)?,
            move_up: parse(&kb.move_up)?,
            move_down: parse(&kb.move_down)?,
            older: parse(&kb.older)?,
            newer: parse(&kb.newer)?,
            today: parse(&kb.today)?,
            copy_unfinished: parse(&kb.copy_unfinished)?,
            next_workspace: parse(&kb.next_workspace)?,
            prev_workspace: parse(&kb.prev_workspace)?,
            new_workspace: parse(&kb.new_workspace)?,
            rename_workspace: parse(&kb.rename_workspace)?,
            close_workspace: parse(&kb.close_workspace)?,
            history: parse(&kb.history)?,
            help: parse(&kb.help)?,
        })
    }
}

pub struct App {
    pub config: Config,
    pub daybook: Daybook,
    pub bindings: Bindings,
    pub ui: UiState,
    pub input: String,
    pub status: StatusState,
}

impl App {
    pub fn new(config: Config, daybook: Daybook) -> Result<Self, TuiError> {
        let bindings = Bindings::from_config(&config)?;
        let mut app = Self {
            config,
            daybook,
            bindings,
            ui: UiState::default(),
            input: String::new(),
            status: StatusState::default(),
        };
        app.sync_list_state();
        match app.daybook.source() {
            StateSource::Recovered => app.set_status_message(
                "Saved workspaces could not be read, starting fresh".to_string(),
            ),
            StateSource::MigratedLegacy => {
                app.set_status_message("Older notes moved into workspace \"Main\"".to_string())
            }
            StateSource::Modern | StateSource::Fresh => {}
        }
        Ok(app)
    }

    pub fn active_workspace(&self) -> Option<&Workspace> {
        self.daybook.active_workspace()
    }

    pub fn visible_note(&self) -> Option<&Note> {
        self.daybook.visible_note()
    }

    pub fn selected_task(&self) -> Option<&Task> {
        self.visible_note()
            .and_then(|note| note.tasks.get(self.ui.selected_index))
    }

    fn selected_task_id(&self) -> Option<String> {
        self.selected_task().map(|t| t.id.clone())
    }

    fn task_count(&self) -> usize {
        self.visible_note().map(|n| n.tasks.len()).unwrap_or(0)
    }

    pub fn sync_list_state(&mut self) {
        let count = self.task_count();
        if count == 0 {
            self.ui.selected_index = 0;
            self.ui.list_state.select(None);
        } else {
            self.ui.selected_index = self.ui.selected_index.min(count - 1);
            self.ui.list_state.select(Some(self.ui.selected_index));
        }
    }

    pub fn move_selection_up(&mut self) {
        self.ui.selected_index = self.ui.selected_index.saturating_sub(1);
        self.sync_list_state();
    }

    pub fn move_selection_down(&mut self) {
        self.ui.selected_index += 1;
        self.sync_list_state();
    }

    pub fn set_status_message(&mut self, message: String) {
        self.status.message = Some(message);
        self.status.message_time = Some(Instant::now());
    }

    pub fn clear_status_message(&mut self) {
        self.status.message = None;
        self.status.message_time = None;
    }

    /// Check if status message should be auto-cleared
    pub fn check_status_message_timeout(&mut self) {
        let timeout = Duration::from_secs(self.config.timing.status_message_secs);
        if let Some(time) = self.status.message_time {
            if time.elapsed() >= timeout {
                self.clear_status_message();
            }
        }
    }

    /// Surface a rejection as a transient notice
    fn report<T>(&mut self, outcome: Outcome<T>) -> Option<T> {
        match outcome {
            Ok(value) => Some(value),
            Err(rejection) => {
                self.set_status_message(rejection.to_string());
                None
            }
        }
    }

    /// Drive clock ticks and navigation timers
    pub fn on_tick(&mut self, now: Instant) {
        let report = self.daybook.tick(now);
        if let Some(RolloverOutcome::RolledOver { carried, .. }) = report.rollover {
            let message = match carried {
                0 => "A new day has started".to_string(),
                1 => "A new day has started - 1 pinned task carried over".to_string(),
                n => format!("A new day has started - {} pinned tasks carried over", n),
            };
            self.set_status_message(message);
        }
        if report.rolled_over() || !report.settled.is_empty() {
            self.sync_list_state();
        }
        self.check_status_message_timeout();
    }

    pub fn begin_new_task(&mut self) {
        let gate = self.daybook.gate();
        if self.report(gate).is_some() {
            self.input.clear();
            self.ui.mode = Mode::Input(InputPurpose::NewTask);
        }
    }

    pub fn begin_edit_task(&mut self) {
        let gate = self.daybook.gate();
        if self.report(gate).is_none() {
            return;
        }
        if let Some((id, text)) = self.selected_task().map(|t| (t.id.clone(), t.text.clone())) {
            self.input = text;
            self.ui.mode = Mode::Input(InputPurpose::EditTask(id));
        }
    }

    pub fn begin_new_workspace(&mut self) {
        self.input.clear();
        self.ui.mode = Mode::Input(InputPurpose::NewWorkspace);
    }

    pub fn begin_rename_workspace(&mut self) {
        if let Some((id, name)) = self.active_workspace().map(|w| (w.id.clone(), w.name.clone())) {
            self.input = name;
            self.ui.mode = Mode::Input(InputPurpose::RenameWorkspace(id));
        }
    }

    pub fn cancel_input(&mut self) {
        self.input.clear();
        self.ui.mode = Mode::View;
    }

    /// Apply the input line to whatever it was collecting for
    pub fn submit_input(&mut self) {
        let Mode::Input(purpose) = self.ui.mode.clone() else {
            return;
        };
        let text = std::mem::take(&mut self.input);
        match purpose {
            InputPurpose::NewTask => {
                let outcome = self.daybook.add_task(&text);
                if self.report(outcome).is_some() {
                    self.ui.selected_index = self.task_count().saturating_sub(1);
                }
            }
            InputPurpose::EditTask(id) => {
                let outcome = self.daybook.edit_task(&id, &text);
                self.report(outcome);
            }
            InputPurpose::NewWorkspace => {
                self.daybook.create_workspace(&text);
                self.ui.selected_index = 0;
            }
            InputPurpose::RenameWorkspace(id) => {
                let outcome = self.daybook.rename_workspace(&id, &text);
                self.report(outcome);
            }
        }
        self.ui.mode = Mode::View;
        self.sync_list_state();
    }

    pub fn delete_selected(&mut self) {
        if let Some(id) = self.selected_task_id() {
            let outcome = self.daybook.delete_task(&id);
            self.report(outcome);
            self.sync_list_state();
        }
    }

    pub fn toggle_selected_complete(&mut self) {
        if let Some(id) = self.selected_task_id() {
            let outcome = self.daybook.toggle_complete(&id);
            self.report(outcome);
        }
    }

    pub fn toggle_selected_pin(&mut self) {
        if let Some(id) = self.selected_task_id() {
            let outcome = self.daybook.toggle_pin(&id);
            self.report(outcome);
        }
    }

    /// Move the selected task one place up (negative) or down (positive)
    pub fn move_selected(&mut self, offset: isize) {
        let Some(id) = self.selected_task_id() else {
            return;
        };
        let target = self.ui.selected_index as isize + offset;
        if target < 0 || target as usize >= self.task_count() {
            return;
        }
        let outcome = self.daybook.reorder(&id, target as usize);
        if self.report(outcome).is_some() {
            self.ui.selected_index = target as usize;
            self.sync_list_state();
        }
    }

    /// Step one day back (`older`) or toward today
    pub fn step_day(&mut self, older: bool) {
        let Some(current) = self.active_workspace().map(|w| w.current_index) else {
            return;
        };
        let target = if older {
            current + 1
        } else if current > 0 {
            current - 1
        } else {
            return;
        };
        self.navigate_to(target);
    }

    pub fn scroll(&mut self, delta: f64) {
        let outcome = self.daybook.scroll(delta, Instant::now());
        // Hitting either end is not worth a notice
        if let Err(Rejection::Busy) = outcome {
            self.report(outcome);
        }
    }

    pub fn navigate_to(&mut self, index: usize) {
        let outcome = self.daybook.navigate_to(index, Instant::now());
        if let Err(Rejection::Busy) = outcome {
            self.report(outcome);
        }
    }

    pub fn return_to_today(&mut self) {
        let outcome = self.daybook.return_to_today(Instant::now());
        if let Err(Rejection::Busy) = outcome {
            self.report(outcome);
        }
    }

    pub fn copy_unfinished(&mut self) {
        let outcome = self.daybook.copy_unfinished_to_today(Instant::now());
        match self.report(outcome) {
            Some(0) => self.set_status_message("No unfinished tasks on that day".to_string()),
            Some(1) => self.set_status_message("Copied 1 task to today".to_string()),
            Some(n) => self.set_status_message(format!("Copied {} tasks to today", n)),
            None => {}
        }
    }

    pub fn cycle_workspace(&mut self, offset: isize) {
        if self.daybook.cycle_workspace(offset).is_ok() {
            self.ui.selected_index = 0;
            self.sync_list_state();
        }
    }

    pub fn request_close_workspace(&mut self) {
        if self.daybook.collection().workspaces.len() <= 1 {
            self.report::<()>(Err(Rejection::LastWorkspace));
            return;
        }
        if let Some(workspace) = self.active_workspace() {
            self.ui.mode = Mode::ConfirmClose(workspace.id.clone());
        }
    }

    pub fn confirm_close_workspace(&mut self) {
        if let Mode::ConfirmClose(id) = self.ui.mode.clone() {
            let outcome = self.daybook.close_workspace(&id);
            self.report(outcome);
            self.ui.selected_index = 0;
            self.sync_list_state();
        }
        self.ui.mode = Mode::View;
    }

    pub fn enter_history_mode(&mut self) {
        self.ui.overlay_scroll = 0;
        self.ui.mode = Mode::History;
    }

    /// Scroll the open history or help popup by one line
    pub fn scroll_overlay(&mut self, down: bool) {
        let max = match self.ui.mode {
            Mode::History => self.daybook.ledger().len().saturating_sub(1),
            _ => HELP_SCROLL_LIMIT,
        };
        self.ui.overlay_scroll = if down {
            (self.ui.overlay_scroll + 1).min(max)
        } else {
            self.ui.overlay_scroll.saturating_sub(1)
        };
    }

    pub fn enter_help_mode(&mut self) {
        self.ui.overlay_scroll = 0;
        self.ui.mode = Mode::Help;
    }

    pub fn exit_overlay(&mut self) {
        self.ui.mode = Mode::View;
    }

    /// Key hints for the status bar in the current mode
    pub fn key_hints(&self) -> Vec<String> {
        let kb = &self.config.key_bindings;
        let show = crate::utils::format_key_binding_for_display;
        match &self.ui.mode {
            Mode::Input(_) => vec!["Enter: Save".to_string(), "Esc: Cancel".to_string()],
            Mode::History | Mode::Help => vec!["Esc: Close".to_string(), "j/k: Scroll".to_string()],
            Mode::ConfirmClose(_) => vec!["y: Close workspace".to_string(), "n/Esc: Keep".to_string()],
            Mode::View if self.daybook.is_today() => vec![
                format!("{}: New", show(&kb.new)),
                format!("{}: Done", show(&kb.toggle_complete)),
                format!("{}: Pin", show(&kb.toggle_pin)),
                format!("{}: Edit", show(&kb.edit)),
                format!("{}: Delete", show(&kb.delete)),
                format!("{}: Older", show(&kb.older)),
                format!("{}: History", show(&kb.history)),
                format!("{}: Help", show(&kb.help)),
                format!("{}: Quit", show(&kb.quit)),
            ],
            Mode::View => vec![
                format!("{}: Back to today", show(&kb.today)),
                format!("{}: Copy unfinished", show(&kb.copy_unfinished)),
                format!("{}/{}: Older/Newer", show(&kb.older), show(&kb.newer)),
                format!("{}: Help", show(&kb.help)),
                format!("{}: Quit", show(&kb.quit)),
            ],
        }
    }
}
