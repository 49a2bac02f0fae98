//! The task store: workspaces, their day notes, and every mutation over them.
//!
//! Task operations act on the active workspace and only on its most recent
//! note, and only while that note is the one being viewed. Anything else is
//! rejected without touching state.

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, info};

use crate::error::{Outcome, Rejection};
use crate::ledger::CompletionLedger;
use crate::models::{CompletionRecord, Note, Task, Workspace, WorkspaceCollection};

/// Name used when a workspace is created with a blank name
pub const UNTITLED_WORKSPACE_NAME: &str = "Untitled";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskStore {
    collection: WorkspaceCollection,
    ledger: CompletionLedger,
}

impl TaskStore {
    pub fn new(collection: WorkspaceCollection, ledger: CompletionLedger) -> Self {
        Self { collection, ledger }
    }

    pub fn collection(&self) -> &WorkspaceCollection {
        &self.collection
    }

    pub(crate) fn collection_mut(&mut self) -> &mut WorkspaceCollection {
        &mut self.collection
    }

    pub fn ledger(&self) -> &CompletionLedger {
        &self.ledger
    }

    pub fn active_workspace(&self) -> Option<&Workspace> {
        self.collection.active()
    }

    pub fn visible_note(&self) -> Option<&Note> {
        self.active_workspace().and_then(Workspace::visible_note)
    }

    /// Whether the active workspace is showing its most recent note
    pub fn is_today(&self) -> bool {
        self.active_workspace()
            .map(Workspace::is_viewing_latest)
            .unwrap_or(false)
    }

    /// Most recent note of the active workspace, if it is the one being viewed
    fn today_note_mut(&mut self) -> Outcome<&mut Note> {
        let workspace = self.collection.active_mut().ok_or(Rejection::InvalidTarget)?;
        if !workspace.is_viewing_latest() {
            return Err(Rejection::NotToday);
        }
        workspace.latest_note_mut().ok_or(Rejection::InvalidTarget)
    }

    /// Append a new task to today's note and return its id
    pub fn add_task(&mut self, text: &str) -> Outcome<String> {
        let text = text.trim();
        if text.is_empty() {
            return Err(Rejection::EmptyContent);
        }
        let note = self.today_note_mut()?;
        let task = Task::new(text.to_string());
        let id = task.id.clone();
        note.tasks.push(task);
        debug!(task_id = %id, "task added");
        Ok(id)
    }

    pub fn edit_task(&mut self, id: &str, new_text: &str) -> Outcome {
        let new_text = new_text.trim();
        if new_text.is_empty() {
            return Err(Rejection::EmptyContent);
        }
        let task = self
            .today_note_mut()?
            .task_mut(id)
            .ok_or(Rejection::InvalidTarget)?;
        task.text = new_text.to_string();
        Ok(())
    }

    pub fn delete_task(&mut self, id: &str) -> Outcome {
        let note = self.today_note_mut()?;
        let position = note.position_of(id).ok_or(Rejection::InvalidTarget)?;
        note.tasks.remove(position);
        debug!(task_id = %id, "task deleted");
        Ok(())
    }

    /// Flip completion and return the new state.
    ///
    /// Completing a task records it in the ledger; un-completing leaves the
    /// earlier record in place.
    pub fn toggle_complete(&mut self, id: &str, now: DateTime<Utc>) -> Outcome<bool> {
        let note = self.today_note_mut()?;
        let date = note.date;
        let task = note.task_mut(id).ok_or(Rejection::InvalidTarget)?;
        task.completed = !task.completed;

        if task.completed {
            let record = CompletionRecord {
                id: task.id.clone(),
                text: task.text.clone(),
                completed_at: now,
                completed_date: date,
            };
            self.ledger.record(record);
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Flip the pinned flag and return the new state
    pub fn toggle_pin(&mut self, id: &str) -> Outcome<bool> {
        let task = self
            .today_note_mut()?
            .task_mut(id)
            .ok_or(Rejection::InvalidTarget)?;
        task.pinned = !task.pinned;
        Ok(task.pinned)
    }

    /// Move a task to `target` within today's note, keeping the others in order
    pub fn reorder(&mut self, id: &str, target: usize) -> Outcome {
        let note = self.today_note_mut()?;
        let from = note.position_of(id).ok_or(Rejection::InvalidTarget)?;
        if target >= note.tasks.len() {
            return Err(Rejection::InvalidTarget);
        }
        if from != target {
            let task = note.tasks.remove(from);
            note.tasks.insert(target, task);
        }
        Ok(())
    }

    /// Duplicate every unfinished task of the viewed past day into today.
    ///
    /// The one mutation allowed while looking at an older note. Copies are new
    /// tasks (fresh ids, not completed) that keep their pinned flag. Returns
    /// how many tasks were copied.
    pub fn copy_unfinished_to_today(&mut self) -> Outcome<usize> {
        let workspace = self.collection.active_mut().ok_or(Rejection::InvalidTarget)?;
        if workspace.is_viewing_latest() {
            return Err(Rejection::InvalidTarget);
        }
        let copies: Vec<Task> = workspace
            .visible_note()
            .ok_or(Rejection::InvalidTarget)?
            .unfinished()
            .map(Task::duplicate)
            .collect();
        let count = copies.len();
        workspace
            .latest_note_mut()
            .ok_or(Rejection::InvalidTarget)?
            .tasks
            .extend(copies);
        debug!(count, "copied unfinished tasks to today");
        Ok(count)
    }

    /// Create a workspace seeded with an empty note for `today` and make it active
    pub fn create_workspace(&mut self, name: &str, today: NaiveDate) -> String {
        let name = match name.trim() {
            "" => UNTITLED_WORKSPACE_NAME,
            trimmed => trimmed,
        };
        let workspace = Workspace::new(name.to_string(), today);
        let id = workspace.id.clone();
        self.collection.workspaces.push(workspace);
        self.collection.active_workspace_id = id.clone();
        info!(workspace_id = %id, name, "workspace created");
        id
    }

    pub fn rename_workspace(&mut self, id: &str, name: &str) -> Outcome {
        let name = name.trim();
        if name.is_empty() {
            return Err(Rejection::EmptyContent);
        }
        let workspace = self.collection.get_mut(id).ok_or(Rejection::InvalidTarget)?;
        workspace.name = name.to_string();
        Ok(())
    }

    pub fn switch_workspace(&mut self, id: &str) -> Outcome {
        if self.collection.get(id).is_none() {
            return Err(Rejection::InvalidTarget);
        }
        self.collection.active_workspace_id = id.to_string();
        Ok(())
    }

    /// Remove a workspace. The last one left can never be closed.
    ///
    /// Closing the active workspace activates the one that takes its place in
    /// display order (or the new last one).
    pub fn close_workspace(&mut self, id: &str) -> Outcome {
        let position = self.collection.position_of(id).ok_or(Rejection::InvalidTarget)?;
        if self.collection.workspaces.len() <= 1 {
            return Err(Rejection::LastWorkspace);
        }
        self.collection.workspaces.remove(position);

        if self.collection.active_workspace_id == id {
            let next = position.min(self.collection.workspaces.len() - 1);
            self.collection.active_workspace_id = self.collection.workspaces[next].id.clone();
        }
        info!(workspace_id = %id, "workspace closed");
        Ok(())
    }

    /// Activate the workspace `offset` places away in display order, wrapping around
    pub fn cycle_workspace(&mut self, offset: isize) -> Outcome {
        let len = self.collection.workspaces.len() as isize;
        let current = self
            .collection
            .position_of(&self.collection.active_workspace_id)
            .ok_or(Rejection::InvalidTarget)? as isize;
        if len <= 1 {
            return Err(Rejection::InvalidTarget);
        }
        let next = (current + offset).rem_euclid(len) as usize;
        self.collection.active_workspace_id = self.collection.workspaces[next].id.clone();
        Ok(())
    }
}
