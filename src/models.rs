use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Outcome, Rejection};

/// Name given to the workspace synthesized for fresh or migrated state
pub const DEFAULT_WORKSPACE_NAME: &str = "Main";

/// Mint a new opaque identifier for a task or workspace
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub text: String,
    pub completed: bool,
    #[serde(default)]
    pub pinned: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub date: NaiveDate, // YYYY-MM-DD
    pub tasks: Vec<Task>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workspace {
    pub id: String,
    pub name: String,
    /// Date descending; index 0 is the most recent day
    pub notes: Vec<Note>,
    pub current_index: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceCollection {
    pub workspaces: Vec<Workspace>,
    pub active_workspace_id: String,
}

/// One completion event. Never mutated once recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionRecord {
    /// Id of the task that was completed
    pub id: String,
    /// Task text at the moment of completion
    pub text: String,
    pub completed_at: DateTime<Utc>,
    pub completed_date: NaiveDate,
}

impl Task {
    pub fn new(text: String) -> Self {
        Self {
            id: new_id(),
            text,
            completed: false,
            pinned: false,
        }
    }

    /// Copy this task into a new, unfinished entity with its own id
    pub fn duplicate(&self) -> Self {
        Self {
            id: new_id(),
            text: self.text.clone(),
            completed: false,
            pinned: self.pinned,
        }
    }

    /// Unfinished and pinned: carried into the next day by rollover
    pub fn carries_forward(&self) -> bool {
        self.pinned && !self.completed
    }
}

impl Note {
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            tasks: Vec::new(),
        }
    }

    pub fn position_of(&self, task_id: &str) -> Option<usize> {
        self.tasks.iter().position(|t| t.id == task_id)
    }

    pub fn task_mut(&mut self, task_id: &str) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == task_id)
    }

    pub fn unfinished(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter().filter(|t| !t.completed)
    }
}

impl Workspace {
    /// Create a workspace seeded with one empty note for `today`
    pub fn new(name: String, today: NaiveDate) -> Self {
        Self {
            id: new_id(),
            name,
            notes: vec![Note::empty(today)],
            current_index: 0,
        }
    }

    /// The note currently being viewed
    pub fn visible_note(&self) -> Option<&Note> {
        self.notes.get(self.current_index)
    }

    /// The most recent note (index 0)
    pub fn latest_note(&self) -> Option<&Note> {
        self.notes.first()
    }

    pub fn latest_note_mut(&mut self) -> Option<&mut Note> {
        self.notes.first_mut()
    }

    pub fn latest_date(&self) -> Option<NaiveDate> {
        self.latest_note().map(|n| n.date)
    }

    pub fn is_viewing_latest(&self) -> bool {
        self.current_index == 0
    }

    pub fn last_index(&self) -> usize {
        self.notes.len().saturating_sub(1)
    }

    pub fn has_note_for(&self, date: NaiveDate) -> bool {
        self.notes.iter().any(|n| n.date == date)
    }

    /// Start a new most-recent day and view it. Dates stay unique per workspace.
    pub fn prepend_note(&mut self, note: Note) -> Outcome {
        if self.has_note_for(note.date) {
            return Err(Rejection::DuplicateDate);
        }
        self.notes.insert(0, note);
        self.current_index = 0;
        Ok(())
    }
}

impl WorkspaceCollection {
    /// Fresh state: a single "Main" workspace with one empty note for `today`
    pub fn new(today: NaiveDate) -> Self {
        let workspace = Workspace::new(DEFAULT_WORKSPACE_NAME.to_string(), today);
        Self {
            active_workspace_id: workspace.id.clone(),
            workspaces: vec![workspace],
        }
    }

    pub fn active(&self) -> Option<&Workspace> {
        self.get(&self.active_workspace_id)
    }

    pub fn active_mut(&mut self) -> Option<&mut Workspace> {
        let id = self.active_workspace_id.clone();
        self.get_mut(&id)
    }

    pub fn get(&self, id: &str) -> Option<&Workspace> {
        self.workspaces.iter().find(|w| w.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Workspace> {
        self.workspaces.iter_mut().find(|w| w.id == id)
    }

    pub fn find_by_name(&self, name: &str) -> Option<&Workspace> {
        self.workspaces
            .iter()
            .find(|w| w.name.eq_ignore_ascii_case(name.trim()))
    }

    pub fn position_of(&self, id: &str) -> Option<usize> {
        self.workspaces.iter().position(|w| w.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn duplicate_mints_new_id_and_clears_completion() {
        let mut task = Task::new("water plants".to_string());
        task.completed = true;
        task.pinned = true;

        let copy = task.duplicate();
        assert_ne!(copy.id, task.id);
        assert_eq!(copy.text, "water plants");
        assert!(!copy.completed);
        assert!(copy.pinned);
    }

    #[test]
    fn prepend_refuses_a_second_note_for_a_date() {
        let mut ws = Workspace::new("Work".to_string(), date("2024-03-05"));
        assert_eq!(
            ws.prepend_note(Note::empty(date("2024-03-05"))),
            Err(Rejection::DuplicateDate)
        );
        assert_eq!(ws.notes.len(), 1);

        ws.prepend_note(Note::empty(date("2024-03-06"))).unwrap();
        assert_eq!(ws.latest_date(), Some(date("2024-03-06")));
        assert_eq!(ws.notes.len(), 2);
    }

    #[test]
    fn workspace_serializes_with_camel_case_keys() {
        let ws = Workspace::new("Work".to_string(), date("2024-03-05"));
        let json = serde_json::to_value(&ws).unwrap();

        assert_eq!(json["currentIndex"], 0);
        assert_eq!(json["notes"][0]["date"], "2024-03-05");
        assert!(json["notes"][0]["tasks"].as_array().unwrap().is_empty());
    }

    #[test]
    fn task_without_pinned_key_defaults_to_unpinned() {
        let task: Task =
            serde_json::from_str(r#"{"id":"1","text":"x","completed":false}"#).unwrap();
        assert!(!task.pinned);
    }

    #[test]
    fn completion_record_uses_persisted_key_names() {
        let record = CompletionRecord {
            id: "t1".to_string(),
            text: "Buy milk".to_string(),
            completed_at: "2024-01-01T09:30:00Z".parse().unwrap(),
            completed_date: date("2024-01-01"),
        };
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["completedDate"], "2024-01-01");
        assert!(json["completedAt"].as_str().unwrap().starts_with("2024-01-01T09:30:00"));
    }

    #[test]
    fn find_by_name_ignores_case_and_whitespace() {
        let collection = WorkspaceCollection::new(date("2024-01-01"));
        assert!(collection.find_by_name("  main ").is_some());
        assert!(collection.find_by_name("other").is_none());
    }
}
