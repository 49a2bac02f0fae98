//! Mapping between in-memory state and the durable key-value records.
//!
//! Two records are written: the workspace collection and the completion
//! ledger. A third, legacy record (a bare list of day notes from before
//! workspaces existed) is only ever read, as a one-time migration source.

use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::database::{DatabaseError, KeyValueStore};
use crate::ledger::CompletionLedger;
use crate::models::{DEFAULT_WORKSPACE_NAME, Note, Task, Workspace, WorkspaceCollection, new_id};

pub const WORKSPACES_KEY: &str = "timeMachineWorkspaces";
pub const COMPLETIONS_KEY: &str = "timeMachineCompletions";
pub const LEGACY_KEY: &str = "timeMachineTodos";

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Storage error: {0}")]
    StorageError(#[from] DatabaseError),
    #[error("Failed to serialize state: {0}")]
    SerializeError(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LegacyTodo {
    pub id: String,
    pub text: String,
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LegacyNote {
    pub date: NaiveDate,
    pub todos: Vec<LegacyTodo>,
}

/// A workspace record as found in storage, by schema version
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoredWorkspaces {
    Modern(WorkspaceCollection),
    Legacy(Vec<LegacyNote>),
    /// Nothing stored yet
    Absent,
    /// Something is stored but matches no known schema
    Unreadable,
}

/// Where the loaded state came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateSource {
    Modern,
    MigratedLegacy,
    Fresh,
    Recovered,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedState {
    pub collection: WorkspaceCollection,
    pub ledger: CompletionLedger,
    pub source: StateSource,
}

/// Classify the raw workspace records.
///
/// A present modern record decides alone: the legacy record is only read
/// while the modern key is missing.
pub fn decode_workspaces(modern: Option<&str>, legacy: Option<&str>) -> StoredWorkspaces {
    if let Some(raw) = modern {
        return match serde_json::from_str::<WorkspaceCollection>(raw) {
            Ok(collection) => StoredWorkspaces::Modern(collection),
            Err(e) => {
                warn!(error = %e, "workspace record does not parse");
                StoredWorkspaces::Unreadable
            }
        };
    }
    match legacy {
        Some(raw) => match serde_json::from_str::<Vec<LegacyNote>>(raw) {
            Ok(notes) => StoredWorkspaces::Legacy(notes),
            Err(e) => {
                warn!(error = %e, "legacy record does not parse");
                StoredWorkspaces::Unreadable
            }
        },
        None => StoredWorkspaces::Absent,
    }
}

/// Drop notes whose date already appeared earlier in the list
fn drop_duplicate_dates(notes: &mut Vec<Note>) -> bool {
    let before = notes.len();
    let mut seen = Vec::with_capacity(before);
    notes.retain(|note| {
        if seen.contains(&note.date) {
            warn!(date = %note.date, "dropping note with duplicate date");
            false
        } else {
            seen.push(note.date);
            true
        }
    });
    notes.len() != before
}

/// Put notes newest first and keep one note per date. The first note for a
/// date wins. Returns true if anything moved or was dropped.
pub fn normalize_notes(notes: &mut Vec<Note>) -> bool {
    let dropped = drop_duplicate_dates(notes);
    let sorted = notes.windows(2).all(|pair| pair[0].date > pair[1].date);
    if !sorted {
        notes.sort_by(|a, b| b.date.cmp(&a.date));
    }
    dropped || !sorted
}

/// Wrap legacy day notes into a single "Main" workspace.
///
/// Task ids and order are kept. If two notes share a date, the first wins.
pub fn legacy_to_modern(notes: Vec<LegacyNote>) -> WorkspaceCollection {
    let mut converted: Vec<Note> = notes
        .into_iter()
        .map(|note| Note {
            date: note.date,
            tasks: note
                .todos
                .into_iter()
                .map(|todo| Task {
                    id: todo.id,
                    text: todo.text,
                    completed: todo.completed,
                    pinned: false,
                })
                .collect(),
        })
        .collect();
    normalize_notes(&mut converted);

    let workspace = Workspace {
        id: new_id(),
        name: DEFAULT_WORKSPACE_NAME.to_string(),
        notes: converted,
        current_index: 0,
    };
    WorkspaceCollection {
        active_workspace_id: workspace.id.clone(),
        workspaces: vec![workspace],
    }
}

/// Make a loaded collection usable for `today`.
///
/// Restores newest-first order with one note per date, prepends an empty
/// note for today wherever the newest note is older (no pinned tasks are
/// carried here), clamps view indexes and repairs a dangling active
/// workspace. Returns true if anything changed.
pub fn ensure_today(collection: &mut WorkspaceCollection, today: NaiveDate) -> bool {
    if collection.workspaces.is_empty() {
        *collection = WorkspaceCollection::new(today);
        return true;
    }

    let mut changed = false;
    for workspace in collection.workspaces.iter_mut() {
        if normalize_notes(&mut workspace.notes) {
            warn!(workspace_id = %workspace.id, "notes were out of order, repaired");
            changed = true;
        }
        let behind = match workspace.latest_date() {
            None => true,
            Some(latest) if latest < today => true,
            Some(latest) => {
                if latest > today {
                    warn!(workspace_id = %workspace.id, %latest, %today, "newest note is dated after today");
                }
                false
            }
        };
        if behind && workspace.prepend_note(Note::empty(today)).is_ok() {
            changed = true;
        }
        if workspace.current_index > workspace.last_index() {
            workspace.current_index = workspace.last_index();
            changed = true;
        }
    }

    if collection.active().is_none() {
        collection.active_workspace_id = collection.workspaces[0].id.clone();
        changed = true;
    }
    changed
}

/// Reads and writes the full state through a key-value store
pub struct Gateway {
    store: Box<dyn KeyValueStore>,
}

impl Gateway {
    pub fn new(store: impl KeyValueStore + 'static) -> Self {
        Self {
            store: Box::new(store),
        }
    }

    /// Load state for `today`, migrating or initializing as needed.
    ///
    /// Only a failure to read storage is an error; records that cannot be
    /// parsed are replaced by fresh state.
    pub fn load(&self, today: NaiveDate) -> Result<LoadedState, PersistenceError> {
        let modern = self.store.get(WORKSPACES_KEY)?;
        let legacy = match modern {
            Some(_) => None,
            None => self.store.get(LEGACY_KEY)?,
        };
        let decoded = decode_workspaces(modern.as_deref(), legacy.as_deref());

        let (mut collection, source) = match decoded {
            StoredWorkspaces::Modern(collection) => (collection, StateSource::Modern),
            StoredWorkspaces::Legacy(notes) => {
                info!(notes = notes.len(), "migrating legacy notes into workspace \"Main\"");
                (legacy_to_modern(notes), StateSource::MigratedLegacy)
            }
            StoredWorkspaces::Absent => (WorkspaceCollection::new(today), StateSource::Fresh),
            StoredWorkspaces::Unreadable => {
                error!("stored workspaces match no known schema, starting over");
                (WorkspaceCollection::new(today), StateSource::Recovered)
            }
        };
        ensure_today(&mut collection, today);

        let ledger = match self.store.get(COMPLETIONS_KEY)? {
            Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                error!(error = %e, "completion history does not parse, starting over");
                CompletionLedger::new()
            }),
            None => CompletionLedger::new(),
        };

        Ok(LoadedState {
            collection,
            ledger,
            source,
        })
    }

    pub fn save(
        &self,
        collection: &WorkspaceCollection,
        ledger: &CompletionLedger,
    ) -> Result<(), PersistenceError> {
        let workspaces = serde_json::to_string(collection)?;
        let completions = serde_json::to_string(ledger)?;
        self.store.put(WORKSPACES_KEY, &workspaces)?;
        self.store.put(COMPLETIONS_KEY, &completions)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn modern_record_takes_precedence() {
        let collection = WorkspaceCollection::new(date("2024-02-01"));
        let raw = serde_json::to_string(&collection).unwrap();
        let legacy = r#"[{"date":"2024-01-01","todos":[]}]"#;

        assert_eq!(
            decode_workspaces(Some(&raw), Some(legacy)),
            StoredWorkspaces::Modern(collection)
        );
    }

    #[test]
    fn garbage_is_unreadable_not_absent() {
        assert_eq!(decode_workspaces(Some("{nope"), None), StoredWorkspaces::Unreadable);
        assert_eq!(decode_workspaces(None, None), StoredWorkspaces::Absent);
    }

    #[test]
    fn broken_modern_record_never_falls_back_to_legacy() {
        let legacy = r#"[{"date":"2024-01-01","todos":[]}]"#;
        assert_eq!(
            decode_workspaces(Some("{\"workspaces\": 7}"), Some(legacy)),
            StoredWorkspaces::Unreadable
        );
    }

    #[test]
    fn legacy_notes_keep_ids_and_order() {
        let notes: Vec<LegacyNote> = serde_json::from_str(
            r#"[
                {"date":"2024-01-02","todos":[{"id":"a","text":"one","completed":true},{"id":"b","text":"two","completed":false}]},
                {"date":"2024-01-01","todos":[]},
                {"date":"2024-01-01","todos":[{"id":"c","text":"dup","completed":false}]}
            ]"#,
        )
        .unwrap();

        let collection = legacy_to_modern(notes);
        let workspace = collection.active().unwrap();
        assert_eq!(workspace.name, "Main");
        assert_eq!(workspace.notes.len(), 2);
        assert_eq!(workspace.notes[0].tasks[0].id, "a");
        assert!(workspace.notes[0].tasks[0].completed);
        assert!(workspace.notes[1].tasks.is_empty());
    }

    #[test]
    fn ensure_today_prepends_without_carrying_pins() {
        let mut collection = WorkspaceCollection::new(date("2024-01-01"));
        let mut pinned = Task::new("pinned".to_string());
        pinned.pinned = true;
        collection.workspaces[0].notes[0].tasks.push(pinned);

        assert!(ensure_today(&mut collection, date("2024-01-03")));
        let workspace = &collection.workspaces[0];
        assert_eq!(workspace.notes[0].date, date("2024-01-03"));
        assert!(workspace.notes[0].tasks.is_empty());
        assert!(!ensure_today(&mut collection, date("2024-01-03")));
    }

    #[test]
    fn ensure_today_repairs_indexes_and_active_id() {
        let mut collection = WorkspaceCollection::new(date("2024-01-01"));
        collection.workspaces[0].current_index = 7;
        collection.active_workspace_id = "gone".to_string();

        assert!(ensure_today(&mut collection, date("2024-01-01")));
        assert_eq!(collection.workspaces[0].current_index, 0);
        assert_eq!(collection.active_workspace_id, collection.workspaces[0].id);
    }

    #[test]
    fn ensure_today_restores_note_order() {
        let mut collection = WorkspaceCollection::new(date("2024-01-01"));
        let notes = &mut collection.workspaces[0].notes;
        let mut first_today = Note::empty(date("2024-01-03"));
        first_today.tasks.push(Task::new("kept".to_string()));
        notes.push(first_today);
        notes.push(Note::empty(date("2024-01-03")));

        assert!(ensure_today(&mut collection, date("2024-01-03")));
        let workspace = &collection.workspaces[0];
        let dates: Vec<NaiveDate> = workspace.notes.iter().map(|n| n.date).collect();
        assert_eq!(dates, vec![date("2024-01-03"), date("2024-01-01")]);
        assert_eq!(workspace.notes[0].tasks[0].text, "kept");
    }

    #[test]
    fn empty_collection_is_reinitialized() {
        let mut collection = WorkspaceCollection {
            workspaces: Vec::new(),
            active_workspace_id: String::new(),
        };
        assert!(ensure_today(&mut collection, date("2024-01-01")));
        assert_eq!(collection.workspaces.len(), 1);
        assert_eq!(collection.workspaces[0].notes[0].date, date("2024-01-01"));
    }
}
