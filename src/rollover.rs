use chrono::NaiveDate;
use std::time::{Duration, Instant};
use tracing::{info, warn};

use crate::clock::{ClockSource, Ticker};
use crate::models::{Note, Task, WorkspaceCollection};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RolloverOutcome {
    /// Every workspace already has a note for today
    UpToDate,
    RolledOver {
        /// Ids of the workspaces that received a new note
        workspaces: Vec<String>,
        /// Pinned tasks carried into the new notes, across all workspaces
        carried: usize,
        /// Calendar days passed over without a note (dormancy)
        skipped_days: i64,
    },
    /// Some workspace already holds a note newer than today; nothing changed
    ClockRegressed,
}

/// Advance every workspace to `today`, carrying forward pinned unfinished tasks.
///
/// All workspaces move together or none do: the new notes are built on a copy
/// and swapped in at the end. Only the single current date is considered, so
/// several missed days produce one new note.
pub fn roll_over(collection: &mut WorkspaceCollection, today: NaiveDate) -> RolloverOutcome {
    if collection
        .workspaces
        .iter()
        .all(|w| w.latest_date() == Some(today))
    {
        return RolloverOutcome::UpToDate;
    }
    if let Some(newest) = collection
        .workspaces
        .iter()
        .filter_map(|w| w.latest_date())
        .filter(|d| *d > today)
        .max()
    {
        warn!(%today, %newest, "clock is behind the newest note, skipping rollover");
        return RolloverOutcome::ClockRegressed;
    }

    let mut workspaces = collection.workspaces.clone();
    let mut rolled = Vec::new();
    let mut carried = 0;
    let mut skipped_days = 0;

    for workspace in workspaces.iter_mut() {
        let previous = workspace.latest_date();
        if previous == Some(today) {
            continue;
        }
        let tasks: Vec<Task> = workspace
            .latest_note()
            .map(|n| n.tasks.iter().filter(|t| t.carries_forward()).map(Task::duplicate).collect())
            .unwrap_or_default();
        let count = tasks.len();
        if let Err(rejection) = workspace.prepend_note(Note { date: today, tasks }) {
            warn!(workspace_id = %workspace.id, %rejection, "workspace not rolled over");
            continue;
        }
        if let Some(previous) = previous {
            skipped_days = skipped_days.max((today - previous).num_days() - 1);
        }
        carried += count;
        rolled.push(workspace.id.clone());
    }

    collection.workspaces = workspaces;
    info!(%today, workspaces = rolled.len(), carried, skipped_days, "rolled over to a new day");
    RolloverOutcome::RolledOver {
        workspaces: rolled,
        carried,
        skipped_days,
    }
}

/// Runs the rollover check on each clock tick
#[derive(Debug, Clone)]
pub struct RolloverEngine {
    ticker: Ticker,
}

impl RolloverEngine {
    pub fn new(tick_interval: Duration, start: Instant) -> Self {
        Self {
            ticker: Ticker::new(tick_interval, start),
        }
    }

    /// Check for a day boundary if a tick is due; `None` when no tick fired
    pub fn on_tick(
        &mut self,
        now: Instant,
        clock: &dyn ClockSource,
        collection: &mut WorkspaceCollection,
    ) -> Option<RolloverOutcome> {
        if self.ticker.poll(now) {
            Some(roll_over(collection, clock.today()))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::models::Workspace;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn task(text: &str, pinned: bool, completed: bool) -> Task {
        let mut task = Task::new(text.to_string());
        task.pinned = pinned;
        task.completed = completed;
        task
    }

    #[test]
    fn carries_only_pinned_unfinished_tasks() {
        let mut collection = WorkspaceCollection::new(date(1));
        let original = task("pinned open", true, false);
        let original_id = original.id.clone();
        collection.workspaces[0].notes[0].tasks = vec![
            original,
            task("pinned done", true, true),
            task("loose", false, false),
        ];

        let outcome = roll_over(&mut collection, date(2));
        assert!(matches!(outcome, RolloverOutcome::RolledOver { carried: 1, .. }));

        let today = &collection.workspaces[0].notes[0];
        assert_eq!(today.date, date(2));
        assert_eq!(today.tasks.len(), 1);
        assert_eq!(today.tasks[0].text, "pinned open");
        assert_ne!(today.tasks[0].id, original_id);
        assert!(!today.tasks[0].completed);
        assert_eq!(collection.workspaces[0].notes[1].tasks.len(), 3);
    }

    #[test]
    fn second_check_on_same_day_adds_nothing() {
        let mut collection = WorkspaceCollection::new(date(1));
        roll_over(&mut collection, date(2));
        assert_eq!(roll_over(&mut collection, date(2)), RolloverOutcome::UpToDate);
        assert_eq!(collection.workspaces[0].notes.len(), 2);
    }

    #[test]
    fn resets_view_to_newest_note() {
        let mut collection = WorkspaceCollection::new(date(1));
        collection.workspaces[0].notes.push(Note::empty(NaiveDate::from_ymd_opt(2023, 12, 31).unwrap()));
        collection.workspaces[0].current_index = 1;

        roll_over(&mut collection, date(2));
        assert_eq!(collection.workspaces[0].current_index, 0);
    }

    #[test]
    fn dormancy_collapses_into_one_note() {
        let mut collection = WorkspaceCollection::new(date(1));
        let outcome = roll_over(&mut collection, date(5));

        assert!(matches!(outcome, RolloverOutcome::RolledOver { skipped_days: 3, .. }));
        let dates: Vec<_> = collection.workspaces[0].notes.iter().map(|n| n.date).collect();
        assert_eq!(dates, [date(5), date(1)]);
    }

    #[test]
    fn workspace_already_on_today_is_left_alone() {
        let mut collection = WorkspaceCollection::new(date(1));
        collection.workspaces.push(Workspace::new("Fresh".to_string(), date(2)));

        let outcome = roll_over(&mut collection, date(2));
        match outcome {
            RolloverOutcome::RolledOver { workspaces, .. } => assert_eq!(workspaces.len(), 1),
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_eq!(collection.workspaces[1].notes.len(), 1);
    }

    #[test]
    fn regressed_clock_changes_nothing() {
        let mut collection = WorkspaceCollection::new(date(1));
        collection.workspaces.push(Workspace::new("Ahead".to_string(), date(3)));
        let before = collection.clone();

        assert_eq!(roll_over(&mut collection, date(2)), RolloverOutcome::ClockRegressed);
        assert_eq!(collection, before);
    }

    #[test]
    fn engine_only_checks_when_a_tick_is_due() {
        let start = Instant::now();
        let clock = ManualClock::new(date(1));
        let mut collection = WorkspaceCollection::new(date(1));
        let mut engine = RolloverEngine::new(Duration::from_secs(60), start);

        clock.advance_day();
        assert_eq!(engine.on_tick(start + Duration::from_secs(10), &clock, &mut collection), None);
        assert_eq!(collection.workspaces[0].notes.len(), 1);

        let outcome = engine.on_tick(start + Duration::from_secs(60), &clock, &mut collection);
        assert!(matches!(outcome, Some(RolloverOutcome::RolledOver { .. })));
        assert_eq!(collection.workspaces[0].notes.len(), 2);
    }
}
