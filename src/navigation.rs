//! Which day each workspace shows, and whether it is allowed to change right now.
//!
//! A workspace is either Settled or Transitioning towards a target index. A
//! transition resolves once its settle delay has elapsed, when [`poll`] is
//! next called; requests made in the meantime are rejected, not queued.
//!
//! [`poll`]: NavigationController::poll

use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::error::{Outcome, Rejection};
use crate::models::{Workspace, WorkspaceCollection};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NavigationTiming {
    /// Jumping to an index, including back to today
    pub navigate: Duration,
    /// A single step from scroll input
    pub scroll: Duration,
    /// Returning to today after a day boundary
    pub rollover: Duration,
    /// Scroll magnitudes at or below this are ignored
    pub scroll_threshold: f64,
}

impl Default for NavigationTiming {
    fn default() -> Self {
        Self {
            navigate: Duration::from_millis(600),
            scroll: Duration::from_millis(400),
            rollover: Duration::from_millis(800),
            scroll_threshold: 50.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavState {
    Settled,
    Transitioning { target: usize, settles_at: Instant },
}

#[derive(Debug, Clone, Default)]
pub struct NavigationController {
    timing: NavigationTiming,
    pending: HashMap<String, (usize, Instant)>,
}

impl NavigationController {
    pub fn new(timing: NavigationTiming) -> Self {
        Self {
            timing,
            pending: HashMap::new(),
        }
    }

    pub fn timing(&self) -> &NavigationTiming {
        &self.timing
    }

    pub fn state(&self, workspace_id: &str) -> NavState {
        match self.pending.get(workspace_id) {
            Some(&(target, settles_at)) => NavState::Transitioning { target, settles_at },
            None => NavState::Settled,
        }
    }

    pub fn is_transitioning(&self, workspace_id: &str) -> bool {
        self.pending.contains_key(workspace_id)
    }

    /// Start moving `workspace` to `target`
    pub fn request_navigate(&mut self, workspace: &Workspace, target: usize, now: Instant) -> Outcome {
        self.begin(workspace, target, self.timing.navigate, now)
    }

    /// Turn continuous scroll input into at most one step.
    ///
    /// Positive deltas go back in time (towards older notes), negative ones
    /// towards today.
    pub fn request_scroll_delta(&mut self, workspace: &Workspace, delta: f64, now: Instant) -> Outcome {
        if delta.abs() <= self.timing.scroll_threshold {
            return Err(Rejection::InvalidTarget);
        }
        let current = workspace.current_index;
        let target = if delta > 0.0 {
            (current + 1).min(workspace.last_index())
        } else {
            current.saturating_sub(1)
        };
        self.begin(workspace, target, self.timing.scroll, now)
    }

    pub fn request_return_to_today(&mut self, workspace: &Workspace, now: Instant) -> Outcome {
        self.request_navigate(workspace, 0, now)
    }

    fn begin(&mut self, workspace: &Workspace, target: usize, delay: Duration, now: Instant) -> Outcome {
        if self.is_transitioning(&workspace.id) {
            return Err(Rejection::Busy);
        }
        if target >= workspace.notes.len() || target == workspace.current_index {
            return Err(Rejection::InvalidTarget);
        }
        debug!(workspace_id = %workspace.id, from = workspace.current_index, target, "navigation started");
        self.pending.insert(workspace.id.clone(), (target, now + delay));
        Ok(())
    }

    /// Hold a freshly rolled-over workspace on today while the new day settles in.
    ///
    /// Replaces whatever transition was in flight, since its target index
    /// referred to the notes as they were before the new day was inserted.
    pub fn hold_after_rollover(&mut self, workspace_id: &str, now: Instant) {
        self.pending
            .insert(workspace_id.to_string(), (0, now + self.timing.rollover));
    }

    /// Drop state for a workspace that no longer exists
    pub fn forget(&mut self, workspace_id: &str) {
        self.pending.remove(workspace_id);
    }

    /// Resolve every transition whose settle delay has elapsed.
    ///
    /// Returns the ids of the workspaces that settled.
    pub fn poll(&mut self, collection: &mut WorkspaceCollection, now: Instant) -> Vec<String> {
        let due: Vec<String> = self
            .pending
            .iter()
            .filter(|(_, (_, settles_at))| *settles_at <= now)
            .map(|(id, _)| id.clone())
            .collect();

        for id in &due {
            if let Some((target, _)) = self.pending.remove(id) {
                if let Some(workspace) = collection.get_mut(id) {
                    workspace.current_index = target.min(workspace.last_index());
                    debug!(workspace_id = %id, index = workspace.current_index, "navigation settled");
                }
            }
        }
        due
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Note;
    use chrono::NaiveDate;

    fn collection_with_days(days: u32) -> WorkspaceCollection {
        let mut collection = WorkspaceCollection::new(NaiveDate::from_ymd_opt(2024, 1, 28).unwrap());
        for back in 1..days {
            let date = NaiveDate::from_ymd_opt(2024, 1, 28 - back).unwrap();
            collection.workspaces[0].notes.push(Note::empty(date));
        }
        collection
    }

    #[test]
    fn navigation_settles_after_delay() {
        let start = Instant::now();
        let mut collection = collection_with_days(3);
        let mut nav = NavigationController::default();
        let id = collection.workspaces[0].id.clone();

        nav.request_navigate(&collection.workspaces[0], 2, start).unwrap();
        assert!(nav.is_transitioning(&id));

        assert!(nav.poll(&mut collection, start + Duration::from_millis(599)).is_empty());
        assert_eq!(collection.workspaces[0].current_index, 0);

        assert_eq!(nav.poll(&mut collection, start + Duration::from_millis(600)), vec![id.clone()]);
        assert_eq!(collection.workspaces[0].current_index, 2);
        assert_eq!(nav.state(&id), NavState::Settled);
    }

    #[test]
    fn second_request_while_transitioning_is_rejected() {
        let start = Instant::now();
        let collection = collection_with_days(3);
        let mut nav = NavigationController::default();
        let workspace = &collection.workspaces[0];

        nav.request_navigate(workspace, 1, start).unwrap();
        assert_eq!(nav.request_navigate(workspace, 2, start), Err(Rejection::Busy));
        assert_eq!(
            nav.state(&workspace.id),
            NavState::Transitioning { target: 1, settles_at: start + Duration::from_millis(600) }
        );
    }

    #[test]
    fn out_of_range_or_unchanged_targets_are_rejected() {
        let start = Instant::now();
        let collection = collection_with_days(2);
        let mut nav = NavigationController::default();
        let workspace = &collection.workspaces[0];

        assert_eq!(nav.request_navigate(workspace, 2, start), Err(Rejection::InvalidTarget));
        assert_eq!(nav.request_navigate(workspace, 0, start), Err(Rejection::InvalidTarget));
        assert_eq!(nav.request_return_to_today(workspace, start), Err(Rejection::InvalidTarget));
        assert!(!nav.is_transitioning(&workspace.id));
    }

    #[test]
    fn small_scroll_is_ignored() {
        let start = Instant::now();
        let collection = collection_with_days(2);
        let mut nav = NavigationController::default();

        assert_eq!(
            nav.request_scroll_delta(&collection.workspaces[0], 50.0, start),
            Err(Rejection::InvalidTarget)
        );
    }

    #[test]
    fn scroll_steps_one_day_and_stops_at_the_ends() {
        let start = Instant::now();
        let mut collection = collection_with_days(2);
        let mut nav = NavigationController::default();

        assert_eq!(
            nav.request_scroll_delta(&collection.workspaces[0], -120.0, start),
            Err(Rejection::InvalidTarget)
        );

        nav.request_scroll_delta(&collection.workspaces[0], 120.0, start).unwrap();
        nav.poll(&mut collection, start + Duration::from_millis(400));
        assert_eq!(collection.workspaces[0].current_index, 1);

        assert_eq!(
            nav.request_scroll_delta(&collection.workspaces[0], 120.0, start),
            Err(Rejection::InvalidTarget)
        );
    }

    #[test]
    fn rollover_hold_replaces_pending_target() {
        let start = Instant::now();
        let mut collection = collection_with_days(3);
        let mut nav = NavigationController::default();
        let id = collection.workspaces[0].id.clone();

        nav.request_navigate(&collection.workspaces[0], 2, start).unwrap();
        nav.hold_after_rollover(&id, start);
        nav.poll(&mut collection, start + Duration::from_millis(800));
        assert_eq!(collection.workspaces[0].current_index, 0);
    }
}
