//! The daybook ties the pieces together: clock ticks drive rollover and
//! navigation settling, every user mutation passes one gate, and every change
//! is written through the persistence gateway.

use chrono::NaiveDate;
use std::time::{Duration, Instant};
use tracing::{debug, error};

use crate::clock::ClockSource;
use crate::error::{Outcome, Rejection};
use crate::ledger::CompletionLedger;
use crate::models::{Note, Workspace, WorkspaceCollection};
use crate::navigation::{NavState, NavigationController, NavigationTiming};
use crate::persistence::{Gateway, PersistenceError, StateSource};
use crate::rollover::{RolloverEngine, RolloverOutcome, roll_over};
use crate::store::TaskStore;

/// What happened during one call to [`Daybook::tick`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Set when a clock tick was due
    pub rollover: Option<RolloverOutcome>,
    /// Workspaces whose navigation settled
    pub settled: Vec<String>,
}

impl TickReport {
    pub fn rolled_over(&self) -> bool {
        matches!(self.rollover, Some(RolloverOutcome::RolledOver { .. }))
    }
}

pub struct Daybook {
    store: TaskStore,
    navigator: NavigationController,
    rollover: RolloverEngine,
    clock: Box<dyn ClockSource>,
    gateway: Gateway,
    source: StateSource,
}

impl Daybook {
    /// Load state and start a session.
    ///
    /// Every workspace opens on its most recent day.
    pub fn open(
        gateway: Gateway,
        clock: Box<dyn ClockSource>,
        timing: NavigationTiming,
        tick_interval: Duration,
        start: Instant,
    ) -> Result<Self, PersistenceError> {
        let loaded = gateway.load(clock.today())?;
        let mut collection = loaded.collection;
        for workspace in collection.workspaces.iter_mut() {
            workspace.current_index = 0;
        }

        let daybook = Self {
            store: TaskStore::new(collection, loaded.ledger),
            navigator: NavigationController::new(timing),
            rollover: RolloverEngine::new(tick_interval, start),
            clock,
            gateway,
            source: loaded.source,
        };
        daybook.persist();
        Ok(daybook)
    }

    pub fn source(&self) -> StateSource {
        self.source
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    pub fn collection(&self) -> &WorkspaceCollection {
        self.store.collection()
    }

    pub fn ledger(&self) -> &CompletionLedger {
        self.store.ledger()
    }

    pub fn active_workspace(&self) -> Option<&Workspace> {
        self.store.active_workspace()
    }

    pub fn visible_note(&self) -> Option<&Note> {
        self.store.visible_note()
    }

    pub fn is_today(&self) -> bool {
        self.store.is_today()
    }

    pub fn nav_state(&self) -> NavState {
        match self.active_workspace() {
            Some(workspace) => self.navigator.state(&workspace.id),
            None => NavState::Settled,
        }
    }

    pub fn is_transitioning(&self) -> bool {
        self.nav_state() != NavState::Settled
    }

    pub fn timing(&self) -> &NavigationTiming {
        self.navigator.timing()
    }

    /// Task edits are allowed only on today's note, and never mid-transition
    pub fn mutation_permitted(&self) -> bool {
        self.gate().is_ok()
    }

    /// The reason task edits would be refused right now, if any
    pub fn gate(&self) -> Outcome {
        if self.is_transitioning() {
            return Err(Rejection::Busy);
        }
        if !self.is_today() {
            return Err(Rejection::NotToday);
        }
        Ok(())
    }

    /// Write the full state. A failed write is logged, never surfaced.
    fn persist(&self) {
        if let Err(e) = self.gateway.save(self.store.collection(), self.store.ledger()) {
            error!(error = %e, "failed to save state");
        }
    }

    fn logged<T>(&self, op: &str, outcome: Outcome<T>) -> Outcome<T> {
        match &outcome {
            Ok(_) => self.persist(),
            Err(rejection) => debug!(op, %rejection, "operation rejected"),
        }
        outcome
    }

    pub fn add_task(&mut self, text: &str) -> Outcome<String> {
        let outcome = self.gate().and_then(|_| self.store.add_task(text));
        self.logged("add_task", outcome)
    }

    pub fn edit_task(&mut self, id: &str, new_text: &str) -> Outcome {
        let outcome = self.gate().and_then(|_| self.store.edit_task(id, new_text));
        self.logged("edit_task", outcome)
    }

    pub fn delete_task(&mut self, id: &str) -> Outcome {
        let outcome = self.gate().and_then(|_| self.store.delete_task(id));
        self.logged("delete_task", outcome)
    }

    pub fn toggle_complete(&mut self, id: &str) -> Outcome<bool> {
        let now = self.clock.now();
        let outcome = self.gate().and_then(|_| self.store.toggle_complete(id, now));
        self.logged("toggle_complete", outcome)
    }

    pub fn toggle_pin(&mut self, id: &str) -> Outcome<bool> {
        let outcome = self.gate().and_then(|_| self.store.toggle_pin(id));
        self.logged("toggle_pin", outcome)
    }

    pub fn reorder(&mut self, id: &str, target: usize) -> Outcome {
        let outcome = self.gate().and_then(|_| self.store.reorder(id, target));
        self.logged("reorder", outcome)
    }

    /// Copy the viewed day's unfinished tasks into today, then head back to today
    pub fn copy_unfinished_to_today(&mut self, now: Instant) -> Outcome<usize> {
        if self.is_transitioning() {
            return self.logged("copy_unfinished", Err(Rejection::Busy));
        }
        let outcome = self.store.copy_unfinished_to_today();
        if outcome.is_ok() {
            // Already logged; the copy stands either way
            self.return_to_today(now).ok();
        }
        self.logged("copy_unfinished", outcome)
    }

    pub fn navigate_to(&mut self, index: usize, now: Instant) -> Outcome {
        let workspace = self.store.active_workspace().ok_or(Rejection::InvalidTarget)?;
        let outcome = self.navigator.request_navigate(workspace, index, now);
        self.logged_nav("navigate", outcome)
    }

    pub fn scroll(&mut self, delta: f64, now: Instant) -> Outcome {
        let workspace = self.store.active_workspace().ok_or(Rejection::InvalidTarget)?;
        let outcome = self.navigator.request_scroll_delta(workspace, delta, now);
        self.logged_nav("scroll", outcome)
    }

    pub fn return_to_today(&mut self, now: Instant) -> Outcome {
        let workspace = self.store.active_workspace().ok_or(Rejection::InvalidTarget)?;
        let outcome = self.navigator.request_return_to_today(workspace, now);
        self.logged_nav("return_to_today", outcome)
    }

    // Navigation only changes state once it settles, so nothing to save yet
    fn logged_nav(&self, op: &str, outcome: Outcome) -> Outcome {
        if let Err(rejection) = &outcome {
            debug!(op, %rejection, "navigation rejected");
        }
        outcome
    }

    pub fn create_workspace(&mut self, name: &str) -> String {
        let today = self.clock.today();
        let id = self.store.create_workspace(name, today);
        self.persist();
        id
    }

    pub fn rename_workspace(&mut self, id: &str, name: &str) -> Outcome {
        let outcome = self.store.rename_workspace(id, name);
        self.logged("rename_workspace", outcome)
    }

    pub fn switch_workspace(&mut self, id: &str) -> Outcome {
        let outcome = self.store.switch_workspace(id);
        self.logged("switch_workspace", outcome)
    }

    pub fn cycle_workspace(&mut self, offset: isize) -> Outcome {
        let outcome = self.store.cycle_workspace(offset);
        self.logged("cycle_workspace", outcome)
    }

    pub fn close_workspace(&mut self, id: &str) -> Outcome {
        let outcome = self.store.close_workspace(id);
        if outcome.is_ok() {
            self.navigator.forget(id);
        }
        self.logged("close_workspace", outcome)
    }

    /// Advance timers: settle finished transitions and, when a clock tick is
    /// due, check for a day boundary.
    pub fn tick(&mut self, now: Instant) -> TickReport {
        let settled = self.navigator.poll(self.store.collection_mut(), now);
        let rollover = self
            .rollover
            .on_tick(now, self.clock.as_ref(), self.store.collection_mut());
        if let Some(outcome) = &rollover {
            self.after_rollover(outcome, now);
        }
        if !settled.is_empty() {
            self.persist();
        }
        TickReport { rollover, settled }
    }

    /// Check for a day boundary right away, without waiting for a tick
    pub fn check_rollover(&mut self, now: Instant) -> RolloverOutcome {
        let today = self.clock.today();
        let outcome = roll_over(self.store.collection_mut(), today);
        self.after_rollover(&outcome, now);
        outcome
    }

    fn after_rollover(&mut self, outcome: &RolloverOutcome, now: Instant) {
        if let RolloverOutcome::RolledOver { workspaces, .. } = outcome {
            for id in workspaces {
                self.navigator.hold_after_rollover(id, now);
            }
            self.persist();
        }
    }
}
