use chrono::NaiveDate;
use daynotes::navigation::{NavState, NavigationTiming};
use daynotes::rollover::RolloverOutcome;
use daynotes::{
    CompletionLedger, Daybook, Gateway, ManualClock, MemoryStore, Note, Rejection, Task,
    WorkspaceCollection,
};
use std::rc::Rc;
use std::time::{Duration, Instant};

const TICK: Duration = Duration::from_secs(60);

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn open(clock: &Rc<ManualClock>, store: &Rc<MemoryStore>, start: Instant) -> Daybook {
    Daybook::open(
        Gateway::new(Rc::clone(store)),
        Box::new(Rc::clone(clock)),
        NavigationTiming::default(),
        TICK,
        start,
    )
    .unwrap()
}

fn task(text: &str, completed: bool) -> Task {
    let mut task = Task::new(text.to_string());
    task.completed = completed;
    task
}

/// Main workspace with today plus two older days; the oldest holds two open tasks and one done
fn seeded_store(today: NaiveDate) -> Rc<MemoryStore> {
    let mut collection = WorkspaceCollection::new(today);
    let workspace = &mut collection.workspaces[0];
    workspace.notes.push(Note {
        date: today.pred_opt().unwrap(),
        tasks: vec![task("yesterday's chore", true)],
    });
    workspace.notes.push(Note {
        date: today.pred_opt().unwrap().pred_opt().unwrap(),
        tasks: vec![
            task("write report", false),
            task("call plumber", false),
            task("water plants", true),
        ],
    });

    let store = Rc::new(MemoryStore::new());
    Gateway::new(Rc::clone(&store))
        .save(&collection, &CompletionLedger::new())
        .unwrap();
    store
}

#[test]
fn completed_then_deleted_task_stays_in_history() {
    let clock = Rc::new(ManualClock::new(date("2024-05-10")));
    let store = Rc::new(MemoryStore::new());
    let mut daybook = open(&clock, &store, Instant::now());

    let id = daybook.add_task("Buy milk").unwrap();
    assert!(daybook.toggle_complete(&id).unwrap());
    daybook.delete_task(&id).unwrap();

    assert!(daybook.visible_note().unwrap().tasks.is_empty());
    assert_eq!(daybook.ledger().len(), 1);
    let record = &daybook.ledger().entries()[0];
    assert_eq!(record.text, "Buy milk");
    assert_eq!(record.completed_date, date("2024-05-10"));

    // Survives a restart
    let reopened = open(&clock, &store, Instant::now());
    assert_eq!(reopened.ledger().len(), 1);
}

#[test]
fn reopening_a_task_does_not_add_history() {
    let clock = Rc::new(ManualClock::new(date("2024-05-10")));
    let store = Rc::new(MemoryStore::new());
    let mut daybook = open(&clock, &store, Instant::now());

    let id = daybook.add_task("stretch").unwrap();
    assert!(daybook.toggle_complete(&id).unwrap());
    assert!(!daybook.toggle_complete(&id).unwrap());
    assert!(daybook.toggle_complete(&id).unwrap());
    assert_eq!(daybook.ledger().len(), 2);
}

#[test]
fn copying_unfinished_tasks_from_an_old_day() {
    let today = date("2024-05-10");
    let clock = Rc::new(ManualClock::new(today));
    let store = seeded_store(today);
    let t0 = Instant::now();
    let mut daybook = open(&clock, &store, t0);

    daybook.navigate_to(2, t0).unwrap();
    assert!(daybook.is_today(), "index only moves once the transition settles");
    assert!(daybook.tick(t0 + ms(599)).settled.is_empty());
    let report = daybook.tick(t0 + ms(600));
    assert_eq!(report.settled.len(), 1);
    assert_eq!(daybook.active_workspace().unwrap().current_index, 2);

    let old_ids: Vec<String> = daybook
        .visible_note()
        .unwrap()
        .tasks
        .iter()
        .map(|t| t.id.clone())
        .collect();

    let t1 = t0 + ms(1_000);
    assert_eq!(daybook.copy_unfinished_to_today(t1), Ok(2));

    let workspace = daybook.active_workspace().unwrap();
    let today_tasks = &workspace.notes[0].tasks;
    let texts: Vec<&str> = today_tasks.iter().map(|t| t.text.as_str()).collect();
    assert_eq!(texts, vec!["write report", "call plumber"]);
    assert!(today_tasks.iter().all(|t| !t.completed && !old_ids.contains(&t.id)));
    // The source day is untouched
    assert_eq!(workspace.notes[2].tasks.len(), 3);

    // Heading back to today
    assert!(matches!(
        daybook.nav_state(),
        NavState::Transitioning { target: 0, .. }
    ));
    daybook.tick(t1 + ms(600));
    assert_eq!(daybook.active_workspace().unwrap().current_index, 0);
    assert!(daybook.mutation_permitted());
}

#[test]
fn past_days_reject_edits_without_changing_state() {
    let today = date("2024-05-10");
    let clock = Rc::new(ManualClock::new(today));
    let store = seeded_store(today);
    let t0 = Instant::now();
    let mut daybook = open(&clock, &store, t0);

    daybook.navigate_to(1, t0).unwrap();
    daybook.tick(t0 + ms(600));
    let before = daybook.store().clone();
    let id = daybook.visible_note().unwrap().tasks[0].id.clone();

    assert_eq!(daybook.add_task("sneaky"), Err(Rejection::NotToday));
    assert_eq!(daybook.edit_task(&id, "changed"), Err(Rejection::NotToday));
    assert_eq!(daybook.delete_task(&id), Err(Rejection::NotToday));
    assert_eq!(daybook.toggle_complete(&id), Err(Rejection::NotToday));
    assert_eq!(daybook.toggle_pin(&id), Err(Rejection::NotToday));
    assert_eq!(daybook.reorder(&id, 0), Err(Rejection::NotToday));

    assert_eq!(daybook.store(), &before);
}

#[test]
fn edits_wait_while_moving_between_days() {
    let today = date("2024-05-10");
    let clock = Rc::new(ManualClock::new(today));
    let store = seeded_store(today);
    let t0 = Instant::now();
    let mut daybook = open(&clock, &store, t0);

    daybook.scroll(120.0, t0).unwrap();
    assert_eq!(daybook.add_task("too early"), Err(Rejection::Busy));
    assert_eq!(daybook.navigate_to(2, t0 + ms(10)), Err(Rejection::Busy));
    assert_eq!(daybook.copy_unfinished_to_today(t0 + ms(10)), Err(Rejection::Busy));

    // Scroll settles faster than navigation
    daybook.tick(t0 + ms(400));
    assert_eq!(daybook.active_workspace().unwrap().current_index, 1);
}

#[test]
fn small_scrolls_and_out_of_range_targets_are_ignored() {
    let today = date("2024-05-10");
    let clock = Rc::new(ManualClock::new(today));
    let store = seeded_store(today);
    let t0 = Instant::now();
    let mut daybook = open(&clock, &store, t0);

    assert_eq!(daybook.scroll(50.0, t0), Err(Rejection::InvalidTarget));
    assert_eq!(daybook.scroll(-200.0, t0), Err(Rejection::InvalidTarget));
    assert_eq!(daybook.navigate_to(3, t0), Err(Rejection::InvalidTarget));
    assert_eq!(daybook.return_to_today(t0), Err(Rejection::InvalidTarget));
    assert!(!daybook.is_transitioning());
}

#[test]
fn new_day_carries_pinned_open_tasks() {
    let clock = Rc::new(ManualClock::new(date("2024-05-10")));
    let store = Rc::new(MemoryStore::new());
    let t0 = Instant::now();
    let mut daybook = open(&clock, &store, t0);

    let keep = daybook.add_task("renew passport").unwrap();
    daybook.toggle_pin(&keep).unwrap();
    daybook.add_task("one-off errand").unwrap();
    let finished = daybook.add_task("pinned but done").unwrap();
    daybook.toggle_pin(&finished).unwrap();
    daybook.toggle_complete(&finished).unwrap();

    clock.advance_day();
    // Nothing happens before the tick is due
    assert_eq!(daybook.tick(t0 + Duration::from_secs(59)).rollover, None);

    let t1 = t0 + TICK;
    let report = daybook.tick(t1);
    assert!(report.rolled_over());
    assert!(matches!(
        report.rollover,
        Some(RolloverOutcome::RolledOver { carried: 1, skipped_days: 0, .. })
    ));

    let workspace = daybook.active_workspace().unwrap();
    assert_eq!(workspace.notes.len(), 2);
    assert_eq!(workspace.notes[0].date, date("2024-05-11"));
    let carried = &workspace.notes[0].tasks;
    assert_eq!(carried.len(), 1);
    assert_eq!(carried[0].text, "renew passport");
    assert!(carried[0].pinned && !carried[0].completed);
    assert_ne!(carried[0].id, keep);
    // Yesterday keeps its three tasks
    assert_eq!(workspace.notes[1].tasks.len(), 3);

    // The new day settles in before edits are accepted
    assert_eq!(daybook.add_task("fresh"), Err(Rejection::Busy));
    daybook.tick(t1 + ms(800));
    assert!(daybook.add_task("fresh").is_ok());

    // A second check on the same day changes nothing
    let before = daybook.collection().clone();
    assert_eq!(daybook.check_rollover(t1 + ms(900)), RolloverOutcome::UpToDate);
    assert_eq!(daybook.collection(), &before);
}

#[test]
fn dormant_days_collapse_into_one_note() {
    let clock = Rc::new(ManualClock::new(date("2024-05-10")));
    let store = Rc::new(MemoryStore::new());
    let t0 = Instant::now();
    let mut daybook = open(&clock, &store, t0);

    clock.set_today(date("2024-05-14"));
    let outcome = daybook.check_rollover(t0);
    assert!(matches!(
        outcome,
        RolloverOutcome::RolledOver { skipped_days: 3, .. }
    ));
    let dates: Vec<NaiveDate> = daybook
        .active_workspace()
        .unwrap()
        .notes
        .iter()
        .map(|n| n.date)
        .collect();
    assert_eq!(dates, vec![date("2024-05-14"), date("2024-05-10")]);
}

#[test]
fn clock_going_backwards_changes_nothing() {
    let clock = Rc::new(ManualClock::new(date("2024-05-10")));
    let store = Rc::new(MemoryStore::new());
    let mut daybook = open(&clock, &store, Instant::now());

    let before = daybook.collection().clone();
    clock.set_today(date("2024-05-09"));
    assert_eq!(daybook.check_rollover(Instant::now()), RolloverOutcome::ClockRegressed);
    assert_eq!(daybook.collection(), &before);
}

#[test]
fn rollover_moves_every_workspace_together() {
    let clock = Rc::new(ManualClock::new(date("2024-05-10")));
    let store = Rc::new(MemoryStore::new());
    let t0 = Instant::now();
    let mut daybook = open(&clock, &store, t0);
    daybook.create_workspace("Work");

    clock.advance_day();
    let outcome = daybook.check_rollover(t0);
    match outcome {
        RolloverOutcome::RolledOver { workspaces, .. } => assert_eq!(workspaces.len(), 2),
        other => panic!("expected a rollover, got {:?}", other),
    }
    assert!(
        daybook
            .collection()
            .workspaces
            .iter()
            .all(|w| w.latest_date() == Some(date("2024-05-11")) && w.current_index == 0)
    );
}

#[test]
fn workspaces_keep_their_own_days() {
    let clock = Rc::new(ManualClock::new(date("2024-05-10")));
    let store = Rc::new(MemoryStore::new());
    let mut daybook = open(&clock, &store, Instant::now());
    let main_id = daybook.collection().active_workspace_id.clone();

    daybook.add_task("main task").unwrap();
    let work_id = daybook.create_workspace("  Work ");
    assert_eq!(daybook.active_workspace().unwrap().name, "Work");
    assert!(daybook.visible_note().unwrap().tasks.is_empty());
    daybook.add_task("work task").unwrap();

    daybook.switch_workspace(&main_id).unwrap();
    assert_eq!(daybook.visible_note().unwrap().tasks[0].text, "main task");

    assert_eq!(daybook.rename_workspace(&work_id, "   "), Err(Rejection::EmptyContent));
    daybook.rename_workspace(&work_id, "Office").unwrap();

    daybook.close_workspace(&main_id).unwrap();
    assert_eq!(daybook.collection().active_workspace_id, work_id);
    assert_eq!(daybook.close_workspace(&work_id), Err(Rejection::LastWorkspace));

    let reopened = open(&clock, &store, Instant::now());
    assert_eq!(reopened.collection().workspaces.len(), 1);
    assert_eq!(reopened.active_workspace().unwrap().name, "Office");
}
