pub mod cli;
pub mod clock;
pub mod config;
pub mod database;
pub mod daybook;
pub mod error;
pub mod ledger;
pub mod logging;
pub mod models;
pub mod navigation;
pub mod persistence;
pub mod rollover;
pub mod store;
pub mod tui;
pub mod utils;

pub use clock::{ClockSource, ManualClock, SystemClock};
pub use config::Config;
pub use database::{Database, KeyValueStore, MemoryStore};
pub use daybook::Daybook;
pub use error::{Outcome, Rejection};
pub use ledger::CompletionLedger;
pub use models::{CompletionRecord, Note, Task, Workspace, WorkspaceCollection};
pub use persistence::Gateway;
pub use utils::Profile;
