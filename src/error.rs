use thiserror::Error;

/// Why a core operation declined to change state.
///
/// None of these are failures of the program: the state is left untouched
/// and the presentation layer may show the message as a transient notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("Past days are read-only")]
    NotToday,
    #[error("Nothing to act on")]
    InvalidTarget,
    #[error("Text cannot be empty")]
    EmptyContent,
    #[error("The last workspace cannot be closed")]
    LastWorkspace,
    #[error("A note for that day already exists")]
    DuplicateDate,
    #[error("Still moving between days")]
    Busy,
}

/// Result of a core operation
pub type Outcome<T = ()> = Result<T, Rejection>;
