use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("unknown level: {0:?}")]
    UnknownLevel(String),
}

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("no candidate pair for students {0} and {1}")]
    PairNotFound(String, String),

    #[error("cannot schedule student {0} against themselves")]
    SamePair(String),
}
