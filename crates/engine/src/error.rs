#![forbid(unsafe_code)]

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Failed to read procfs info: {0}")]
    ProcfsReadFailed(#[from] procfs::ProcError),

    #[error("Scheduled duration must be greater than zero")]
    ZeroDuration,

    #[error("Scheduled time has already passed")]
    DeadlinePassed,
}
