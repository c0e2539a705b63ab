use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, PartialEq)]
#[non_exhaustive]
pub enum Error {
    #[error("clock rate must be greater than zero")]
    ErrInvalidClockRate,
    #[error("report interval must be greater than zero")]
    ErrInvalidInterval,
    #[error("rtcp receiver is already running")]
    ErrAlreadyRunning,
    #[error("rtcp receiver is closed")]
    ErrClosed,
    /// The report timer is a Tokio task, so `initialize` must run inside a runtime.
    #[error("no tokio runtime available to drive the report timer")]
    ErrNoRuntime,
}
