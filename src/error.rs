use reqwest::StatusCode;
use thiserror::Error;

/// Everything that can go wrong while tailing. Startup-phase kinds (config,
/// stream resolution) are fatal; fetch-cycle kinds are retried by the poll
/// loop.
#[derive(Debug, Error)]
pub enum Error {
    #[error("could not read configuration: {0}")]
    Config(String),

    #[error("stream '{0}' could not be found or is not active")]
    StreamNotFound(String),

    #[error("could not reach server: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("server returned status {0}")]
    Status(StatusCode),

    #[error("malformed server response: {0}")]
    Parse(String),
}

impl Error {
    /// Whether the poll loop should retry after this error instead of
    /// terminating. Malformed responses get the same treatment as network
    /// failures: report, back off, try again.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::Transport(_) | Error::Status(_) | Error::Parse(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
