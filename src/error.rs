//! Crate-wide error type
//!
//! Failures fall into four caller-visible groups: bad input (rejected
//! before any remote side effect), transport trouble (the whole call is
//! safe to retry), a command the scheduler refused, and lookups of jobs
//! that do not exist. Database and filesystem problems pass through with
//! their own variants. Nothing in this crate retries automatically.

use std::io;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The request was malformed or referenced missing files; nothing was
    /// created or transferred.
    #[error("invalid submission: {0}")]
    Validation(String),

    /// Connection, authentication, or transfer failure. The job keeps its
    /// last recorded state and the operation can be retried as a whole.
    #[error("remote transport failure: {0}")]
    Transport(String),

    /// The cluster ran the command but rejected it.
    #[error("remote command failed: `{command}`: {detail}")]
    RemoteCommand { command: String, detail: String },

    #[error("job {0} not found")]
    NotFound(i64),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("configuration error: {0}")]
    Config(#[from] toml::de::Error),

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl From<ssh2::Error> for Error {
    fn from(err: ssh2::Error) -> Self {
        Error::Transport(err.to_string())
    }
}
