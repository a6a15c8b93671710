use std::path::PathBuf;

use thiserror::Error;

use crate::page::PageError;

/// Fatal errors. Anything that goes wrong while extracting a single entity is
/// recorded as a snapshot status instead and never shows up here.
#[derive(Debug, Error)]
pub enum Error {
    #[error("database error: {0}")]
    Store(#[from] rusqlite::Error),

    #[error("could not read entity list {}: {source}", path.display())]
    EntityList {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not start browser session: {0}")]
    Session(#[source] PageError),

    #[error("invalid config {origin}: {reason}")]
    Config { origin: String, reason: String },

    #[error("corrupt row {id} in snapshot log: {reason}")]
    CorruptRow { id: i64, reason: String },

    #[error("could not determine data directory")]
    NoDataDir,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
