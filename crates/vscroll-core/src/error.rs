use thiserror::Error;

use crate::scroll::TriggerId;

/// Boxed error returned by trigger callbacks
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Trigger {id} callback failed: {source}")]
    Trigger {
        id: TriggerId,
        #[source]
        source: BoxError,
    },

    #[error("Replay error: {0}")]
    Replay(String),
}

pub type Result<T> = std::result::Result<T, Error>;
