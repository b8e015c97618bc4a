use std::path::PathBuf;

use thiserror::Error;

use crate::OpenAiError;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    /// A required environment variable is missing.
    #[error("{name} is not set in environment variables")]
    Configuration { name: &'static str },

    /// The market-data provider answered with a non-success status.
    #[error("market data request failed with status {status}: {body}")]
    Transport { status: u16, body: String },

    /// The market-data request could not be sent or its body decoded.
    #[error("market data request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("assistant service error: {0}")]
    Api(#[from] OpenAiError),

    #[error("invalid arguments for tool `{tool}`: {source}")]
    ToolArguments {
        tool: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Only raised when a bounded poll policy is in effect.
    #[error("run did not settle after {attempts} polls")]
    PollLimitExceeded { attempts: u32 },

    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
