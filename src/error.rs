use std::path::PathBuf;

use thiserror::Error;

/// Failure of a single call against the vCD API.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    #[error("{status}: {message}")]
    Status { status: u16, message: String },

    #[error("task {operation} ended with status {status}: {message}")]
    Task {
        operation: String,
        status: String,
        message: String,
    },

    #[error("unexpected response: {0}")]
    Decode(String),

    #[error("key not present")]
    KeyNotPresent,
}

impl ApiError {
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        ApiError::Status {
            status,
            message: message.into(),
        }
    }
}

/// Everything that can end an invocation with a non-zero exit status.
#[derive(Debug, Error)]
pub enum Error {
    #[error("action must be specified (-action)")]
    MissingAction,

    #[error("unknown action {0:?}. Available actions: find, get, set, delete")]
    UnknownAction(String),

    #[error("must specify {} for action {action}", .missing.join(", "))]
    MissingArguments {
        action: &'static str,
        missing: Vec<&'static str>,
    },

    #[error("error loading configuration {path:?}: {source}")]
    ConfigNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("error parsing configuration {path:?}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("error parsing URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("error connecting: {0}")]
    Authentication(String),

    #[error("error finding VM: organization {0:?} not found")]
    OrgNotFound(String),

    #[error("error finding VM: VDC {0:?} not found")]
    VdcNotFound(String),

    #[error("error finding VM: vApp {0:?} not found")]
    VappNotFound(String),

    #[error("error finding VM: VM {0:?} not found")]
    VmNotFound(String),

    #[error("error finding VM: looking up {scope} {name:?}: {source}")]
    Lookup {
        scope: &'static str,
        name: String,
        #[source]
        source: ApiError,
    },

    #[error("error getting parameters: fetching hardware section: {0}")]
    HardwareFetch(#[source] ApiError),

    #[error("error getting parameters: fetching extra config: {0}")]
    ExtraConfigFetch(#[source] ApiError),

    #[error("error setting ExtraConfig {key}: {source}")]
    ExtraConfigSet {
        key: String,
        #[source]
        source: ApiError,
    },

    #[error("error deleting ExtraConfig {key}: {source}")]
    ExtraConfigDelete {
        key: String,
        #[source]
        source: ApiError,
    },

    #[error("error writing output: {0}")]
    Output(#[from] std::io::Error),
}
