use std::path::PathBuf;

use thiserror::Error;

use crate::occurrence::OccurrenceId;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unable to read event file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed event file {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("event {id} ends before it starts")]
    InvalidEvent { id: OccurrenceId },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value `{value}` for {key}")]
    InvalidValue { key: &'static str, value: String },
}
