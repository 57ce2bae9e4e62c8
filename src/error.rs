use std::{fmt, io};

use serde::{Deserialize, Serialize};
use serde_json::Error as JsonError;
use thiserror::Error;
use tokio::sync::mpsc::error::SendError as TokioSendError;

use crate::event::GraphEvent;

pub type Result<T, E = PipelineError> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Duplicate node id: {0}")]
    DuplicateNode(String),
    #[error("Edge Not Found: {0}")]
    EdgeNotFound(String),
    #[error("File System error: {0}")]
    Io(String),
    #[error("Node Not Found: {0}")]
    NodeNotFound(String),
    #[error("(De)Serialization error: {0}")]
    Serialization(String),
    #[error("Pipeline submission failed: {0}")]
    Submit(String),
}

impl From<toml::de::Error> for PipelineError {
    fn from(src: toml::de::Error) -> PipelineError {
        PipelineError::Config(format!("Toml deserialization error: {src}"))
    }
}

impl From<toml::ser::Error> for PipelineError {
    fn from(src: toml::ser::Error) -> PipelineError {
        PipelineError::Serialization(format!("Toml serialization error: {src}"))
    }
}

impl From<JsonError> for PipelineError {
    fn from(src: JsonError) -> PipelineError {
        PipelineError::Serialization(format!("JSON (de)serialization error: {src}"))
    }
}

impl From<io::Error> for PipelineError {
    fn from(x: io::Error) -> Self {
        match x.kind() {
            io::ErrorKind::NotFound => PipelineError::Io(format!("not found: {x}")),
            _ => PipelineError::Io(format!("IOError: {}", x.kind())),
        }
    }
}

impl From<fmt::Error> for PipelineError {
    fn from(x: fmt::Error) -> Self {
        PipelineError::Serialization(format!("{x}"))
    }
}

impl From<TokioSendError<GraphEvent>> for PipelineError {
    fn from(x: TokioSendError<GraphEvent>) -> Self {
        PipelineError::Io(format!(
            "Channel update send Error, could not transmit graph event {:?}",
            x.0
        ))
    }
}
