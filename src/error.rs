//! Errors raised while loading configuration and assembling pipeline graphs.

use std::path::PathBuf;

use thiserror::Error;

/// Error type for pipeline construction, validation and the dirty registration helper.
#[derive(Debug, Error)]
pub enum PipelineError {
  /// None of the keys that select a construction branch is present.
  #[error("pipeline '{pipeline}' needs one of the parameter keys {keys:?}, none was found")]
  MissingStrategy {
    pipeline: String,
    keys: Vec<&'static str>,
  },

  #[error("configuration error: {0}")]
  Config(String),

  #[error("pipeline '{pipeline}' already has a node named '{node}'")]
  DuplicateNode { pipeline: String, node: String },

  #[error("pipeline '{pipeline}' has no node named '{node}'")]
  UnknownNode { pipeline: String, node: String },

  #[error("node '{node}' has no {direction} port '{port}'")]
  UnknownPort {
    node: String,
    port: String,
    direction: &'static str,
  },

  /// An input port was connected (or fixed) more than once.
  #[error("input '{node}.{port}' is already fed")]
  PortAlreadyConnected { node: String, port: String },

  #[error("required input '{node}.{port}' is not connected")]
  UnconnectedInput { node: String, port: String },

  #[error("pipeline '{pipeline}' contains a cycle through {nodes:?}")]
  Cycle { pipeline: String, nodes: Vec<String> },

  /// An external tool ran but its expected output never appeared.
  #[error("expected output {} does not exist after running `{command}`", .path.display())]
  MissingOutput { path: PathBuf, command: String },

  #[error("failed to run `{command}`: {source}")]
  Spawn {
    command: String,
    #[source]
    source: std::io::Error,
  },

  #[error(transparent)]
  Io(#[from] std::io::Error),

  #[error(transparent)]
  Json(#[from] serde_json::Error),
}

pub type PipelineResult<T, E = PipelineError> = std::result::Result<T, E>;
