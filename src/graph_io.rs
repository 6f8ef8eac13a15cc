//! Pipeline graph save/load (JSON) and DOT export to disk.

use crate::dot_writer::render_dot;
use crate::types::Pipeline;
use std::path::Path;
use tracing::instrument;

/// Default filename for a saved graph under an output directory.
pub const GRAPH_FILENAME: &str = "graph.json";

/// Saves a pipeline graph to `path` as JSON.
#[instrument(level = "trace", skip(path, pipeline))]
pub fn save_pipeline(path: &Path, pipeline: &Pipeline) -> Result<(), std::io::Error> {
  let json = serde_json::to_string_pretty(pipeline)
    .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
  write_creating_parent(path, json)
}

/// Loads a pipeline graph from `path`. Returns error if file is missing or invalid JSON.
/// The loaded graph is not validated; call [Pipeline::validate].
#[instrument(level = "trace", skip(path))]
pub fn load_pipeline(path: &Path) -> Result<Pipeline, std::io::Error> {
  let bytes = std::fs::read(path)?;
  serde_json::from_slice(&bytes)
    .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
}

/// Writes the DOT rendering of `pipeline` to `path`.
#[instrument(level = "trace", skip(path, pipeline))]
pub fn write_dot(path: &Path, pipeline: &Pipeline) -> Result<(), std::io::Error> {
  write_creating_parent(path, render_dot(pipeline))
}

fn write_creating_parent(path: &Path, contents: String) -> Result<(), std::io::Error> {
  if let Some(parent) = path.parent() {
    std::fs::create_dir_all(parent)?;
  }
  std::fs::write(path, contents)
}
