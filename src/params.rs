//! Parameter lookup over the nested JSON configuration.
//!
//! A parameter file is a JSON object keyed by pipeline or step name; each value is the
//! sub-mapping handed to that pipeline or step. Absent keys mean "use tool defaults".

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::instrument;

use crate::error::{PipelineError, PipelineResult};

/// Returns `params[key]` when present, otherwise an empty mapping.
pub fn parse_key(params: &Value, key: &str) -> Value {
  params
    .get(key)
    .cloned()
    .unwrap_or_else(|| Value::Object(Map::new()))
}

/// Returns true if `params` is a mapping containing `key`.
pub fn has_key(params: &Value, key: &str) -> bool {
  params.as_object().is_some_and(|m| m.contains_key(key))
}

/// Borrows `path` as UTF-8. Paths end up in JSON graphs and shell commands, which
/// cannot carry other bytes unchanged.
pub fn utf8_path(path: &Path) -> PipelineResult<&str> {
  path
    .to_str()
    .ok_or_else(|| PipelineError::Config(format!("path {} is not valid UTF-8", path.display())))
}

/// Loads a parameter file. The top level must be a JSON object.
#[instrument(level = "trace", skip(path))]
pub fn load_params(path: &Path) -> PipelineResult<Value> {
  let bytes = std::fs::read(path)?;
  let value: Value = serde_json::from_slice(&bytes)?;
  if !value.is_object() {
    return Err(PipelineError::Config(format!(
      "{} must contain a JSON object at top level",
      path.display()
    )));
  }
  Ok(value)
}

/// Template files used by the normalisation steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateParams {
  /// Skull-stripped template image, the reference for template-space outputs.
  pub template_brain: PathBuf,
  /// Remaining template entries (priors etc.), carried but unused here.
  #[serde(flatten)]
  pub extra: Map<String, Value>,
}

impl TemplateParams {
  pub fn new(template_brain: impl Into<PathBuf>) -> Self {
    Self {
      template_brain: template_brain.into(),
      extra: Map::new(),
    }
  }

  /// Reads a template description from a JSON value.
  pub fn from_value(value: Value) -> PipelineResult<Self> {
    if !has_key(&value, "template_brain") {
      return Err(PipelineError::Config(
        "template parameters have no 'template_brain' entry".to_string(),
      ));
    }
    Ok(serde_json::from_value(value)?)
  }
}

/// Loads a template description file.
#[instrument(level = "trace", skip(path))]
pub fn load_template(path: &Path) -> PipelineResult<TemplateParams> {
  let bytes = std::fs::read(path)?;
  TemplateParams::from_value(serde_json::from_slice(&bytes)?)
}
