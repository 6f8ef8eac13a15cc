//! A node (step) in a pipeline graph.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::Tool;

/// Conventional id of a pipeline's input boundary node.
pub const INPUT_NODE: &str = "inputnode";
/// Conventional id of a pipeline's output boundary node.
pub const OUTPUT_NODE: &str = "outputnode";

/// What a node does.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeKind {
  /// Pass-through boundary exposing the pipeline's named inputs.
  Input { fields: Vec<String> },
  /// Pass-through boundary exposing the pipeline's named outputs.
  Output { fields: Vec<String> },
  /// A step invoking an external tool.
  Tool { tool: Tool },
}

/// A node in a pipeline graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineNode {
  pub id: String,
  #[serde(flatten)]
  pub kind: NodeKind,
  /// Tool parameters taken from the configuration entry named after the step.
  #[serde(default, skip_serializing_if = "Map::is_empty")]
  pub params: Map<String, Value>,
  /// Inputs set to literal values at construction time.
  #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
  pub fixed_inputs: BTreeMap<String, String>,
}

impl PipelineNode {
  pub fn input(id: impl Into<String>, fields: &[&str]) -> Self {
    Self::with_kind(
      id,
      NodeKind::Input {
        fields: fields.iter().map(|f| f.to_string()).collect(),
      },
    )
  }

  pub fn output(id: impl Into<String>, fields: &[&str]) -> Self {
    Self::with_kind(
      id,
      NodeKind::Output {
        fields: fields.iter().map(|f| f.to_string()).collect(),
      },
    )
  }

  /// A tool step. Non-object `params` are treated as "no overrides".
  pub fn tool(id: impl Into<String>, tool: Tool, params: Value) -> Self {
    let mut node = Self::with_kind(id, NodeKind::Tool { tool });
    if let Value::Object(map) = params {
      node.params = map;
    }
    node
  }

  fn with_kind(id: impl Into<String>, kind: NodeKind) -> Self {
    Self {
      id: id.into(),
      kind,
      params: Map::new(),
      fixed_inputs: BTreeMap::new(),
    }
  }

  pub fn tool_kind(&self) -> Option<Tool> {
    match &self.kind {
      NodeKind::Tool { tool } => Some(*tool),
      _ => None,
    }
  }

  pub fn has_input_port(&self, port: &str) -> bool {
    match &self.kind {
      NodeKind::Input { fields } | NodeKind::Output { fields } => fields.iter().any(|f| f == port),
      NodeKind::Tool { tool } => tool.input_ports().contains(&port),
    }
  }

  pub fn has_output_port(&self, port: &str) -> bool {
    match &self.kind {
      NodeKind::Input { fields } | NodeKind::Output { fields } => fields.iter().any(|f| f == port),
      NodeKind::Tool { tool } => tool.output_ports().contains(&port),
    }
  }

  /// Input ports that must be fed exactly once: a tool's required inputs, every field of an
  /// output boundary. Input boundaries are fed from outside and have none.
  pub fn required_inputs(&self) -> Vec<String> {
    match &self.kind {
      NodeKind::Input { .. } => vec![],
      NodeKind::Output { fields } => fields.clone(),
      NodeKind::Tool { tool } => tool.required_inputs().iter().map(|p| p.to_string()).collect(),
    }
  }

  /// Short description used in graph renderings.
  pub fn describe(&self) -> String {
    match &self.kind {
      NodeKind::Input { .. } => "input".to_string(),
      NodeKind::Output { .. } => "output".to_string(),
      NodeKind::Tool { tool } => format!("{} ({})", tool, tool.program()),
    }
  }
}
