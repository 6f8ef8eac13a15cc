//! Pipeline graph: named steps plus named port-to-port connections.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::pipeline_node::{INPUT_NODE, OUTPUT_NODE};
use super::{Connection, NodeKind, PipelineNode, Tool};
use crate::error::{PipelineError, PipelineResult};

/// A pipeline graph. Built once, validated, then handed to an execution backend.
///
/// Embedded sub-pipelines are flattened: their nodes live in `nodes` under
/// `"<sub>.<node>"` ids, and callers address them the way the step wiring reads,
/// e.g. `connect("inputnode", "FLAIR", "short_preparation_FLAIR_pipe", "inputnode.FLAIR")`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pipeline {
  pub name: String,
  pub nodes: BTreeMap<String, PipelineNode>,
  pub connections: Vec<Connection>,
  /// Names (flattened prefixes) of embedded sub-pipelines.
  #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
  pub subpipelines: BTreeSet<String>,
}

impl Pipeline {
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      nodes: BTreeMap::new(),
      connections: Vec::new(),
      subpipelines: BTreeSet::new(),
    }
  }

  /// Adds a node. Ids must be unique and free of `.`, which is reserved for nesting.
  pub fn add_node(&mut self, node: PipelineNode) -> PipelineResult<()> {
    if node.id.contains('.') {
      return Err(PipelineError::Config(format!(
        "node id '{}' must not contain '.'",
        node.id
      )));
    }
    self.insert_node(node)
  }

  pub fn add_input_node(&mut self, fields: &[&str]) -> PipelineResult<()> {
    self.add_node(PipelineNode::input(INPUT_NODE, fields))
  }

  pub fn add_output_node(&mut self, fields: &[&str]) -> PipelineResult<()> {
    self.add_node(PipelineNode::output(OUTPUT_NODE, fields))
  }

  pub fn add_tool(&mut self, id: &str, tool: Tool, params: Value) -> PipelineResult<()> {
    self.add_node(PipelineNode::tool(id, tool, params))
  }

  /// Embeds `sub`, namespacing its nodes and connections under `sub.name`.
  pub fn add_subpipeline(&mut self, sub: Pipeline) -> PipelineResult<()> {
    let prefix = sub.name;
    if self.nodes.contains_key(&prefix) || self.subpipelines.contains(&prefix) {
      return Err(PipelineError::DuplicateNode {
        pipeline: self.name.clone(),
        node: prefix,
      });
    }
    for (id, mut node) in sub.nodes {
      node.id = format!("{}.{}", prefix, id);
      self.insert_node(node)?;
    }
    self
      .connections
      .extend(sub.connections.iter().map(|c| c.prefixed(&prefix)));
    for inner in sub.subpipelines {
      self.subpipelines.insert(format!("{}.{}", prefix, inner));
    }
    debug!(pipeline = %self.name, sub = %prefix, "embedded sub-pipeline");
    self.subpipelines.insert(prefix);
    Ok(())
  }

  fn insert_node(&mut self, node: PipelineNode) -> PipelineResult<()> {
    if self.nodes.contains_key(&node.id) || self.subpipelines.contains(&node.id) {
      return Err(PipelineError::DuplicateNode {
        pipeline: self.name.clone(),
        node: node.id,
      });
    }
    self.nodes.insert(node.id.clone(), node);
    Ok(())
  }

  /// Maps `(sub, "inner.port")` onto the flattened `("sub.inner", "port")`.
  fn resolve(&self, node: &str, port: &str) -> (String, String) {
    if self.subpipelines.contains(node) {
      if let Some((inner, port)) = port.rsplit_once('.') {
        return (format!("{}.{}", node, inner), port.to_string());
      }
    }
    (node.to_string(), port.to_string())
  }

  pub fn node(&self, id: &str) -> PipelineResult<&PipelineNode> {
    self.nodes.get(id).ok_or_else(|| PipelineError::UnknownNode {
      pipeline: self.name.clone(),
      node: id.to_string(),
    })
  }

  /// Connects an output port of one node to an input port of another.
  pub fn connect(
    &mut self,
    from_node: &str,
    from_port: &str,
    to_node: &str,
    to_port: &str,
  ) -> PipelineResult<()> {
    let (src, src_port) = self.resolve(from_node, from_port);
    let (dst, dst_port) = self.resolve(to_node, to_port);

    if !self.node(&src)?.has_output_port(&src_port) {
      return Err(PipelineError::UnknownPort {
        node: src,
        port: src_port,
        direction: "output",
      });
    }
    self.check_input_free(&dst, &dst_port)?;

    debug!(from = %src, from_port = %src_port, to = %dst, to_port = %dst_port, "connect");
    self
      .connections
      .push(Connection::new(src, src_port, dst, dst_port));
    Ok(())
  }

  /// Sets an input port to a literal value (usually a file path).
  pub fn set_input(&mut self, node: &str, port: &str, value: impl Into<String>) -> PipelineResult<()> {
    let (dst, dst_port) = self.resolve(node, port);
    self.check_input_free(&dst, &dst_port)?;
    if let Some(n) = self.nodes.get_mut(&dst) {
      n.fixed_inputs.insert(dst_port, value.into());
    }
    Ok(())
  }

  fn check_input_free(&self, node: &str, port: &str) -> PipelineResult<()> {
    if !self.node(node)?.has_input_port(port) {
      return Err(PipelineError::UnknownPort {
        node: node.to_string(),
        port: port.to_string(),
        direction: "input",
      });
    }
    if self.feed_count(node, port) > 0 {
      return Err(PipelineError::PortAlreadyConnected {
        node: node.to_string(),
        port: port.to_string(),
      });
    }
    Ok(())
  }

  /// Number of sources (connections plus fixed values) feeding `node.port`.
  pub fn feed_count(&self, node: &str, port: &str) -> usize {
    let connected = self
      .connections
      .iter()
      .filter(|c| c.to_node == node && c.to_port == port)
      .count();
    let fixed = self
      .nodes
      .get(node)
      .is_some_and(|n| n.fixed_inputs.contains_key(port));
    connected + usize::from(fixed)
  }

  pub fn incoming(&self, node_id: &str) -> Vec<&Connection> {
    self
      .connections
      .iter()
      .filter(|c| c.to_node == node_id)
      .collect()
  }

  pub fn outgoing(&self, node_id: &str) -> Vec<&Connection> {
    self
      .connections
      .iter()
      .filter(|c| c.from_node == node_id)
      .collect()
  }

  /// Fields of the top-level `inputnode`.
  pub fn input_fields(&self) -> Vec<String> {
    self.boundary_fields(INPUT_NODE)
  }

  /// Fields of the top-level `outputnode`.
  pub fn output_fields(&self) -> Vec<String> {
    self.boundary_fields(OUTPUT_NODE)
  }

  fn boundary_fields(&self, id: &str) -> Vec<String> {
    match self.nodes.get(id).map(|n| &n.kind) {
      Some(NodeKind::Input { fields }) | Some(NodeKind::Output { fields }) => fields.clone(),
      _ => vec![],
    }
  }

  pub fn tool_nodes(&self) -> impl Iterator<Item = &PipelineNode> {
    self.nodes.values().filter(|n| n.tool_kind().is_some())
  }

  /// Validates the graph and returns its execution order. See [crate::validate::validate].
  pub fn validate(&self) -> PipelineResult<Vec<String>> {
    crate::validate::validate(self)
  }
}
