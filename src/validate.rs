//! Construction-time validation of a pipeline graph.
//!
//! Catches what an execution backend would otherwise only report at run time: dangling
//! connections, inputs fed twice, required inputs left unconnected, and cycles.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{info, instrument};

use crate::error::{PipelineError, PipelineResult};
use crate::types::{INPUT_NODE, NodeKind, Pipeline};

/// Validates `pipeline` and returns its node ids in a deterministic execution order.
#[instrument(level = "trace", skip(pipeline), fields(pipeline = %pipeline.name))]
pub fn validate(pipeline: &Pipeline) -> PipelineResult<Vec<String>> {
  check_connections(pipeline)?;
  check_feeds(pipeline)?;
  check_subpipeline_inputs(pipeline)?;
  let order = execution_order(pipeline)?;
  info!(
    pipeline = %pipeline.name,
    node_count = pipeline.nodes.len(),
    connection_count = pipeline.connections.len(),
    "pipeline is valid"
  );
  Ok(order)
}

/// Every connection joins an existing output port to an existing input port.
pub(crate) fn check_connections(pipeline: &Pipeline) -> PipelineResult<()> {
  for c in &pipeline.connections {
    if !pipeline.node(&c.from_node)?.has_output_port(&c.from_port) {
      return Err(PipelineError::UnknownPort {
        node: c.from_node.clone(),
        port: c.from_port.clone(),
        direction: "output",
      });
    }
    if !pipeline.node(&c.to_node)?.has_input_port(&c.to_port) {
      return Err(PipelineError::UnknownPort {
        node: c.to_node.clone(),
        port: c.to_port.clone(),
        direction: "input",
      });
    }
  }
  Ok(())
}

/// Every input is fed at most once, and every required input exactly once.
pub(crate) fn check_feeds(pipeline: &Pipeline) -> PipelineResult<()> {
  let mut feeds: BTreeMap<(&str, &str), usize> = BTreeMap::new();
  for c in &pipeline.connections {
    *feeds.entry((c.to_node.as_str(), c.to_port.as_str())).or_default() += 1;
  }
  for node in pipeline.nodes.values() {
    for port in node.fixed_inputs.keys() {
      if !node.has_input_port(port) {
        return Err(PipelineError::UnknownPort {
          node: node.id.clone(),
          port: port.clone(),
          direction: "input",
        });
      }
      *feeds.entry((node.id.as_str(), port.as_str())).or_default() += 1;
    }
  }
  if let Some(((node, port), _)) = feeds.iter().find(|(_, n)| **n > 1) {
    return Err(PipelineError::PortAlreadyConnected {
      node: node.to_string(),
      port: port.to_string(),
    });
  }
  for node in pipeline.nodes.values() {
    for port in node.required_inputs() {
      if !feeds.contains_key(&(node.id.as_str(), port.as_str())) {
        return Err(PipelineError::UnconnectedInput {
          node: node.id.clone(),
          port,
        });
      }
    }
  }
  Ok(())
}

/// An embedded pipeline's input field that has consumers must be fed by the parent.
/// Only the top-level `inputnode` is fed from outside the graph.
pub(crate) fn check_subpipeline_inputs(pipeline: &Pipeline) -> PipelineResult<()> {
  for c in &pipeline.connections {
    let Some(source) = pipeline.nodes.get(&c.from_node) else {
      continue;
    };
    let nested_input = matches!(source.kind, NodeKind::Input { .. })
      && source.id != INPUT_NODE;
    if nested_input && pipeline.feed_count(&c.from_node, &c.from_port) == 0 {
      return Err(PipelineError::UnconnectedInput {
        node: c.from_node.clone(),
        port: c.from_port.clone(),
      });
    }
  }
  Ok(())
}

/// Topological order (Kahn), ties broken by node id so repeated builds order identically.
pub(crate) fn execution_order(pipeline: &Pipeline) -> PipelineResult<Vec<String>> {
  let mut in_degree: BTreeMap<&str, usize> =
    pipeline.nodes.keys().map(|id| (id.as_str(), 0)).collect();
  for c in &pipeline.connections {
    if let Some(d) = in_degree.get_mut(c.to_node.as_str()) {
      *d += 1;
    }
  }

  let mut ready: BTreeSet<&str> = in_degree
    .iter()
    .filter(|(_, d)| **d == 0)
    .map(|(id, _)| *id)
    .collect();
  let mut order = Vec::with_capacity(in_degree.len());

  while let Some(id) = ready.pop_first() {
    order.push(id.to_string());
    for c in pipeline.outgoing(id) {
      if let Some(d) = in_degree.get_mut(c.to_node.as_str()) {
        *d -= 1;
        if *d == 0 {
          ready.insert(c.to_node.as_str());
        }
      }
    }
  }

  if order.len() < pipeline.nodes.len() {
    let blocked: BTreeSet<&str> = in_degree
      .into_iter()
      .filter(|(_, d)| *d > 0)
      .map(|(id, _)| id)
      .collect();
    let nodes = blocked
      .iter()
      .filter(|id| reaches_itself(pipeline, id, &blocked))
      .map(|id| id.to_string())
      .collect();
    return Err(PipelineError::Cycle {
      pipeline: pipeline.name.clone(),
      nodes,
    });
  }
  Ok(order)
}

/// True if `start` lies on a cycle. Only edges between `within` nodes are followed;
/// every cycle left over by Kahn's algorithm is inside that set.
fn reaches_itself(pipeline: &Pipeline, start: &str, within: &BTreeSet<&str>) -> bool {
  let mut seen = BTreeSet::new();
  let mut stack = vec![start];
  while let Some(id) = stack.pop() {
    for c in pipeline.outgoing(id) {
      let next = c.to_node.as_str();
      if next == start {
        return true;
      }
      if within.contains(next) && seen.insert(next) {
        stack.push(next);
      }
    }
  }
  false
}
