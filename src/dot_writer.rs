//! Graphviz DOT rendering of a pipeline graph.
//!
//! Nodes of an embedded pipeline are grouped in a `cluster_` subgraph named after it.

use std::fmt::Write;

use crate::types::Pipeline;

/// Escapes `"` and `\` for use inside a quoted DOT string.
pub(crate) fn escape(s: &str) -> String {
  let mut out = String::with_capacity(s.len());
  for c in s.chars() {
    match c {
      '"' => out.push_str("\\\""),
      '\\' => out.push_str("\\\\"),
      _ => out.push(c),
    }
  }
  out
}

/// Identifier safe for a DOT cluster name.
pub(crate) fn cluster_id(prefix: &str) -> String {
  prefix
    .chars()
    .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
    .collect()
}

/// Renders `pipeline` as a `digraph`. Each connection becomes an edge labelled with its ports.
pub fn render_dot(pipeline: &Pipeline) -> String {
  let mut out = String::new();
  let _ = writeln!(out, "digraph \"{}\" {{", escape(&pipeline.name));
  let _ = writeln!(out, "  rankdir=LR;");

  // Innermost prefix wins, so nested pipelines land in their own cluster.
  let owner = |id: &str| -> Option<&String> {
    pipeline
      .subpipelines
      .iter()
      .filter(|s| id.starts_with(&format!("{}.", s)))
      .max_by_key(|s| s.len())
  };

  for node in pipeline.nodes.values().filter(|n| owner(&n.id).is_none()) {
    write_node(&mut out, "  ", &node.id, &node.describe());
  }
  for sub in &pipeline.subpipelines {
    let _ = writeln!(out, "  subgraph cluster_{} {{", cluster_id(sub));
    let _ = writeln!(out, "    label=\"{}\";", escape(sub));
    for node in pipeline
      .nodes
      .values()
      .filter(|n| owner(&n.id) == Some(sub))
    {
      write_node(&mut out, "    ", &node.id, &node.describe());
    }
    let _ = writeln!(out, "  }}");
  }

  for c in &pipeline.connections {
    let _ = writeln!(
      out,
      "  \"{}\" -> \"{}\" [label=\"{} -> {}\"];",
      escape(&c.from_node),
      escape(&c.to_node),
      escape(&c.from_port),
      escape(&c.to_port)
    );
  }
  out.push_str("}\n");
  out
}

fn write_node(out: &mut String, indent: &str, id: &str, description: &str) {
  let short = id.rsplit('.').next().unwrap_or(id);
  let _ = writeln!(
    out,
    "{}\"{}\" [label=\"{}\\n{}\"];",
    indent,
    escape(id),
    escape(short),
    escape(description)
  );
}
