//! A directed connection between two named ports.

use serde::{Deserialize, Serialize};

/// Wires `from_node.from_port` (an output) to `to_node.to_port` (an input).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Connection {
  pub from_node: String,
  pub from_port: String,
  pub to_node: String,
  pub to_port: String,
}

impl Connection {
  pub fn new(
    from_node: impl Into<String>,
    from_port: impl Into<String>,
    to_node: impl Into<String>,
    to_port: impl Into<String>,
  ) -> Self {
    Self {
      from_node: from_node.into(),
      from_port: from_port.into(),
      to_node: to_node.into(),
      to_port: to_port.into(),
    }
  }

  /// Copy of this connection with both node ids placed under `prefix`.
  pub(crate) fn prefixed(&self, prefix: &str) -> Self {
    Self {
      from_node: format!("{}.{}", prefix, self.from_node),
      from_port: self.from_port.clone(),
      to_node: format!("{}.{}", prefix, self.to_node),
      to_port: self.to_port.clone(),
    }
  }
}
