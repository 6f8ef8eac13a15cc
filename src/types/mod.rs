//! Pipeline graph types: tools, nodes, connections and the graph itself.
//!
//! These types are plain data. They serialize to JSON so a built graph can be handed to an
//! execution backend.

mod connection;
mod pipeline;
mod pipeline_node;
#[cfg(test)]
mod pipeline_node_test;
mod tool;

pub use connection::Connection;
pub use pipeline::Pipeline;
pub use pipeline_node::{INPUT_NODE, NodeKind, OUTPUT_NODE, PipelineNode};
pub use tool::Tool;
