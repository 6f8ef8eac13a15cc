//! # neuroweave
//!
//! Coregistration and normalisation pipelines for neuroimaging, assembled as explicit graphs
//! of external-tool steps joined by named ports.
//!
//! ## Architecture
//!
//! - `types`: the graph model ([Pipeline], [PipelineNode], [Connection], [Tool]).
//! - `validate`: construction-time checks (every required input fed exactly once, no cycles)
//!   and a deterministic execution order.
//! - `pipelines`: FLAIR and MD preparation and transformation pipelines, parameterised from a
//!   nested JSON configuration (`params`).
//! - `dot_writer` / `graph_io`: DOT and JSON export for an execution backend.
//! - `nodes`: the one step run directly, the dirty `reg_aladin` helper.
//!
//! Executing a graph is left to the backend that consumes the export.

pub mod dot_writer;
pub mod error;
pub mod graph_io;
pub mod nodes;
pub mod params;
pub mod pipelines;
pub mod types;
pub mod validate;
#[cfg(test)]
mod validate_test;

pub use dot_writer::render_dot;
pub use error::{PipelineError, PipelineResult};
pub use params::{TemplateParams, parse_key};
pub use types::{Connection, NodeKind, Pipeline, PipelineNode, Tool};
