//! Tests for `PipelineNode`.

use serde_json::json;

use super::{NodeKind, PipelineNode, Tool};

#[test]
fn input_node_ports_are_its_fields() {
  let n = PipelineNode::input("inputnode", &["orig_T1", "FLAIR"]);
  assert!(n.has_input_port("orig_T1"));
  assert!(n.has_output_port("FLAIR"));
  assert!(!n.has_output_port("MD"));
  assert!(n.required_inputs().is_empty());
}

#[test]
fn output_node_requires_every_field() {
  let n = PipelineNode::output("outputnode", &["coreg_MD", "coreg_better_MD"]);
  assert_eq!(n.required_inputs(), vec!["coreg_MD", "coreg_better_MD"]);
}

#[test]
fn tool_node_keeps_object_params() {
  let n = PipelineNode::tool("align", Tool::Flirt, json!({"dof": 6}));
  assert_eq!(n.tool_kind(), Some(Tool::Flirt));
  assert_eq!(n.params.get("dof"), Some(&json!(6)));
  assert!(n.has_input_port("wm_seg"));
  assert!(!n.has_input_port("flo_file"));
  assert!(n.has_output_port("out_matrix_file"));
}

#[test]
fn tool_node_ignores_non_object_params() {
  let n = PipelineNode::tool("align", Tool::RegAladin, json!("oops"));
  assert!(n.params.is_empty());
}

#[test]
fn serializes_with_flat_kind_tag() {
  let n = PipelineNode::tool("norm", Tool::ApplyXfm, json!({}));
  let v = serde_json::to_value(&n).unwrap();
  assert_eq!(v["kind"], "tool");
  assert_eq!(v["tool"], "apply_xfm");
  assert!(v.get("params").is_none());
  let back: PipelineNode = serde_json::from_value(v).unwrap();
  assert_eq!(back, n);
}

#[test]
fn describe_names_program() {
  let n = PipelineNode::tool("a", Tool::RegAladin, json!({}));
  assert_eq!(n.describe(), "reg_aladin (reg_aladin)");
  assert!(matches!(
    PipelineNode::input("inputnode", &[]).kind,
    NodeKind::Input { .. }
  ));
}
