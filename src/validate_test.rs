//! Tests for `validate`.

use serde_json::json;

use crate::error::PipelineError;
use crate::types::{Connection, Pipeline, PipelineNode, Tool};
use crate::validate::{execution_order, validate};

fn chain() -> Pipeline {
  let mut p = Pipeline::new("chain");
  p.add_input_node(&["img", "ref", "mat"]).unwrap();
  p.add_tool("align", Tool::Flirt, json!({})).unwrap();
  p.add_tool("apply", Tool::ApplyXfm, json!({})).unwrap();
  p.add_output_node(&["result"]).unwrap();
  p.connect("inputnode", "img", "align", "in_file").unwrap();
  p.connect("inputnode", "ref", "align", "reference").unwrap();
  p.connect("inputnode", "img", "apply", "in_file").unwrap();
  p.connect("inputnode", "ref", "apply", "reference").unwrap();
  p.connect("align", "out_matrix_file", "apply", "in_matrix_file").unwrap();
  p.connect("apply", "out_file", "outputnode", "result").unwrap();
  p
}

#[test]
fn valid_chain_orders_upstream_first() {
  let order = validate(&chain()).unwrap();
  assert_eq!(order, vec!["inputnode", "align", "apply", "outputnode"]);
}

#[test]
fn unconnected_required_input_is_named() {
  let mut p = Pipeline::new("p");
  p.add_input_node(&["img"]).unwrap();
  p.add_tool("apply", Tool::ApplyXfm, json!({})).unwrap();
  p.connect("inputnode", "img", "apply", "in_file").unwrap();
  p.set_input("apply", "reference", "/tpl.nii").unwrap();
  let err = validate(&p).unwrap_err();
  assert!(matches!(
    err,
    PipelineError::UnconnectedInput { ref node, ref port } if node == "apply" && port == "in_matrix_file"
  ));
}

#[test]
fn unconnected_output_field_is_reported() {
  let mut p = chain();
  p.nodes
    .insert("outputnode".to_string(), PipelineNode::output("outputnode", &["result", "extra"]));
  let err = validate(&p).unwrap_err();
  assert!(matches!(err, PipelineError::UnconnectedInput { ref port, .. } if port == "extra"));
}

#[test]
fn optional_inputs_may_stay_unconnected() {
  let p = chain();
  assert_eq!(p.feed_count("align", "wm_seg"), 0);
  assert!(validate(&p).is_ok());
}

#[test]
fn doubly_fed_input_from_loaded_graph_is_rejected() {
  let mut p = chain();
  p.connections
    .push(Connection::new("inputnode", "mat", "apply", "in_matrix_file"));
  assert!(matches!(
    validate(&p),
    Err(PipelineError::PortAlreadyConnected { .. })
  ));
}

#[test]
fn dangling_connection_is_rejected() {
  let mut p = chain();
  p.connections
    .push(Connection::new("ghost", "out_file", "align", "wm_seg"));
  assert!(matches!(validate(&p), Err(PipelineError::UnknownNode { .. })));
}

#[test]
fn bad_fixed_input_port_is_rejected() {
  let mut p = chain();
  if let Some(n) = p.nodes.get_mut("align") {
    n.fixed_inputs.insert("flo_file".to_string(), "x.nii".to_string());
  }
  assert!(matches!(
    validate(&p),
    Err(PipelineError::UnknownPort { direction: "input", .. })
  ));
}

#[test]
fn cycle_is_reported_with_its_nodes() {
  let mut p = Pipeline::new("loop");
  p.add_input_node(&["ref"]).unwrap();
  p.add_tool("a", Tool::Flirt, json!({})).unwrap();
  p.add_tool("b", Tool::Flirt, json!({})).unwrap();
  p.connect("inputnode", "ref", "a", "reference").unwrap();
  p.connect("inputnode", "ref", "b", "reference").unwrap();
  p.connect("a", "out_file", "b", "in_file").unwrap();
  p.connect("b", "out_file", "a", "in_file").unwrap();
  match execution_order(&p) {
    Err(PipelineError::Cycle { nodes, .. }) => assert_eq!(nodes, vec!["a", "b"]),
    other => panic!("expected cycle, got {:?}", other),
  }
}

#[test]
fn cycle_report_leaves_out_downstream_nodes() {
  let mut p = Pipeline::new("loop");
  p.add_input_node(&["ref"]).unwrap();
  for id in ["a", "b", "z_after"] {
    p.add_tool(id, Tool::Flirt, json!({})).unwrap();
    p.connect("inputnode", "ref", id, "reference").unwrap();
  }
  p.connect("a", "out_file", "b", "in_file").unwrap();
  p.connect("b", "out_file", "a", "in_file").unwrap();
  p.connect("b", "out_matrix_file", "z_after", "in_file").unwrap();
  match execution_order(&p) {
    Err(PipelineError::Cycle { nodes, .. }) => assert_eq!(nodes, vec!["a", "b"]),
    other => panic!("expected cycle, got {:?}", other),
  }
}

#[test]
fn nested_input_with_consumers_must_be_fed() {
  let mut inner = Pipeline::new("inner");
  inner.add_input_node(&["img", "ref"]).unwrap();
  inner.add_tool("align", Tool::Flirt, json!({})).unwrap();
  inner.connect("inputnode", "img", "align", "in_file").unwrap();
  inner.connect("inputnode", "ref", "align", "reference").unwrap();

  let mut outer = Pipeline::new("outer");
  outer.add_input_node(&["t1"]).unwrap();
  outer.add_subpipeline(inner).unwrap();
  outer.connect("inputnode", "t1", "inner", "inputnode.ref").unwrap();

  let err = validate(&outer).unwrap_err();
  assert!(matches!(
    err,
    PipelineError::UnconnectedInput { ref node, ref port } if node == "inner.inputnode" && port == "img"
  ));

  outer.connect("inputnode", "t1", "inner", "inputnode.img").unwrap();
  assert!(validate(&outer).is_ok());
}

#[test]
fn order_is_stable_across_calls() {
  let p = chain();
  assert_eq!(validate(&p).unwrap(), validate(&p.clone()).unwrap());
}
