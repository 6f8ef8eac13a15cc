//! Tests for the short preparation pipelines.

use serde_json::json;

use super::prepare::{
  FlairStrategy, SHORT_PREPARATION_FLAIR_PIPE, SHORT_PREPARATION_MD_PIPE,
  create_short_preparation_flair_pipe, create_short_preparation_md_pipe,
};
use crate::error::PipelineError;
use crate::types::{Connection, Tool};

#[test]
fn strategy_prefers_flirt_key() {
  let params = json!({
    "align_FLAIR_on_T1": {"dof": 6},
    "reg_aladin_FLAIR_on_T1": {}
  });
  assert_eq!(
    FlairStrategy::from_params(&params, SHORT_PREPARATION_FLAIR_PIPE).unwrap(),
    FlairStrategy::Flirt {
      params: json!({"dof": 6})
    }
  );
}

#[test]
fn strategy_falls_back_to_reg_aladin() {
  let params = json!({"reg_aladin_FLAIR_on_T1": {}});
  let s = FlairStrategy::from_params(&params, SHORT_PREPARATION_FLAIR_PIPE).unwrap();
  assert!(matches!(s, FlairStrategy::RegAladin { .. }));
  assert_eq!(s.key(), "reg_aladin_FLAIR_on_T1");
}

#[test]
fn strategy_missing_is_a_catchable_error() {
  let err = FlairStrategy::from_params(&json!({"something_else": {}}), SHORT_PREPARATION_FLAIR_PIPE)
    .unwrap_err();
  match &err {
    PipelineError::MissingStrategy { pipeline, keys } => {
      assert_eq!(pipeline, SHORT_PREPARATION_FLAIR_PIPE);
      assert_eq!(keys, &vec!["align_FLAIR_on_T1", "reg_aladin_FLAIR_on_T1"]);
    }
    other => panic!("unexpected error {:?}", other),
  }
  assert!(err.to_string().contains("align_FLAIR_on_T1"));
  assert!(create_short_preparation_flair_pipe(&json!({}), SHORT_PREPARATION_FLAIR_PIPE).is_err());
}

#[test]
fn missing_strategy_names_the_requested_pipeline() {
  match create_short_preparation_flair_pipe(&json!({}), "prep") {
    Err(PipelineError::MissingStrategy { pipeline, .. }) => assert_eq!(pipeline, "prep"),
    other => panic!("expected missing strategy, got {:?}", other),
  }
}

#[test]
fn flirt_branch_has_one_alignment() {
  let params = json!({"align_FLAIR_on_T1": {"cost": "normmi"}});
  let p = create_short_preparation_flair_pipe(&params, SHORT_PREPARATION_FLAIR_PIPE).unwrap();
  let tools: Vec<_> = p.tool_nodes().collect();
  assert_eq!(tools.len(), 1);
  assert_eq!(tools[0].id, "align_FLAIR_on_T1");
  assert_eq!(tools[0].tool_kind(), Some(Tool::Flirt));
  assert_eq!(tools[0].params.get("cost"), Some(&json!("normmi")));
  assert!(p.connections.contains(&Connection::new(
    "inputnode",
    "FLAIR",
    "align_FLAIR_on_T1",
    "in_file"
  )));
  assert!(p.connections.contains(&Connection::new(
    "align_FLAIR_on_T1",
    "out_file",
    "outputnode",
    "coreg_FLAIR"
  )));
  assert_eq!(p.output_fields(), vec!["coreg_FLAIR"]);
}

#[test]
fn reg_aladin_branch_chains_two_alignments() {
  let params = json!({"reg_aladin_FLAIR_on_T1": {}});
  let p = create_short_preparation_flair_pipe(&params, "prep").unwrap();
  assert_eq!(p.name, "prep");
  assert_eq!(p.tool_nodes().count(), 2);
  assert!(p.connections.contains(&Connection::new(
    "align_FLAIR_on_T1",
    "res_file",
    "align_FLAIR_on_T1_2",
    "flo_file"
  )));
  assert!(p.connections.contains(&Connection::new(
    "inputnode",
    "orig_T1",
    "align_FLAIR_on_T1_2",
    "ref_file"
  )));
  assert!(p.connections.contains(&Connection::new(
    "align_FLAIR_on_T1_2",
    "res_file",
    "outputnode",
    "coreg_FLAIR"
  )));
  let order = p.validate().unwrap();
  let first = order.iter().position(|n| n == "align_FLAIR_on_T1").unwrap();
  let second = order.iter().position(|n| n == "align_FLAIR_on_T1_2").unwrap();
  assert!(first < second);
}

#[test]
fn md_pipe_always_exposes_both_outputs() {
  for params in [
    json!({}),
    json!({"init_align_b0mean_on_T2": {"dof": 6}}),
    json!({"align_b0mean_on_T2": {"cost": "bbr", "dof": 6}, "unrelated": 1}),
  ] {
    let p = create_short_preparation_md_pipe(&params, SHORT_PREPARATION_MD_PIPE).unwrap();
    assert_eq!(p.output_fields(), vec!["coreg_MD", "coreg_better_MD"]);
    assert_eq!(p.incoming("outputnode").len(), 2);
  }
}

#[test]
fn md_refinement_is_seeded_and_masked() {
  let params = json!({"align_b0mean_on_T2": {"cost": "bbr"}});
  let p = create_short_preparation_md_pipe(&params, SHORT_PREPARATION_MD_PIPE).unwrap();
  assert!(p.connections.contains(&Connection::new(
    "init_align_b0mean_on_T2",
    "out_matrix_file",
    "align_b0mean_on_T2",
    "in_matrix_file"
  )));
  assert!(p.connections.contains(&Connection::new(
    "inputnode",
    "native_wm_mask",
    "align_b0mean_on_T2",
    "wm_seg"
  )));
  assert_eq!(
    p.nodes["align_b0mean_on_T2"].params.get("cost"),
    Some(&json!("bbr"))
  );
  assert!(p.nodes["init_align_b0mean_on_T2"].params.is_empty());
}

#[test]
fn md_coarse_and_refined_use_their_own_matrix() {
  let p = create_short_preparation_md_pipe(&json!({}), SHORT_PREPARATION_MD_PIPE).unwrap();
  assert!(p.connections.contains(&Connection::new(
    "init_align_b0mean_on_T2",
    "out_matrix_file",
    "align_MD_on_T2_with_b0",
    "in_matrix_file"
  )));
  assert!(p.connections.contains(&Connection::new(
    "align_b0mean_on_T2",
    "out_matrix_file",
    "align_better_MD_on_T2_with_b0",
    "in_matrix_file"
  )));
  assert!(p.connections.contains(&Connection::new(
    "align_better_MD_on_T2_with_b0",
    "out_file",
    "outputnode",
    "coreg_better_MD"
  )));
}

#[test]
fn construction_is_deterministic() {
  let params = json!({"reg_aladin_FLAIR_on_T1": {"rig_only": true}});
  let a = create_short_preparation_flair_pipe(&params, "p").unwrap();
  let b = create_short_preparation_flair_pipe(&params, "p").unwrap();
  assert_eq!(a, b);
  let a = create_short_preparation_md_pipe(&params, "m").unwrap();
  let b = create_short_preparation_md_pipe(&params, "m").unwrap();
  assert_eq!(a, b);
  assert_eq!(a.validate().unwrap(), b.validate().unwrap());
}
