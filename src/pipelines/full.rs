//! Transformation pipelines: short preparation followed by template-space normalisation.

use serde_json::Value;
use tracing::{info, instrument};

use super::prepare::{
  SHORT_PREPARATION_FLAIR_PIPE, SHORT_PREPARATION_MD_PIPE, create_short_preparation_flair_pipe,
  create_short_preparation_md_pipe,
};
use crate::error::PipelineResult;
use crate::params::{TemplateParams, parse_key, utf8_path};
use crate::types::{INPUT_NODE, OUTPUT_NODE, Pipeline, Tool};

/// Default name of the FLAIR transformation pipeline.
pub const TRANSFO_FLAIR_PIPE: &str = "transfo_FLAIR_pipe";
/// Default name of the MD transformation pipeline.
pub const TRANSFO_MD_PIPE: &str = "transfo_MD_pipe";

/// Coregisters FLAIR onto T1 and applies the native-to-template matrix to the result.
///
/// Inputs: `orig_T1`, `FLAIR`, `lin_transfo_file`.
/// Outputs: `coreg_FLAIR` (native space), `norm_FLAIR` (template space).
///
/// Step parameters for the embedded preparation come from the
/// `short_preparation_FLAIR_pipe` entry of `params`.
#[instrument(level = "trace", skip(template, params))]
pub fn create_transfo_flair_pipe(
  template: &TemplateParams,
  params: &Value,
  name: &str,
) -> PipelineResult<Pipeline> {
  info!(pipeline = name, "creating FLAIR transformation pipeline");

  let mut pipe = Pipeline::new(name);
  pipe.add_input_node(&["orig_T1", "FLAIR", "lin_transfo_file"])?;

  let prep = create_short_preparation_flair_pipe(
    &parse_key(params, SHORT_PREPARATION_FLAIR_PIPE),
    SHORT_PREPARATION_FLAIR_PIPE,
  )?;
  pipe.add_subpipeline(prep)?;
  pipe.connect(INPUT_NODE, "orig_T1", SHORT_PREPARATION_FLAIR_PIPE, "inputnode.orig_T1")?;
  pipe.connect(INPUT_NODE, "FLAIR", SHORT_PREPARATION_FLAIR_PIPE, "inputnode.FLAIR")?;

  pipe.add_tool("norm_lin_FLAIR", Tool::ApplyXfm, Value::Null)?;
  pipe.set_input(
    "norm_lin_FLAIR",
    "reference",
    utf8_path(&template.template_brain)?,
  )?;
  pipe.connect(
    SHORT_PREPARATION_FLAIR_PIPE,
    "outputnode.coreg_FLAIR",
    "norm_lin_FLAIR",
    "in_file",
  )?;
  pipe.connect(INPUT_NODE, "lin_transfo_file", "norm_lin_FLAIR", "in_matrix_file")?;

  pipe.add_output_node(&["coreg_FLAIR", "norm_FLAIR"])?;
  pipe.connect(
    SHORT_PREPARATION_FLAIR_PIPE,
    "outputnode.coreg_FLAIR",
    OUTPUT_NODE,
    "coreg_FLAIR",
  )?;
  pipe.connect("norm_lin_FLAIR", "out_file", OUTPUT_NODE, "norm_FLAIR")?;

  pipe.validate()?;
  Ok(pipe)
}

/// Coregisters MD onto the skull-stripped T2 and applies the native-to-template matrix.
///
/// The template-space white-matter mask `threshold_wm` is first brought back to native
/// space through `inv_lin_transfo_file` and feeds the boundary-based refinement of the
/// embedded MD preparation.
///
/// Inputs: `orig_T1`, `SS_T2`, `MD`, `b0mean`, `threshold_wm`, `lin_transfo_file`,
/// `inv_lin_transfo_file`. Outputs: `coreg_MD`, `norm_MD`.
#[instrument(level = "trace", skip(template, params))]
pub fn create_transfo_md_pipe(
  template: &TemplateParams,
  params: &Value,
  name: &str,
) -> PipelineResult<Pipeline> {
  info!(pipeline = name, "creating MD transformation pipeline");

  let mut pipe = Pipeline::new(name);
  pipe.add_input_node(&[
    "orig_T1",
    "SS_T2",
    "MD",
    "b0mean",
    "threshold_wm",
    "lin_transfo_file",
    "inv_lin_transfo_file",
  ])?;

  pipe.add_tool("compute_native_wm", Tool::ApplyXfm, Value::Null)?;
  pipe.connect(INPUT_NODE, "threshold_wm", "compute_native_wm", "in_file")?;
  pipe.connect(INPUT_NODE, "orig_T1", "compute_native_wm", "reference")?;
  pipe.connect(
    INPUT_NODE,
    "inv_lin_transfo_file",
    "compute_native_wm",
    "in_matrix_file",
  )?;

  let prep = create_short_preparation_md_pipe(
    &parse_key(params, SHORT_PREPARATION_MD_PIPE),
    SHORT_PREPARATION_MD_PIPE,
  )?;
  pipe.add_subpipeline(prep)?;
  pipe.connect(INPUT_NODE, "SS_T2", SHORT_PREPARATION_MD_PIPE, "inputnode.SS_T2")?;
  pipe.connect(INPUT_NODE, "MD", SHORT_PREPARATION_MD_PIPE, "inputnode.MD")?;
  pipe.connect(INPUT_NODE, "b0mean", SHORT_PREPARATION_MD_PIPE, "inputnode.b0mean")?;
  pipe.connect(
    "compute_native_wm",
    "out_file",
    SHORT_PREPARATION_MD_PIPE,
    "inputnode.native_wm_mask",
  )?;

  pipe.add_tool("norm_lin_MD", Tool::ApplyXfm, Value::Null)?;
  pipe.set_input(
    "norm_lin_MD",
    "reference",
    utf8_path(&template.template_brain)?,
  )?;
  pipe.connect(
    SHORT_PREPARATION_MD_PIPE,
    "outputnode.coreg_MD",
    "norm_lin_MD",
    "in_file",
  )?;
  pipe.connect(INPUT_NODE, "lin_transfo_file", "norm_lin_MD", "in_matrix_file")?;

  pipe.add_output_node(&["coreg_MD", "norm_MD"])?;
  pipe.connect(
    SHORT_PREPARATION_MD_PIPE,
    "outputnode.coreg_MD",
    OUTPUT_NODE,
    "coreg_MD",
  )?;
  pipe.connect("norm_lin_MD", "out_file", OUTPUT_NODE, "norm_MD")?;

  pipe.validate()?;
  Ok(pipe)
}
