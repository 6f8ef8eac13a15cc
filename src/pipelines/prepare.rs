//! Short preparation pipelines: coregistration of one modality onto a structural reference.

use serde_json::Value;
use tracing::{info, instrument};

use crate::error::{PipelineError, PipelineResult};
use crate::params::{has_key, parse_key};
use crate::types::{INPUT_NODE, OUTPUT_NODE, Pipeline, Tool};

/// Default name of the FLAIR preparation pipeline.
pub const SHORT_PREPARATION_FLAIR_PIPE: &str = "short_preparation_FLAIR_pipe";
/// Default name of the MD preparation pipeline.
pub const SHORT_PREPARATION_MD_PIPE: &str = "short_preparation_MD_pipe";

/// Parameter key selecting a single FLIRT alignment of FLAIR on T1.
pub const ALIGN_FLAIR_ON_T1: &str = "align_FLAIR_on_T1";
/// Parameter key selecting two chained reg_aladin alignments of FLAIR on T1.
pub const REG_ALADIN_FLAIR_ON_T1: &str = "reg_aladin_FLAIR_on_T1";

pub const INIT_ALIGN_B0MEAN_ON_T2: &str = "init_align_b0mean_on_T2";
pub const ALIGN_B0MEAN_ON_T2: &str = "align_b0mean_on_T2";

/// How FLAIR is brought onto T1. Resolved once from the parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum FlairStrategy {
  /// One FLIRT step, parameterised by the `align_FLAIR_on_T1` entry.
  Flirt { params: Value },
  /// reg_aladin on raw FLAIR, then again on its result (refinement), parameterised by the
  /// `reg_aladin_FLAIR_on_T1` entry.
  RegAladin { params: Value },
}

impl FlairStrategy {
  /// Picks the strategy by key presence, `align_FLAIR_on_T1` first. `pipeline` names the
  /// pipeline being built in the error.
  pub fn from_params(params: &Value, pipeline: &str) -> PipelineResult<Self> {
    if has_key(params, ALIGN_FLAIR_ON_T1) {
      Ok(FlairStrategy::Flirt {
        params: parse_key(params, ALIGN_FLAIR_ON_T1),
      })
    } else if has_key(params, REG_ALADIN_FLAIR_ON_T1) {
      Ok(FlairStrategy::RegAladin {
        params: parse_key(params, REG_ALADIN_FLAIR_ON_T1),
      })
    } else {
      Err(PipelineError::MissingStrategy {
        pipeline: pipeline.to_string(),
        keys: vec![ALIGN_FLAIR_ON_T1, REG_ALADIN_FLAIR_ON_T1],
      })
    }
  }

  pub fn key(&self) -> &'static str {
    match self {
      FlairStrategy::Flirt { .. } => ALIGN_FLAIR_ON_T1,
      FlairStrategy::RegAladin { .. } => REG_ALADIN_FLAIR_ON_T1,
    }
  }
}

/// Coregisters FLAIR onto T1.
///
/// Inputs: `orig_T1`, `FLAIR`. Output: `coreg_FLAIR`.
#[instrument(level = "trace", skip(params))]
pub fn create_short_preparation_flair_pipe(params: &Value, name: &str) -> PipelineResult<Pipeline> {
  let strategy = FlairStrategy::from_params(params, name)?;
  info!(pipeline = name, strategy = strategy.key(), "creating FLAIR preparation pipeline");

  let mut pipe = Pipeline::new(name);
  pipe.add_input_node(&["orig_T1", "FLAIR"])?;
  pipe.add_output_node(&["coreg_FLAIR"])?;

  let (last_step, last_port) = match strategy {
    FlairStrategy::Flirt { params } => {
      pipe.add_tool("align_FLAIR_on_T1", Tool::Flirt, params)?;
      pipe.connect(INPUT_NODE, "orig_T1", "align_FLAIR_on_T1", "reference")?;
      pipe.connect(INPUT_NODE, "FLAIR", "align_FLAIR_on_T1", "in_file")?;
      ("align_FLAIR_on_T1", "out_file")
    }
    FlairStrategy::RegAladin { params } => {
      pipe.add_tool("align_FLAIR_on_T1", Tool::RegAladin, params.clone())?;
      pipe.connect(INPUT_NODE, "orig_T1", "align_FLAIR_on_T1", "ref_file")?;
      pipe.connect(INPUT_NODE, "FLAIR", "align_FLAIR_on_T1", "flo_file")?;

      pipe.add_tool("align_FLAIR_on_T1_2", Tool::RegAladin, params)?;
      pipe.connect(INPUT_NODE, "orig_T1", "align_FLAIR_on_T1_2", "ref_file")?;
      pipe.connect("align_FLAIR_on_T1", "res_file", "align_FLAIR_on_T1_2", "flo_file")?;
      ("align_FLAIR_on_T1_2", "res_file")
    }
  };
  pipe.connect(last_step, last_port, OUTPUT_NODE, "coreg_FLAIR")?;

  pipe.validate()?;
  Ok(pipe)
}

/// Coregisters an MD map onto the skull-stripped T2 through the mean B0 image.
///
/// The B0-to-T2 alignment runs twice: an unconstrained initial estimate, then a
/// boundary-based refinement using the native white-matter mask and seeded with the first
/// matrix. Both matrices are applied to MD, giving `coreg_MD` (initial) and
/// `coreg_better_MD` (refined).
///
/// Inputs: `SS_T2`, `MD`, `b0mean`, `native_wm_mask`.
#[instrument(level = "trace", skip(params))]
pub fn create_short_preparation_md_pipe(params: &Value, name: &str) -> PipelineResult<Pipeline> {
  info!(pipeline = name, "creating MD preparation pipeline");

  let mut pipe = Pipeline::new(name);
  pipe.add_input_node(&["SS_T2", "MD", "b0mean", "native_wm_mask"])?;

  pipe.add_tool(
    INIT_ALIGN_B0MEAN_ON_T2,
    Tool::Flirt,
    parse_key(params, INIT_ALIGN_B0MEAN_ON_T2),
  )?;
  pipe.connect(INPUT_NODE, "SS_T2", INIT_ALIGN_B0MEAN_ON_T2, "reference")?;
  pipe.connect(INPUT_NODE, "b0mean", INIT_ALIGN_B0MEAN_ON_T2, "in_file")?;

  pipe.add_tool(
    ALIGN_B0MEAN_ON_T2,
    Tool::Flirt,
    parse_key(params, ALIGN_B0MEAN_ON_T2),
  )?;
  pipe.connect(INPUT_NODE, "SS_T2", ALIGN_B0MEAN_ON_T2, "reference")?;
  pipe.connect(INPUT_NODE, "b0mean", ALIGN_B0MEAN_ON_T2, "in_file")?;
  pipe.connect(INPUT_NODE, "native_wm_mask", ALIGN_B0MEAN_ON_T2, "wm_seg")?;
  pipe.connect(
    INIT_ALIGN_B0MEAN_ON_T2,
    "out_matrix_file",
    ALIGN_B0MEAN_ON_T2,
    "in_matrix_file",
  )?;

  // initial matrix applied to MD
  pipe.add_tool("align_MD_on_T2_with_b0", Tool::ApplyXfm, Value::Null)?;
  pipe.connect(INPUT_NODE, "SS_T2", "align_MD_on_T2_with_b0", "reference")?;
  pipe.connect(INPUT_NODE, "MD", "align_MD_on_T2_with_b0", "in_file")?;
  pipe.connect(
    INIT_ALIGN_B0MEAN_ON_T2,
    "out_matrix_file",
    "align_MD_on_T2_with_b0",
    "in_matrix_file",
  )?;

  // refined matrix applied to MD
  pipe.add_tool("align_better_MD_on_T2_with_b0", Tool::ApplyXfm, Value::Null)?;
  pipe.connect(INPUT_NODE, "SS_T2", "align_better_MD_on_T2_with_b0", "reference")?;
  pipe.connect(INPUT_NODE, "MD", "align_better_MD_on_T2_with_b0", "in_file")?;
  pipe.connect(
    ALIGN_B0MEAN_ON_T2,
    "out_matrix_file",
    "align_better_MD_on_T2_with_b0",
    "in_matrix_file",
  )?;

  pipe.add_output_node(&["coreg_MD", "coreg_better_MD"])?;
  pipe.connect("align_MD_on_T2_with_b0", "out_file", OUTPUT_NODE, "coreg_MD")?;
  pipe.connect(
    "align_better_MD_on_T2_with_b0",
    "out_file",
    OUTPUT_NODE,
    "coreg_better_MD",
  )?;

  pipe.validate()?;
  Ok(pipe)
}
