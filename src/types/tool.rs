//! External image-processing tools a pipeline step can invoke.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An external tool with a fixed set of named input and output ports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tool {
  /// FSL linear registration.
  Flirt,
  /// FSL `flirt -applyxfm`: resample an image through an existing matrix.
  ApplyXfm,
  /// NiftyReg block-matching affine registration.
  RegAladin,
}

impl Tool {
  /// Name of the external program.
  pub fn program(&self) -> &'static str {
    match self {
      Tool::Flirt | Tool::ApplyXfm => "flirt",
      Tool::RegAladin => "reg_aladin",
    }
  }

  pub fn input_ports(&self) -> &'static [&'static str] {
    match self {
      Tool::Flirt => &["in_file", "reference", "in_matrix_file", "wm_seg"],
      Tool::ApplyXfm => &["in_file", "reference", "in_matrix_file"],
      Tool::RegAladin => &["ref_file", "flo_file", "in_aff_file", "rmask_file", "fmask_file"],
    }
  }

  /// Inputs that must be fed before the step can run.
  pub fn required_inputs(&self) -> &'static [&'static str] {
    match self {
      Tool::Flirt => &["in_file", "reference"],
      Tool::ApplyXfm => &["in_file", "reference", "in_matrix_file"],
      Tool::RegAladin => &["ref_file", "flo_file"],
    }
  }

  pub fn output_ports(&self) -> &'static [&'static str] {
    match self {
      Tool::Flirt | Tool::ApplyXfm => &["out_file", "out_matrix_file"],
      Tool::RegAladin => &["res_file", "aff_file"],
    }
  }
}

impl fmt::Display for Tool {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Tool::Flirt => write!(f, "flirt"),
      Tool::ApplyXfm => write!(f, "apply_xfm"),
      Tool::RegAladin => write!(f, "reg_aladin"),
    }
  }
}
