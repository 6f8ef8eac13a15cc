//! Direct `reg_aladin` call outside any pipeline graph.
//!
//! Runs the command through `sh -c` and trusts the output file rather than the exit status:
//! a non-zero exit is only logged, a missing output is an error. A present but truncated
//! output is not detected.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::error::{PipelineError, PipelineResult};
use crate::params::utf8_path;

/// Program run when none is configured.
pub const DEFAULT_PROGRAM: &str = "reg_aladin";
/// Name of the registered image written into the working directory.
pub const OUTPUT_FILENAME: &str = "outputResult.nii";

/// How the output file is named inside the working directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputNaming {
  /// Always [OUTPUT_FILENAME]. Two calls sharing a working directory overwrite each other.
  #[default]
  Fixed,
  /// [OUTPUT_FILENAME] with a random suffix, one file per call.
  Unique,
}

/// Configured dirty registration call.
#[derive(Debug, Clone)]
pub struct DirtyRegistration {
  /// Shell fragment naming the program (may carry leading arguments).
  program: String,
  /// Directory receiving the output; the current directory when unset.
  work_dir: Option<PathBuf>,
  naming: OutputNaming,
}

impl Default for DirtyRegistration {
  fn default() -> Self {
    Self::new()
  }
}

/// Single-quotes `s` for `sh`.
pub(crate) fn shell_quote(s: &str) -> String {
  format!("'{}'", s.replace('\'', r"'\''"))
}

impl DirtyRegistration {
  pub fn new() -> Self {
    Self {
      program: DEFAULT_PROGRAM.to_string(),
      work_dir: None,
      naming: OutputNaming::Fixed,
    }
  }

  pub fn program(mut self, program: impl Into<String>) -> Self {
    self.program = program.into();
    self
  }

  pub fn work_dir(mut self, dir: impl Into<PathBuf>) -> Self {
    self.work_dir = Some(dir.into());
    self
  }

  pub fn naming(mut self, naming: OutputNaming) -> Self {
    self.naming = naming;
    self
  }

  /// Absolute path the next call will write to.
  pub fn output_path(&self) -> PipelineResult<PathBuf> {
    let dir = match &self.work_dir {
      Some(d) if d.is_absolute() => d.clone(),
      Some(d) => std::env::current_dir()?.join(d),
      None => std::env::current_dir()?,
    };
    let name = match self.naming {
      OutputNaming::Fixed => OUTPUT_FILENAME.to_string(),
      OutputNaming::Unique => format!("outputResult_{}.nii", Uuid::new_v4().simple()),
    };
    Ok(dir.join(name))
  }

  /// Shell command registering `in_file` (floating) onto `reference`, writing `out_file`.
  /// Non-UTF-8 paths are rejected, so the shell writes exactly the file [Self::run] checks.
  pub fn command(&self, reference: &Path, in_file: &Path, out_file: &Path) -> PipelineResult<String> {
    Ok(format!(
      "{} -flo {} -ref {} -res {}",
      self.program,
      shell_quote(utf8_path(in_file)?),
      shell_quote(utf8_path(reference)?),
      shell_quote(utf8_path(out_file)?)
    ))
  }

  /// Runs the registration and returns the output path, which is guaranteed to exist.
  #[instrument(level = "trace", skip(self))]
  pub fn run(&self, reference: &Path, in_file: &Path) -> PipelineResult<PathBuf> {
    let out_file = self.output_path()?;
    let cmd = self.command(reference, in_file, &out_file)?;
    // A stale file from an earlier call would otherwise pass the existence check.
    match std::fs::remove_file(&out_file) {
      Ok(()) => warn!(path = %out_file.display(), "removed stale output"),
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
      Err(e) => return Err(e.into()),
    }

    info!(command = %cmd, "running");
    let status = Command::new("sh")
      .arg("-c")
      .arg(&cmd)
      .status()
      .map_err(|source| PipelineError::Spawn {
        command: cmd.clone(),
        source,
      })?;
    if !status.success() {
      warn!(command = %cmd, code = ?status.code(), "registration exited with failure status");
    }

    if !out_file.exists() {
      return Err(PipelineError::MissingOutput {
        path: out_file,
        command: cmd,
      });
    }
    info!(path = %out_file.display(), "finished");
    Ok(out_file)
  }

  /// [Self::run] on tokio's blocking pool.
  pub async fn run_async(&self, reference: PathBuf, in_file: PathBuf) -> PipelineResult<PathBuf> {
    let this = self.clone();
    tokio::task::spawn_blocking(move || this.run(&reference, &in_file))
      .await
      .map_err(|e| PipelineError::Spawn {
        command: self.program.clone(),
        source: std::io::Error::other(e),
      })?
  }
}

/// Registers `in_file` onto `reference` with `reg_aladin`, writing `outputResult.nii` in the
/// current directory.
pub fn reg_aladin_dirty(reference: &Path, in_file: &Path) -> PipelineResult<PathBuf> {
  DirtyRegistration::new().run(reference, in_file)
}
