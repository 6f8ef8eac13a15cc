//! CLI: build and export coregistration pipelines, or run the dirty reg_aladin helper.
//!
//! Usage:
//!   neuroweave build --pipeline transfo-flair --params params.json --template template.json
//!   neuroweave reg-aladin-dirty --reference T1.nii --moving FLAIR.nii
//!
//! Set RUST_LOG=neuroweave=trace for TRACE-level span enter/exit and events.

use clap::{Parser, Subcommand, ValueEnum};
use neuroweave::graph_io::{save_pipeline, write_dot};
use neuroweave::nodes::{DEFAULT_PROGRAM, DirtyRegistration, OutputNaming};
use neuroweave::params::{load_params, load_template};
use neuroweave::pipelines::{
  SHORT_PREPARATION_FLAIR_PIPE, SHORT_PREPARATION_MD_PIPE, TRANSFO_FLAIR_PIPE, TRANSFO_MD_PIPE,
  create_short_preparation_flair_pipe, create_short_preparation_md_pipe, create_transfo_flair_pipe,
  create_transfo_md_pipe,
};
use neuroweave::{Pipeline, PipelineError, PipelineResult, render_dot};
use std::path::{Path, PathBuf};
use std::process;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

#[derive(Parser, Debug)]
#[command(name = "neuroweave")]
#[command(
  after_help = r#"Environment variables (used when the matching flag is absent):
  NEUROWEAVE_REG_ALADIN   Program run by reg-aladin-dirty (default: reg_aladin).

Examples:
  neuroweave build --pipeline short-flair --params params.json --format dot
  neuroweave build --pipeline transfo-md --params params.json --template template.json -o graph.json
  neuroweave reg-aladin-dirty --reference T1.nii --moving FLAIR.nii --work-dir /tmp/reg --unique"#
)]
struct Args {
  #[command(subcommand)]
  command: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
  /// Build, validate and export a pipeline graph.
  Build {
    /// Which pipeline to build.
    #[arg(long, value_enum)]
    pipeline: PipelineKind,

    /// JSON parameter file (nested mapping keyed by pipeline and step name).
    #[arg(long, value_name = "FILE")]
    params: PathBuf,

    /// JSON template file with a `template_brain` entry. Required for transfo pipelines.
    #[arg(long, value_name = "FILE")]
    template: Option<PathBuf>,

    /// Pipeline name. Defaults to the conventional name of the chosen pipeline.
    #[arg(long)]
    name: Option<String>,

    #[arg(long, value_enum, default_value_t = Format::Json)]
    format: Format,

    /// Write the export here instead of stdout.
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
  },

  /// Register a moving image onto a reference with reg_aladin, outside any pipeline.
  RegAladinDirty {
    #[arg(long, value_name = "FILE")]
    reference: PathBuf,

    #[arg(long, value_name = "FILE")]
    moving: PathBuf,

    /// Directory receiving outputResult.nii. Default: current directory.
    #[arg(long, value_name = "DIR")]
    work_dir: Option<PathBuf>,

    /// Give the output a unique name so concurrent calls do not collide.
    #[arg(long)]
    unique: bool,

    /// Registration program. Falls back to NEUROWEAVE_REG_ALADIN, then reg_aladin.
    #[arg(long, env = "NEUROWEAVE_REG_ALADIN", default_value = DEFAULT_PROGRAM)]
    program: String,
  },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum PipelineKind {
  ShortFlair,
  ShortMd,
  TransfoFlair,
  TransfoMd,
}

impl PipelineKind {
  fn default_name(self) -> &'static str {
    match self {
      PipelineKind::ShortFlair => SHORT_PREPARATION_FLAIR_PIPE,
      PipelineKind::ShortMd => SHORT_PREPARATION_MD_PIPE,
      PipelineKind::TransfoFlair => TRANSFO_FLAIR_PIPE,
      PipelineKind::TransfoMd => TRANSFO_MD_PIPE,
    }
  }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
  Json,
  Dot,
}

fn build(
  kind: PipelineKind,
  params: &Path,
  template_path: Option<&Path>,
  name: Option<&str>,
) -> PipelineResult<Pipeline> {
  let params = load_params(params)?;
  let name = name.unwrap_or(kind.default_name());
  let template = || -> PipelineResult<_> {
    let path = template_path.ok_or_else(|| {
      PipelineError::Config(format!("--template is required for {:?}", kind))
    })?;
    load_template(path)
  };
  match kind {
    PipelineKind::ShortFlair => create_short_preparation_flair_pipe(&params, name),
    PipelineKind::ShortMd => create_short_preparation_md_pipe(&params, name),
    PipelineKind::TransfoFlair => create_transfo_flair_pipe(&template()?, &params, name),
    PipelineKind::TransfoMd => create_transfo_md_pipe(&template()?, &params, name),
  }
}

#[tokio::main]
async fn main() {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .with_span_events(FmtSpan::ENTER | FmtSpan::EXIT)
    .with_writer(std::io::stderr)
    .init();

  let args = Args::parse();
  match args.command {
    Cmd::Build {
      pipeline,
      params,
      template,
      name,
      format,
      output,
    } => {
      info!(pipeline = ?pipeline, params = %params.display(), "building pipeline");
      let pipe = match build(pipeline, &params, template.as_deref(), name.as_deref()) {
        Ok(p) => p,
        Err(e) => {
          eprintln!("Error building pipeline: {}", e);
          process::exit(1);
        }
      };
      let order = match pipe.validate() {
        Ok(o) => o,
        Err(e) => {
          eprintln!("Invalid pipeline: {}", e);
          process::exit(1);
        }
      };

      match &output {
        Some(path) => {
          let written = match format {
            Format::Json => save_pipeline(path, &pipe),
            Format::Dot => write_dot(path, &pipe),
          };
          if let Err(e) = written {
            eprintln!("Error writing {}: {}", path.display(), e);
            process::exit(1);
          }
          println!("Pipeline built.");
          println!("  Name: {}", pipe.name);
          println!("  Nodes: {}", pipe.nodes.len());
          println!("  Connections: {}", pipe.connections.len());
          println!("  Execution order: {:?}", order);
          println!("  Written to: {}", path.display());
        }
        None => match format {
          Format::Json => match serde_json::to_string_pretty(&pipe) {
            Ok(s) => println!("{}", s),
            Err(e) => {
              eprintln!("Error serializing pipeline: {}", e);
              process::exit(1);
            }
          },
          Format::Dot => print!("{}", render_dot(&pipe)),
        },
      }
    }

    Cmd::RegAladinDirty {
      reference,
      moving,
      work_dir,
      unique,
      program,
    } => {
      let mut reg = DirtyRegistration::new().program(program);
      if let Some(dir) = work_dir {
        reg = reg.work_dir(dir);
      }
      if unique {
        reg = reg.naming(OutputNaming::Unique);
      }
      match reg.run_async(reference, moving).await {
        Ok(out) => println!("{}", out.display()),
        Err(e) => {
          eprintln!("Registration error: {}", e);
          process::exit(1);
        }
      }
    }
  }
}
