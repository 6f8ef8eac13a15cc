//! Pipeline constructors for FLAIR and MD coregistration and normalisation.

mod full;
mod prepare;
#[cfg(test)]
mod prepare_test;

pub use full::{TRANSFO_FLAIR_PIPE, TRANSFO_MD_PIPE, create_transfo_flair_pipe, create_transfo_md_pipe};
pub use prepare::{
  ALIGN_B0MEAN_ON_T2, ALIGN_FLAIR_ON_T1, FlairStrategy, INIT_ALIGN_B0MEAN_ON_T2,
  REG_ALADIN_FLAIR_ON_T1, SHORT_PREPARATION_FLAIR_PIPE, SHORT_PREPARATION_MD_PIPE,
  create_short_preparation_flair_pipe, create_short_preparation_md_pipe,
};
