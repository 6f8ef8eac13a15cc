//! Steps run directly by this crate rather than by an execution backend.

mod reg_aladin_dirty;

pub use reg_aladin_dirty::{
  DEFAULT_PROGRAM, DirtyRegistration, OUTPUT_FILENAME, OutputNaming, reg_aladin_dirty,
};
