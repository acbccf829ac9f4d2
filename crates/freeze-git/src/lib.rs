//! Git calendar source
//!
//! Implements `SourceRepo` by driving the `git` command line:
//! - Clone at a branch tip or a pinned revision
//! - Fetch and hard-reset to the remote branch tip
//! - Per-file revision history

mod adapter;
mod process;

pub use adapter::*;
pub use process::*;
