//! Calendar source capability
//!
//! This crate defines the interface between the freeze core and whatever
//! holds the calendar file (a git repository in production). It contains
//! no transport code itself, only the trait, its value types and an
//! in-memory mock.

mod handle;
mod mock;
mod traits;

pub use handle::*;
pub use mock::*;
pub use traits::*;
