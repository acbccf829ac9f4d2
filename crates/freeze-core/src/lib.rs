//! Core of the freeze calendar resource
//!
//! This crate contains:
//! - Window evaluation (which windows are active now, for which scope)
//! - Mode policy (fuse fails, gate waits)
//! - The gate loop (Evaluating -> Blocked -> Refreshing -> Evaluating)
//! - Cooperative cancellation by deadline or stop signal
//! - The `check`, `in` and `out` verbs

mod cancel;
mod error;
mod evaluator;
mod gate;
mod policy;
mod resource;

pub use cancel::*;
pub use error::*;
pub use evaluator::*;
pub use gate::*;
pub use policy::*;
pub use resource::*;
