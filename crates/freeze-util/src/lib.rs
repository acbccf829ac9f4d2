//! Shared utilities for the freeze calendar resource
//!
//! This crate provides:
//! - The `Clock` capability (system, offset and mock clocks)
//! - Duration parsing and human-readable formatting
//! - The `Revision` identifier for calendar source states
//! - Error types

mod error;
mod ids;
mod time;

pub use error::*;
pub use ids::*;
pub use time::*;
