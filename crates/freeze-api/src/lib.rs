//! Envelope types for the freeze calendar resource
//!
//! This crate defines the JSON contract with the CD orchestrator:
//! - Requests for the three verbs (check, in, out)
//! - Responses (version lists, version + metadata)
//! - The operating `Mode` and request validation

mod duration;
mod requests;
mod responses;
mod types;
mod validation;

pub use duration::*;
pub use requests::*;
pub use responses::*;
pub use types::*;
pub use validation::*;

/// Metadata name carrying the number of windows in the calendar
pub const METADATA_TOTAL_WINDOWS: &str = "total number of freeze windows";

/// Metadata name carrying the number of windows active at exit
pub const METADATA_ACTIVE_WINDOWS: &str = "number of active freeze windows";
