//! FC CLI - replay recorded forum traffic through the client cache
//!
//! Used by the `fc` binary to check how the cache coordinator reacts to a
//! recorded sequence of query responses, mutations and reads.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod script;

pub use script::{replay, DocumentSpec, Script, ScriptError, Step, StepReport};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
