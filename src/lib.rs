//! Samchon Invoke – normalized remote calls over a managed array of systems
//!
//! This crate implements the control-plane core for coordinating remote
//! systems from a central node:
//! - `Invoke` messages: a listener name plus ordered, typed parameters
//! - Structured node and preserves encodings of those messages
//! - Dispatch by listener name through explicit listener tables
//! - A system array that indexes roles across systems, broadcasts invokes
//!   and closes each removed system exactly once
//! - A mediator stub that connects server systems before handing off

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

/// Invoke protocol, external systems and the system array
pub mod protocol;

/// Structured nodes and logging setup
pub mod util;

// Re-export key types for convenience
pub use protocol::{ArrayConfig, Invoke, Protocol, SystemArray};

/// Current version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Version of the Invoke node layout
pub const PROTOCOL_VERSION: &str = "1.0.0";
