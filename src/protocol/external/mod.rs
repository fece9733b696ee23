//! External systems and the array that manages them
//!
//! - [`ExternalSystem`]: one remote endpoint with its roles and lifecycle
//! - [`Role`]: a named capability reachable independent of its host system
//! - [`SystemArray`]: ordered collection, role index, broadcast and dispatch hub

pub mod array;
pub mod role;
pub mod system;

pub use array::{SystemArray, SystemArrayBuilder};
pub use role::Role;
pub use system::{Connector, Endpoint, ExternalSystem, SystemId, SystemState};
