//! Supporting utilities: structured nodes and logging setup.

pub mod logging;
pub mod node;
