//! Invoke protocol and system array
//!
//! This module ties together the normalized message ([`Invoke`]), its typed
//! parameters, the listener tables used for dispatch, the wire codecs and
//! the external-system layer that routes invokes between a master and its
//! remote systems.

use std::path::Path;

use serde::{Deserialize, Serialize};

// Submodules
pub mod codec;
pub mod error;
pub mod external;
pub mod invoke;
pub mod listener;
pub mod master;
pub mod parameter;

pub use error::{Error, Result};
pub use external::{Endpoint, ExternalSystem, Role, SystemArray, SystemId, SystemState};
pub use invoke::Invoke;
pub use listener::{Dispatch, Listeners};
pub use parameter::{Parameter, ParameterType, ParameterValue};

use error::{ConfigError, InvokeResult, SystemResult};

/// Message chain shared by everything that sends and receives invokes.
pub trait Protocol {
    /// Send an invoke outwards.
    fn send_data(&self, invoke: &Invoke) -> SystemResult<()>;

    /// Handle an invoke that was received. `Ok(false)` means nothing handled it.
    fn reply_data(&self, invoke: &Invoke) -> InvokeResult<bool>;
}

/// Configuration for a system array
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArrayConfig {
    /// Name used in log records
    pub name: String,

    /// Largest frame payload accepted by `SystemArray::receive_frame` (`frame` feature)
    pub max_frame_len: usize,

    /// Log unhandled inbound invokes at WARN instead of DEBUG
    pub warn_on_unhandled: bool,

    /// Raise the default tracing level to DEBUG in [`ArrayConfig::init_tracing`]
    pub debug: bool,
}

impl Default for ArrayConfig {
    fn default() -> Self {
        Self {
            name: "system-array".to_string(),
            max_frame_len: 16 * 1024 * 1024,
            warn_on_unhandled: true,
            debug: false,
        }
    }
}

impl ArrayConfig {
    /// Install the global tracing subscriber at the level this config asks for.
    pub fn init_tracing(&self) {
        crate::util::logging::init_tracing(self.debug);
    }

    /// Load configuration from a JSON file.
    pub fn load(path: &Path) -> std::result::Result<Self, ConfigError> {
        let data = std::fs::read(path)?;
        let config = serde_json::from_slice(&data)?;
        Ok(config)
    }

    /// Write configuration as pretty JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> std::result::Result<(), ConfigError> {
        let data = serde_json::to_vec_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, data)?;
        Ok(())
    }
}
