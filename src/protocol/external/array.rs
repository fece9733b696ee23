//! System array: the collection and manager of external systems
//!
//! The array owns its systems in insertion order, indexes their roles for
//! proxy access, broadcasts outbound invokes and dispatches inbound ones
//! against its own listener table. Adding a system sets the system's
//! back-reference; removing one runs the close sequence exactly once no
//! matter how many removal paths fire.
//!
//! Locks are never held while calling into an endpoint or a handler, so
//! collaborators may call back into the array.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info, warn};

use super::role::Role;
use super::system::{ExternalSystem, SystemId};
#[cfg(feature = "frame")]
use crate::protocol::codec;
use crate::protocol::error::{InvokeResult, SystemError, SystemResult};
use crate::protocol::invoke::Invoke;
use crate::protocol::listener::{Dispatch, Listeners};
use crate::protocol::parameter::ParameterValue;
use crate::protocol::{ArrayConfig, Protocol};

pub(crate) struct ArrayInner {
    config: ArrayConfig,
    systems: RwLock<Vec<Arc<ExternalSystem>>>,
    listeners: Listeners<SystemArray>,
}

/// Shared handle to a system array. Clones refer to the same array.
#[derive(Clone)]
pub struct SystemArray {
    inner: Arc<ArrayInner>,
}

/// Builder registering the array's listeners before it is shared.
pub struct SystemArrayBuilder {
    config: ArrayConfig,
    listeners: Listeners<SystemArray>,
}

impl SystemArrayBuilder {
    /// Replace the configuration.
    pub fn config(mut self, config: ArrayConfig) -> Self {
        self.config = config;
        self
    }

    /// Register a handler for inbound invokes with this listener name.
    pub fn listener<F>(mut self, listener: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&SystemArray, &[ParameterValue]) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.listeners.register(listener, handler);
        self
    }

    /// Build the array.
    pub fn build(self) -> SystemArray {
        SystemArray {
            inner: Arc::new(ArrayInner {
                config: self.config,
                systems: RwLock::new(Vec::new()),
                listeners: self.listeners,
            }),
        }
    }
}

impl SystemArray {
    /// Create an array with no listeners.
    pub fn new(config: ArrayConfig) -> Self {
        Self::builder().config(config).build()
    }

    /// Start building an array.
    pub fn builder() -> SystemArrayBuilder {
        SystemArrayBuilder {
            config: ArrayConfig::default(),
            listeners: Listeners::new(),
        }
    }

    pub(crate) fn from_inner(inner: Arc<ArrayInner>) -> Self {
        Self { inner }
    }

    /// Array configuration.
    pub fn config(&self) -> &ArrayConfig {
        &self.inner.config
    }

    /// Whether two handles refer to the same array.
    pub fn ptr_eq(&self, other: &SystemArray) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Append a system and point its back-reference at this array.
    ///
    /// Returns false if the system is already present, no longer open, or
    /// owned by another array.
    pub fn add_system(&self, system: Arc<ExternalSystem>) -> bool {
        {
            let mut systems = self.inner.systems.write();
            if systems.iter().any(|existing| Arc::ptr_eq(existing, &system)) {
                return false;
            }
            if !system.attach(&self.inner) {
                warn!(
                    array = %self.inner.config.name,
                    system = system.name(),
                    state = ?system.state(),
                    "refusing to add a closed system or one owned by another array"
                );
                return false;
            }
            systems.push(system.clone());
        }

        info!(
            array = %self.inner.config.name,
            system = system.name(),
            id = %system.id(),
            "system added"
        );
        true
    }

    /// Unlink a system, then close it unless its close sequence already started.
    ///
    /// Returns false if no system with this id is in the array.
    pub fn remove_system(&self, id: &SystemId) -> bool {
        let removed = {
            let mut systems = self.inner.systems.write();
            let index = systems.iter().position(|system| system.id() == *id);
            index.map(|index| systems.remove(index))
        };

        let Some(system) = removed else {
            return false;
        };

        if system.begin_close() {
            system.close_and_finalize();
        }
        info!(array = %self.inner.config.name, system = system.name(), "system removed");
        true
    }

    /// Close path for a system whose connection ended or failed.
    ///
    /// Closes and tears the system down, then unlinks it. No-op if the close
    /// sequence already started elsewhere.
    pub fn handle_system_close(&self, system: &Arc<ExternalSystem>) {
        if !system.begin_close() {
            debug!(system = system.name(), "close already in progress");
            return;
        }

        system.close_and_finalize();
        self.inner
            .systems
            .write()
            .retain(|existing| !Arc::ptr_eq(existing, system));
        info!(array = %self.inner.config.name, system = system.name(), "system closed and unlinked");
    }

    /// Snapshot of the systems in insertion order.
    pub fn systems(&self) -> Vec<Arc<ExternalSystem>> {
        self.inner.systems.read().clone()
    }

    /// Look up a system by id.
    pub fn system(&self, id: &SystemId) -> Option<Arc<ExternalSystem>> {
        self.inner
            .systems
            .read()
            .iter()
            .find(|system| system.id() == *id)
            .cloned()
    }

    /// Number of systems.
    pub fn len(&self) -> usize {
        self.inner.systems.read().len()
    }

    /// Whether the array holds no systems.
    pub fn is_empty(&self) -> bool {
        self.inner.systems.read().is_empty()
    }

    /// Whether any system hosts a role with this name.
    pub fn has_role(&self, name: &str) -> bool {
        self.inner
            .systems
            .read()
            .iter()
            .any(|system| system.has_role(name))
    }

    /// First role with this name, scanning systems in insertion order.
    pub fn get_role(&self, name: &str) -> SystemResult<Arc<Role>> {
        self.inner
            .systems
            .read()
            .iter()
            .find_map(|system| system.role(name))
            .ok_or_else(|| SystemError::RoleNotFound(name.to_string()))
    }

    /// Decode an inbound frame (bounded by `max_frame_len`) and dispatch it.
    #[cfg(feature = "frame")]
    pub fn receive_frame(&self, frame: &[u8]) -> crate::protocol::Result<bool> {
        let invoke = codec::decode_frame(frame, self.inner.config.max_frame_len)?;
        Ok(self.reply_data(&invoke)?)
    }
}

impl Dispatch for SystemArray {
    fn listeners(&self) -> &Listeners<Self> {
        &self.inner.listeners
    }
}

impl Protocol for SystemArray {
    /// Broadcast to every system in insertion order.
    ///
    /// Every system is attempted even if one fails.
    fn send_data(&self, invoke: &Invoke) -> SystemResult<()> {
        let systems = self.systems();
        let total = systems.len();
        let mut failed = 0;

        for system in &systems {
            if let Err(err) = system.send_data(invoke) {
                failed += 1;
                warn!(
                    system = system.name(),
                    listener = invoke.listener(),
                    "broadcast delivery failed: {}",
                    err
                );
            }
        }

        if failed > 0 {
            return Err(SystemError::Broadcast { failed, total });
        }
        Ok(())
    }

    /// Dispatch an inbound invoke against this array's listeners.
    fn reply_data(&self, invoke: &Invoke) -> InvokeResult<bool> {
        let handled = invoke.apply(self)?;
        if !handled {
            if self.inner.config.warn_on_unhandled {
                warn!(array = %self.inner.config.name, listener = invoke.listener(), "unhandled invoke");
            } else {
                debug!(array = %self.inner.config.name, listener = invoke.listener(), "unhandled invoke");
            }
        }
        Ok(handled)
    }
}

impl fmt::Debug for SystemArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SystemArray")
            .field("name", &self.inner.config.name)
            .field("systems", &*self.inner.systems.read())
            .field("listeners", &self.inner.listeners)
            .finish()
    }
}
