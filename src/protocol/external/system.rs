//! External systems: one remote endpoint each
//!
//! The transport layer supplies an [`Endpoint`]; the core wraps it in an
//! [`ExternalSystem`] that owns the system's roles, its lifecycle state and a
//! non-owning back-reference to the array it belongs to.

use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use super::array::{ArrayInner, SystemArray};
use super::role::Role;
use crate::protocol::Protocol;
use crate::protocol::error::{InvokeResult, SystemError, SystemResult};
use crate::protocol::invoke::Invoke;

/// Unique identifier of an external system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SystemId(pub Uuid);

impl SystemId {
    /// Create a new random SystemId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create from a UUID
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for SystemId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SystemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Transport-side contract of a connected remote endpoint.
pub trait Endpoint: Send + Sync {
    /// Deliver an invoke to the remote side.
    fn send_data(&self, invoke: &Invoke) -> anyhow::Result<()>;

    /// Close the connection.
    fn close(&self) -> anyhow::Result<()>;

    /// Active-connection capability, if this endpoint dials out.
    ///
    /// Accepted (passive) connections return `None`.
    fn connector(&self) -> Option<&dyn Connector> {
        None
    }
}

/// Capability of endpoints that establish their own connection.
pub trait Connector: Send + Sync {
    /// Connect to the remote system.
    fn connect(&self) -> anyhow::Result<()>;
}

/// Lifecycle of an external system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SystemState {
    /// Participating in broadcast and dispatch
    Open,
    /// Close sequence started
    Closing,
    /// Closed and torn down
    Closed,
}

/// A remote system managed by a [`SystemArray`].
pub struct ExternalSystem {
    id: SystemId,
    name: String,
    endpoint: Box<dyn Endpoint>,
    roles: RwLock<Vec<Arc<Role>>>,
    state: Mutex<SystemState>,
    array: RwLock<Weak<ArrayInner>>,
}

impl ExternalSystem {
    /// Wrap an endpoint in a new, open system.
    pub fn new(name: impl Into<String>, endpoint: impl Endpoint + 'static) -> Arc<Self> {
        Self::from_boxed(name, Box::new(endpoint))
    }

    /// Wrap an already boxed endpoint.
    pub fn from_boxed(name: impl Into<String>, endpoint: Box<dyn Endpoint>) -> Arc<Self> {
        Arc::new(Self {
            id: SystemId::new(),
            name: name.into(),
            endpoint,
            roles: RwLock::new(Vec::new()),
            state: Mutex::new(SystemState::Open),
            array: RwLock::new(Weak::new()),
        })
    }

    /// System identifier.
    pub fn id(&self) -> SystemId {
        self.id
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SystemState {
        *self.state.lock()
    }

    /// Whether the system is open.
    pub fn is_open(&self) -> bool {
        self.state() == SystemState::Open
    }

    /// Add a role hosted by this system.
    pub fn add_role(self: &Arc<Self>, name: impl Into<String>) -> Arc<Role> {
        let role = Arc::new(Role::new(name, Arc::downgrade(self)));
        self.roles.write().push(role.clone());
        role
    }

    /// Roles in insertion order.
    pub fn roles(&self) -> Vec<Arc<Role>> {
        self.roles.read().clone()
    }

    /// First role with this name.
    pub fn role(&self, name: &str) -> Option<Arc<Role>> {
        self.roles
            .read()
            .iter()
            .find(|role| role.key() == name)
            .cloned()
    }

    /// Whether this system hosts a role with this name.
    pub fn has_role(&self, name: &str) -> bool {
        self.roles.read().iter().any(|role| role.key() == name)
    }

    /// Connect capability of the underlying endpoint.
    pub fn connector(&self) -> Option<&dyn Connector> {
        self.endpoint.connector()
    }

    /// The array this system currently belongs to.
    pub fn system_array(&self) -> Option<SystemArray> {
        self.array.read().upgrade().map(SystemArray::from_inner)
    }

    /// Transport callback: the connection closed or failed.
    ///
    /// Runs the array's close path when attached, otherwise closes locally.
    /// Repeated notifications are ignored.
    pub fn notify_closed(self: &Arc<Self>) {
        let attached = {
            let array = self.array.read();
            match array.upgrade() {
                Some(inner) => Some(inner),
                None => {
                    // under the back-reference lock that attach checks
                    if !self.begin_close() {
                        return;
                    }
                    None
                }
            }
        };

        match attached {
            Some(inner) => SystemArray::from_inner(inner).handle_system_close(self),
            None => self.close_and_finalize(),
        }
    }

    /// Point the back-reference at `array`.
    ///
    /// Refused when the system is no longer open or already belongs to a
    /// different live array.
    pub(crate) fn attach(&self, array: &Arc<ArrayInner>) -> bool {
        let mut current = self.array.write();
        if let Some(owner) = current.upgrade() {
            if !Arc::ptr_eq(&owner, array) {
                return false;
            }
        }
        if !self.is_open() {
            return false;
        }
        *current = Arc::downgrade(array);
        true
    }

    /// Open -> Closing. Returns false if the close sequence already started.
    pub(crate) fn begin_close(&self) -> bool {
        let mut state = self.state.lock();
        if *state != SystemState::Open {
            return false;
        }
        *state = SystemState::Closing;
        true
    }

    /// Close the endpoint once, then tear the system down.
    pub(crate) fn close_and_finalize(&self) {
        if let Err(err) = self.endpoint.close() {
            warn!(system = %self.name, id = %self.id, "close failed: {:#}", err);
        }

        self.roles.write().clear();
        *self.array.write() = Weak::new();
        *self.state.lock() = SystemState::Closed;
        debug!(system = %self.name, id = %self.id, "system closed");
    }
}

impl Protocol for ExternalSystem {
    fn send_data(&self, invoke: &Invoke) -> SystemResult<()> {
        if !self.is_open() {
            return Err(SystemError::SystemClosed(self.name.clone()));
        }

        self.endpoint
            .send_data(invoke)
            .map_err(|err| SystemError::Transport {
                system: self.name.clone(),
                message: format!("{:#}", err),
            })
    }

    /// Inbound invokes are handed up to the owning array.
    fn reply_data(&self, invoke: &Invoke) -> InvokeResult<bool> {
        match self.system_array() {
            Some(array) => array.reply_data(invoke),
            None => {
                debug!(system = %self.name, listener = invoke.listener(), "detached system dropped invoke");
                Ok(false)
            }
        }
    }
}

impl fmt::Debug for ExternalSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let roles: Vec<String> = self
            .roles
            .read()
            .iter()
            .map(|role| role.name().to_string())
            .collect();
        f.debug_struct("ExternalSystem")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("state", &self.state())
            .field("roles", &roles)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingEndpoint {
        sent: AtomicUsize,
        closed: Arc<AtomicUsize>,
    }

    impl Endpoint for CountingEndpoint {
        fn send_data(&self, _invoke: &Invoke) -> anyhow::Result<()> {
            self.sent.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn close(&self) -> anyhow::Result<()> {
            self.closed.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[test]
    fn test_system_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ExternalSystem>();
    }

    #[test]
    fn test_roles_keep_order() {
        let system = ExternalSystem::new("calc-server", CountingEndpoint::default());
        system.add_role("add");
        system.add_role("mul");

        let names: Vec<String> = system.roles().iter().map(|r| r.name().to_string()).collect();
        assert_eq!(names, vec!["add", "mul"]);
        assert!(system.has_role("mul"));
        assert!(system.role("div").is_none());
    }

    #[test]
    fn test_detached_notify_closes_once() {
        let closed = Arc::new(AtomicUsize::new(0));
        let system = ExternalSystem::new(
            "worker",
            CountingEndpoint {
                sent: AtomicUsize::new(0),
                closed: closed.clone(),
            },
        );

        system.notify_closed();
        system.notify_closed();

        assert_eq!(closed.load(Ordering::SeqCst), 1);
        assert_eq!(system.state(), SystemState::Closed);
    }

    #[test]
    fn test_closed_system_refuses_send() {
        let system = ExternalSystem::new("worker", CountingEndpoint::default());
        system.notify_closed();

        let err = system.send_data(&Invoke::new("ping")).unwrap_err();
        assert!(matches!(err, SystemError::SystemClosed(name) if name == "worker"));
    }

    #[test]
    fn test_attach_refuses_second_owner() {
        let system = ExternalSystem::new("worker", CountingEndpoint::default());
        let first = SystemArray::new(Default::default());
        let second = SystemArray::new(Default::default());

        assert!(first.add_system(system.clone()));
        assert!(!second.add_system(system.clone()));
        assert!(system.system_array().unwrap().ptr_eq(&first));
    }

    #[test]
    fn test_detached_reply_is_unhandled() {
        let system = ExternalSystem::new("worker", CountingEndpoint::default());
        assert!(!system.reply_data(&Invoke::new("ping")).unwrap());
    }
}
