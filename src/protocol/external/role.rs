//! Roles: location-transparent capabilities of an external system
//!
//! Callers reach a role by name through [`SystemArray::get_role`] without
//! knowing which system hosts it. Sending through the role routes to the
//! owning system only.

use std::fmt;
use std::sync::{Arc, Weak};

use super::array::SystemArray;
use super::system::ExternalSystem;
use crate::protocol::Protocol;
use crate::protocol::error::{SystemError, SystemResult};
use crate::protocol::invoke::Invoke;

/// A named capability bound to one external system.
pub struct Role {
    name: String,
    system: Weak<ExternalSystem>,
}

impl Role {
    pub(crate) fn new(name: impl Into<String>, system: Weak<ExternalSystem>) -> Self {
        Self {
            name: name.into(),
            system,
        }
    }

    /// Role name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Lookup key (the name).
    pub fn key(&self) -> &str {
        &self.name
    }

    /// Owning system, if it is still alive.
    pub fn system(&self) -> Option<Arc<ExternalSystem>> {
        self.system.upgrade()
    }

    /// Array of the owning system, if both are still attached.
    pub fn system_array(&self) -> Option<SystemArray> {
        self.system().and_then(|system| system.system_array())
    }

    /// Send an invoke to the owning system only.
    ///
    /// Fails with [`SystemError::RoleDetached`] when the system is gone and with
    /// [`SystemError::SystemClosed`] when it is closing.
    pub fn send_data(&self, invoke: &Invoke) -> SystemResult<()> {
        let system = self
            .system()
            .ok_or_else(|| SystemError::RoleDetached(self.name.clone()))?;
        system.send_data(invoke)
    }
}

impl fmt::Debug for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Role")
            .field("name", &self.name)
            .field("system", &self.system().map(|system| system.name().to_string()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::external::system::Endpoint;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct Recorder {
        listeners: Arc<Mutex<Vec<String>>>,
    }

    impl Endpoint for Recorder {
        fn send_data(&self, invoke: &Invoke) -> anyhow::Result<()> {
            self.listeners.lock().push(invoke.listener().to_string());
            Ok(())
        }

        fn close(&self) -> anyhow::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_send_routes_to_owner() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let system = ExternalSystem::new(
            "calc",
            Recorder {
                listeners: log.clone(),
            },
        );
        let role = system.add_role("adder");

        role.send_data(&Invoke::new("add")).unwrap();
        assert_eq!(*log.lock(), vec!["add".to_string()]);
        assert_eq!(role.system().unwrap().name(), "calc");
    }

    fn err_text(role: &Role) -> String {
        role.send_data(&Invoke::new("boo")).unwrap_err().to_string()
    }

    #[test]
    fn test_dropped_system_is_tolerated() {
        let role = {
            let system = ExternalSystem::new("ghost", Recorder::default());
            system.add_role("phantom")
        };

        assert!(role.system().is_none());
        let err = role.send_data(&Invoke::new("boo")).unwrap_err();
        assert!(matches!(err, SystemError::RoleDetached(name) if name == "phantom"));
        assert_eq!(err_text(&role), "Role 'phantom' has no owning system");
    }
}
