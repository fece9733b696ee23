//! Mediator for arrays of server systems
//!
//! A mediator sits on top of a [`SystemArray`] whose systems dial out to
//! remote servers. [`ServerArrayMediator::connect`] connects every system that
//! has the connect capability and then hands control to a downstream
//! [`MediatorLoop`]. How the loop distributes work is up to the loop.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::error::{SystemError, SystemResult};
use super::external::{SystemArray, SystemId};

/// Downstream loop started once all connect calls were issued.
pub trait MediatorLoop: Send {
    /// Take over after the array's systems were connected.
    fn start(&mut self, array: &SystemArray) -> anyhow::Result<()>;
}

/// Outcome of a connect pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectReport {
    /// Systems whose connect call succeeded
    pub connected: Vec<SystemId>,

    /// Systems without the connect capability (passive connections)
    pub skipped: Vec<SystemId>,

    /// Systems whose connect call failed, with the failure message
    pub failed: Vec<(SystemId, String)>,
}

/// Connect orchestration over an array of server systems.
pub struct ServerArrayMediator<L> {
    array: SystemArray,
    mediator: L,
}

impl<L: MediatorLoop> ServerArrayMediator<L> {
    /// Create a mediator over `array`.
    pub fn new(array: SystemArray, mediator: L) -> Self {
        Self { array, mediator }
    }

    /// The mediated array.
    pub fn array(&self) -> &SystemArray {
        &self.array
    }

    /// The downstream loop.
    pub fn mediator(&self) -> &L {
        &self.mediator
    }

    /// Connect every connectable system, then start the downstream loop.
    ///
    /// Connect failures are recorded in the report and do not stop the pass.
    pub fn connect(&mut self) -> SystemResult<ConnectReport> {
        let mut report = ConnectReport::default();

        for system in self.array.systems() {
            let Some(connector) = system.connector() else {
                report.skipped.push(system.id());
                continue;
            };

            match connector.connect() {
                Ok(()) => report.connected.push(system.id()),
                Err(err) => {
                    warn!(system = system.name(), "connect failed: {:#}", err);
                    report.failed.push((system.id(), format!("{:#}", err)));
                }
            }
        }

        info!(
            connected = report.connected.len(),
            skipped = report.skipped.len(),
            failed = report.failed.len(),
            "connect pass finished"
        );

        self.mediator
            .start(&self.array)
            .map_err(|err| SystemError::Mediator(format!("{:#}", err)))?;

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::ArrayConfig;

    #[derive(Default)]
    struct CountingLoop {
        starts: usize,
    }

    impl MediatorLoop for CountingLoop {
        fn start(&mut self, _array: &SystemArray) -> anyhow::Result<()> {
            self.starts += 1;
            Ok(())
        }
    }

    #[test]
    fn test_empty_array_still_starts_loop() {
        let array = SystemArray::new(ArrayConfig::default());
        let mut mediator = ServerArrayMediator::new(array, CountingLoop::default());

        let report = mediator.connect().unwrap();
        assert_eq!(report, ConnectReport::default());
        assert_eq!(mediator.mediator().starts, 1);
    }
}
