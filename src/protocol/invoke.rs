//! Invoke: the standard remote-call message.
//!
//! An [`Invoke`] is a listener name (the remote method identifier) plus an
//! ordered list of typed [`Parameter`]s. Instead of ad-hoc request formats,
//! every system in the network exchanges invokes, and the receiver dispatches
//! each one to the local handler registered under its listener name.
//!
//! Node form:
//!
//! ```text
//! <invoke listener="login">
//!     <parameter name="" type="string">admin</parameter>
//!     <parameter name="" type="string">pwd123</parameter>
//! </invoke>
//! ```

use super::error::{InvokeError, InvokeResult};
use super::listener::Dispatch;
use super::parameter::{PARAMETER_TAG, Parameter, ParameterValue};
use crate::util::node::Node;

/// Node tag used for a serialized invoke.
pub const INVOKE_TAG: &str = "invoke";

/// Node property carrying the listener name.
pub const LISTENER_PROPERTY: &str = "listener";

/// Reserved parameter tracking the history of a distributed invoke.
pub const HISTORY_UID: &str = "invoke_history_uid";

/// Parameter names reserved by parallel processing layers.
pub const RESERVED_PARAMETERS: [&str; 3] = [HISTORY_UID, "piece_index", "piece_size"];

/// Standard message of network I/O.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Invoke {
    listener: String,
    parameters: Vec<Parameter>,
}

impl Invoke {
    /// Create an invoke with no parameters.
    pub fn new(listener: impl Into<String>) -> Self {
        Self {
            listener: listener.into(),
            parameters: Vec::new(),
        }
    }

    /// Create an invoke with one unnamed parameter per value, in order.
    pub fn with_values<I, V>(listener: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<ParameterValue>,
    {
        Self {
            listener: listener.into(),
            parameters: values
                .into_iter()
                .map(|value| Parameter::new("", value))
                .collect(),
        }
    }

    /// Create an invoke from existing parameters.
    pub fn with_parameters<I>(listener: impl Into<String>, parameters: I) -> Self
    where
        I: IntoIterator<Item = Parameter>,
    {
        Self {
            listener: listener.into(),
            parameters: parameters.into_iter().collect(),
        }
    }

    /// Rebuild an invoke from its node form.
    ///
    /// Children not tagged `parameter` are ignored; a missing listener reads as empty.
    pub fn from_node(node: &Node) -> Self {
        Self {
            listener: node
                .property(LISTENER_PROPERTY)
                .unwrap_or_default()
                .to_string(),
            parameters: node
                .children_tagged(PARAMETER_TAG)
                .map(Parameter::from_node)
                .collect(),
        }
    }

    /// Serialize into an `invoke` node.
    pub fn to_node(&self) -> Node {
        let mut node = Node::new(INVOKE_TAG).with_property(LISTENER_PROPERTY, self.listener.clone());
        for parameter in &self.parameters {
            node.push(parameter.to_node());
        }
        node
    }

    /// Listener name.
    pub fn listener(&self) -> &str {
        &self.listener
    }

    /// Parameters in order.
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// Iterate over the parameters.
    pub fn iter(&self) -> std::slice::Iter<'_, Parameter> {
        self.parameters.iter()
    }

    /// Number of parameters.
    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    /// Whether the invoke has no parameters.
    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    /// Append a parameter.
    pub fn push(&mut self, parameter: Parameter) {
        self.parameters.push(parameter);
    }

    /// Append a named value.
    pub fn push_value(&mut self, name: impl Into<String>, value: impl Into<ParameterValue>) {
        self.parameters.push(Parameter::new(name, value));
    }

    /// Whether a parameter with this name exists.
    pub fn has(&self, name: &str) -> bool {
        self.parameters.iter().any(|param| param.key() == name)
    }

    /// First parameter with this name.
    pub fn get(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|param| param.key() == name)
    }

    /// Positional argument values, skipping the history bookkeeping parameter.
    pub fn arguments(&self) -> Vec<ParameterValue> {
        self.parameters
            .iter()
            .filter(|param| param.name() != HISTORY_UID)
            .map(|param| param.value().clone())
            .collect()
    }

    /// Value of the history bookkeeping parameter, if present and numeric.
    pub fn history_uid(&self) -> Option<f64> {
        self.get(HISTORY_UID)
            .and_then(|param| param.value().as_number())
    }

    /// Tag this invoke with a history uid before distributing it.
    ///
    /// Fails if any reserved parameter name is already in use.
    pub fn attach_history_uid(&mut self, uid: u64) -> InvokeResult<()> {
        if let Some(reserved) = RESERVED_PARAMETERS.iter().find(|name| self.has(name)) {
            return Err(InvokeError::ReservedParameter(reserved.to_string()));
        }
        self.push_value(HISTORY_UID, uid);
        Ok(())
    }

    /// Dispatch this invoke against `target`.
    ///
    /// Returns `Ok(false)` when the target has no listener with this name.
    /// Only a failing handler produces an error.
    pub fn apply<T: Dispatch>(&self, target: &T) -> InvokeResult<bool> {
        let Some(handler) = target.listeners().get(&self.listener) else {
            return Ok(false);
        };

        let args = self.arguments();
        handler(target, &args).map_err(|err| InvokeError::HandlerFailed {
            listener: self.listener.clone(),
            message: format!("{:#}", err),
        })?;

        Ok(true)
    }
}

impl<'a> IntoIterator for &'a Invoke {
    type Item = &'a Parameter;
    type IntoIter = std::slice::Iter<'a, Parameter>;

    fn into_iter(self) -> Self::IntoIter {
        self.parameters.iter()
    }
}
