//! Typed parameters carried by an [`Invoke`](super::invoke::Invoke)
//!
//! A parameter is a named scalar-or-structured value. Its type tag is always
//! derived from the value variant, so the two can never disagree.

use std::fmt;

use crate::util::node::Node;

/// Node tag used for a serialized parameter.
pub const PARAMETER_TAG: &str = "parameter";

/// Kind of a parameter value, with its wire tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterType {
    /// UTF-8 text (`"string"`)
    String,
    /// Floating-point number (`"number"`)
    Number,
    /// Nested structured node (`"XML"`)
    Structured,
    /// Raw bytes (`"ByteArray"`), never written to the text form
    Binary,
}

impl ParameterType {
    /// Wire tag for this type.
    pub fn as_tag(&self) -> &'static str {
        match self {
            ParameterType::String => "string",
            ParameterType::Number => "number",
            ParameterType::Structured => "XML",
            ParameterType::Binary => "ByteArray",
        }
    }

    /// Parse a wire tag.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "string" => Some(ParameterType::String),
            "number" => Some(ParameterType::Number),
            "XML" => Some(ParameterType::Structured),
            "ByteArray" => Some(ParameterType::Binary),
            _ => None,
        }
    }
}

impl fmt::Display for ParameterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

/// Value held by a parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterValue {
    /// Text value
    String(String),
    /// Numeric value
    Number(f64),
    /// Structured node value
    Structured(Node),
    /// Binary payload
    Binary(Vec<u8>),
}

impl ParameterValue {
    /// Type tag matching this variant.
    pub fn kind(&self) -> ParameterType {
        match self {
            ParameterValue::String(_) => ParameterType::String,
            ParameterValue::Number(_) => ParameterType::Number,
            ParameterValue::Structured(_) => ParameterType::Structured,
            ParameterValue::Binary(_) => ParameterType::Binary,
        }
    }

    /// Text value, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParameterValue::String(text) => Some(text),
            _ => None,
        }
    }

    /// Numeric value, if this is a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            ParameterValue::Number(num) => Some(*num),
            _ => None,
        }
    }

    /// Structured node, if this is a node.
    pub fn as_node(&self) -> Option<&Node> {
        match self {
            ParameterValue::Structured(node) => Some(node),
            _ => None,
        }
    }

    /// Binary payload, if this is binary.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            ParameterValue::Binary(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// Scalar text form written to a node. `None` for structured and binary values.
    fn scalar_text(&self) -> Option<String> {
        match self {
            ParameterValue::String(text) => Some(text.clone()),
            ParameterValue::Number(num) => Some(number_text(*num)),
            ParameterValue::Structured(_) | ParameterValue::Binary(_) => None,
        }
    }
}

/// Number text as peers write it: non-finite values use `Infinity`, `-Infinity` and `NaN`.
fn number_text(num: f64) -> String {
    if num.is_nan() {
        "NaN".to_string()
    } else if num == f64::INFINITY {
        "Infinity".to_string()
    } else if num == f64::NEG_INFINITY {
        "-Infinity".to_string()
    } else {
        num.to_string()
    }
}

impl Default for ParameterValue {
    fn default() -> Self {
        ParameterValue::String(String::new())
    }
}

impl From<&str> for ParameterValue {
    fn from(value: &str) -> Self {
        ParameterValue::String(value.to_string())
    }
}

impl From<String> for ParameterValue {
    fn from(value: String) -> Self {
        ParameterValue::String(value)
    }
}

impl From<f64> for ParameterValue {
    fn from(value: f64) -> Self {
        ParameterValue::Number(value)
    }
}

impl From<f32> for ParameterValue {
    fn from(value: f32) -> Self {
        ParameterValue::Number(f64::from(value))
    }
}

impl From<i32> for ParameterValue {
    fn from(value: i32) -> Self {
        ParameterValue::Number(f64::from(value))
    }
}

impl From<u32> for ParameterValue {
    fn from(value: u32) -> Self {
        ParameterValue::Number(f64::from(value))
    }
}

impl From<i64> for ParameterValue {
    fn from(value: i64) -> Self {
        ParameterValue::Number(value as f64)
    }
}

impl From<u64> for ParameterValue {
    fn from(value: u64) -> Self {
        ParameterValue::Number(value as f64)
    }
}

impl From<usize> for ParameterValue {
    fn from(value: usize) -> Self {
        ParameterValue::Number(value as f64)
    }
}

impl From<Node> for ParameterValue {
    fn from(value: Node) -> Self {
        ParameterValue::Structured(value)
    }
}

impl From<Vec<u8>> for ParameterValue {
    fn from(value: Vec<u8>) -> Self {
        ParameterValue::Binary(value)
    }
}

/// One named, typed argument of an invoke.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Parameter {
    name: String,
    value: ParameterValue,
}

impl Parameter {
    /// Create a parameter, inferring its type from the value.
    pub fn new(name: impl Into<String>, value: impl Into<ParameterValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Create a parameter with a declared type.
    ///
    /// The stored type is still derived from `value`; the declaration is only
    /// checked and a mismatch is logged.
    pub fn with_type(
        name: impl Into<String>,
        declared: ParameterType,
        value: impl Into<ParameterValue>,
    ) -> Self {
        let parameter = Self::new(name, value);
        if parameter.parameter_type() != declared {
            tracing::debug!(
                name = %parameter.name,
                declared = %declared,
                actual = %parameter.parameter_type(),
                "declared parameter type ignored"
            );
        }
        parameter
    }

    /// Rebuild a parameter from its node form.
    ///
    /// Malformed numeric text yields NaN rather than an error.
    pub fn from_node(node: &Node) -> Self {
        let name = node.property("name").unwrap_or_default().to_string();
        let type_tag = node.property("type").unwrap_or_default();

        let value = match ParameterType::from_tag(type_tag) {
            Some(ParameterType::Structured) => {
                ParameterValue::Structured(node.first_child().cloned().unwrap_or_default())
            }
            Some(ParameterType::Number) => {
                ParameterValue::Number(node.value().trim().parse().unwrap_or(f64::NAN))
            }
            Some(ParameterType::Binary) => ParameterValue::Binary(Vec::new()),
            Some(ParameterType::String) => ParameterValue::String(node.value().to_string()),
            None => {
                tracing::debug!(name = %name, type_tag, "unknown parameter type read as string");
                ParameterValue::String(node.value().to_string())
            }
        };

        Self { name, value }
    }

    /// Serialize into a `parameter` node. Binary payloads are not written.
    pub fn to_node(&self) -> Node {
        let mut node = Node::new(PARAMETER_TAG)
            .with_property("name", self.name.clone())
            .with_property("type", self.parameter_type().as_tag());

        if let ParameterValue::Structured(child) = &self.value {
            node.push(child.clone());
        }
        if let Some(text) = self.value.scalar_text() {
            node.set_value(text);
        }
        node
    }

    /// Identity used for lookups within an invoke.
    pub fn key(&self) -> &str {
        &self.name
    }

    /// Parameter name (may be empty).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Type tag derived from the value.
    pub fn parameter_type(&self) -> ParameterType {
        self.value.kind()
    }

    /// Borrow the value.
    pub fn value(&self) -> &ParameterValue {
        &self.value
    }

    /// Replace the value; the type follows.
    pub fn set_value(&mut self, value: impl Into<ParameterValue>) {
        self.value = value.into();
    }

    /// Consume the parameter, returning its value.
    pub fn into_value(self) -> ParameterValue {
        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_is_inferred_from_value() {
        assert_eq!(Parameter::new("a", "text").parameter_type(), ParameterType::String);
        assert_eq!(Parameter::new("a", 3).parameter_type(), ParameterType::Number);
        assert_eq!(
            Parameter::new("a", Node::new("x")).parameter_type(),
            ParameterType::Structured
        );
        assert_eq!(
            Parameter::new("a", vec![1u8, 2]).parameter_type(),
            ParameterType::Binary
        );
    }

    #[test]
    fn test_declared_type_does_not_override_value() {
        let param = Parameter::with_type("id", ParameterType::String, 42);
        assert_eq!(param.parameter_type(), ParameterType::Number);
        assert_eq!(param.value().as_number(), Some(42.0));
    }

    #[test]
    fn test_set_value_recomputes_type() {
        let mut param = Parameter::new("x", "1");
        param.set_value(1.5);
        assert_eq!(param.parameter_type(), ParameterType::Number);
    }

    #[test]
    fn test_number_node_round_trip() {
        let param = Parameter::new("id", 42);
        let node = param.to_node();

        assert_eq!(node.tag(), PARAMETER_TAG);
        assert_eq!(node.property("type"), Some("number"));
        assert_eq!(node.value(), "42");
        assert_eq!(Parameter::from_node(&node), param);
    }

    #[test]
    fn test_non_finite_numbers_use_peer_spelling() {
        for (num, text) in [
            (f64::INFINITY, "Infinity"),
            (f64::NEG_INFINITY, "-Infinity"),
            (f64::NAN, "NaN"),
        ] {
            let node = Parameter::new("x", num).to_node();
            assert_eq!(node.value(), text);
        }

        let node = Parameter::new("x", f64::NEG_INFINITY).to_node();
        assert_eq!(
            Parameter::from_node(&node).value(),
            &ParameterValue::Number(f64::NEG_INFINITY)
        );
    }

    #[test]
    fn test_structured_value_is_a_child() {
        let inner = Node::new("member").with_property("id", "admin");
        let node = Parameter::new("who", inner.clone()).to_node();

        assert_eq!(node.children(), &[inner.clone()]);
        assert_eq!(node.value(), "");
        assert_eq!(Parameter::from_node(&node).value().as_node(), Some(&inner));
    }

    #[test]
    fn test_binary_payload_is_dropped() {
        let node = Parameter::new("blob", vec![9u8, 8, 7]).to_node();
        assert_eq!(node.property("type"), Some("ByteArray"));
        assert_eq!(node.value(), "");

        let restored = Parameter::from_node(&node);
        assert_eq!(restored.name(), "blob");
        assert_eq!(restored.parameter_type(), ParameterType::Binary);
        assert_eq!(restored.value().as_bytes(), Some(&[][..]));
    }

    #[test]
    fn test_malformed_number_becomes_nan() {
        let node = Node::new(PARAMETER_TAG)
            .with_property("type", "number")
            .with_value("forty-two");
        let param = Parameter::from_node(&node);
        assert!(param.value().as_number().expect("number").is_nan());
    }

    #[test]
    fn test_missing_name_defaults_to_empty() {
        let node = Node::new(PARAMETER_TAG)
            .with_property("type", "string")
            .with_value("hi");
        let param = Parameter::from_node(&node);
        assert_eq!(param.name(), "");
        assert_eq!(param.value().as_str(), Some("hi"));
    }
}
