//! Hierarchical XML-like nodes and their preserves encoding.
//!
//! A [`Node`] is the structured tree the protocol layer reads and writes: a
//! tag, an ordered list of named properties, a scalar text value and child
//! nodes. Nodes convert to and from preserves records so they can be carried
//! in the preserves text syntax:
//!
//! ```text
//! <node "invoke" <properties <property "listener" "login">> "" <children ...>>
//! ```

use preserves::IOValue;
use serde::{Deserialize, Serialize};

const NODE_LABEL: &str = "node";
const PROPERTIES_LABEL: &str = "properties";
const PROPERTY_LABEL: &str = "property";
const CHILDREN_LABEL: &str = "children";

/// A single named property on a [`Node`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    /// Property name
    pub name: String,
    /// Property text
    pub value: String,
}

/// Hierarchical structured node (XML-like element).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    tag: String,
    properties: Vec<Property>,
    value: String,
    children: Vec<Node>,
}

impl Node {
    /// Create an empty node with the given tag.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    /// Tag name of this node.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Replace the tag name.
    pub fn set_tag(&mut self, tag: impl Into<String>) {
        self.tag = tag.into();
    }

    /// Whether a property with this name exists.
    pub fn has_property(&self, name: &str) -> bool {
        self.properties.iter().any(|prop| prop.name == name)
    }

    /// Read a property by name.
    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties
            .iter()
            .find(|prop| prop.name == name)
            .map(|prop| prop.value.as_str())
    }

    /// Set a property, replacing an existing value in place or appending a new one.
    pub fn set_property(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.properties.iter_mut().find(|prop| prop.name == name) {
            Some(existing) => existing.value = value,
            None => self.properties.push(Property { name, value }),
        }
    }

    /// Properties in insertion order.
    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    /// Scalar text value.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Replace the scalar text value.
    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    /// Append a child node.
    pub fn push(&mut self, child: Node) {
        self.children.push(child);
    }

    /// Child nodes in insertion order.
    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Child nodes carrying the given tag.
    pub fn children_tagged<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a Node> + 'a {
        self.children.iter().filter(move |child| child.tag == tag)
    }

    /// First child, if any.
    pub fn first_child(&self) -> Option<&Node> {
        self.children.first()
    }

    /// Builder-style [`Node::set_property`].
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_property(name, value);
        self
    }

    /// Builder-style [`Node::set_value`].
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.set_value(value);
        self
    }

    /// Builder-style [`Node::push`].
    pub fn with_child(mut self, child: Node) -> Self {
        self.push(child);
        self
    }

    /// Encode the node tree as a preserves record.
    pub fn to_io_value(&self) -> IOValue {
        let properties = self
            .properties
            .iter()
            .map(|prop| {
                IOValue::record(
                    IOValue::symbol(PROPERTY_LABEL),
                    vec![IOValue::new(prop.name.clone()), IOValue::new(prop.value.clone())],
                )
            })
            .collect();
        let children = self.children.iter().map(Node::to_io_value).collect();

        IOValue::record(
            IOValue::symbol(NODE_LABEL),
            vec![
                IOValue::new(self.tag.clone()),
                IOValue::record(IOValue::symbol(PROPERTIES_LABEL), properties),
                IOValue::new(self.value.clone()),
                IOValue::record(IOValue::symbol(CHILDREN_LABEL), children),
            ],
        )
    }

    /// Rebuild a node tree from a preserves record produced by [`Node::to_io_value`].
    pub fn from_io_value(value: &IOValue) -> Option<Node> {
        let record = Record::labelled(value, NODE_LABEL)?;
        if record.len() < 4 {
            return None;
        }

        let mut node = Node::new(record.field_string(0)?);
        node.value = record.field_string(2)?;

        let properties = record.field(1);
        let properties = Record::labelled(&properties, PROPERTIES_LABEL)?;
        for idx in 0..properties.len() {
            let entry = properties.field(idx);
            let prop = Record::labelled(&entry, PROPERTY_LABEL)?;
            node.properties.push(Property {
                name: prop.field_string(0)?,
                value: prop.field_string(1)?,
            });
        }

        let children = record.field(3);
        let children = Record::labelled(&children, CHILDREN_LABEL)?;
        for idx in 0..children.len() {
            node.children.push(Node::from_io_value(&children.field(idx))?);
        }

        Some(node)
    }
}

/// Read-only view over a labelled preserves record.
struct Record<'a> {
    value: &'a IOValue,
}

impl<'a> Record<'a> {
    fn labelled(value: &'a IOValue, expected: &str) -> Option<Self> {
        if !value.is_record() {
            return None;
        }
        let matches = value
            .label()
            .as_symbol()
            .map(|sym| sym.as_ref() == expected)
            == Some(true);
        matches.then_some(Self { value })
    }

    fn len(&self) -> usize {
        self.value.len()
    }

    fn field(&self, index: usize) -> IOValue {
        IOValue::from(self.value.index(index))
    }

    fn field_string(&self, index: usize) -> Option<String> {
        self.field(index).as_string().map(|s| s.to_string())
    }
}
