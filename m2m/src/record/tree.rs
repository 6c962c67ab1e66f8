//! Ordered metadata tree built for one record.
//!
//! The tree is append-only: nodes keep the order in which they were mapped.

use serde_json::{json, Map, Value};

use crate::models::{AgentChild, Element};

/// A text element with an optional qualifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicElement {
    pub element: Element,
    pub qualifier: Option<String>,
    pub content: String,
}

/// An agent element (creator, contributor, publisher).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentElement {
    pub element: Element,
    pub qualifier: Option<String>,
    pub name: String,
    pub info: Option<String>,
    pub agent_type: Option<String>,
    /// Only ever set on `publisher`.
    pub location: Option<String>,
}

impl AgentElement {
    /// Present children in serialization order: `info`, `type`, `name`, `location`.
    pub fn children(&self) -> Vec<(AgentChild, &str)> {
        AgentChild::ORDER
            .iter()
            .filter_map(|child| {
                let value = match child {
                    AgentChild::Info => self.info.as_deref(),
                    AgentChild::Type => self.agent_type.as_deref(),
                    AgentChild::Name => Some(self.name.as_str()),
                    AgentChild::Location => self.location.as_deref(),
                };
                value.map(|v| (*child, v))
            })
            .collect()
    }
}

/// A top-level node under `<metadata>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Basic(BasicElement),
    Agent(AgentElement),
}

impl Node {
    pub fn element(&self) -> Element {
        match self {
            Node::Basic(b) => b.element,
            Node::Agent(a) => a.element,
        }
    }

    pub fn qualifier(&self) -> Option<&str> {
        match self {
            Node::Basic(b) => b.qualifier.as_deref(),
            Node::Agent(a) => a.qualifier.as_deref(),
        }
    }

    /// Structured form: `{ "qualifier"?, "content" }`.
    fn to_value(&self) -> Value {
        let mut obj = Map::new();
        if let Some(q) = self.qualifier() {
            obj.insert("qualifier".to_string(), json!(q));
        }
        let content = match self {
            Node::Basic(b) => json!(b.content),
            Node::Agent(a) => {
                let children: Map<String, Value> = a
                    .children()
                    .into_iter()
                    .map(|(child, v)| (child.name().to_string(), json!(v)))
                    .collect();
                Value::Object(children)
            }
        };
        obj.insert("content".to_string(), content);
        Value::Object(obj)
    }
}

/// Ordered sequence of nodes rooted under `<metadata>`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataTree {
    nodes: Vec<Node>,
}

impl MetadataTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, node: Node) {
        self.nodes.push(node);
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Node> {
        self.nodes.iter()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes of one element, in insertion order.
    pub fn find(&self, element: Element) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(move |n| n.element() == element)
    }

    /// Key/value projection: element name to the list of its nodes.
    pub fn to_value(&self) -> Value {
        let mut obj = Map::new();
        for node in &self.nodes {
            let entry = obj
                .entry(node.element().name().to_string())
                .or_insert_with(|| Value::Array(Vec::new()));
            if let Value::Array(items) = entry {
                items.push(node.to_value());
            }
        }
        Value::Object(obj)
    }
}

impl<'a> IntoIterator for &'a MetadataTree {
    type Item = &'a Node;
    type IntoIter = std::slice::Iter<'a, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}
