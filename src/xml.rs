//! Thin accessor over a parsed roxmltree element.
//!
//! Child and sibling lookups by tag name, trimmed text and number
//! extraction, attribute access. Knows nothing about music.

use std::str::FromStr;

use roxmltree::{Node, NodeType};

use crate::error::{Result, ScoreError};

/// A node that is known to be an XML element.
#[derive(Debug, Clone, Copy)]
pub struct XmlElement<'a, 'input: 'a> {
    node: Node<'a, 'input>,
}

impl<'a, 'input: 'a> XmlElement<'a, 'input> {
    /// Wrap `node`, failing with [`ScoreError::InvalidNode`] if it is not
    /// an element.
    pub fn new(node: Node<'a, 'input>) -> Result<Self> {
        if node.is_element() {
            Ok(Self { node })
        } else {
            Err(ScoreError::InvalidNode {
                expected: "element".to_string(),
                found: describe(&node),
            })
        }
    }

    /// Wrap `node`, requiring it to be a `<name>` element.
    pub fn expect(node: Node<'a, 'input>, name: &str) -> Result<Self> {
        let element = Self::new(node).map_err(|_| ScoreError::InvalidNode {
            expected: name.to_string(),
            found: describe(&node),
        })?;
        if element.name() != name {
            return Err(ScoreError::InvalidNode {
                expected: name.to_string(),
                found: describe(&node),
            });
        }
        Ok(element)
    }

    pub fn node(&self) -> Node<'a, 'input> {
        self.node
    }

    /// Local tag name.
    pub fn name(&self) -> &'a str {
        self.node.tag_name().name()
    }

    /// All element children in document order.
    pub fn elements(&self) -> impl Iterator<Item = XmlElement<'a, 'input>> {
        self.node
            .children()
            .filter(|n| n.is_element())
            .map(|node| XmlElement { node })
    }

    /// Element children named `name`, in document order.
    pub fn children_named<'n>(
        &self,
        name: &'n str,
    ) -> impl Iterator<Item = XmlElement<'a, 'input>> + 'n
    where
        'a: 'n,
        'input: 'n,
    {
        self.elements().filter(move |e| e.name() == name)
    }

    /// First element child named `name`.
    pub fn child(&self, name: &str) -> Option<XmlElement<'a, 'input>> {
        self.elements().find(|e| e.name() == name)
    }

    /// Trimmed text content of this element, `None` when empty.
    pub fn text(&self) -> Option<&'a str> {
        self.node.text().map(str::trim).filter(|t| !t.is_empty())
    }

    /// Trimmed text of the first child named `name`.
    pub fn child_text(&self, name: &str) -> Option<&'a str> {
        self.child(name).and_then(|c| c.text())
    }

    /// Text of this element parsed as a number.
    pub fn num<T: FromStr>(&self) -> Option<T> {
        self.text()?.parse().ok()
    }

    /// Text of the first child named `name` parsed as a number.
    pub fn child_num<T: FromStr>(&self, name: &str) -> Option<T> {
        self.child(name)?.num()
    }

    pub fn attribute(&self, name: &str) -> Option<&'a str> {
        self.node.attribute(name)
    }

    /// Attribute parsed as a number.
    pub fn attribute_num<T: FromStr>(&self, name: &str) -> Option<T> {
        self.attribute(name)?.trim().parse().ok()
    }
}

fn describe(node: &Node) -> String {
    match node.node_type() {
        NodeType::Element => format!("<{}>", node.tag_name().name()),
        NodeType::Root => "document root".to_string(),
        NodeType::Text => "text node".to_string(),
        NodeType::Comment => "comment".to_string(),
        NodeType::PI => "processing instruction".to_string(),
    }
}
