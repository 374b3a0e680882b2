//! Definition documents as trees of named elements with string attributes.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Display;
use std::path::Path;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// One element of a definition document.
///
/// Schema and options files share this shape: an element name, a flat bag
/// of string attributes, ordered children, and an optional text body for
/// elements such as `sql` that carry one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DefNode {
    /// Element name, e.g. `schema`, `table`, `column`.
    pub element: String,
    /// Attributes keyed by name. Values are uninterpreted strings; typed
    /// readers live in [`AttributeSet`].
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
    /// Child elements in document order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<DefNode>,
    /// Text body, present only on elements that carry one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl DefNode {
    /// Parse a definition document from its JSON source.
    pub fn parse(input: &str) -> Result<Self> {
        Ok(serde_json::from_str(input)?)
    }

    /// Load a definition document from disk.
    pub fn from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Children with the given element name, in document order.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a DefNode> {
        self.children.iter().filter(move |c| c.element == name)
    }

    /// Error for a child element this parent does not recognize.
    pub fn unknown_child(&self, child: &DefNode) -> Error {
        Error::UnknownElement {
            parent: self.element.clone(),
            element: child.element.clone(),
        }
    }
}

/// Typed attribute reader over one [`DefNode`].
///
/// Every read records the attribute name it consulted. [`finish`] then
/// rejects any attribute the element carries that was never consulted, so
/// a reader that walks an element fully is also its grammar check.
///
/// [`finish`]: AttributeSet::finish
pub struct AttributeSet<'a> {
    node: &'a DefNode,
    consulted: BTreeSet<String>,
}

impl<'a> AttributeSet<'a> {
    pub fn new(node: &'a DefNode) -> Self {
        Self {
            node,
            consulted: BTreeSet::new(),
        }
    }

    /// Element name, for error reporting.
    pub fn element(&self) -> &str {
        &self.node.element
    }

    /// Raw lookup; records the name as consulted either way.
    pub fn optional(&mut self, name: &str) -> Option<&'a str> {
        self.consulted.insert(name.to_string());
        self.node.attributes.get(name).map(String::as_str)
    }

    /// Required string attribute.
    pub fn required(&mut self, name: &str) -> Result<&'a str> {
        self.optional(name).ok_or_else(|| Error::MissingAttribute {
            element: self.node.element.clone(),
            attribute: name.to_string(),
        })
    }

    /// Optional string attribute copied out with a default.
    pub fn string_or(&mut self, name: &str, default: &str) -> String {
        self.optional(name).unwrap_or(default).to_string()
    }

    /// Optional attribute parsed through [`FromStr`].
    pub fn parse_opt<T>(&mut self, name: &str) -> Result<Option<T>>
    where
        T: FromStr,
        T::Err: Display,
    {
        let Some(raw) = self.optional(name) else {
            return Ok(None);
        };
        raw.parse::<T>()
            .map(Some)
            .map_err(|err| Error::InvalidAttribute {
                element: self.node.element.clone(),
                attribute: name.to_string(),
                message: err.to_string(),
            })
    }

    /// Optional parsed attribute with a default.
    pub fn parse_or<T>(&mut self, name: &str, default: T) -> Result<T>
    where
        T: FromStr,
        T::Err: Display,
    {
        Ok(self.parse_opt(name)?.unwrap_or(default))
    }

    /// Required parsed attribute.
    pub fn parse_required<T>(&mut self, name: &str) -> Result<T>
    where
        T: FromStr,
        T::Err: Display,
    {
        let raw = self.required(name)?;
        raw.parse::<T>().map_err(|err| Error::InvalidAttribute {
            element: self.node.element.clone(),
            attribute: name.to_string(),
            message: err.to_string(),
        })
    }

    /// Optional boolean attribute (`true`/`false`) with a default.
    pub fn bool_or(&mut self, name: &str, default: bool) -> Result<bool> {
        self.parse_or(name, default)
    }

    /// Reject any attribute on the element that was never consulted.
    ///
    /// Must be called once all readers for the element have run; a typo'd
    /// or misplaced attribute surfaces here as a fatal error naming both
    /// the element and the attribute.
    pub fn finish(self) -> Result<()> {
        for name in self.node.attributes.keys() {
            if !self.consulted.contains(name) {
                return Err(Error::UnknownAttribute {
                    element: self.node.element.clone(),
                    attribute: name.clone(),
                });
            }
        }
        Ok(())
    }
}
