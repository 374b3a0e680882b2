//! Free-form SQL commands and custom views.

use crate::column::Column;
use crate::procedure::Parameter;

/// A free-form SQL command with bound parameters and no result shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub name: String,
    /// Keep newlines in the SQL body instead of collapsing whitespace.
    pub preserve_newlines: bool,
    pub parameters: Vec<Parameter>,
    pub sql: String,
}

/// Entity binding declared by a custom view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CustomViewEntity {
    /// Rows map onto the entity of an existing relation.
    Existing(String),
    /// Rows map onto a new entity synthesized from the view's columns.
    Synthesized(String),
}

impl CustomViewEntity {
    /// Name of the entity the view's rows map onto.
    pub fn entity_name(&self) -> &str {
        match self {
            CustomViewEntity::Existing(name) | CustomViewEntity::Synthesized(name) => name,
        }
    }
}

/// A custom SQL view: a query with parameters and a declared row shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomView {
    pub name: String,
    pub entity: CustomViewEntity,
    /// Keep newlines in the SQL body instead of collapsing whitespace.
    pub preserve_newlines: bool,
    pub parameters: Vec<Parameter>,
    /// Declared row shape; drives entity synthesis for
    /// [`CustomViewEntity::Synthesized`] bindings.
    pub columns: Vec<Column>,
    pub sql: String,
}
