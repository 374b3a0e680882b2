//! Relations: tables, views, and the common surface they share.

use crate::column::Column;
use crate::constraint::Constraint;

/// Tag distinguishing relation flavors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKind {
    Table,
    View,
    /// Table synthesized from a custom view's declared entity.
    CustomView,
}

/// Common surface of every relation.
///
/// Generation code works against this trait so tables, views, and
/// synthesized custom-view tables all flow through one path.
pub trait Relation {
    /// Logical name of the relation.
    fn name(&self) -> &str;

    /// Physical database name.
    fn physical_name(&self) -> &str;

    /// Name of the entity backing this relation. Differs from [`name`]
    /// when the relation maps onto another relation's entity.
    ///
    /// [`name`]: Relation::name
    fn entity_name(&self) -> &str;

    /// Columns in declaration order.
    fn columns(&self) -> &[Column];

    /// The live primary-key constraint, when any.
    fn primary_constraint(&self) -> Option<&Constraint>;

    /// Column used for optimistic locking, when declared.
    fn optimistic_lock_column(&self) -> Option<&str>;

    fn kind(&self) -> RelationKind;

    /// True when this relation maps onto an entity owned elsewhere.
    fn has_shared_entity(&self) -> bool {
        self.entity_name() != self.name()
    }

    /// Look up a column by logical name.
    fn column(&self, name: &str) -> Option<&Column> {
        self.columns().iter().find(|c| c.name == name)
    }
}

/// A table declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub name: String,
    pub physical_name: String,
    pub entity_name: String,
    pub columns: Vec<Column>,
    pub constraints: Vec<Constraint>,
    pub optimistic_lock: Option<String>,
    pub kind: RelationKind,
}

impl Relation for Table {
    fn name(&self) -> &str {
        &self.name
    }

    fn physical_name(&self) -> &str {
        &self.physical_name
    }

    fn entity_name(&self) -> &str {
        &self.entity_name
    }

    fn columns(&self) -> &[Column] {
        &self.columns
    }

    fn primary_constraint(&self) -> Option<&Constraint> {
        self.constraints.iter().find(|c| c.is_primary_key())
    }

    fn optimistic_lock_column(&self) -> Option<&str> {
        self.optimistic_lock.as_deref()
    }

    fn kind(&self) -> RelationKind {
        self.kind
    }
}

/// A view declaration: a column shape without constraints or locking.
#[derive(Debug, Clone, PartialEq)]
pub struct View {
    pub name: String,
    pub physical_name: String,
    pub entity_name: String,
    pub columns: Vec<Column>,
}

impl Relation for View {
    fn name(&self) -> &str {
        &self.name
    }

    fn physical_name(&self) -> &str {
        &self.physical_name
    }

    fn entity_name(&self) -> &str {
        &self.entity_name
    }

    fn columns(&self) -> &[Column] {
        &self.columns
    }

    fn primary_constraint(&self) -> Option<&Constraint> {
        None
    }

    fn optimistic_lock_column(&self) -> Option<&str> {
        None
    }

    fn kind(&self) -> RelationKind {
        RelationKind::View
    }
}
