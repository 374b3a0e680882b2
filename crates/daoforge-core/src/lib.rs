//! Core schema model and definition parsing for daoforge.
//!
//! A schema file declares database objects (tables, views, enums, stored
//! procedures, custom views, and commands) as a tree of elements with
//! string attributes. This crate parses those documents into a typed
//! model, enforces the structural invariants, and exposes the name
//! transforms shared by the options layer, the generation engine, and
//! the CLI.

pub mod column;
pub mod command;
pub mod constraint;
pub mod enums;
pub mod error;
pub mod names;
pub mod node;
pub mod parse;
pub mod procedure;
pub mod relation;
pub mod schema;
pub mod validation;

pub use column::{CharMode, Column, ColumnAttributes, ColumnKind, ColumnRef, Requirement};
pub use command::{Command, CustomView, CustomViewEntity};
pub use constraint::{Constraint, ConstraintKind};
pub use enums::{DbEnum, EnumValue};
pub use error::{Error, Result};
pub use names::{default_physical_name, display_name, field_name};
pub use node::{AttributeSet, DefNode};
pub use parse::{load_schema, parse_schema};
pub use procedure::{ParamDirection, Parameter, ProcedureKind, StoredProcedure};
pub use relation::{Relation, RelationKind, Table, View};
pub use schema::{Schema, SchemaObjects};
pub use validation::validate_schema;
