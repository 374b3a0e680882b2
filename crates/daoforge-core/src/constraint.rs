//! Named constraints over ordered column sets.

use std::str::FromStr;

/// Kind of a relation constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    PrimaryKey,
    ForeignKey,
    Uniqueness,
    Check,
    Index,
}

impl FromStr for ConstraintKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "primarykey" => Ok(Self::PrimaryKey),
            "foreignkey" => Ok(Self::ForeignKey),
            "uniqueness" => Ok(Self::Uniqueness),
            "check" => Ok(Self::Check),
            "index" => Ok(Self::Index),
            other => Err(format!("unknown constraint type '{other}'")),
        }
    }
}

/// A named constraint over an ordered set of member columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraint {
    pub name: String,
    pub kind: ConstraintKind,
    /// Member column names, in declaration order.
    pub columns: Vec<String>,
}

impl Constraint {
    pub fn is_primary_key(&self) -> bool {
        self.kind == ConstraintKind::PrimaryKey
    }
}
