//! Database enum declarations.

/// One symbolic value of a database enum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumValue {
    pub title: String,
    /// Code pinned explicitly in the definition, when any.
    pub override_code: Option<i32>,
    /// Effective code after sequential assignment.
    pub code: i32,
}

/// A database enum: an ordered list of titled codes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbEnum {
    pub name: String,
    pub values: Vec<EnumValue>,
}

impl DbEnum {
    /// Look up a value by title.
    pub fn value(&self, title: &str) -> Option<&EnumValue> {
        self.values.iter().find(|v| v.title == title)
    }
}
