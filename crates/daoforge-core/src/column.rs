//! Column declarations and their abstract type tags.

use std::str::FromStr;

/// How a column participates in its relation's contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    PrimaryKey,
    Mandatory,
    Optional,
}

impl Requirement {
    /// True when the column may hold NULL.
    pub fn is_nullable(self) -> bool {
        matches!(self, Requirement::Optional)
    }
}

impl FromStr for Requirement {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "primarykey" => Ok(Self::PrimaryKey),
            "mandatory" => Ok(Self::Mandatory),
            "optional" => Ok(Self::Optional),
            other => Err(format!(
                "unknown requirement '{other}' (expected primarykey, mandatory or optional)"
            )),
        }
    }
}

/// Width behavior of a character column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharMode {
    Fixed,
    Varying,
}

impl FromStr for CharMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fixed" => Ok(Self::Fixed),
            "varying" => Ok(Self::Varying),
            other => Err(format!(
                "unknown mode '{other}' (expected fixed or varying)"
            )),
        }
    }
}

/// Abstract column type tag as written in a definition file.
///
/// Tags are deliberately database-agnostic; the engine resolves them to
/// concrete language and SQL types. Unrecognized tags are preserved in
/// [`ColumnKind::Other`] so resolution can fall back softly instead of
/// failing the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnKind {
    Char(CharMode),
    Integer,
    Number,
    Decimal,
    FloatingPoint,
    Boolean,
    DateTime,
    Date,
    Blob,
    Guid,
    Clob,
    Text,
    RefCursor,
    Other(String),
}

impl ColumnKind {
    /// Map a definition-file type tag (plus the char mode) onto a kind.
    pub fn from_tag(tag: &str, mode: CharMode) -> Self {
        match tag {
            "char" => Self::Char(mode),
            "integer" => Self::Integer,
            "number" => Self::Number,
            "decimal" => Self::Decimal,
            "floatingpoint" => Self::FloatingPoint,
            "boolean" => Self::Boolean,
            "datetime" => Self::DateTime,
            "date" => Self::Date,
            "blob" => Self::Blob,
            "guid" => Self::Guid,
            "clob" => Self::Clob,
            "text" => Self::Text,
            "oracle-refcursor" => Self::RefCursor,
            other => Self::Other(other.to_string()),
        }
    }
}

/// Foreign-key target declared directly on a column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRef {
    pub table: String,
    pub column: String,
}

/// Type-shape attributes of a column declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnAttributes {
    pub kind: ColumnKind,
    pub size: Option<u32>,
    pub scale: Option<i32>,
    pub precision: Option<u32>,
    pub references: Option<ColumnRef>,
    /// Element entity of an `oracle-refcursor` column; required for that
    /// kind and absent for every other.
    pub cursor_element: Option<String>,
}

/// One column of a relation, or the column shape of a parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    /// Logical (capitalized) name.
    pub name: String,
    /// Physical database name; defaults to the upper-snake transform of
    /// the logical name.
    pub physical_name: String,
    pub requirement: Requirement,
    /// True for identity (database-assigned) key columns.
    pub identity: bool,
    /// Enum this column is bound to, when any.
    pub enum_name: Option<String>,
    pub attributes: ColumnAttributes,
}

impl Column {
    pub fn is_nullable(&self) -> bool {
        self.requirement.is_nullable()
    }

    pub fn is_primary_key(&self) -> bool {
        self.requirement == Requirement::PrimaryKey
    }
}
