//! Resolved column type descriptors handed to code strategies.
//!
//! A [`ColumnTypeInfo`] is the complete answer to "what does this column
//! look like in generated code": the value type, the declared field type,
//! the database-facing type, and the templates a strategy needs to render
//! equality, hashing and conversions without re-deriving any of it.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use daoforge_options::DatabaseKind;

/// Copy behavior of values of the type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum CopyMode {
    /// A plain clone or bitwise copy is enough.
    Shallow,
    /// The value owns a mutable buffer that must be duplicated rather
    /// than shared when crossing an ownership boundary.
    Duplicate,
}

/// How generated accessors reach the column value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ColumnAccess {
    /// The driver hands the value over directly.
    Direct,
    /// Large objects stream through a locator instead of materializing
    /// in the row buffer.
    LobStream,
}

/// Inclusive value range of a narrowed integral type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct NumericBounds {
    pub min: i64,
    pub max: i64,
}

/// Database-facing column type, rendered per dialect by [`SqlType::render`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SqlType {
    Char { size: u32 },
    VarChar { size: Option<u32> },
    Text,
    SmallInt,
    Integer,
    BigInt,
    Numeric { precision: Option<u32>, scale: i32 },
    Double,
    Boolean,
    Timestamp,
    Blob,
    Clob,
    RefCursor,
}

impl SqlType {
    /// Column type expression for the target dialect.
    pub fn render(&self, database: DatabaseKind) -> String {
        match database {
            DatabaseKind::Oracle => self.render_oracle(),
            DatabaseKind::Postgres => self.render_postgres(),
            DatabaseKind::SqlServer => self.render_sql_server(),
        }
    }

    fn render_oracle(&self) -> String {
        match self {
            SqlType::Char { size } => format!("CHAR({size})"),
            SqlType::VarChar { size: Some(size) } => format!("VARCHAR2({size})"),
            SqlType::VarChar { size: None } => "VARCHAR2(4000)".to_string(),
            SqlType::Text | SqlType::Clob => "CLOB".to_string(),
            SqlType::SmallInt => "NUMBER(5)".to_string(),
            SqlType::Integer => "NUMBER(10)".to_string(),
            SqlType::BigInt => "NUMBER(19)".to_string(),
            SqlType::Numeric { precision, scale } => match (precision, scale) {
                (Some(precision), 0) => format!("NUMBER({precision})"),
                (Some(precision), scale) => format!("NUMBER({precision},{scale})"),
                (None, _) => "NUMBER".to_string(),
            },
            SqlType::Double => "BINARY_DOUBLE".to_string(),
            SqlType::Boolean => "NUMBER(1)".to_string(),
            SqlType::Timestamp => "TIMESTAMP".to_string(),
            SqlType::Blob => "BLOB".to_string(),
            SqlType::RefCursor => "SYS_REFCURSOR".to_string(),
        }
    }

    fn render_postgres(&self) -> String {
        match self {
            SqlType::Char { size } => format!("char({size})"),
            SqlType::VarChar { size: Some(size) } => format!("varchar({size})"),
            SqlType::VarChar { size: None } | SqlType::Text | SqlType::Clob => "text".to_string(),
            SqlType::SmallInt => "smallint".to_string(),
            SqlType::Integer => "integer".to_string(),
            SqlType::BigInt => "bigint".to_string(),
            SqlType::Numeric { precision, scale } => match precision {
                Some(precision) => format!("numeric({precision},{scale})"),
                None => "numeric".to_string(),
            },
            SqlType::Double => "double precision".to_string(),
            SqlType::Boolean => "boolean".to_string(),
            SqlType::Timestamp => "timestamp".to_string(),
            SqlType::Blob => "bytea".to_string(),
            SqlType::RefCursor => "refcursor".to_string(),
        }
    }

    fn render_sql_server(&self) -> String {
        match self {
            SqlType::Char { size } => format!("nchar({size})"),
            SqlType::VarChar { size: Some(size) } => format!("nvarchar({size})"),
            SqlType::VarChar { size: None } | SqlType::Text | SqlType::Clob => {
                "nvarchar(max)".to_string()
            }
            SqlType::SmallInt => "smallint".to_string(),
            SqlType::Integer => "int".to_string(),
            SqlType::BigInt => "bigint".to_string(),
            SqlType::Numeric { precision, scale } => match precision {
                Some(precision) => format!("decimal({precision},{scale})"),
                None => "decimal".to_string(),
            },
            SqlType::Double => "float".to_string(),
            SqlType::Boolean => "bit".to_string(),
            SqlType::Timestamp => "datetime2".to_string(),
            SqlType::Blob => "varbinary(max)".to_string(),
            SqlType::RefCursor => "cursor".to_string(),
        }
    }
}

/// Everything a code strategy needs to know about one resolved column.
///
/// The `eq_template` and `hash_template` fields are small substitution
/// templates over field expressions: `{a}` and `{b}` stand for the two
/// sides of an equality check, `{v}` for the value being hashed. A
/// missing hash template means the field hashes directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ColumnTypeInfo {
    /// Bare value type, e.g. `i32` or `String`.
    pub native: String,
    /// Declared field type; wraps [`Self::native`] in `Option` for
    /// nullable columns.
    pub declared: String,
    pub sql: SqlType,
    /// Narrowing conversion applied when reading a wide driver value,
    /// e.g. `i16::try_from`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversion: Option<String>,
    /// Widening cast applied when handing the value back to the driver,
    /// e.g. `i64::from`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cast: Option<String>,
    pub eq_template: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash_template: Option<String>,
    /// Value range enforced for narrowed integrals.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounds: Option<NumericBounds>,
    pub copy: CopyMode,
    pub access: ColumnAccess,
    /// Whole-number convenience accessor type for scale-zero decimal
    /// columns too wide for a machine integer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub convenience_integral: Option<String>,
    /// Enum type backing the column, when one is bound.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enum_ref: Option<String>,
    /// Import paths the generated code needs for this type.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub imports: Vec<String>,
    pub nullable: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn varchar_renders_per_dialect() {
        let sql = SqlType::VarChar { size: Some(80) };
        assert_eq!(sql.render(DatabaseKind::Oracle), "VARCHAR2(80)");
        assert_eq!(sql.render(DatabaseKind::Postgres), "varchar(80)");
        assert_eq!(sql.render(DatabaseKind::SqlServer), "nvarchar(80)");
    }

    #[test]
    fn unsized_varchar_falls_back_to_wide_types() {
        let sql = SqlType::VarChar { size: None };
        assert_eq!(sql.render(DatabaseKind::Oracle), "VARCHAR2(4000)");
        assert_eq!(sql.render(DatabaseKind::Postgres), "text");
        assert_eq!(sql.render(DatabaseKind::SqlServer), "nvarchar(max)");
    }

    #[test]
    fn numeric_renders_precision_and_scale() {
        let sql = SqlType::Numeric {
            precision: Some(12),
            scale: 2,
        };
        assert_eq!(sql.render(DatabaseKind::Oracle), "NUMBER(12,2)");
        assert_eq!(sql.render(DatabaseKind::Postgres), "numeric(12,2)");
        assert_eq!(sql.render(DatabaseKind::SqlServer), "decimal(12,2)");

        let whole = SqlType::Numeric {
            precision: Some(7),
            scale: 0,
        };
        assert_eq!(whole.render(DatabaseKind::Oracle), "NUMBER(7)");
    }

    #[test]
    fn lob_and_cursor_types_render() {
        assert_eq!(SqlType::Blob.render(DatabaseKind::Postgres), "bytea");
        assert_eq!(SqlType::Clob.render(DatabaseKind::Oracle), "CLOB");
        assert_eq!(
            SqlType::RefCursor.render(DatabaseKind::Oracle),
            "SYS_REFCURSOR"
        );
        assert_eq!(
            SqlType::Boolean.render(DatabaseKind::SqlServer),
            "bit"
        );
    }
}
