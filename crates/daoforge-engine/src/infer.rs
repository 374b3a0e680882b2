//! Deterministic mapping from declared column types to resolved
//! descriptors, with a run-scoped cache.
//!
//! Inference is a pure function of the column declaration. The cache
//! exists so every worker that touches the same column hands out the
//! same `Arc` for the whole run, which keeps manifests referentially
//! consistent and avoids recomputing narrow/widen templates per use.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::warn;

use daoforge_core::{CharMode, Column, ColumnKind, default_physical_name, display_name};

use crate::typeinfo::{ColumnAccess, ColumnTypeInfo, CopyMode, NumericBounds, SqlType};

const EQ_DIRECT: &str = "{a} == {b}";

/// Identity of one column's resolved type within a run.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeKey {
    pub relation: String,
    pub column: String,
}

/// Run-scoped cache of resolved column types.
#[derive(Debug, Default)]
pub struct TypeCache {
    entries: Mutex<HashMap<TypeKey, Arc<ColumnTypeInfo>>>,
}

impl TypeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve a column's type, computing and caching it on first use.
    ///
    /// Later calls for the same relation and column return the cached
    /// `Arc` unchanged.
    pub fn resolve(&self, relation: &str, column: &Column) -> Arc<ColumnTypeInfo> {
        let key = TypeKey {
            relation: relation.to_string(),
            column: column.name.clone(),
        };
        let mut entries = match self.entries.lock() {
            Ok(guard) => guard,
            // A poisoning panic already failed the run; the map itself
            // is still usable.
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(cached) = entries.get(&key) {
            return Arc::clone(cached);
        }
        let info = Arc::new(resolve_column(column));
        entries.insert(key, Arc::clone(&info));
        info
    }

    /// Number of distinct column types resolved so far.
    pub fn len(&self) -> usize {
        match self.entries.lock() {
            Ok(guard) => guard.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Map one column declaration onto its resolved descriptor.
pub fn resolve_column(column: &Column) -> ColumnTypeInfo {
    let nullable = column.is_nullable();
    let attrs = &column.attributes;
    let mut info = match &attrs.kind {
        ColumnKind::Char(mode) => character(*mode, attrs.size),
        ColumnKind::Integer => base("i32", SqlType::Integer),
        ColumnKind::Number | ColumnKind::Decimal => numeric(attrs.precision, attrs.scale),
        ColumnKind::FloatingPoint => floating_point(nullable),
        ColumnKind::Boolean => boolean(nullable),
        ColumnKind::DateTime | ColumnKind::Date => datetime(),
        ColumnKind::Blob | ColumnKind::Guid => blob(),
        ColumnKind::Clob => clob(),
        ColumnKind::Text => base("String", SqlType::Text),
        ColumnKind::RefCursor => cursor(attrs.cursor_element.as_deref()),
        ColumnKind::Other(tag) => {
            warn!(
                column = %column.name,
                tag = %tag,
                "unknown column type tag, treating as a bounded string"
            );
            character(CharMode::Varying, attrs.size.or(Some(255)))
        }
    };
    info.nullable = nullable;
    info.declared = if nullable {
        format!("Option<{}>", info.native)
    } else {
        info.native.clone()
    };
    info.enum_ref = column
        .enum_name
        .as_deref()
        .map(|name| display_name(&default_physical_name(name)));
    info
}

fn base(native: &str, sql: SqlType) -> ColumnTypeInfo {
    ColumnTypeInfo {
        native: native.to_string(),
        declared: native.to_string(),
        sql,
        conversion: None,
        cast: None,
        eq_template: EQ_DIRECT.to_string(),
        hash_template: None,
        bounds: None,
        copy: CopyMode::Shallow,
        access: ColumnAccess::Direct,
        convenience_integral: None,
        enum_ref: None,
        imports: Vec::new(),
        nullable: false,
    }
}

fn character(mode: CharMode, size: Option<u32>) -> ColumnTypeInfo {
    let sql = match mode {
        CharMode::Fixed => SqlType::Char {
            size: size.unwrap_or(1),
        },
        CharMode::Varying => SqlType::VarChar { size },
    };
    base("String", sql)
}

/// Pick the narrowest machine integer holding `precision` whole digits,
/// or fall back to arbitrary precision when none fits.
fn numeric(precision: Option<u32>, scale: Option<i32>) -> ColumnTypeInfo {
    let scale = scale.unwrap_or(0);
    if scale != 0 {
        return decimal(precision, scale, false);
    }
    let Some(precision) = precision else {
        return decimal(None, 0, true);
    };
    let native = match precision {
        0..=2 => "i8",
        3..=4 => "i16",
        5..=9 => "i32",
        10..=17 => "i64",
        _ => return decimal(Some(precision), 0, true),
    };
    let max = 10_i64.pow(precision) - 1;
    let mut info = base(
        native,
        SqlType::Numeric {
            precision: Some(precision),
            scale: 0,
        },
    );
    info.conversion = Some(format!("{native}::try_from"));
    info.cast = Some("i64::from".to_string());
    info.bounds = Some(NumericBounds { min: -max, max });
    info
}

fn decimal(precision: Option<u32>, scale: i32, whole: bool) -> ColumnTypeInfo {
    let mut info = base("Decimal", SqlType::Numeric { precision, scale });
    info.imports.push("rust_decimal::Decimal".to_string());
    if whole {
        info.convenience_integral = Some("i64".to_string());
    }
    info
}

fn floating_point(nullable: bool) -> ColumnTypeInfo {
    let mut info = base("f64", SqlType::Double);
    if nullable {
        info.eq_template = "{a}.map(f64::to_bits) == {b}.map(f64::to_bits)".to_string();
        info.hash_template = Some("{v}.map(f64::to_bits)".to_string());
    } else {
        info.eq_template = "{a}.to_bits() == {b}.to_bits()".to_string();
        info.hash_template = Some("{v}.to_bits()".to_string());
    }
    info
}

fn boolean(nullable: bool) -> ColumnTypeInfo {
    let mut info = base("bool", SqlType::Boolean);
    info.hash_template = Some(if nullable {
        "{v}.map(u8::from)".to_string()
    } else {
        "u8::from({v})".to_string()
    });
    info
}

fn datetime() -> ColumnTypeInfo {
    let mut info = base("NaiveDateTime", SqlType::Timestamp);
    info.copy = CopyMode::Duplicate;
    info.imports.push("chrono::NaiveDateTime".to_string());
    info
}

fn blob() -> ColumnTypeInfo {
    let mut info = base("Vec<u8>", SqlType::Blob);
    info.copy = CopyMode::Duplicate;
    info
}

fn clob() -> ColumnTypeInfo {
    let mut info = base("String", SqlType::Clob);
    info.access = ColumnAccess::LobStream;
    info
}

fn cursor(element: Option<&str>) -> ColumnTypeInfo {
    // Parsing rejects cursor columns without an element; the fallback
    // only keeps this total.
    let element = element.unwrap_or("Row");
    base(&format!("Vec<{element}>"), SqlType::RefCursor)
}
