//! The options model a generation run is configured from.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::filter::Filter;
use crate::overrides::Overrides;

/// Concurrent generation units unless the options file says otherwise.
pub const DEFAULT_WORKER_LIMIT: usize = 4;

/// Target database dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseKind {
    Oracle,
    Postgres,
    SqlServer,
}

impl FromStr for DatabaseKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "oracle" => Ok(Self::Oracle),
            "postgres" => Ok(Self::Postgres),
            "sqlserver" => Ok(Self::SqlServer),
            other => Err(format!(
                "unknown database type '{other}' (expected oracle, postgres or sqlserver)"
            )),
        }
    }
}

impl fmt::Display for DatabaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DatabaseKind::Oracle => "oracle",
            DatabaseKind::Postgres => "postgres",
            DatabaseKind::SqlServer => "sqlserver",
        };
        f.write_str(name)
    }
}

/// Built-in code strategy selection.
///
/// A closed set resolved once at startup; there is no dynamic lookup by
/// class or module name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    /// Write entity and DAO metadata manifests under the output path.
    Manifest,
    /// Produce feedback lines only; nothing is written.
    Null,
}

impl FromStr for StrategyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "manifest" => Ok(Self::Manifest),
            "null" => Ok(Self::Null),
            other => Err(format!(
                "unknown code strategy '{other}' (expected manifest or null)"
            )),
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StrategyKind::Manifest => "manifest",
            StrategyKind::Null => "null",
        };
        f.write_str(name)
    }
}

/// Everything a generation run is configured from, parsed out of the
/// options document.
#[derive(Debug, Clone)]
pub struct GenOptions {
    pub output_base_path: PathBuf,
    /// Logical package the generated artifacts belong to.
    pub output_package: String,
    pub database: DatabaseKind,
    pub database_version: Option<String>,
    /// Schema file path, resolved against the options file's directory.
    pub schema_path: PathBuf,
    pub additional_schema_path: Option<PathBuf>,
    /// Emit accessor-style definitions in generated metadata.
    pub bean_style_definitions: bool,
    pub code_strategy: StrategyKind,
    /// Upper bound on concurrently running generation units.
    pub worker_limit: usize,
    pub filters: Vec<Filter>,
    pub overrides: Overrides,
}

impl Default for GenOptions {
    fn default() -> Self {
        Self {
            output_base_path: PathBuf::from("."),
            output_package: String::new(),
            database: DatabaseKind::Oracle,
            database_version: None,
            schema_path: PathBuf::new(),
            additional_schema_path: None,
            bean_style_definitions: false,
            code_strategy: StrategyKind::Null,
            worker_limit: DEFAULT_WORKER_LIMIT,
            filters: Vec::new(),
            overrides: Overrides::default(),
        }
    }
}
