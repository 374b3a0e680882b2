//! Stored procedure and function declarations.

use std::fmt;
use std::str::FromStr;

use crate::column::Column;

/// Passing direction of a procedure parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamDirection {
    In,
    Out,
    InOut,
    /// Function return value.
    Return,
    /// Function return rebound to an out-parameter slot. Never written in
    /// definition files; only an override produces it.
    ReturnAsOut,
}

impl ParamDirection {
    /// True for directions that flow data back to the caller.
    pub fn is_output(self) -> bool {
        !matches!(self, ParamDirection::In)
    }
}

impl FromStr for ParamDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in" => Ok(Self::In),
            "out" => Ok(Self::Out),
            "inout" => Ok(Self::InOut),
            "return" => Ok(Self::Return),
            other => Err(format!(
                "unknown direction '{other}' (expected in, out, inout or return)"
            )),
        }
    }
}

impl fmt::Display for ParamDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ParamDirection::In => "in",
            ParamDirection::Out => "out",
            ParamDirection::InOut => "inout",
            ParamDirection::Return => "return",
            ParamDirection::ReturnAsOut => "return-as-out",
        };
        f.write_str(label)
    }
}

/// Procedure flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcedureKind {
    Procedure,
    Function,
}

impl FromStr for ProcedureKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "procedure" => Ok(Self::Procedure),
            "function" => Ok(Self::Function),
            other => Err(format!(
                "unknown procedure type '{other}' (expected procedure or function)"
            )),
        }
    }
}

/// One procedure, function, command, or custom-view parameter: a column
/// shape plus its passing direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub column: Column,
    pub direction: ParamDirection,
}

/// A stored procedure or function declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredProcedure {
    pub name: String,
    pub physical_name: String,
    /// Database catalog qualifier, when any.
    pub catalog: Option<String>,
    /// Database schema qualifier, when any.
    pub schema_name: Option<String>,
    pub kind: ProcedureKind,
    pub parameters: Vec<Parameter>,
    /// Relations whose shape this procedure returns as result sets.
    /// Declared externally through overrides, never in the schema file.
    pub result_sets: Vec<String>,
}

impl StoredProcedure {
    /// The return parameter, when this is a function.
    pub fn return_parameter(&self) -> Option<&Parameter> {
        self.parameters
            .iter()
            .find(|p| p.direction == ParamDirection::Return)
    }
}
