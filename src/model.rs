use serde::Serialize;
use std::fmt;

/// Which identifier a request is about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// 1-based line and 1-based byte column.
    Position { row: usize, col: usize },
    FunctionVariable { function: String, variable: String },
}

impl Selector {
    pub fn position(row: usize, col: usize) -> Self {
        Selector::Position { row, col }
    }

    pub fn function_variable(function: impl Into<String>, variable: impl Into<String>) -> Self {
        Selector::FunctionVariable {
            function: function.into(),
            variable: variable.into(),
        }
    }
}

/// A `file:line:col` position, 1-based like the Go toolchain prints them.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Location {
    pub file: String,
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    Function,
    File,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Function => f.write_str("function"),
            Scope::File => f.write_str("file"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum VariableKind {
    #[serde(rename = "local variable")]
    Local,
    #[serde(rename = "parameter")]
    Parameter,
}

impl fmt::Display for VariableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VariableKind::Local => f.write_str("local variable"),
            VariableKind::Parameter => f.write_str("parameter"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariableContext {
    pub package_name: String,
    pub file_name: String,
    pub function_name: String,
    pub function_summary: String,
    pub variable_name: String,
    /// Literal kind of the first literal assignment, or `unknown`.
    pub variable_type: String,
    pub scope: Scope,
    pub kind: VariableKind,
    pub assignments: Vec<String>,
    pub usages: Vec<Location>,
    pub related_identifiers: Vec<String>,
    pub imports: Vec<String>,
    pub file_comments: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldContext {
    pub package_name: String,
    pub file_name: String,
    pub struct_name: String,
    pub field_name: String,
    pub field_type: String,
    pub struct_doc: String,
    /// Declaration site first, then selector usages in source order.
    pub usages: Vec<Location>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeContext {
    pub package_name: String,
    pub type_name: String,
    pub fields: Vec<String>,
    pub struct_doc: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "entity", rename_all = "snake_case")]
pub enum EntityContext {
    Variable(VariableContext),
    Field(FieldContext),
    Type(TypeContext),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    pub name: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenameResult {
    pub suggestions: Vec<Suggestion>,
    /// The exact prompt sent to the model, kept for diagnostics.
    #[serde(skip)]
    pub prompt: String,
}
