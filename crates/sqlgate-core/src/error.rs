//! Error types

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dialect::SqlDialect;

/// Errors raised while setting up a validator.
///
/// Validation failures are never reported through this type; they are data in
/// [`crate::ValidationResult`].
#[derive(Debug, Clone, PartialEq, Eq, Error, miette::Diagnostic)]
pub enum ValidatorError {
    /// The registry has no validator for the requested dialect
    #[error("no validator registered for dialect '{0}'")]
    #[diagnostic(
        code(sqlgate::unsupported_dialect),
        help("Register a validator for this dialect or use ValidatorRegistry::builtin()")
    )]
    UnsupportedDialect(SqlDialect),

    /// A dialect name that does not map to any known dialect
    #[error("unknown dialect: '{0}'")]
    #[diagnostic(
        code(sqlgate::unknown_dialect),
        help("Supported dialects: sqlserver, postgresql, mysql, sqlite")
    )]
    UnknownDialect(String),
}

/// Syntax error reported by the grammar parser
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyntaxError {
    /// Line number (1-indexed), if the parser reported one
    pub line: Option<u64>,
    /// Column number (1-indexed), if the parser reported one
    pub column: Option<u64>,
    pub message: String,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            line: None,
            column: None,
            message: message.into(),
        }
    }

    pub fn with_location(mut self, line: u64, column: u64) -> Self {
        self.line = Some(line);
        self.column = Some(column);
        self
    }
}

impl std::fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.line, self.column) {
            (Some(line), Some(column)) => {
                write!(f, "Line {}, Column {}: {}", line, column, self.message)
            }
            _ => write!(f, "{}", self.message),
        }
    }
}
