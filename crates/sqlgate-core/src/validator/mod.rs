//! Validators
//!
//! Every dialect is served through the same [`SqlValidator`] contract, but the
//! implementations are not equally strict. PostgreSQL, MySQL and SQLite use
//! [`PatternValidator`]: a lexical scan, ordered keyword patterns and dialect
//! rules. That approach can accept malformed SQL and occasionally reject legal
//! SQL. SQL Server uses [`GrammarValidator`], which runs a full SQL grammar
//! and reports exact line/column positions. Callers must not assume identical
//! strictness across dialects.

mod grammar;
mod pattern;

pub use grammar::GrammarValidator;
pub use pattern::PatternValidator;

use crate::dialect::SqlDialect;
use crate::result::{StatementKind, TableNameSet, ValidationResult};

/// Dialect-specific syntax validation
pub trait SqlValidator: Send + Sync {
    /// Dialect this validator was built for
    fn dialect(&self) -> SqlDialect;

    /// Check that `sql` is well-formed for the dialect.
    ///
    /// Empty or whitespace-only input yields exactly one error,
    /// `"SQL statement is empty"`, and no other check runs.
    fn validate_syntax(&self, sql: &str) -> ValidationResult;

    /// Kind of the statement; `Unknown` for empty or invalid input
    fn statement_type(&self, sql: &str) -> StatementKind;

    /// Tables referenced by the statement; empty for empty or invalid input
    fn extract_table_names(&self, sql: &str) -> TableNameSet;

    /// Validate input that may be missing altogether; `None` counts as empty
    fn validate_optional(&self, sql: Option<&str>) -> ValidationResult {
        self.validate_syntax(sql.unwrap_or_default())
    }
}

pub(crate) fn is_blank(sql: &str) -> bool {
    sql.trim().is_empty()
}
