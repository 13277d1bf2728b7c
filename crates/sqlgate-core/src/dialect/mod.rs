//! SQL dialect support

use serde::{Deserialize, Serialize};
use sqlparser::dialect::{Dialect, MsSqlDialect, MySqlDialect, PostgreSqlDialect, SQLiteDialect};
use std::str::FromStr;

use crate::error::ValidatorError;

/// Supported SQL dialects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SqlDialect {
    SqlServer,
    PostgreSQL,
    MySQL,
    SQLite,
}

/// Lexical conventions that differ between dialects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LexicalRules {
    /// `#` starts a line comment in addition to `--`
    pub hash_comments: bool,
    /// `\'` escapes a quote inside a string literal
    pub backslash_escapes: bool,
    /// `` `ident` `` quoting
    pub backtick_identifiers: bool,
    /// `[ident]` quoting
    pub bracket_identifiers: bool,
    /// `$tag$ ... $tag$` string bodies
    pub dollar_quoted_strings: bool,
    /// `"text"` is a string literal, not an identifier
    pub double_quoted_strings: bool,
}

impl SqlDialect {
    /// All dialects, in registry order
    pub const ALL: [SqlDialect; 4] = [
        SqlDialect::SqlServer,
        SqlDialect::PostgreSQL,
        SqlDialect::MySQL,
        SqlDialect::SQLite,
    ];

    /// Get the sqlparser dialect for parsing
    pub fn parser_dialect(&self) -> Box<dyn Dialect> {
        match self {
            SqlDialect::SqlServer => Box::new(MsSqlDialect {}),
            SqlDialect::PostgreSQL => Box::new(PostgreSqlDialect {}),
            SqlDialect::MySQL => Box::new(MySqlDialect {}),
            SqlDialect::SQLite => Box::new(SQLiteDialect {}),
        }
    }

    /// Quoting, escaping and comment conventions of this dialect
    pub fn lexical_rules(&self) -> LexicalRules {
        match self {
            SqlDialect::SqlServer => LexicalRules {
                hash_comments: false,
                backslash_escapes: false,
                backtick_identifiers: false,
                bracket_identifiers: true,
                dollar_quoted_strings: false,
                double_quoted_strings: false,
            },
            SqlDialect::PostgreSQL => LexicalRules {
                hash_comments: false,
                backslash_escapes: false,
                backtick_identifiers: false,
                bracket_identifiers: false,
                dollar_quoted_strings: true,
                double_quoted_strings: false,
            },
            SqlDialect::MySQL => LexicalRules {
                hash_comments: true,
                backslash_escapes: true,
                backtick_identifiers: true,
                bracket_identifiers: false,
                dollar_quoted_strings: false,
                double_quoted_strings: true,
            },
            // SQLite accepts all three identifier quoting styles for compatibility
            SqlDialect::SQLite => LexicalRules {
                hash_comments: false,
                backslash_escapes: false,
                backtick_identifiers: true,
                bracket_identifiers: true,
                dollar_quoted_strings: false,
                double_quoted_strings: false,
            },
        }
    }

    /// Table name prefixes reserved for the engine's own catalog
    pub fn system_table_prefixes(&self) -> &'static [&'static str] {
        match self {
            SqlDialect::PostgreSQL => &["pg_"],
            SqlDialect::SQLite => &["sqlite_"],
            SqlDialect::SqlServer | SqlDialect::MySQL => &[],
        }
    }

    /// Schemas holding system catalog objects
    pub fn system_schemas(&self) -> &'static [&'static str] {
        match self {
            SqlDialect::SqlServer => &["sys", "information_schema"],
            SqlDialect::PostgreSQL => &["pg_catalog", "information_schema"],
            SqlDialect::MySQL => &["information_schema", "mysql", "performance_schema", "sys"],
            SqlDialect::SQLite => &[],
        }
    }

    /// Whether a (schema, table) pair names a system object
    pub fn is_system_table(&self, schema: Option<&str>, table: &str) -> bool {
        let table = table.to_ascii_lowercase();
        if self
            .system_table_prefixes()
            .iter()
            .any(|prefix| table.starts_with(prefix))
        {
            return true;
        }
        match schema {
            Some(schema) => self
                .system_schemas()
                .iter()
                .any(|s| s.eq_ignore_ascii_case(schema)),
            None => false,
        }
    }

    /// Human readable product name
    pub fn display_name(&self) -> &'static str {
        match self {
            SqlDialect::SqlServer => "SQL Server",
            SqlDialect::PostgreSQL => "PostgreSQL",
            SqlDialect::MySQL => "MySQL",
            SqlDialect::SQLite => "SQLite",
        }
    }
}

impl FromStr for SqlDialect {
    type Err = ValidatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sqlserver" | "mssql" | "tsql" | "serversql" => Ok(SqlDialect::SqlServer),
            "postgresql" | "postgres" | "pg" => Ok(SqlDialect::PostgreSQL),
            "mysql" | "mysql8" | "mariadb" => Ok(SqlDialect::MySQL),
            "sqlite" | "sqlite3" => Ok(SqlDialect::SQLite),
            _ => Err(ValidatorError::UnknownDialect(s.to_string())),
        }
    }
}

impl std::fmt::Display for SqlDialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SqlDialect::SqlServer => write!(f, "sqlserver"),
            SqlDialect::PostgreSQL => write!(f, "postgresql"),
            SqlDialect::MySQL => write!(f, "mysql"),
            SqlDialect::SQLite => write!(f, "sqlite"),
        }
    }
}
