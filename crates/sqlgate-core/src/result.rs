//! Validation output types

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Error reported for empty or whitespace-only input
pub const EMPTY_STATEMENT: &str = "SQL statement is empty";

/// High-level category of a SQL statement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum StatementKind {
    #[default]
    Unknown,
    Select,
    Insert,
    Update,
    Delete,
    Merge,
    CreateTable,
    AlterTable,
    DropTable,
    CreateIndex,
    DropIndex,
    Truncate,
}

impl StatementKind {
    /// Whether the statement modifies data rows
    pub fn is_dml(&self) -> bool {
        matches!(
            self,
            StatementKind::Insert
                | StatementKind::Update
                | StatementKind::Delete
                | StatementKind::Merge
        )
    }

    /// Whether the statement changes the schema
    pub fn is_ddl(&self) -> bool {
        matches!(
            self,
            StatementKind::CreateTable
                | StatementKind::AlterTable
                | StatementKind::DropTable
                | StatementKind::CreateIndex
                | StatementKind::DropIndex
                | StatementKind::Truncate
        )
    }
}

impl std::fmt::Display for StatementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            StatementKind::Unknown => "UNKNOWN",
            StatementKind::Select => "SELECT",
            StatementKind::Insert => "INSERT",
            StatementKind::Update => "UPDATE",
            StatementKind::Delete => "DELETE",
            StatementKind::Merge => "MERGE",
            StatementKind::CreateTable => "CREATE TABLE",
            StatementKind::AlterTable => "ALTER TABLE",
            StatementKind::DropTable => "DROP TABLE",
            StatementKind::CreateIndex => "CREATE INDEX",
            StatementKind::DropIndex => "DROP INDEX",
            StatementKind::Truncate => "TRUNCATE",
        };
        f.write_str(name)
    }
}

/// Outcome of a syntax validation.
///
/// `is_valid` is derived from the error list and cannot be set on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    is_valid: bool,
    errors: Vec<String>,
}

impl ValidationResult {
    /// Build a result from the accumulated errors
    pub fn from_errors(errors: Vec<String>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
        }
    }

    pub fn valid() -> Self {
        Self::from_errors(Vec::new())
    }

    /// Result for empty or whitespace-only input
    pub fn empty_statement() -> Self {
        Self::from_errors(vec![EMPTY_STATEMENT.to_string()])
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<String> {
        self.errors
    }
}

/// Deduplicated set of table names.
///
/// Iteration follows first-discovery order and each entry keeps the casing it
/// was first seen with. Equality ignores order.
#[derive(Debug, Clone, Default)]
pub struct TableNameSet {
    fold_case: bool,
    names: IndexMap<String, String>,
}

impl TableNameSet {
    /// Set that treats `Users` and `USERS` as the same table
    pub fn case_insensitive() -> Self {
        Self {
            fold_case: true,
            names: IndexMap::new(),
        }
    }

    /// Set that only merges names spelled identically
    pub fn exact() -> Self {
        Self {
            fold_case: false,
            names: IndexMap::new(),
        }
    }

    fn key(&self, name: &str) -> String {
        if self.fold_case {
            name.to_lowercase()
        } else {
            name.to_string()
        }
    }

    /// Insert a name; returns false if an equivalent name was already present
    pub fn insert(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        let key = self.key(&name);
        if self.names.contains_key(&key) {
            return false;
        }
        self.names.insert(key, name);
        true
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains_key(&self.key(name))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.values().map(String::as_str)
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.names.values().cloned().collect()
    }
}

impl PartialEq for TableNameSet {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|name| other.contains(name))
    }
}

impl Eq for TableNameSet {}

impl IntoIterator for TableNameSet {
    type Item = String;
    type IntoIter = indexmap::map::IntoValues<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.names.into_values()
    }
}

impl Serialize for TableNameSet {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validity_follows_errors() {
        assert!(ValidationResult::valid().is_valid());
        let result = ValidationResult::from_errors(vec!["bad".to_string()]);
        assert!(!result.is_valid());
        assert_eq!(result.errors(), ["bad".to_string()]);
    }

    #[test]
    fn test_empty_statement_result() {
        let result = ValidationResult::empty_statement();
        assert!(!result.is_valid());
        assert_eq!(result.errors(), [EMPTY_STATEMENT.to_string()]);
    }

    #[test]
    fn test_case_insensitive_keeps_first_casing() {
        let mut set = TableNameSet::case_insensitive();
        assert!(set.insert("Users"));
        assert!(!set.insert("USERS"));
        assert!(set.insert("orders"));
        assert_eq!(set.to_vec(), vec!["Users", "orders"]);
        assert!(set.contains("users"));
    }

    #[test]
    fn test_exact_keeps_distinct_casing() {
        let mut set = TableNameSet::exact();
        set.insert("Users");
        set.insert("users");
        assert_eq!(set.len(), 2);
        assert!(!set.contains("USERS"));
    }

    #[test]
    fn test_equality_ignores_order() {
        let mut a = TableNameSet::case_insensitive();
        a.insert("a");
        a.insert("b");
        let mut b = TableNameSet::case_insensitive();
        b.insert("B");
        b.insert("A");
        assert_eq!(a, b);
    }

    #[test]
    fn test_statement_kind_groups() {
        assert!(StatementKind::Merge.is_dml());
        assert!(StatementKind::Truncate.is_ddl());
        assert!(!StatementKind::Select.is_dml());
        assert_eq!(StatementKind::default(), StatementKind::Unknown);
    }
}
