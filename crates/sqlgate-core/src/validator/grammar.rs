//! Grammar-backed validator - full parse with sqlparser, then tree visitors

use std::ops::ControlFlow;

use once_cell::sync::Lazy;
use regex::Regex;
use sqlparser::ast::{ObjectName, ObjectType, Statement, Visit, Visitor};
use sqlparser::parser::{Parser, ParserError};

use crate::dialect::SqlDialect;
use crate::error::SyntaxError;
use crate::result::{StatementKind, TableNameSet, ValidationResult};
use crate::validator::{is_blank, SqlValidator};

/// Location suffix sqlparser appends to its messages
static LOCATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s*at Line: (\d+), Column: (\d+)").expect("location pattern is valid")
});

/// Validator that delegates lexing and parsing to a complete SQL grammar.
///
/// Table names are deduplicated by exact spelling, following the grammar's
/// identifier rules rather than the case-insensitive policy of
/// [`crate::PatternValidator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrammarValidator {
    dialect: SqlDialect,
}

impl GrammarValidator {
    pub fn new(dialect: SqlDialect) -> Self {
        Self { dialect }
    }

    pub fn sql_server() -> Self {
        Self::new(SqlDialect::SqlServer)
    }

    /// Parse with a fresh parser per call
    fn parse(&self, sql: &str) -> Result<Vec<Statement>, SyntaxError> {
        let dialect = self.dialect.parser_dialect();
        Parser::parse_sql(dialect.as_ref(), sql).map_err(|e| syntax_error(&e))
    }
}

impl Default for GrammarValidator {
    fn default() -> Self {
        Self::sql_server()
    }
}

impl SqlValidator for GrammarValidator {
    fn dialect(&self) -> SqlDialect {
        self.dialect
    }

    fn validate_syntax(&self, sql: &str) -> ValidationResult {
        if is_blank(sql) {
            return ValidationResult::empty_statement();
        }
        match self.parse(sql) {
            Ok(statements) => {
                tracing::debug!(
                    dialect = %self.dialect,
                    statements = statements.len(),
                    "statement parsed"
                );
                ValidationResult::valid()
            }
            Err(err) => {
                tracing::debug!(dialect = %self.dialect, error = %err, "parse failed");
                ValidationResult::from_errors(vec![err.to_string()])
            }
        }
    }

    fn statement_type(&self, sql: &str) -> StatementKind {
        if is_blank(sql) {
            return StatementKind::Unknown;
        }
        match self.parse(sql) {
            Ok(statements) => statements
                .first()
                .map(statement_kind)
                .unwrap_or_default(),
            Err(_) => StatementKind::Unknown,
        }
    }

    fn extract_table_names(&self, sql: &str) -> TableNameSet {
        let mut collector = TableCollector::new(self.dialect);
        if is_blank(sql) {
            return collector.tables;
        }
        if let Ok(statements) = self.parse(sql) {
            for statement in &statements {
                collector.collect_targets(statement);
                let _ = statement.visit(&mut collector);
            }
        }
        collector.tables
    }
}

/// Convert a sqlparser error into a located syntax error
fn syntax_error(err: &ParserError) -> SyntaxError {
    let message = match err {
        ParserError::TokenizerError(message) | ParserError::ParserError(message) => {
            message.clone()
        }
        other => other.to_string(),
    };

    match LOCATION_RE.captures(&message) {
        Some(caps) => {
            let line = caps[1].parse().unwrap_or_default();
            let column = caps[2].parse().unwrap_or_default();
            let bare = LOCATION_RE.replace(&message, "").trim().to_string();
            SyntaxError::new(bare).with_location(line, column)
        }
        None => SyntaxError::new(message),
    }
}

/// Kind of a top-level statement node
pub(crate) fn statement_kind(statement: &Statement) -> StatementKind {
    match statement {
        Statement::Query(_) => StatementKind::Select,
        Statement::Insert(_) => StatementKind::Insert,
        Statement::Update { .. } => StatementKind::Update,
        Statement::Delete(_) => StatementKind::Delete,
        Statement::Merge { .. } => StatementKind::Merge,
        Statement::CreateTable(_) => StatementKind::CreateTable,
        Statement::AlterTable { .. } => StatementKind::AlterTable,
        Statement::Drop {
            object_type: ObjectType::Table,
            ..
        } => StatementKind::DropTable,
        Statement::Drop {
            object_type: ObjectType::Index,
            ..
        } => StatementKind::DropIndex,
        Statement::CreateIndex(_) => StatementKind::CreateIndex,
        Statement::Truncate { .. } => StatementKind::Truncate,
        _ => StatementKind::Unknown,
    }
}

/// Visitor collecting every named table of a statement tree
struct TableCollector {
    dialect: SqlDialect,
    tables: TableNameSet,
}

impl TableCollector {
    fn new(dialect: SqlDialect) -> Self {
        Self {
            dialect,
            tables: TableNameSet::exact(),
        }
    }

    fn add(&mut self, name: &ObjectName) {
        let parts = &name.0;
        let Some(table) = parts.last() else { return };
        let schema = parts
            .len()
            .checked_sub(2)
            .map(|i| parts[i].value.as_str());
        if self.dialect.is_system_table(schema, &table.value) {
            tracing::trace!(table = %table.value, "skipping system table");
            return;
        }
        self.tables.insert(table.value.clone());
    }

    /// Statement targets, recorded ahead of the tables the body reads from
    fn collect_targets(&mut self, statement: &Statement) {
        match statement {
            Statement::Insert(insert) => self.add(&insert.table_name),
            Statement::CreateTable(create) => self.add(&create.name),
            Statement::AlterTable { name, .. } => self.add(name),
            Statement::CreateIndex(create) => self.add(&create.table_name),
            Statement::Drop {
                object_type: ObjectType::Table,
                names,
                ..
            } => {
                for name in names {
                    self.add(name);
                }
            }
            _ => {}
        }
    }
}

impl Visitor for TableCollector {
    type Break = ();

    fn pre_visit_relation(&mut self, relation: &ObjectName) -> ControlFlow<Self::Break> {
        self.add(relation);
        ControlFlow::Continue(())
    }
}
