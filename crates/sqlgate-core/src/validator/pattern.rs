//! Pattern-based validator - lexical scan, classifier, extractor and rules

use crate::classifier::{classify_stripped, is_recognized_uncategorized_stripped};
use crate::dialect::SqlDialect;
use crate::extractor::extract_from_prepared;
use crate::result::{StatementKind, TableNameSet, ValidationResult};
use crate::rules::{evaluate_rules, RuleInput};
use crate::scanner::{
    blank_string_literals, offset_to_line_col, paren_imbalance, quote_imbalance, strip_comments,
    ParenImbalance, QuoteImbalance,
};
use crate::validator::{is_blank, SqlValidator};

/// Validator driven by the dialect's pattern tables and rule list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatternValidator {
    dialect: SqlDialect,
}

/// Everything one pass over a statement produces
struct Analysis {
    errors: Vec<String>,
    kind: StatementKind,
    /// Comment-free text with blanked string literals
    prepared: String,
}

impl PatternValidator {
    pub fn new(dialect: SqlDialect) -> Self {
        Self { dialect }
    }

    pub fn postgres() -> Self {
        Self::new(SqlDialect::PostgreSQL)
    }

    pub fn mysql() -> Self {
        Self::new(SqlDialect::MySQL)
    }

    pub fn sqlite() -> Self {
        Self::new(SqlDialect::SQLite)
    }

    /// Run every check on non-blank input
    fn analyze(&self, sql: &str) -> Analysis {
        let mut errors = Vec::new();

        if let Some(problem) = quote_imbalance(sql, self.dialect) {
            errors.push(describe_quote_problem(sql, problem));
        }
        if let Some(problem) = paren_imbalance(sql, self.dialect) {
            errors.push(describe_paren_problem(sql, problem));
        }

        // Classification and rules still run on unbalanced text, best effort
        let stripped = strip_comments(sql, self.dialect);
        let kind = classify_stripped(&stripped, self.dialect);
        if kind == StatementKind::Unknown
            && !is_recognized_uncategorized_stripped(&stripped, self.dialect)
        {
            errors.push(format!(
                "Unknown or invalid statement for {}: '{}'",
                self.dialect.display_name(),
                leading_words(&stripped)
            ));
        }

        let prepared = blank_string_literals(&stripped, self.dialect);
        errors.extend(evaluate_rules(&RuleInput {
            sql: &prepared,
            kind,
            dialect: self.dialect,
        }));

        tracing::debug!(
            dialect = %self.dialect,
            kind = %kind,
            errors = errors.len(),
            "validated statement"
        );

        Analysis {
            errors,
            kind,
            prepared,
        }
    }
}

impl SqlValidator for PatternValidator {
    fn dialect(&self) -> SqlDialect {
        self.dialect
    }

    fn validate_syntax(&self, sql: &str) -> ValidationResult {
        if is_blank(sql) {
            return ValidationResult::empty_statement();
        }
        ValidationResult::from_errors(self.analyze(sql).errors)
    }

    fn statement_type(&self, sql: &str) -> StatementKind {
        if is_blank(sql) {
            return StatementKind::Unknown;
        }
        let analysis = self.analyze(sql);
        if analysis.errors.is_empty() {
            analysis.kind
        } else {
            StatementKind::Unknown
        }
    }

    fn extract_table_names(&self, sql: &str) -> TableNameSet {
        if is_blank(sql) {
            return TableNameSet::case_insensitive();
        }
        let analysis = self.analyze(sql);
        if analysis.errors.is_empty() {
            extract_from_prepared(&analysis.prepared, self.dialect)
        } else {
            TableNameSet::case_insensitive()
        }
    }
}

fn describe_quote_problem(sql: &str, problem: QuoteImbalance) -> String {
    match problem {
        QuoteImbalance::Unclosed { style, offset } => {
            let (line, col) = offset_to_line_col(sql, offset);
            format!(
                "Unbalanced quotes: unclosed {} starting at Line {}, Column {}",
                style.describe(),
                line,
                col
            )
        }
        QuoteImbalance::UnmatchedClose { offset, .. } => {
            let (line, col) = offset_to_line_col(sql, offset);
            format!(
                "Unbalanced brackets: ']' at Line {}, Column {} has no matching '['",
                line, col
            )
        }
    }
}

fn describe_paren_problem(sql: &str, problem: ParenImbalance) -> String {
    match problem {
        ParenImbalance::UnexpectedClose { offset } => {
            let (line, col) = offset_to_line_col(sql, offset);
            format!(
                "Unbalanced parentheses: unexpected ')' at Line {}, Column {}",
                line, col
            )
        }
        ParenImbalance::Unclosed { count } => {
            format!("Unbalanced parentheses: {} unclosed '('", count)
        }
    }
}

/// First few words of a statement, for error messages
fn leading_words(sql: &str) -> String {
    let words: Vec<&str> = sql.split_whitespace().take(3).collect();
    words.join(" ")
}
