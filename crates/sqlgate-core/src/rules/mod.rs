//! Dialect rule sets
//!
//! A rule flags a construct that is syntactically plausible but forbidden or
//! restricted in a dialect. Every rule of a dialect runs on every statement;
//! a rule may contribute any number of errors.

mod mysql;
mod postgres;
mod sqlite;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::classifier::main_statement_kind;
use crate::dialect::SqlDialect;
use crate::result::StatementKind;

/// What a rule sees of the statement
#[derive(Debug, Clone, Copy)]
pub struct RuleInput<'a> {
    /// Statement text without comments and with string literal contents blanked
    pub sql: &'a str,
    /// Kind assigned by the classifier
    pub kind: StatementKind,
    pub dialect: SqlDialect,
}

/// A named predicate producing zero or more error messages
#[derive(Clone, Copy)]
pub struct DialectRule {
    pub name: &'static str,
    pub description: &'static str,
    pub check: fn(&RuleInput<'_>) -> Vec<String>,
}

impl std::fmt::Debug for DialectRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DialectRule")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

impl DialectRule {
    pub fn evaluate(&self, input: &RuleInput<'_>) -> Vec<String> {
        (self.check)(input)
    }
}

/// Rule list of a dialect, in evaluation order.
///
/// SQL Server has none: its grammar-backed validator rejects unsupported
/// constructs while parsing.
pub fn rules_for(dialect: SqlDialect) -> &'static [DialectRule] {
    match dialect {
        SqlDialect::SqlServer => &[],
        SqlDialect::PostgreSQL => postgres::RULES,
        SqlDialect::MySQL => mysql::RULES,
        SqlDialect::SQLite => sqlite::RULES,
    }
}

/// Run every rule of the input's dialect and collect their errors in order
pub fn evaluate_rules(input: &RuleInput<'_>) -> Vec<String> {
    let mut errors = Vec::new();
    for rule in rules_for(input.dialect) {
        let found = rule.evaluate(input);
        if !found.is_empty() {
            tracing::trace!(rule = rule.name, count = found.len(), "dialect rule matched");
        }
        errors.extend(found);
    }
    errors
}

fn regex(pattern: &str) -> Regex {
    Regex::new(pattern).expect("rule patterns are valid regexes")
}

static TOP_RE: Lazy<Regex> = Lazy::new(|| regex(r"(?i)\bSELECT\s+(?:DISTINCT\s+)?TOP\b"));
static MERGE_RE: Lazy<Regex> = Lazy::new(|| regex(r"(?i)^\s*MERGE\b"));
static RETURNING_RE: Lazy<Regex> = Lazy::new(|| regex(r"(?i)\bRETURNING\b"));
static ON_CONFLICT_RE: Lazy<Regex> = Lazy::new(|| regex(r"(?i)\bON\s+CONFLICT\b"));

pub(crate) fn top_clause(input: &RuleInput<'_>) -> Vec<String> {
    if TOP_RE.is_match(input.sql) {
        vec![format!(
            "SELECT TOP is not supported in {}; use LIMIT instead",
            input.dialect.display_name()
        )]
    } else {
        Vec::new()
    }
}

pub(crate) fn merge_unsupported(input: &RuleInput<'_>) -> Vec<String> {
    if MERGE_RE.is_match(input.sql) {
        vec![format!(
            "MERGE statements are not supported in {}",
            input.dialect.display_name()
        )]
    } else {
        Vec::new()
    }
}

pub(crate) fn returning_unsupported(input: &RuleInput<'_>) -> Vec<String> {
    if RETURNING_RE.is_match(input.sql) {
        vec![format!(
            "RETURNING clause is not supported in {}",
            input.dialect.display_name()
        )]
    } else {
        Vec::new()
    }
}

/// Flag `re` when the statement kind is not one of `allowed`.
///
/// A statement led by a CTE list is judged by its main statement.
pub(crate) fn clause_only_in(
    input: &RuleInput<'_>,
    re: &Regex,
    clause: &str,
    allowed: &[StatementKind],
) -> Vec<String> {
    if !re.is_match(input.sql) || allowed.contains(&input.kind) {
        return Vec::new();
    }
    let kind = match input.kind {
        StatementKind::Select => main_statement_kind(input.sql, input.dialect),
        other => other,
    };
    if allowed.contains(&kind) {
        return Vec::new();
    }
    let allowed: Vec<String> = allowed.iter().map(ToString::to_string).collect();
    vec![format!(
        "{} is only allowed in {} statements, not in {}",
        clause,
        allowed.join(", "),
        describe_kind(kind)
    )]
}

pub(crate) fn returning_placement(input: &RuleInput<'_>, allowed: &[StatementKind]) -> Vec<String> {
    clause_only_in(input, &RETURNING_RE, "RETURNING", allowed)
}

pub(crate) fn on_conflict_placement(input: &RuleInput<'_>, allowed: &[StatementKind]) -> Vec<String> {
    clause_only_in(input, &ON_CONFLICT_RE, "ON CONFLICT", allowed)
}

fn describe_kind(kind: StatementKind) -> String {
    match kind {
        StatementKind::Unknown => "an unclassified statement".to_string(),
        other => format!("a {} statement", other),
    }
}
