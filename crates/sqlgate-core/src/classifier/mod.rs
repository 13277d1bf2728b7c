//! Statement classifier
//!
//! Each dialect owns an ordered list of anchored, case-insensitive patterns.
//! The first pattern matching the start of the statement decides its kind;
//! where prefixes overlap, the more specific pattern comes first.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::dialect::SqlDialect;
use crate::result::StatementKind;
use crate::scanner::strip_comments;

/// A `(pattern, kind)` pair of a dialect's classification table
#[derive(Debug)]
pub struct ClassificationRule {
    pattern: Regex,
    kind: StatementKind,
}

impl ClassificationRule {
    fn new(pattern: &str, kind: StatementKind) -> Self {
        let anchored = format!(r"(?i)^(?:{})", pattern);
        Self {
            pattern: Regex::new(&anchored).expect("classification patterns are valid regexes"),
            kind,
        }
    }

    pub fn kind(&self) -> StatementKind {
        self.kind
    }

    pub fn matches(&self, sql: &str) -> bool {
        self.pattern.is_match(sql)
    }
}

fn build_rules(table: &[(&str, StatementKind)]) -> Vec<ClassificationRule> {
    table
        .iter()
        .map(|(pattern, kind)| ClassificationRule::new(pattern, *kind))
        .collect()
}

fn build_allow_list(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(&format!(r"(?i)^(?:{})\b", p)).expect("allow-list patterns are valid regexes"))
        .collect()
}

const SELECT: &str = r"\(*\s*SELECT\b";
const WITH: &str = r"WITH\b";

static SQLSERVER_RULES: Lazy<Vec<ClassificationRule>> = Lazy::new(|| {
    use StatementKind::*;
    build_rules(&[
        (SELECT, Select),
        (WITH, Select),
        (r"INSERT\b", Insert),
        (r"UPDATE\b", Update),
        (r"DELETE\b", Delete),
        (r"MERGE\b", Merge),
        (r"CREATE\s+TABLE\b", CreateTable),
        (r"ALTER\s+TABLE\b", AlterTable),
        (r"DROP\s+TABLE\b", DropTable),
        (r"CREATE\s+UNIQUE\s+(?:(?:CLUSTERED|NONCLUSTERED)\s+)?INDEX\b", CreateIndex),
        (r"CREATE\s+(?:(?:CLUSTERED|NONCLUSTERED|COLUMNSTORE)\s+)*INDEX\b", CreateIndex),
        (r"DROP\s+INDEX\b", DropIndex),
        (r"TRUNCATE\s+TABLE\b", Truncate),
    ])
});

static POSTGRES_RULES: Lazy<Vec<ClassificationRule>> = Lazy::new(|| {
    use StatementKind::*;
    build_rules(&[
        (SELECT, Select),
        (WITH, Select),
        (r"VALUES\b", Select),
        (r"INSERT\s+INTO\b", Insert),
        (r"UPDATE\b", Update),
        (r"DELETE\s+FROM\b", Delete),
        (r"MERGE\s+INTO\b", Merge),
        (
            r"CREATE\s+(?:(?:GLOBAL|LOCAL|TEMP|TEMPORARY|UNLOGGED)\s+)*TABLE\b",
            CreateTable,
        ),
        (r"ALTER\s+TABLE\b", AlterTable),
        (r"DROP\s+TABLE\b", DropTable),
        (r"CREATE\s+UNIQUE\s+INDEX\b", CreateIndex),
        (r"CREATE\s+INDEX\b", CreateIndex),
        (r"DROP\s+INDEX\b", DropIndex),
        (r"TRUNCATE\b", Truncate),
    ])
});

static MYSQL_RULES: Lazy<Vec<ClassificationRule>> = Lazy::new(|| {
    use StatementKind::*;
    build_rules(&[
        (SELECT, Select),
        (WITH, Select),
        (r"INSERT\b", Insert),
        (r"REPLACE\b", Insert),
        (r"UPDATE\b", Update),
        (r"DELETE\b", Delete),
        (r"CREATE\s+(?:TEMPORARY\s+)?TABLE\b", CreateTable),
        (r"ALTER\s+TABLE\b", AlterTable),
        (r"DROP\s+(?:TEMPORARY\s+)?TABLE\b", DropTable),
        (r"CREATE\s+UNIQUE\s+INDEX\b", CreateIndex),
        (r"CREATE\s+(?:FULLTEXT|SPATIAL)\s+INDEX\b", CreateIndex),
        (r"CREATE\s+INDEX\b", CreateIndex),
        (r"DROP\s+INDEX\b", DropIndex),
        (r"TRUNCATE\b", Truncate),
    ])
});

static SQLITE_RULES: Lazy<Vec<ClassificationRule>> = Lazy::new(|| {
    use StatementKind::*;
    build_rules(&[
        (SELECT, Select),
        (WITH, Select),
        (r"VALUES\b", Select),
        (
            r"INSERT\s+(?:OR\s+(?:ROLLBACK|ABORT|REPLACE|FAIL|IGNORE)\s+)?INTO\b",
            Insert,
        ),
        (r"REPLACE\s+INTO\b", Insert),
        (r"UPDATE\b", Update),
        (r"DELETE\s+FROM\b", Delete),
        (r"CREATE\s+(?:(?:TEMP|TEMPORARY)\s+)?TABLE\b", CreateTable),
        (r"CREATE\s+VIRTUAL\s+TABLE\b", CreateTable),
        (r"ALTER\s+TABLE\b", AlterTable),
        (r"DROP\s+TABLE\b", DropTable),
        (r"CREATE\s+UNIQUE\s+INDEX\b", CreateIndex),
        (r"CREATE\s+INDEX\b", CreateIndex),
        (r"DROP\s+INDEX\b", DropIndex),
    ])
});

static SQLSERVER_ALLOWED: Lazy<Vec<Regex>> = Lazy::new(|| {
    build_allow_list(&[
        r"BEGIN(?:\s+(?:TRAN|TRANSACTION|DISTRIBUTED))?",
        r"COMMIT",
        r"ROLLBACK",
        r"SAVE\s+(?:TRAN|TRANSACTION)",
        r"SET",
        r"USE",
        r"GO",
        r"EXEC(?:UTE)?",
        r"DECLARE",
        r"PRINT",
        r"GRANT|REVOKE|DENY",
        r"(?:CREATE|ALTER|DROP)\s+(?:VIEW|PROCEDURE|PROC|FUNCTION|TRIGGER|SCHEMA|DATABASE)",
        r"CREATE\s+OR\s+ALTER",
    ])
});

static POSTGRES_ALLOWED: Lazy<Vec<Regex>> = Lazy::new(|| {
    build_allow_list(&[
        r"BEGIN|START\s+TRANSACTION|COMMIT|END|ROLLBACK|ABORT",
        r"SAVEPOINT|RELEASE",
        r"SET|RESET|SHOW|DISCARD",
        r"EXPLAIN|ANALYZE|VACUUM|REINDEX|CLUSTER",
        r"GRANT|REVOKE",
        r"(?:CREATE|ALTER|DROP)\s+(?:OR\s+REPLACE\s+)?(?:MATERIALIZED\s+)?VIEW",
        r"REFRESH\s+MATERIALIZED\s+VIEW",
        r"(?:CREATE|ALTER|DROP)\s+(?:SCHEMA|SEQUENCE|EXTENSION|TYPE|DOMAIN|DATABASE|ROLE|USER)",
        r"(?:CREATE|DROP)\s+(?:OR\s+REPLACE\s+)?(?:FUNCTION|PROCEDURE|TRIGGER)",
        r"COMMENT\s+ON",
        r"LISTEN|NOTIFY|UNLISTEN",
        r"DO|CALL|COPY|LOCK",
        r"PREPARE|EXECUTE|DEALLOCATE",
    ])
});

static MYSQL_ALLOWED: Lazy<Vec<Regex>> = Lazy::new(|| {
    build_allow_list(&[
        r"BEGIN|START\s+TRANSACTION|COMMIT|ROLLBACK",
        r"SAVEPOINT|RELEASE\s+SAVEPOINT",
        r"SET|SHOW|DESCRIBE|DESC|EXPLAIN|USE",
        r"GRANT|REVOKE",
        r"(?:CREATE|DROP)\s+(?:DATABASE|SCHEMA)",
        r"(?:CREATE|ALTER|DROP)\s+(?:OR\s+REPLACE\s+)?VIEW",
        r"(?:CREATE|DROP)\s+(?:PROCEDURE|FUNCTION|TRIGGER|EVENT|USER)",
        r"LOCK\s+TABLES|UNLOCK\s+TABLES",
        r"CALL|FLUSH",
        r"(?:ANALYZE|OPTIMIZE|CHECK|REPAIR)\s+TABLE",
    ])
});

static SQLITE_ALLOWED: Lazy<Vec<Regex>> = Lazy::new(|| {
    build_allow_list(&[
        r"BEGIN|COMMIT|END|ROLLBACK",
        r"SAVEPOINT|RELEASE",
        r"PRAGMA|VACUUM|ANALYZE|REINDEX",
        r"ATTACH|DETACH",
        r"EXPLAIN",
        r"(?:CREATE|DROP)\s+(?:(?:TEMP|TEMPORARY)\s+)?(?:VIEW|TRIGGER)",
    ])
});

/// Ordered classification table of a dialect
pub fn classification_rules(dialect: SqlDialect) -> &'static [ClassificationRule] {
    match dialect {
        SqlDialect::SqlServer => &SQLSERVER_RULES,
        SqlDialect::PostgreSQL => &POSTGRES_RULES,
        SqlDialect::MySQL => &MYSQL_RULES,
        SqlDialect::SQLite => &SQLITE_RULES,
    }
}

fn allow_list(dialect: SqlDialect) -> &'static [Regex] {
    match dialect {
        SqlDialect::SqlServer => &SQLSERVER_ALLOWED,
        SqlDialect::PostgreSQL => &POSTGRES_ALLOWED,
        SqlDialect::MySQL => &MYSQL_ALLOWED,
        SqlDialect::SQLite => &SQLITE_ALLOWED,
    }
}

/// Classify a statement; comments are stripped first
pub fn classify(sql: &str, dialect: SqlDialect) -> StatementKind {
    classify_stripped(&strip_comments(sql, dialect), dialect)
}

/// Classify text that is already free of comments
pub(crate) fn classify_stripped(sql: &str, dialect: SqlDialect) -> StatementKind {
    let sql = sql.trim();
    classification_rules(dialect)
        .iter()
        .find(|rule| rule.matches(sql))
        .map(|rule| rule.kind())
        .unwrap_or_default()
}

static WITH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^WITH\b").expect("WITH pattern is valid"));

/// Kind of the statement a `WITH` list leads into.
///
/// `classify` reports every CTE as `Select`; this looks past the balanced
/// CTE bodies for the main statement (`WITH s AS (...) INSERT ...`). Input
/// must already be comment-free. Other statements classify as usual.
pub(crate) fn main_statement_kind(sql: &str, dialect: SqlDialect) -> StatementKind {
    let sql = sql.trim();
    if !WITH_RE.is_match(sql) {
        return classify_stripped(sql, dialect);
    }

    let bytes = sql.as_bytes();
    let mut depth = 0usize;
    let mut body_seen = false;
    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b'(' => depth += 1,
            b')' => {
                depth = depth.saturating_sub(1);
                body_seen |= depth == 0;
            }
            _ if depth == 0 && body_seen && is_word_start(bytes, i) => {
                let kind = classify_stripped(&sql[i..], dialect);
                if kind != StatementKind::Unknown {
                    return kind;
                }
            }
            _ => {}
        }
    }
    StatementKind::Select
}

fn is_word_start(bytes: &[u8], i: usize) -> bool {
    bytes[i].is_ascii_alphabetic()
        && (i == 0 || !(bytes[i - 1].is_ascii_alphanumeric() || bytes[i - 1] == b'_'))
}

/// Whether the statement is valid for the dialect even though it has no
/// table-bearing kind (transaction control, session settings, views, ...)
pub fn is_recognized_uncategorized(sql: &str, dialect: SqlDialect) -> bool {
    is_recognized_uncategorized_stripped(&strip_comments(sql, dialect), dialect)
}

pub(crate) fn is_recognized_uncategorized_stripped(sql: &str, dialect: SqlDialect) -> bool {
    let sql = sql.trim();
    allow_list(dialect).iter().any(|re| re.is_match(sql))
}
