//! Table reference extractor
//!
//! Clause-scoped pattern extraction: every name following `FROM`, `JOIN`,
//! `INTO`, `UPDATE` or `TABLE` is collected, unwrapped of its identifier
//! quoting and reduced to the unqualified table name. Comments are stripped
//! and string literal contents blanked before matching.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::dialect::SqlDialect;
use crate::result::TableNameSet;
use crate::scanner::{blank_string_literals, strip_comments};

/// Compiled patterns of one dialect's identifier grammar
#[derive(Debug)]
struct ExtractorPatterns {
    /// Clause introducer followed by a table name
    clause: Regex,
    /// `[alias] , name` continuing a comma-separated FROM list
    continuation: Regex,
    /// A single, possibly quoted, name part
    part: Regex,
}

const BARE: &str = r"[A-Za-z_][A-Za-z0-9_$]*";
const SQLSERVER_BARE: &str = r"#{0,2}[A-Za-z_@][A-Za-z0-9_$#@]*";
const DOUBLE_QUOTED: &str = r#""(?:[^"]|"")+""#;
const BACKTICK_QUOTED: &str = r"`(?:[^`]|``)+`";
const BRACKET_QUOTED: &str = r"\[(?:[^\]]|\]\])+\]";

impl ExtractorPatterns {
    fn new(part_alternatives: &[&str]) -> Self {
        let part = format!("(?:{})", part_alternatives.join("|"));
        let name = format!(r"{part}(?:\s*\.\s*{part}){{0,3}}");
        let clause = format!(
            r"(?i)\b(?P<clause>FROM|JOIN|INTO|UPDATE|TABLE)\s+(?:(?:ONLY|IF\s+(?:NOT\s+)?EXISTS)\s+)?(?P<name>{name})"
        );
        let continuation =
            format!(r"(?i)^(?:\s+(?:AS\s+)?(?P<alias>{part}))?\s*,\s*(?P<name>{name})");
        Self {
            clause: Regex::new(&clause).expect("extractor clause pattern is valid"),
            continuation: Regex::new(&continuation).expect("extractor continuation pattern is valid"),
            part: Regex::new(&part).expect("extractor part pattern is valid"),
        }
    }
}

static SQLSERVER_PATTERNS: Lazy<ExtractorPatterns> =
    Lazy::new(|| ExtractorPatterns::new(&[BRACKET_QUOTED, DOUBLE_QUOTED, SQLSERVER_BARE]));

static POSTGRES_PATTERNS: Lazy<ExtractorPatterns> =
    Lazy::new(|| ExtractorPatterns::new(&[DOUBLE_QUOTED, BARE]));

// `"..."` is a string literal in MySQL
static MYSQL_PATTERNS: Lazy<ExtractorPatterns> =
    Lazy::new(|| ExtractorPatterns::new(&[BACKTICK_QUOTED, BARE]));

static SQLITE_PATTERNS: Lazy<ExtractorPatterns> = Lazy::new(|| {
    ExtractorPatterns::new(&[DOUBLE_QUOTED, BACKTICK_QUOTED, BRACKET_QUOTED, BARE])
});

fn patterns(dialect: SqlDialect) -> &'static ExtractorPatterns {
    match dialect {
        SqlDialect::SqlServer => &SQLSERVER_PATTERNS,
        SqlDialect::PostgreSQL => &POSTGRES_PATTERNS,
        SqlDialect::MySQL => &MYSQL_PATTERNS,
        SqlDialect::SQLite => &SQLITE_PATTERNS,
    }
}

/// Words that can follow a clause introducer without naming a table
const NON_TABLE_WORDS: &[&str] = &[
    "SELECT", "SET", "LATERAL", "VALUES", "UNNEST", "WHERE", "ON", "USING", "AS", "OUTFILE",
    "DUMPFILE", "NOWAIT", "OF", "SKIP", "DUAL", "WITH", "DEFAULT",
];

/// Words that end a FROM item rather than aliasing it
const CLAUSE_WORDS: &[&str] = &[
    "WHERE", "JOIN", "INNER", "LEFT", "RIGHT", "FULL", "CROSS", "NATURAL", "ON", "USING",
    "GROUP", "ORDER", "HAVING", "LIMIT", "OFFSET", "UNION", "EXCEPT", "INTERSECT", "WINDOW",
    "FOR", "SET", "RETURNING", "OUTER", "LATERAL",
];

/// Functions whose argument syntax uses FROM (`EXTRACT(YEAR FROM ts)`)
const FROM_ARGUMENT_FUNCTIONS: &[&str] = &["EXTRACT", "TRIM", "SUBSTRING", "SUBSTR", "POSITION", "OVERLAY"];

/// Words that turn a following UPDATE into a clause, not a statement
const UPDATE_PREFIX_WORDS: &[&str] = &["KEY", "DO", "FOR", "NO"];

/// Extract the set of table names referenced by `sql`
pub fn extract_table_names(sql: &str, dialect: SqlDialect) -> TableNameSet {
    let text = blank_string_literals(&strip_comments(sql, dialect), dialect);
    extract_from_prepared(&text, dialect)
}

/// Extraction over text that is already comment-free with blanked literals
pub(crate) fn extract_from_prepared(text: &str, dialect: SqlDialect) -> TableNameSet {
    let patterns = patterns(dialect);
    let mut tables = TableNameSet::case_insensitive();

    for caps in patterns.clause.captures_iter(text) {
        let (Some(clause), Some(name)) = (caps.name("clause"), caps.name("name")) else {
            continue;
        };
        if is_clause_word_usage(text, clause.start(), clause.as_str()) {
            continue;
        }
        // Table-valued function such as `FROM generate_series(1, 10)`
        if is_source_clause(clause.as_str()) && is_call(text, name.end()) {
            continue;
        }
        add_name(&mut tables, patterns, dialect, name.as_str());

        if clause.as_str().eq_ignore_ascii_case("FROM") {
            collect_comma_list(&mut tables, patterns, dialect, text, name.end());
        }
    }

    tables
}

/// Follow `FROM a x, b y, c` past the first item
fn collect_comma_list(
    tables: &mut TableNameSet,
    patterns: &ExtractorPatterns,
    dialect: SqlDialect,
    text: &str,
    mut pos: usize,
) {
    while let Some(caps) = patterns.continuation.captures(&text[pos..]) {
        if alias_is_clause_word(&caps) {
            break;
        }
        let Some(name) = caps.name("name") else { break };
        if is_call(text, pos + name.end()) {
            break;
        }
        add_name(tables, patterns, dialect, name.as_str());
        pos += name.end();
    }
}

fn is_source_clause(clause: &str) -> bool {
    clause.eq_ignore_ascii_case("FROM") || clause.eq_ignore_ascii_case("JOIN")
}

/// Whether the name ending at `end` is followed by an argument list
fn is_call(text: &str, end: usize) -> bool {
    text[end..].trim_start().starts_with('(')
}

fn alias_is_clause_word(caps: &Captures<'_>) -> bool {
    caps.name("alias")
        .map(|alias| is_one_of(alias.as_str(), CLAUSE_WORDS))
        .unwrap_or(false)
}

/// Whether a matched introducer is really part of another construct
fn is_clause_word_usage(text: &str, clause_start: usize, clause: &str) -> bool {
    let before = text[..clause_start].trim_end();
    if clause.eq_ignore_ascii_case("UPDATE") {
        return is_one_of(previous_word(before), UPDATE_PREFIX_WORDS);
    }
    if clause.eq_ignore_ascii_case("FROM") {
        // IS DISTINCT FROM
        if previous_word(before).eq_ignore_ascii_case("DISTINCT") {
            return true;
        }
        return enclosing_function(before)
            .map(|f| is_one_of(f, FROM_ARGUMENT_FUNCTIONS))
            .unwrap_or(false);
    }
    false
}

/// Trailing identifier-like word of `before`
fn previous_word(before: &str) -> &str {
    let start = before
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_alphanumeric() || *c == '_')
        .last()
        .map(|(i, _)| i)
        .unwrap_or(before.len());
    &before[start..]
}

/// Name of the call whose parentheses are still open at the end of `before`
fn enclosing_function(before: &str) -> Option<&str> {
    let mut depth = 0usize;
    for (i, c) in before.char_indices().rev() {
        match c {
            ')' => depth += 1,
            '(' if depth == 0 => return Some(previous_word(before[..i].trim_end())),
            '(' => depth -= 1,
            _ => {}
        }
    }
    None
}

fn is_one_of(word: &str, list: &[&str]) -> bool {
    list.iter().any(|w| w.eq_ignore_ascii_case(word))
}

fn add_name(
    tables: &mut TableNameSet,
    patterns: &ExtractorPatterns,
    dialect: SqlDialect,
    qualified: &str,
) {
    let parts: Vec<String> = patterns
        .part
        .find_iter(qualified)
        .map(|m| unquote_identifier(m.as_str()))
        .collect();
    let Some(table) = parts.last() else { return };

    if parts.len() == 1 && is_one_of(table, NON_TABLE_WORDS) && !is_quoted(qualified) {
        return;
    }
    let schema = parts.len().checked_sub(2).map(|i| parts[i].as_str());
    if dialect.is_system_table(schema, table) {
        tracing::trace!(table = %table, "skipping system table");
        return;
    }
    tables.insert(table.clone());
}

fn is_quoted(name: &str) -> bool {
    name.starts_with(['"', '`', '['])
}

/// Remove identifier quoting and collapse doubled closing characters
pub fn unquote_identifier(part: &str) -> String {
    let mut chars = part.chars();
    let (first, last) = (chars.next(), part.chars().last());
    let close = match (first, last) {
        (Some('"'), Some('"')) => '"',
        (Some('`'), Some('`')) => '`',
        (Some('['), Some(']')) => ']',
        _ => return part.to_string(),
    };
    if part.len() < 2 {
        return part.to_string();
    }
    let inner = &part[1..part.len() - 1];
    let doubled: String = [close, close].iter().collect();
    inner.replace(&doubled, &close.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn names(sql: &str, dialect: SqlDialect) -> Vec<String> {
        extract_table_names(sql, dialect).to_vec()
    }

    #[test]
    fn test_simple_select() {
        for dialect in SqlDialect::ALL {
            assert_eq!(names("SELECT col FROM T", dialect), vec!["T"]);
        }
    }

    #[test]
    fn test_case_insensitive_dedup() {
        let sql = "SELECT * FROM Users u1 JOIN users u2 ON u1.manager_id = u2.id";
        assert_eq!(names(sql, SqlDialect::PostgreSQL), vec!["Users"]);
    }

    #[test]
    fn test_schema_qualification_stripped() {
        assert_eq!(names("SELECT * FROM dbo.Orders", SqlDialect::SqlServer), vec!["Orders"]);
        assert_eq!(
            names("SELECT * FROM [dbo].[Order Details]", SqlDialect::SqlServer),
            vec!["Order Details"]
        );
        assert_eq!(
            names("SELECT * FROM `shop`.`orders`", SqlDialect::MySQL),
            vec!["orders"]
        );
    }

    #[test]
    fn test_all_clause_introducers() {
        let sql = "INSERT INTO audit SELECT * FROM a JOIN b ON a.id = b.id";
        assert_eq!(names(sql, SqlDialect::SQLite), vec!["audit", "a", "b"]);
        assert_eq!(names("UPDATE accounts SET x = 1", SqlDialect::MySQL), vec!["accounts"]);
        assert_eq!(
            names("CREATE TABLE IF NOT EXISTS logs (id INT)", SqlDialect::SQLite),
            vec!["logs"]
        );
        assert_eq!(names("DROP TABLE IF EXISTS logs", SqlDialect::PostgreSQL), vec!["logs"]);
    }

    #[test]
    fn test_comma_separated_from() {
        let sql = "SELECT * FROM a x, b AS y, c WHERE x.id = y.id";
        assert_eq!(names(sql, SqlDialect::PostgreSQL), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_comments_and_strings_ignored() {
        let sql = "SELECT 'from fake' FROM real_table -- JOIN ghost\n/* FROM phantom */";
        assert_eq!(names(sql, SqlDialect::PostgreSQL), vec!["real_table"]);
    }

    #[test]
    fn test_literal_before_from() {
        assert_eq!(names("SELECT 'x' FROM t", SqlDialect::SQLite), vec!["t"]);
    }

    #[test]
    fn test_subquery_tables() {
        let sql = "SELECT * FROM (SELECT id FROM inner_t) s JOIN outer_t o ON o.id = s.id";
        assert_eq!(names(sql, SqlDialect::MySQL), vec!["inner_t", "outer_t"]);
    }

    #[test]
    fn test_update_clauses_not_tables() {
        let mysql = "INSERT INTO t (a) VALUES (1) ON DUPLICATE KEY UPDATE a = 2";
        assert_eq!(names(mysql, SqlDialect::MySQL), vec!["t"]);

        let pg = "INSERT INTO t (a) VALUES (1) ON CONFLICT (a) DO UPDATE SET a = 2";
        assert_eq!(names(pg, SqlDialect::PostgreSQL), vec!["t"]);

        let locking = "SELECT * FROM t FOR UPDATE NOWAIT";
        assert_eq!(names(locking, SqlDialect::PostgreSQL), vec!["t"]);
    }

    #[test]
    fn test_extract_function_not_table() {
        let sql = "SELECT EXTRACT(YEAR FROM created_at) FROM orders";
        assert_eq!(names(sql, SqlDialect::PostgreSQL), vec!["orders"]);
        let sql = "SELECT TRIM(BOTH ' ' FROM name) FROM people";
        assert_eq!(names(sql, SqlDialect::PostgreSQL), vec!["people"]);
        let sql = "SELECT a FROM t WHERE a IS DISTINCT FROM b";
        assert_eq!(names(sql, SqlDialect::PostgreSQL), vec!["t"]);
    }

    #[test]
    fn test_table_functions_not_tables() {
        let sql = "SELECT * FROM generate_series(1, 10) g JOIN t ON t.id = g";
        assert_eq!(names(sql, SqlDialect::PostgreSQL), vec!["t"]);
        let sql = "SELECT * FROM a, json_each(a.doc) j";
        assert_eq!(names(sql, SqlDialect::SQLite), vec!["a"]);
        // INTO keeps its column list
        assert_eq!(names("INSERT INTO t (a) VALUES (1)", SqlDialect::MySQL), vec!["t"]);
    }

    #[test]
    fn test_mysql_double_quoted_text_is_a_string() {
        let sql = "SELECT \"from users\" AS label FROM t";
        assert_eq!(names(sql, SqlDialect::MySQL), vec!["t"]);
        assert_eq!(
            names("SELECT * FROM \"Users\"", SqlDialect::PostgreSQL),
            vec!["Users"]
        );
    }

    #[test]
    fn test_system_tables_excluded() {
        assert_eq!(
            names("SELECT name FROM sqlite_master JOIN t", SqlDialect::SQLite),
            vec!["t"]
        );
        assert!(names("SELECT * FROM pg_catalog.pg_class", SqlDialect::PostgreSQL).is_empty());
        assert!(names("SELECT * FROM information_schema.tables", SqlDialect::MySQL).is_empty());
        assert_eq!(names("SELECT * FROM sys.objects, dbo.t", SqlDialect::SqlServer), vec!["t"]);
    }

    #[test]
    fn test_lateral_is_not_a_table() {
        let sql = "SELECT * FROM a JOIN LATERAL (SELECT 1) x ON true";
        assert_eq!(names(sql, SqlDialect::PostgreSQL), vec!["a"]);
    }

    #[test]
    fn test_sqlserver_temp_table() {
        assert_eq!(names("SELECT * INTO #staging FROM src", SqlDialect::SqlServer), vec!["#staging", "src"]);
    }

    #[test]
    fn test_unquote_identifier() {
        assert_eq!(unquote_identifier("\"a\"\"b\""), "a\"b");
        assert_eq!(unquote_identifier("[a]]b]"), "a]b");
        assert_eq!(unquote_identifier("`x`"), "x");
        assert_eq!(unquote_identifier("plain"), "plain");
    }

    #[test]
    fn test_idempotent() {
        let sql = "SELECT * FROM a JOIN b ON a.id = b.id";
        assert_eq!(
            extract_table_names(sql, SqlDialect::MySQL),
            extract_table_names(sql, SqlDialect::MySQL)
        );
    }
}
