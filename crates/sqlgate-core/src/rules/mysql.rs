//! MySQL restrictions

use once_cell::sync::Lazy;
use regex::Regex;

use super::{clause_only_in, merge_unsupported, regex, returning_unsupported, top_clause, DialectRule, RuleInput};
use crate::result::StatementKind;

pub(super) const RULES: &[DialectRule] = &[
    DialectRule {
        name: "merge-unsupported",
        description: "MySQL has no MERGE statement",
        check: merge_unsupported,
    },
    DialectRule {
        name: "full-outer-join",
        description: "FULL [OUTER] JOIN is not implemented",
        check: full_outer_join,
    },
    DialectRule {
        name: "returning-unsupported",
        description: "MySQL has no RETURNING clause",
        check: returning_unsupported,
    },
    DialectRule {
        name: "top-clause",
        description: "SELECT TOP is SQL Server syntax",
        check: top_clause,
    },
    DialectRule {
        name: "bracket-identifier",
        description: "identifiers are quoted with backticks",
        check: bracket_identifier,
    },
    DialectRule {
        name: "on-duplicate-key-placement",
        description: "ON DUPLICATE KEY UPDATE only belongs to INSERT",
        check: on_duplicate_key,
    },
    DialectRule {
        name: "auto-increment-key",
        description: "an AUTO_INCREMENT column must be indexed as a key",
        check: auto_increment_key,
    },
    DialectRule {
        name: "query-cache-hints",
        description: "SQL_CACHE and SQL_NO_CACHE are mutually exclusive",
        check: query_cache_hints,
    },
];

static FULL_JOIN_RE: Lazy<Regex> = Lazy::new(|| regex(r"(?i)\bFULL\s+(?:OUTER\s+)?JOIN\b"));
static BRACKET_RE: Lazy<Regex> = Lazy::new(|| regex(r"\[[A-Za-z_][^\]\[]*\]"));
static ON_DUPLICATE_RE: Lazy<Regex> =
    Lazy::new(|| regex(r"(?i)\bON\s+DUPLICATE\s+KEY\s+UPDATE\b"));
static AUTO_INCREMENT_RE: Lazy<Regex> = Lazy::new(|| regex(r"(?i)\bAUTO_INCREMENT\b"));
static KEY_RE: Lazy<Regex> = Lazy::new(|| {
    regex(r"(?i)\b(?P<foreign>FOREIGN\s+)?(?:PRIMARY\s+KEY|UNIQUE|KEY|INDEX)\b")
});
static SQL_CACHE_RE: Lazy<Regex> = Lazy::new(|| regex(r"(?i)\bSQL_CACHE\b"));
static SQL_NO_CACHE_RE: Lazy<Regex> = Lazy::new(|| regex(r"(?i)\bSQL_NO_CACHE\b"));

fn full_outer_join(input: &RuleInput<'_>) -> Vec<String> {
    if FULL_JOIN_RE.is_match(input.sql) {
        vec!["FULL OUTER JOIN is not supported in MySQL; combine LEFT and RIGHT joins with UNION".to_string()]
    } else {
        Vec::new()
    }
}

fn bracket_identifier(input: &RuleInput<'_>) -> Vec<String> {
    BRACKET_RE
        .find_iter(input.sql)
        .map(|m| {
            format!(
                "Square-bracket identifier {} is not supported in MySQL; use backticks",
                m.as_str()
            )
        })
        .collect()
}

fn on_duplicate_key(input: &RuleInput<'_>) -> Vec<String> {
    clause_only_in(
        input,
        &ON_DUPLICATE_RE,
        "ON DUPLICATE KEY UPDATE",
        &[StatementKind::Insert],
    )
}

fn auto_increment_key(input: &RuleInput<'_>) -> Vec<String> {
    if input.kind != StatementKind::CreateTable {
        return Vec::new();
    }
    // `AUTO_INCREMENT = n` is the table option setting the counter start
    let column_attribute = AUTO_INCREMENT_RE
        .find_iter(input.sql)
        .any(|m| !input.sql[m.end()..].trim_start().starts_with('='));
    // A FOREIGN KEY does not index the column
    let indexed = KEY_RE
        .captures_iter(input.sql)
        .any(|caps| caps.name("foreign").is_none());
    if column_attribute && !indexed {
        vec!["AUTO_INCREMENT column must be defined as a key (PRIMARY KEY, UNIQUE or KEY)".to_string()]
    } else {
        Vec::new()
    }
}

fn query_cache_hints(input: &RuleInput<'_>) -> Vec<String> {
    if SQL_CACHE_RE.is_match(input.sql) && SQL_NO_CACHE_RE.is_match(input.sql) {
        vec!["SQL_CACHE and SQL_NO_CACHE cannot be used together".to_string()]
    } else {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use crate::dialect::SqlDialect;
    use crate::rules::test_support::run;

    fn mysql(sql: &str) -> Vec<String> {
        run(sql, SqlDialect::MySQL)
    }

    #[test]
    fn test_valid_mysql_passes() {
        assert!(mysql("SELECT `id` FROM `users` LIMIT 5, 10").is_empty());
        assert!(mysql("INSERT INTO t (a) VALUES (1) ON DUPLICATE KEY UPDATE a = 2").is_empty());
        assert!(mysql("CREATE TABLE t (id INT AUTO_INCREMENT PRIMARY KEY) AUTO_INCREMENT = 10").is_empty());
        assert!(mysql("SELECT data->'$[0]' FROM docs").is_empty());
    }

    #[test]
    fn test_merge_rejected() {
        let errors = mysql("MERGE INTO t USING s ON t.id = s.id WHEN MATCHED THEN DELETE");
        assert_eq!(errors, vec!["MERGE statements are not supported in MySQL"]);
    }

    #[test]
    fn test_full_outer_join_rejected() {
        assert_eq!(mysql("SELECT * FROM a FULL OUTER JOIN b ON a.id = b.id").len(), 1);
        assert_eq!(mysql("SELECT * FROM a FULL JOIN b ON a.id = b.id").len(), 1);
    }

    #[test]
    fn test_returning_rejected() {
        let errors = mysql("DELETE FROM t WHERE id = 1 RETURNING id");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("RETURNING"));
    }

    #[test]
    fn test_bracket_identifier_rejected() {
        let errors = mysql("SELECT [name] FROM [users]");
        assert_eq!(errors.len(), 2);
        assert!(errors[0].contains("[name]"));
    }

    #[test]
    fn test_on_duplicate_key_outside_insert() {
        let errors = mysql("UPDATE t SET a = 1 ON DUPLICATE KEY UPDATE a = 2");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("ON DUPLICATE KEY UPDATE"));
    }

    #[test]
    fn test_auto_increment_requires_key() {
        let errors = mysql("CREATE TABLE t (id INT AUTO_INCREMENT, name TEXT)");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("AUTO_INCREMENT"));
        assert!(mysql("CREATE TABLE t (id INT AUTO_INCREMENT, KEY (id))").is_empty());
    }

    #[test]
    fn test_foreign_key_does_not_satisfy_auto_increment() {
        let errors = mysql(
            "CREATE TABLE t (id INT AUTO_INCREMENT, k INT, FOREIGN KEY (k) REFERENCES p(id))",
        );
        assert_eq!(errors.len(), 1);
        assert!(mysql(
            "CREATE TABLE t (id INT AUTO_INCREMENT, k INT, INDEX (id), FOREIGN KEY (k) REFERENCES p(id))"
        )
        .is_empty());
    }

    #[test]
    fn test_double_quoted_text_is_not_sql() {
        assert!(mysql("SELECT id FROM t WHERE note = \"RETURNING soon\"").is_empty());
        assert!(mysql("SELECT \"[legacy]\" AS tag FROM t").is_empty());
    }

    #[test]
    fn test_cache_hints_exclusive() {
        assert_eq!(mysql("SELECT SQL_CACHE SQL_NO_CACHE * FROM t").len(), 1);
        assert!(mysql("SELECT SQL_NO_CACHE * FROM t").is_empty());
    }
}
