//! PostgreSQL restrictions

use once_cell::sync::Lazy;
use regex::Regex;

use super::{on_conflict_placement, regex, returning_placement, top_clause, DialectRule, RuleInput};
use crate::result::StatementKind;

pub(super) const RULES: &[DialectRule] = &[
    DialectRule {
        name: "invalid-cast-call",
        description: "`::type(` reads as a cast applied like a function call",
        check: invalid_cast_call,
    },
    DialectRule {
        name: "top-clause",
        description: "SELECT TOP is SQL Server syntax",
        check: top_clause,
    },
    DialectRule {
        name: "backtick-identifier",
        description: "identifiers are quoted with double quotes",
        check: backtick_identifier,
    },
    DialectRule {
        name: "limit-comma",
        description: "LIMIT offset, count is MySQL syntax",
        check: limit_comma,
    },
    DialectRule {
        name: "returning-placement",
        description: "RETURNING only follows data-modifying statements",
        check: returning,
    },
    DialectRule {
        name: "on-conflict-placement",
        description: "ON CONFLICT only belongs to INSERT",
        check: on_conflict,
    },
    DialectRule {
        name: "temp-unlogged",
        description: "TEMPORARY and UNLOGGED tables are mutually exclusive",
        check: temp_unlogged,
    },
];

static CAST_CALL_RE: Lazy<Regex> = Lazy::new(|| regex(r"::\s*([A-Za-z_][A-Za-z0-9_]*)\s*\("));
static LIMIT_COMMA_RE: Lazy<Regex> = Lazy::new(|| regex(r"(?i)\bLIMIT\s+\d+\s*,\s*\d+"));
static TABLE_MODIFIERS_RE: Lazy<Regex> = Lazy::new(|| {
    regex(r"(?i)^\s*CREATE\s+((?:(?:GLOBAL|LOCAL|TEMP|TEMPORARY|UNLOGGED)\s+)+)TABLE\b")
});

// Best effort: `'1.5'::numeric(10, 2)` is legal and trips this rule too.
fn invalid_cast_call(input: &RuleInput<'_>) -> Vec<String> {
    CAST_CALL_RE
        .captures_iter(input.sql)
        .filter_map(|caps| caps.get(1))
        .map(|ty| {
            format!(
                "Invalid cast syntax near '::{}(': a type cast cannot be called like a function",
                ty.as_str()
            )
        })
        .collect()
}

fn backtick_identifier(input: &RuleInput<'_>) -> Vec<String> {
    if input.sql.contains('`') {
        vec!["Backtick-quoted identifiers are not supported in PostgreSQL; use double quotes".to_string()]
    } else {
        Vec::new()
    }
}

fn limit_comma(input: &RuleInput<'_>) -> Vec<String> {
    if LIMIT_COMMA_RE.is_match(input.sql) {
        vec![
            "LIMIT offset, count is not supported in PostgreSQL; use LIMIT count OFFSET offset"
                .to_string(),
        ]
    } else {
        Vec::new()
    }
}

fn returning(input: &RuleInput<'_>) -> Vec<String> {
    returning_placement(
        input,
        &[
            StatementKind::Insert,
            StatementKind::Update,
            StatementKind::Delete,
            StatementKind::Merge,
        ],
    )
}

fn on_conflict(input: &RuleInput<'_>) -> Vec<String> {
    on_conflict_placement(input, &[StatementKind::Insert])
}

fn temp_unlogged(input: &RuleInput<'_>) -> Vec<String> {
    let Some(modifiers) = TABLE_MODIFIERS_RE
        .captures(input.sql)
        .and_then(|caps| caps.get(1))
    else {
        return Vec::new();
    };
    let words: Vec<String> = modifiers
        .as_str()
        .split_whitespace()
        .map(str::to_uppercase)
        .collect();
    let temporary = words.iter().any(|w| w == "TEMP" || w == "TEMPORARY");
    let unlogged = words.iter().any(|w| w == "UNLOGGED");
    if temporary && unlogged {
        vec!["A table cannot be both TEMPORARY and UNLOGGED".to_string()]
    } else {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use crate::dialect::SqlDialect;
    use crate::rules::test_support::run;

    fn pg(sql: &str) -> Vec<String> {
        run(sql, SqlDialect::PostgreSQL)
    }

    #[test]
    fn test_valid_postgres_passes() {
        assert!(pg("SELECT id::text FROM users LIMIT 10 OFFSET 5").is_empty());
        assert!(pg("INSERT INTO t (a) VALUES (1) ON CONFLICT (a) DO NOTHING RETURNING id").is_empty());
        assert!(pg("CREATE UNLOGGED TABLE cache (k TEXT)").is_empty());
    }

    #[test]
    fn test_invalid_cast_call() {
        let errors = pg("SELECT price::decimal(10, 2) FROM items");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("::decimal("));
    }

    #[test]
    fn test_each_cast_call_reported() {
        assert_eq!(pg("SELECT a::int(4), b::varchar(3) FROM t").len(), 2);
    }

    #[test]
    fn test_backticks_rejected() {
        let errors = pg("SELECT `id` FROM t");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("Backtick"));
    }

    #[test]
    fn test_limit_comma() {
        assert_eq!(pg("SELECT * FROM t LIMIT 5, 10").len(), 1);
    }

    #[test]
    fn test_clause_placement() {
        let errors = pg("SELECT * FROM t RETURNING id");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("RETURNING"));

        let errors = pg("UPDATE t SET a = 1 ON CONFLICT DO NOTHING");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("ON CONFLICT"));
    }

    #[test]
    fn test_cte_led_dml_clauses() {
        assert!(pg("WITH moved AS (DELETE FROM a WHERE x = 1 RETURNING *) INSERT INTO b SELECT * FROM moved").is_empty());
        assert!(pg("WITH s AS (SELECT 1 AS a) INSERT INTO t (a) SELECT a FROM s ON CONFLICT DO NOTHING").is_empty());

        let errors = pg("WITH s AS (SELECT 1) SELECT * FROM s RETURNING id");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("not in a SELECT statement"));
    }

    #[test]
    fn test_temp_unlogged_exclusive() {
        let errors = pg("CREATE TEMP UNLOGGED TABLE t (a INT)");
        assert_eq!(errors, vec!["A table cannot be both TEMPORARY and UNLOGGED"]);
    }
}
