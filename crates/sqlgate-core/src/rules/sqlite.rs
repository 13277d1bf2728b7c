//! SQLite restrictions

use once_cell::sync::Lazy;
use regex::Regex;

use super::{
    merge_unsupported, on_conflict_placement, regex, returning_placement, top_clause, DialectRule,
    RuleInput,
};
use crate::result::StatementKind;

pub(super) const RULES: &[DialectRule] = &[
    DialectRule {
        name: "truncate-unsupported",
        description: "SQLite has no TRUNCATE statement",
        check: truncate_unsupported,
    },
    DialectRule {
        name: "merge-unsupported",
        description: "SQLite has no MERGE statement",
        check: merge_unsupported,
    },
    DialectRule {
        name: "top-clause",
        description: "SELECT TOP is SQL Server syntax",
        check: top_clause,
    },
    DialectRule {
        name: "alter-table-action",
        description: "ALTER TABLE supports only RENAME, ADD COLUMN and DROP COLUMN",
        check: alter_table_action,
    },
    DialectRule {
        name: "autoincrement-integer-key",
        description: "AUTOINCREMENT requires an INTEGER PRIMARY KEY column",
        check: autoincrement_integer_key,
    },
    DialectRule {
        name: "on-conflict-placement",
        description: "ON CONFLICT belongs to INSERT upserts and column constraints",
        check: on_conflict,
    },
    DialectRule {
        name: "returning-placement",
        description: "RETURNING only follows INSERT, UPDATE and DELETE",
        check: returning,
    },
];

static TRUNCATE_RE: Lazy<Regex> = Lazy::new(|| regex(r"(?i)^\s*TRUNCATE\b"));
static UNSUPPORTED_ALTER_RE: Lazy<Regex> = Lazy::new(|| {
    regex(
        r"(?i)\b(ALTER\s+COLUMN|MODIFY(?:\s+COLUMN)?|CHANGE\s+COLUMN|ADD\s+CONSTRAINT|DROP\s+CONSTRAINT|ADD\s+(?:PRIMARY\s+KEY|FOREIGN\s+KEY|UNIQUE|CHECK)|DROP\s+(?:PRIMARY\s+KEY|FOREIGN\s+KEY|INDEX))\b",
    )
});
static AUTOINCREMENT_RE: Lazy<Regex> = Lazy::new(|| regex(r"(?i)\bAUTOINCREMENT\b"));
static INTEGER_KEY_AUTOINCREMENT_RE: Lazy<Regex> = Lazy::new(|| {
    regex(
        r"(?i)\bINTEGER\s+(?:CONSTRAINT\s+\w+\s+)?PRIMARY\s+KEY(?:\s+(?:ASC|DESC))?(?:\s+ON\s+CONFLICT\s+\w+)?\s+AUTOINCREMENT\b",
    )
});

fn truncate_unsupported(input: &RuleInput<'_>) -> Vec<String> {
    if TRUNCATE_RE.is_match(input.sql) {
        vec!["TRUNCATE is not supported in SQLite; use DELETE FROM instead".to_string()]
    } else {
        Vec::new()
    }
}

fn alter_table_action(input: &RuleInput<'_>) -> Vec<String> {
    if input.kind != StatementKind::AlterTable {
        return Vec::new();
    }
    UNSUPPORTED_ALTER_RE
        .captures_iter(input.sql)
        .filter_map(|caps| caps.get(1))
        .map(|action| {
            let action = action.as_str().split_whitespace().collect::<Vec<_>>().join(" ");
            format!(
                "ALTER TABLE ... {} is not supported in SQLite; only RENAME TO, RENAME COLUMN, ADD COLUMN and DROP COLUMN are allowed",
                action.to_uppercase()
            )
        })
        .collect()
}

fn autoincrement_integer_key(input: &RuleInput<'_>) -> Vec<String> {
    let total = AUTOINCREMENT_RE.find_iter(input.sql).count();
    let valid = INTEGER_KEY_AUTOINCREMENT_RE.find_iter(input.sql).count();
    if total > valid {
        vec!["AUTOINCREMENT is only allowed on an INTEGER PRIMARY KEY column".to_string()]
    } else {
        Vec::new()
    }
}

fn on_conflict(input: &RuleInput<'_>) -> Vec<String> {
    on_conflict_placement(input, &[StatementKind::Insert, StatementKind::CreateTable])
}

fn returning(input: &RuleInput<'_>) -> Vec<String> {
    returning_placement(
        input,
        &[
            StatementKind::Insert,
            StatementKind::Update,
            StatementKind::Delete,
        ],
    )
}
