// Integration tests for the dialect validators
use std::sync::Arc;
use std::thread;

use pretty_assertions::assert_eq;
use sqlgate_core::result::EMPTY_STATEMENT;
use sqlgate_core::{create_validator, SqlDialect, SqlValidator, StatementKind};

fn validator(dialect: SqlDialect) -> Box<dyn SqlValidator> {
    create_validator(dialect).unwrap()
}

const PATTERN_DIALECTS: [SqlDialect; 3] =
    [SqlDialect::PostgreSQL, SqlDialect::MySQL, SqlDialect::SQLite];

#[test]
fn test_empty_input_every_dialect() {
    for dialect in SqlDialect::ALL {
        let v = validator(dialect);
        for sql in ["", "   ", "\n\t  \r\n"] {
            let result = v.validate_syntax(sql);
            assert!(!result.is_valid());
            assert_eq!(result.errors(), [EMPTY_STATEMENT.to_string()]);
            assert_eq!(v.statement_type(sql), StatementKind::Unknown);
            assert!(v.extract_table_names(sql).is_empty());
        }
        assert_eq!(v.validate_optional(None), v.validate_syntax(""));
    }
}

#[test]
fn test_simple_select_every_dialect() {
    for dialect in SqlDialect::ALL {
        let v = validator(dialect);
        let sql = "SELECT col FROM T";
        let result = v.validate_syntax(sql);
        assert!(result.is_valid(), "{}: {:?}", dialect, result.errors());
        assert_eq!(v.statement_type(sql), StatementKind::Select);
        assert_eq!(v.extract_table_names(sql).to_vec(), vec!["T"]);
        assert_eq!(v.validate_optional(Some(sql)), result);
    }
}

#[test]
fn test_validation_is_idempotent() {
    let inputs = [
        "SELECT col FROM T",
        "SELECT * FROM t WHERE name = 'abc",
        "TRUNCATE TABLE Users",
        "SELEC 1",
    ];
    for dialect in SqlDialect::ALL {
        let v = validator(dialect);
        for sql in inputs {
            assert_eq!(v.validate_syntax(sql), v.validate_syntax(sql));
            assert_eq!(v.statement_type(sql), v.statement_type(sql));
            assert_eq!(v.extract_table_names(sql), v.extract_table_names(sql));
        }
    }
}

#[test]
fn test_unclosed_quote_every_dialect() {
    for dialect in SqlDialect::ALL {
        let v = validator(dialect);
        let sql = "SELECT * FROM t WHERE name = 'abc";
        let result = v.validate_syntax(sql);
        assert!(!result.is_valid(), "{} accepted an unclosed quote", dialect);
        assert!(!result.errors().is_empty());
        assert_eq!(v.statement_type(sql), StatementKind::Unknown);
        assert!(v.extract_table_names(sql).is_empty());
    }
}

#[test]
fn test_truncate_depends_on_dialect() {
    let sql = "TRUNCATE TABLE Users";
    for dialect in [SqlDialect::SqlServer, SqlDialect::PostgreSQL, SqlDialect::MySQL] {
        let v = validator(dialect);
        assert!(v.validate_syntax(sql).is_valid(), "{}", dialect);
        assert_eq!(v.statement_type(sql), StatementKind::Truncate);
    }

    let sqlite = validator(SqlDialect::SQLite);
    let result = sqlite.validate_syntax(sql);
    assert!(!result.is_valid());
    assert!(result
        .errors()
        .iter()
        .any(|e| e.contains("TRUNCATE is not supported in SQLite")));
    assert_eq!(sqlite.statement_type(sql), StatementKind::Unknown);
}

#[test]
fn test_schema_qualified_name_keeps_table() {
    for dialect in SqlDialect::ALL {
        let v = validator(dialect);
        let tables = v.extract_table_names("SELECT * FROM dbo.Orders");
        assert_eq!(tables.to_vec(), vec!["Orders"], "{}", dialect);
    }
}

#[test]
fn test_create_unique_index_every_dialect() {
    for dialect in SqlDialect::ALL {
        let v = validator(dialect);
        let sql = "CREATE UNIQUE INDEX ix_users_email ON Users (Email)";
        assert!(v.validate_syntax(sql).is_valid(), "{}", dialect);
        assert_eq!(v.statement_type(sql), StatementKind::CreateIndex);
    }
}

#[test]
fn test_pattern_dialects_fold_table_case() {
    let sql = "SELECT * FROM Users u JOIN USERS v ON u.id = v.id JOIN Orders o ON o.uid = u.id";
    for dialect in PATTERN_DIALECTS {
        let tables = validator(dialect).extract_table_names(sql);
        assert_eq!(tables.to_vec(), vec!["Users", "Orders"], "{}", dialect);
    }
}

#[test]
fn test_grammar_dialect_keeps_exact_names() {
    let sql = "SELECT * FROM Users u JOIN USERS v ON u.id = v.id";
    let tables = validator(SqlDialect::SqlServer).extract_table_names(sql);
    assert_eq!(tables.to_vec(), vec!["Users", "USERS"]);
}

#[test]
fn test_statement_kinds_every_dialect() {
    let cases = [
        ("INSERT INTO t (a) VALUES (1)", StatementKind::Insert),
        ("UPDATE t SET a = 1 WHERE b = 2", StatementKind::Update),
        ("DELETE FROM t WHERE a = 1", StatementKind::Delete),
        ("CREATE TABLE t (a INT)", StatementKind::CreateTable),
        ("ALTER TABLE t ADD COLUMN b INT", StatementKind::AlterTable),
        ("DROP TABLE t", StatementKind::DropTable),
        ("CREATE INDEX ix ON t (a)", StatementKind::CreateIndex),
    ];
    for dialect in PATTERN_DIALECTS {
        let v = validator(dialect);
        for (sql, kind) in cases {
            assert_eq!(v.statement_type(sql), kind, "{}: {}", dialect, sql);
        }
    }
}

#[test]
fn test_dialect_specific_rejections() {
    let mysql = validator(SqlDialect::MySQL);
    assert!(!mysql.validate_syntax("SELECT * FROM a FULL OUTER JOIN b ON a.id = b.id").is_valid());

    let postgres = validator(SqlDialect::PostgreSQL);
    assert!(!postgres.validate_syntax("SELECT * FROM t LIMIT 5, 10").is_valid());
    assert!(mysql.validate_syntax("SELECT * FROM t LIMIT 5, 10").is_valid());

    let sqlite = validator(SqlDialect::SQLite);
    assert!(!sqlite.validate_syntax("SELECT TOP 5 * FROM t").is_valid());
}

#[test]
fn test_comments_and_literals_do_not_leak_tables() {
    let sql = "-- FROM Ghost\nSELECT 'FROM Phantom' AS title FROM Accounts /* JOIN Hidden */";
    for dialect in SqlDialect::ALL {
        let tables = validator(dialect).extract_table_names(sql);
        assert_eq!(tables.to_vec(), vec!["Accounts"], "{}", dialect);
    }
}

#[test]
fn test_shared_validator_across_threads() {
    for dialect in SqlDialect::ALL {
        let shared: Arc<dyn SqlValidator> = Arc::from(validator(dialect));
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let v = Arc::clone(&shared);
                thread::spawn(move || {
                    let sql = format!("SELECT col FROM T{}", i);
                    (v.validate_syntax(&sql).is_valid(), v.extract_table_names(&sql).to_vec())
                })
            })
            .collect();

        for (i, handle) in handles.into_iter().enumerate() {
            let (valid, tables) = handle.join().unwrap();
            assert!(valid);
            assert_eq!(tables, vec![format!("T{}", i)]);
        }
    }
}

#[test]
fn test_cte_led_dml_keeps_its_clauses() {
    let pg = validator(SqlDialect::PostgreSQL);
    let sql = "WITH moved AS (DELETE FROM a RETURNING *) INSERT INTO b SELECT * FROM moved RETURNING id";
    let result = pg.validate_syntax(sql);
    assert!(result.is_valid(), "{:?}", result.errors());

    let sqlite = validator(SqlDialect::SQLite);
    let sql = "WITH s AS (SELECT 1 AS v) UPDATE t SET a = (SELECT v FROM s) RETURNING a";
    let result = sqlite.validate_syntax(sql);
    assert!(result.is_valid(), "{:?}", result.errors());
}

#[test]
fn test_mysql_double_quoted_text_is_data() {
    let v = validator(SqlDialect::MySQL);
    let sql = "SELECT \"from users\" AS label FROM t WHERE note = \"RETURNING soon\"";
    assert!(v.validate_syntax(sql).is_valid(), "{:?}", v.validate_syntax(sql).errors());
    assert_eq!(v.extract_table_names(sql).to_vec(), vec!["t"]);
}

#[test]
fn test_dollar_inside_postgres_identifier() {
    let v = validator(SqlDialect::PostgreSQL);
    let sql = "SELECT a$b$c FROM t";
    assert!(v.validate_syntax(sql).is_valid(), "{:?}", v.validate_syntax(sql).errors());
    assert_eq!(v.extract_table_names(sql).to_vec(), vec!["t"]);
}

#[test]
fn test_table_functions_are_not_tables() {
    let v = validator(SqlDialect::PostgreSQL);
    let sql = "SELECT g FROM generate_series(1, 10) AS g JOIN t ON t.id = g";
    assert!(v.validate_syntax(sql).is_valid());
    assert_eq!(v.extract_table_names(sql).to_vec(), vec!["t"]);
}
