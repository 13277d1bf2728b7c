//! sqlgate-core: multi-dialect SQL syntax validation
//!
//! This library checks individual SQL statements for SQL Server, PostgreSQL,
//! MySQL and SQLite without a database connection. Besides a valid/invalid
//! verdict it classifies the statement and lists the tables it references.

pub mod classifier;
pub mod dialect;
pub mod error;
pub mod extractor;
pub mod registry;
pub mod result;
pub mod rules;
pub mod scanner;
pub mod validator;

pub use dialect::SqlDialect;
pub use error::{SyntaxError, ValidatorError};
pub use registry::{create_validator, ValidatorRegistry};
pub use result::{StatementKind, TableNameSet, ValidationResult};
pub use validator::{GrammarValidator, PatternValidator, SqlValidator};
