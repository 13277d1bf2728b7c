//! Dialect to validator mapping

use indexmap::IndexMap;
use once_cell::sync::Lazy;

use crate::dialect::SqlDialect;
use crate::error::ValidatorError;
use crate::validator::{GrammarValidator, PatternValidator, SqlValidator};

/// Builds a fresh validator for one dialect
pub type ValidatorConstructor = fn() -> Box<dyn SqlValidator>;

static BUILTIN: Lazy<ValidatorRegistry> = Lazy::new(ValidatorRegistry::builtin);

/// Create a validator from the built-in registry.
///
/// Every [`SqlDialect`] is registered there, so this only fails for a
/// registry that was built without one.
pub fn create_validator(dialect: SqlDialect) -> Result<Box<dyn SqlValidator>, ValidatorError> {
    BUILTIN.create(dialect)
}

/// Registry of validator constructors, keyed by dialect
#[derive(Clone)]
pub struct ValidatorRegistry {
    constructors: IndexMap<SqlDialect, ValidatorConstructor>,
}

impl ValidatorRegistry {
    /// Registry with no dialects at all
    pub fn empty() -> Self {
        Self {
            constructors: IndexMap::new(),
        }
    }

    /// Grammar-backed SQL Server plus pattern-based PostgreSQL, MySQL and SQLite
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        registry.register(SqlDialect::SqlServer, || Box::new(GrammarValidator::sql_server()));
        registry.register(SqlDialect::PostgreSQL, || Box::new(PatternValidator::postgres()));
        registry.register(SqlDialect::MySQL, || Box::new(PatternValidator::mysql()));
        registry.register(SqlDialect::SQLite, || Box::new(PatternValidator::sqlite()));
        registry
    }

    /// Register or replace the constructor for a dialect
    pub fn register(&mut self, dialect: SqlDialect, constructor: ValidatorConstructor) {
        if self.constructors.insert(dialect, constructor).is_some() {
            tracing::debug!(%dialect, "replaced validator constructor");
        }
    }

    pub fn create(&self, dialect: SqlDialect) -> Result<Box<dyn SqlValidator>, ValidatorError> {
        let constructor = self
            .constructors
            .get(&dialect)
            .ok_or(ValidatorError::UnsupportedDialect(dialect))?;
        tracing::trace!(%dialect, "creating validator");
        Ok(constructor())
    }

    /// Registered dialects, in registration order
    pub fn dialects(&self) -> impl Iterator<Item = SqlDialect> + '_ {
        self.constructors.keys().copied()
    }

    pub fn supports(&self, dialect: SqlDialect) -> bool {
        self.constructors.contains_key(&dialect)
    }
}

impl Default for ValidatorRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl std::fmt::Debug for ValidatorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.constructors.keys()).finish()
    }
}
