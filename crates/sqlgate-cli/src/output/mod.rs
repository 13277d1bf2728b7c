//! Output formatting

use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use sqlgate_core::scanner::offset_to_line_col;
use sqlgate_core::{SqlDialect, SqlValidator, TableNameSet, ValidationResult};

use crate::args::OutputFormat;

/// Validation outcome of one statement of a file
#[derive(Debug, Serialize)]
pub struct StatementReport {
    pub line: usize,
    pub column: usize,
    pub sql: String,
    pub kind: String,
    #[serde(flatten)]
    pub result: ValidationResult,
    pub tables: TableNameSet,
}

impl StatementReport {
    /// Validate `statement`, a slice of `source`, and record where it starts
    pub fn build(validator: &dyn SqlValidator, source: &str, statement: &str) -> Self {
        let (line, column) = offset_to_line_col(source, offset_within(source, statement));
        Self {
            line,
            column,
            sql: statement.to_string(),
            kind: validator.statement_type(statement).to_string(),
            result: validator.validate_syntax(statement),
            tables: validator.extract_table_names(statement),
        }
    }
}

/// Reports for every statement of one file
#[derive(Debug, Serialize)]
pub struct FileReport {
    pub file: String,
    pub dialect: SqlDialect,
    pub statements: Vec<StatementReport>,
}

impl FileReport {
    pub fn invalid_count(&self) -> usize {
        self.statements
            .iter()
            .filter(|s| !s.result.is_valid())
            .count()
    }
}

/// Byte offset of `part` inside `source`; 0 when it is not a subslice
fn offset_within(source: &str, part: &str) -> usize {
    let start = source.as_ptr() as usize;
    let ptr = part.as_ptr() as usize;
    if ptr >= start && ptr + part.len() <= start + source.len() {
        ptr - start
    } else {
        0
    }
}

/// Output formatter for validation reports
pub struct OutputFormatter {
    format: OutputFormat,
    quiet: bool,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat, quiet: bool) -> Self {
        Self { format, quiet }
    }

    /// Print all reports in the configured format
    pub fn print_reports(&self, reports: &[FileReport]) -> Result<()> {
        match self.format {
            OutputFormat::Human => {
                for report in reports {
                    self.print_human(report);
                }
                self.print_summary(reports);
                Ok(())
            }
            OutputFormat::Json => self.print_json(reports),
        }
    }

    fn print_human(&self, report: &FileReport) {
        for statement in report.statements.iter().filter(|s| !s.result.is_valid()) {
            for error in statement.result.errors() {
                eprintln!("\x1b[31merror\x1b[0m: {}", error);
            }
            eprintln!("  --> {}:{}:{}", report.file, statement.line, statement.column);
            if let Some(first_line) = statement.sql.lines().next() {
                eprintln!("   |");
                eprintln!("{:>3} | {}", statement.line, first_line);
            }
            eprintln!();
        }
    }

    fn print_summary(&self, reports: &[FileReport]) {
        let statements: usize = reports.iter().map(|r| r.statements.len()).sum();
        let invalid: usize = reports.iter().map(FileReport::invalid_count).sum();

        if invalid > 0 {
            eprintln!(
                "Found {} invalid statement(s) out of {} in {} file(s)",
                invalid,
                statements,
                reports.len()
            );
        } else if !self.quiet {
            eprintln!(
                "\x1b[32mAll {} statement(s) in {} file(s) passed validation\x1b[0m",
                statements,
                reports.len()
            );
        }
    }

    fn print_json(&self, reports: &[FileReport]) -> Result<()> {
        let invalid: usize = reports.iter().map(FileReport::invalid_count).sum();
        let output = serde_json::json!({
            "files": reports,
            "invalid": invalid,
        });
        println!("{}", serde_json::to_string_pretty(&output).into_diagnostic()?);
        Ok(())
    }
}
