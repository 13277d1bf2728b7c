//! sqlgate CLI - multi-dialect SQL syntax validator

mod args;
mod config;
mod output;

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use miette::{IntoDiagnostic, Result};
use sqlgate_core::scanner::split_statements;
use sqlgate_core::{create_validator, SqlDialect, ValidatorRegistry};
use tracing_subscriber::EnvFilter;

use crate::args::{Args, Command};
use crate::config::Config;
use crate::output::{FileReport, OutputFormatter, StatementReport};

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    match run(args) {
        Ok(has_errors) => {
            if has_errors {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            eprintln!("Error: {:?}", e);
            ExitCode::from(2)
        }
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .init();
}

fn run(args: Args) -> Result<bool> {
    match args.command {
        Command::Check {
            files,
            dialect,
            format,
            config: config_path,
        } => {
            let config = if let Some(path) = config_path {
                Config::from_file(&path)?
            } else {
                Config::find_and_load()?.unwrap_or_default()
            };

            // CLI takes precedence
            let config = config.merge_with_args(&files, &dialect, &format);
            let dialect: SqlDialect = config.dialect_name().parse()?;
            let validator = create_validator(dialect)?;

            let sql_files = expand_patterns(&config.files)?;
            if sql_files.is_empty() {
                miette::bail!(
                    "No SQL files specified. Use positional arguments or configure in sqlgate.toml"
                );
            }

            let mut reports = Vec::with_capacity(sql_files.len());
            for path in &sql_files {
                let content = fs::read_to_string(path).into_diagnostic()?;
                let statements = split_statements(&content, dialect)
                    .into_iter()
                    .map(|sql| StatementReport::build(validator.as_ref(), &content, sql))
                    .collect();
                let report = FileReport {
                    file: path.display().to_string(),
                    dialect,
                    statements,
                };
                tracing::info!(
                    file = %report.file,
                    statements = report.statements.len(),
                    invalid = report.invalid_count(),
                    "checked file"
                );
                reports.push(report);
            }

            let formatter = OutputFormatter::new(config.output_format(), args.quiet);
            formatter.print_reports(&reports)?;

            Ok(reports.iter().any(|r| r.invalid_count() > 0))
        }

        Command::Classify { sql, dialect } => {
            let dialect: SqlDialect = dialect.parse()?;
            let validator = create_validator(dialect)?;
            println!("{}", validator.statement_type(&sql));
            Ok(false)
        }

        Command::Tables { sql, dialect } => {
            let dialect: SqlDialect = dialect.parse()?;
            let validator = create_validator(dialect)?;
            let result = validator.validate_syntax(&sql);
            if !result.is_valid() {
                for error in result.errors() {
                    eprintln!("\x1b[31merror\x1b[0m: {}", error);
                }
                return Ok(true);
            }
            for table in validator.extract_table_names(&sql) {
                println!("{}", table);
            }
            Ok(false)
        }

        Command::Dialects => {
            for dialect in ValidatorRegistry::builtin().dialects() {
                if args.quiet {
                    println!("{}", dialect);
                } else {
                    println!("{:<12} {}", dialect.to_string(), dialect.display_name());
                }
            }
            Ok(false)
        }
    }
}

/// Expand glob patterns; plain paths are kept as given
fn expand_patterns(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for pattern in patterns {
        if pattern.contains(['*', '?', '[']) {
            let before = paths.len();
            for path in glob::glob(pattern).into_diagnostic()?.flatten() {
                paths.push(path);
            }
            if paths.len() == before {
                tracing::warn!(pattern = %pattern, "pattern matched no files");
            }
        } else {
            paths.push(PathBuf::from(pattern));
        }
    }
    Ok(paths)
}
