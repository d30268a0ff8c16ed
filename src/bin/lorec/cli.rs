//! # Cli
//!
//! This module contains everything needed for parsing the CLI arguments for
//! lorec.

use std::env;

use clap::{error::ErrorKind, Parser, ValueEnum};

/// Struct containing the CLI configuration for lorec.
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// The path to the Lore source file.
    #[arg(index = 1)]
    pub file: std::path::PathBuf,

    /// Specify the log level of the compiler.
    #[arg(value_enum, short, long, default_value_t = LogLevel::default())]
    pub verbosity: LogLevel,
}

impl Cli {
    /// Parses the command line. Anything other than a well-formed invocation
    /// (or an explicit `--help`/`--version`) prints the usage line and exits
    /// with status 1.
    pub fn init() -> Self {
        match Cli::try_parse() {
            Ok(cli) => cli,
            Err(error)
                if matches!(
                    error.kind(),
                    ErrorKind::DisplayHelp | ErrorKind::DisplayVersion
                ) =>
            {
                error.exit()
            }
            Err(_) => {
                let program = env::args().next().unwrap_or_else(|| "lorec".to_owned());
                println!("Usage: {program} <filename.lr>");
                std::process::exit(1);
            }
        }
    }
}

/// Enum for specifying the log level of lorec.
#[derive(ValueEnum, Clone, Default, Debug)]
pub enum LogLevel {
    /// The default log level. Only critical errors will be logged.
    #[default]
    #[value(alias("0"))]
    Error,

    /// A log level, where also warnings are logged.
    #[value(alias("1"))]
    Warn,

    /// Also log information about the general state of the compiler.
    #[value(alias("2"))]
    Info,

    /// Log everything which happens internally in the compiler.
    #[value(alias("3"))]
    Debug,

    /// Log extra information, more precise than debug output.
    #[value(alias("4"))]
    Trace,
}

impl From<LogLevel> for log::Level {
    fn from(value: LogLevel) -> Self {
        match value {
            LogLevel::Error => log::Level::Error,
            LogLevel::Warn => log::Level::Warn,
            LogLevel::Info => log::Level::Info,
            LogLevel::Debug => log::Level::Debug,
            LogLevel::Trace => log::Level::Trace,
        }
    }
}
