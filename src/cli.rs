use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(author, version, about = "Turn business CSV exports into cleaned data, aggregates, and insights", long_about = None)]
pub struct Cli {
    /// Enable debug logging for the pipeline stages
    #[arg(short, long, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the full pipeline and write the report artifacts to a directory
    Report(ReportArgs),
    /// Run the full pipeline and print summary tables to the terminal
    Summary(SummaryArgs),
    /// Score the header against known business domains
    Domain(DomainArgs),
}

/// Options shared by every command that loads an input file.
#[derive(Debug, Args)]
pub struct InputArgs {
    /// Input CSV file to analyze
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to trying utf-8, then latin-1)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// YAML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct ReportArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Output directory (defaults to a timestamped name in the working directory)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// Format of the executive summary file
    #[arg(long, value_enum, default_value = "yaml")]
    pub format: ReportFormat,
}

#[derive(Debug, Args)]
pub struct SummaryArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Also list strongly correlated numeric column pairs
    #[arg(long)]
    pub correlations: bool,
    /// Also list IQR outlier counts per numeric column
    #[arg(long)]
    pub outliers: bool,
}

#[derive(Debug, Args)]
pub struct DomainArgs {
    #[command(flatten)]
    pub input: InputArgs,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default)]
#[value(rename_all = "kebab-case")]
pub enum ReportFormat {
    #[default]
    Yaml,
    Json,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}
