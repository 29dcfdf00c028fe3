//! Command-line arguments

use crate::model::dialog::ExportFormat;
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "report-export",
    version,
    about = "Pick document-store fields, preview rows and export them to xlsx, pdf or csv"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Config file (default: ~/.report-export-tui/config.json)
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// YAML file with extra report definitions
    #[arg(long, value_name = "FILE", global = true)]
    pub reports: Option<PathBuf>,

    /// Write logs to this file
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Override the configured server URL
    #[arg(long = "base-url", value_name = "URL", global = true)]
    pub base_url: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Export a report without starting the interface
    Export(ExportArgs),
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Report name from the catalogue
    #[arg(long)]
    pub report: String,

    /// Output format
    #[arg(long, value_enum, default_value = "xlsx")]
    pub format: FormatArg,

    /// Comma-separated field keys, in column order
    #[arg(long, value_delimiter = ',', required = true)]
    pub fields: Vec<String>,

    /// Output directory (default: the configured export directory)
    #[arg(long, value_name = "DIR")]
    pub out: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Xlsx,
    Pdf,
    Csv,
}

impl From<FormatArg> for ExportFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Xlsx => ExportFormat::Xlsx,
            FormatArg::Pdf => ExportFormat::Pdf,
            FormatArg::Csv => ExportFormat::Csv,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_export_subcommand() {
        let cli = Cli::try_parse_from([
            "report-export",
            "-vv",
            "export",
            "--report",
            "Employee Report",
            "--format",
            "pdf",
            "--fields",
            "employee_name,department",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        let Some(Command::Export(args)) = cli.command else {
            panic!("expected export subcommand");
        };
        assert_eq!(args.report, "Employee Report");
        assert_eq!(ExportFormat::from(args.format), ExportFormat::Pdf);
        assert_eq!(args.fields, vec!["employee_name", "department"]);
    }

    #[test]
    fn test_no_subcommand_starts_ui() {
        let cli = Cli::try_parse_from(["report-export", "--base-url", "http://localhost:8000"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.base_url.as_deref(), Some("http://localhost:8000"));
    }
}
