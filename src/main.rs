//! dmarc-insight - DMARC Aggregate Report Analyzer
//!
//! This tool ingests DMARC aggregate reports (plain XML, gzipped XML, or ZIP
//! archives), tallies SPF/DKIM authentication outcomes, and writes a pie chart,
//! a per-domain failure bar chart, and a PDF summary report.
//!
//! The console summary is available in one of three formats: Table, CSV, or JSON.

mod batch;
mod charts;
mod config;
mod error;
mod extract;
mod models;
mod pdf;
mod report;
mod stats;
mod xml_parser;

use anyhow::{Context, Result};
use batch::ReportBatch;
use clap::Parser;
use colored::*;
use config::Config;
use prettytable::{row, Table};
use report::Analysis;
use serde::{Deserialize, Serialize};
use stats::Summary;
use std::path::PathBuf;
use std::str::FromStr;

/// CLI arguments for dmarc-insight.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "DMARC aggregate-report analyzer with chart and PDF output",
    long_about = "dmarc-insight parses DMARC aggregate reports (XML, .gz, or .zip), \
                  aggregates SPF/DKIM pass/fail outcomes, and writes pie_chart.png, \
                  bar_chart.png, and DMARC_Analysis_Report.pdf to the output directory.\n\n\
                  USAGE:\n  dmarc-insight <FILES>... [--out-dir <DIR>] [--output <table|csv|json>] [--verbose]"
)]
struct Cli {
    /// Report files or directories containing them
    #[arg(value_parser, required = true)]
    files: Vec<PathBuf>,

    /// Console output format: table, csv, json
    #[arg(short, long, default_value = "table")]
    output: OutputFormat,

    /// Directory for the generated charts and PDF
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Supported console output formats.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum OutputFormat {
    Table,
    Csv,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Invalid output format: {}", s)),
        }
    }
}

/// One row of the CSV export of ranked domain failures.
#[derive(Debug, Serialize)]
struct DomainFailureRow<'a> {
    domain: &'a str,
    failed_messages: u64,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity.
    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(if cli.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .init();

    println!(
        "{}\n{}\n",
        "dmarc-insight - DMARC Aggregate Report Analyzer".bold().green(),
        "Parsing, aggregating & summarizing DMARC data".dimmed()
    );

    let config = Config::new().context("Failed to load configuration")?;

    let batch = ReportBatch::load(&cli.files, &config).context("Failed to load input files")?;
    for skipped in &batch.skipped {
        println!(
            "{} {}: {}",
            "Skipped".yellow().bold(),
            skipped.path.display(),
            skipped.reason
        );
    }
    let batch = batch.require_records()?;
    log::info!(
        "Aggregating {} records from {} file(s)",
        batch.records.len(),
        batch.parsed_files
    );

    let summary = Summary::from_records(&batch.records);
    let analysis = Analysis::from_summary(summary);

    match cli.output {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&analysis)?);
        }
        OutputFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(std::io::stdout());
            for (domain, failed_messages) in &analysis.ranked_failures {
                wtr.serialize(DomainFailureRow {
                    domain,
                    failed_messages: *failed_messages,
                })?;
            }
            wtr.flush()?;
        }
        OutputFormat::Table => {
            println!("{}", "Analysis Summary".bold().blue());
            println!("{}", "----------------------------".dimmed());
            for line in analysis.narrative() {
                println!("{}", line);
            }
            println!();

            if !analysis.ranked_failures.is_empty() {
                let mut table = Table::new();
                table.add_row(row!["Domain", "Failed messages"]);
                for (domain, count) in &analysis.ranked_failures {
                    table.add_row(row![domain, count]);
                }
                table.printstd();
            } else {
                println!("{}", "No failing domains found.".green());
            }
        }
    }

    std::fs::create_dir_all(&cli.out_dir)
        .with_context(|| format!("Failed to create output directory {}", cli.out_dir.display()))?;
    let artifacts = analysis
        .render(&cli.out_dir)
        .context("Failed to render report artifacts")?;

    println!(
        "\n{}\n  {}\n  {}\n  {}",
        "Report artifacts written:".bold().cyan(),
        artifacts.pie_chart.display(),
        artifacts.bar_chart.display(),
        artifacts.pdf.display()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_parsing() {
        assert!(matches!(OutputFormat::from_str("table"), Ok(OutputFormat::Table)));
        assert!(matches!(OutputFormat::from_str("csv"), Ok(OutputFormat::Csv)));
        assert!(matches!(OutputFormat::from_str("JSON"), Ok(OutputFormat::Json)));
        assert!(OutputFormat::from_str("invalid").is_err());
    }
}
