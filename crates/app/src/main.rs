use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use ledgerscan::commands::{self, Tables, CATEGORIZED_ARTIFACT, CLEANED_ARTIFACT, RAW_ARTIFACT};
use ledgerscan::AppConfig;
use ledgerscan_core::{CategorizedTransaction, CleanedTransaction, LineRecord, SpendSummary};

#[derive(Parser)]
#[command(name = "ledgerscan", about = "Turn OCR'd bank statements into categorized transactions")]
struct Cli {
    /// TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Reconstruct reading-order lines from an OCR dump
    Lines {
        input: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Segment lines into transactions and extract their fields
    Clean {
        input: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Label cleaned transactions with a spending category
    Categorize {
        input: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Run every stage on an OCR dump
    Run {
        input: PathBuf,
        #[arg(long, default_value = "out")]
        out_dir: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = AppConfig::load(cli.config.as_deref())?;

    match cli.command {
        Command::Lines { input, output } => {
            let lines = commands::scan_statement(&input, &cfg).await?;
            let output = output.unwrap_or_else(|| commands::default_output(&input, RAW_ARTIFACT));
            commands::write_json(&output, &lines)?;
        }
        Command::Clean { input, output } => {
            let tables = Tables::load(&cfg)?;
            let lines: Vec<LineRecord> = commands::read_json(&input)?;
            let cleaned = commands::clean_lines(lines, &tables);
            info!("Kept {} transactions", cleaned.len());
            let output =
                output.unwrap_or_else(|| commands::default_output(&input, CLEANED_ARTIFACT));
            commands::write_json(&output, &cleaned)?;
        }
        Command::Categorize { input, output } => {
            let tables = Tables::load(&cfg)?;
            let cleaned: Vec<CleanedTransaction> = commands::read_json(&input)?;
            let client = commands::ollama_client(&cfg)?;
            let categorized: Vec<CategorizedTransaction> =
                commands::categorize_with(client, cleaned, tables, &cfg).await?;
            let output =
                output.unwrap_or_else(|| commands::default_output(&input, CATEGORIZED_ARTIFACT));
            commands::write_json(&output, &categorized)?;
            print!("{}", commands::render_summary(&SpendSummary::from_transactions(&categorized)));
        }
        Command::Run { input, out_dir } => {
            let client = commands::ollama_client(&cfg)?;
            let report = commands::run_with(client, &input, &out_dir, &cfg).await?;
            info!(
                lines = report.lines,
                cleaned = report.cleaned,
                categorized = report.categorized.len(),
                "pipeline finished"
            );
            print!("{}", commands::render_summary(&report.summary));
        }
    }

    Ok(())
}
