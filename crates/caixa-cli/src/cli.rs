//! CLI argument definitions for caixa.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `cep` | Resolve a postal code through the provider chain |
//! | `movements` | Bank statement and cash-flow KPIs |
//! | `balances` | Balance per bank with a total line |
//! | `banks` | Bank names seen in movements and balances |
//! | `receivables` | Receivables with KPIs and status buckets |
//! | `form-pdf` | Render a registration form to PDF |
//! | `serve` | Run the JSON API |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--format` | `json` | Output format (json, table) |
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--verbose` | `false` | Debug logging unless `RUST_LOG` is set |
//! | `--config` | `CAIXA_CONFIG` | TOML configuration file |
//!
//! One-shot commands always fetch fresh data. `serve` caches financial
//! responses for the configured TTL unless `--no-cache` is given.
//!
//! # Examples
//!
//! ```bash
//! caixa cep 01001-000 --pretty
//! caixa movements --from 2025-03-01 --to 2025-03-31 --bank Itaú --format table
//! caixa receivables --status overdue,due_today
//! caixa form-pdf --input ficha.json --output ficha.pdf
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use caixa_core::CacheMode;

/// Caixa - Brazilian cash-desk dashboard
///
/// Statements, balances and receivables from the financial API, plus postal
/// code lookup and registration form export.
#[derive(Debug, Parser)]
#[command(name = "caixa", author, version, about = "Cash-desk dashboard CLI")]
pub struct Cli {
    /// Output format for results.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Enable debug logging.
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    /// Path to a TOML configuration file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Resolve a postal code (CEP) to an address.
    Cep(CepArgs),
    /// Bank statement, KPIs and per-bank flows.
    Movements(MovementArgs),
    /// Balances per bank plus total.
    Balances(BalanceArgs),
    /// Bank names available for filtering.
    Banks,
    /// Receivables with KPIs and status buckets.
    Receivables(ReceivableArgs),
    /// Render a registration form JSON file to PDF.
    FormPdf(FormPdfArgs),
    /// Run the JSON API server.
    Serve(ServeArgs),
}

#[derive(Debug, Args)]
pub struct CepArgs {
    /// Postal code, with or without punctuation.
    pub cep: String,
}

#[derive(Debug, Args)]
pub struct MovementArgs {
    /// First day (YYYY-MM-DD), inclusive.
    #[arg(long)]
    pub from: Option<String>,

    /// Last day (YYYY-MM-DD), inclusive.
    #[arg(long)]
    pub to: Option<String>,

    /// Bank names; repeat or separate with commas.
    #[arg(long = "bank", value_delimiter = ',')]
    pub banks: Vec<String>,
}

#[derive(Debug, Args)]
pub struct BalanceArgs {
    /// Bank names; repeat or separate with commas.
    #[arg(long = "bank", value_delimiter = ',')]
    pub banks: Vec<String>,
}

#[derive(Debug, Args)]
pub struct ReceivableArgs {
    /// First due date (YYYY-MM-DD), inclusive.
    #[arg(long)]
    pub from: Option<String>,

    /// Last due date (YYYY-MM-DD), inclusive.
    #[arg(long)]
    pub to: Option<String>,

    /// Status names or labels (settled, overdue, due_today, upcoming, no_due_date).
    #[arg(long = "status", value_delimiter = ',')]
    pub statuses: Vec<String>,
}

#[derive(Debug, Args)]
pub struct FormPdfArgs {
    /// Registration form as JSON; missing fields are blank.
    #[arg(long)]
    pub input: PathBuf,

    /// Where to write the PDF.
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Include the base64 document in the output.
    #[arg(long, default_value_t = false)]
    pub base64: bool,
}

#[derive(Debug, Args)]
pub struct ServeArgs {
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    #[arg(long, default_value_t = 3000)]
    pub port: u16,

    /// Directory served for non-API paths.
    #[arg(long)]
    pub static_dir: Option<PathBuf>,

    /// Fetch financial data on every request instead of caching it.
    #[arg(long, default_value_t = false)]
    pub no_cache: bool,
}

impl ServeArgs {
    pub fn cache_mode(&self) -> CacheMode {
        if self.no_cache {
            CacheMode::Bypass
        } else {
            CacheMode::Use
        }
    }
}
