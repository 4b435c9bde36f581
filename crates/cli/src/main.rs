//! Sales Desk CLI - quotation numbers, totals and payloads from the shell.
//!
//! # Usage
//!
//! ```bash
//! # Next identifier after a known one
//! sd-cli next-id --prefix LD --latest LD-041
//!
//! # Next quotation number, asking the backend for the latest
//! sd-cli next-id --prefix QN --from-backend
//!
//! # Recompute totals of a stored record
//! sd-cli totals record.json
//!
//! # Build the persistence or print payload of a stored record
//! sd-cli payload record.json --pdf-url https://files.example.com/QN-042.pdf
//! sd-cli print record.json --hide-disc
//!
//! # Load a quotation from the backend for revision
//! sd-cli revise QN-042
//! ```
//!
//! Results are written to stdout as JSON; logs go to stderr. Set
//! `RUST_LOG` to adjust verbosity and `LOG_FORMAT=json` for JSON logs.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "sd-cli")]
#[command(author, version, about = "Sales Desk quotation tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the next sequence identifier
    NextId {
        /// Sequence prefix (e.g. `LD`, `DO`, `QN`)
        #[arg(short, long)]
        prefix: String,

        /// Latest identifier issued so far
        #[arg(short, long, conflicts_with = "from_backend")]
        latest: Option<String>,

        /// Ask the backend for the latest identifier (quotation prefix only)
        #[arg(long)]
        from_backend: bool,
    },
    /// Recompute the totals of a stored quotation record
    Totals {
        /// Path to the record JSON
        file: PathBuf,
    },
    /// Build the persistence payload of a stored quotation record
    Payload {
        /// Path to the record JSON
        file: PathBuf,

        /// URL of the stored document
        #[arg(long)]
        pdf_url: Option<String>,
    },
    /// Build the print payload of a stored quotation record
    Print {
        /// Path to the record JSON
        file: PathBuf,

        #[command(flatten)]
        columns: ColumnFlags,
    },
    /// Load a quotation from the backend for revision
    Revise {
        /// Quotation number
        quotation_no: String,
    },
}

#[derive(Args)]
#[allow(clippy::struct_excessive_bools)]
struct ColumnFlags {
    /// Hide the percent discount column
    #[arg(long)]
    hide_disc: bool,

    /// Hide the per-unit flat discount column
    #[arg(long)]
    hide_flat_disc: bool,

    /// Hide the document flat discount row
    #[arg(long)]
    hide_total_flat_disc: bool,

    /// Hide the special discount row
    #[arg(long)]
    hide_special_discount: bool,
}

#[tokio::main]
async fn main() {
    init_tracing();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json")) {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::NextId {
            prefix,
            latest,
            from_backend,
        } => {
            let latest = if from_backend {
                commands::backend::latest(&prefix).await?
            } else {
                latest
            };
            commands::sequence::next_id(&prefix, latest.as_deref())?;
        }
        Commands::Totals { file } => commands::record::totals(&file)?,
        Commands::Payload { file, pdf_url } => commands::record::payload(&file, pdf_url)?,
        Commands::Print { file, columns } => commands::record::print(
            &file,
            salesdesk_core::PrintOptions {
                hide_disc: columns.hide_disc,
                hide_flat_disc: columns.hide_flat_disc,
                hide_total_flat_disc: columns.hide_total_flat_disc,
                hide_special_discount: columns.hide_special_discount,
            },
        )?,
        Commands::Revise { quotation_no } => commands::backend::revise(&quotation_no).await?,
    }
    Ok(())
}
