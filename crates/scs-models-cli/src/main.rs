//! scsmodels - A tool for inspecting and converting SCS model and prefab files
//!
//! Usage:
//!   scsmodels info <file>                 - Show a summary of a .ppd, .pmd or .pmg file
//!   scsmodels verify <dir> [--filter]     - Round-trip every asset under a directory
//!   scsmodels upgrade <file.ppd> [-o out] - Rewrite a prefab descriptor as version 0x19

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use scs_models::asset_utils::{show_info, upgrade_ppd, verify_directory};

#[derive(Parser)]
#[command(name = "scsmodels")]
#[command(version = "0.1.0")]
#[command(about = "Inspect and convert SCS model and prefab descriptor files", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show a summary of a file
    Info {
        /// Path to a .ppd, .pmd or .pmg file
        file: PathBuf,
    },
    /// Load and re-save every asset, reporting byte differences
    Verify {
        /// Directory to scan recursively
        dir: PathBuf,
        /// Filter pattern (e.g., *.ppd, prefab/*)
        #[arg(short, long)]
        filter: Option<String>,
    },
    /// Upgrade a prefab descriptor to the latest revision
    Upgrade {
        /// Path to the .ppd file
        ppd: PathBuf,
        /// Output path (default: overwrite the input)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Info { file } => {
            show_info(&file)?;
        }
        Commands::Verify { dir, filter } => {
            let report = verify_directory(&dir, filter.as_deref())?;
            if report.mismatched > 0 || report.failed > 0 {
                bail!(
                    "{} mismatched, {} failed",
                    report.mismatched,
                    report.failed
                );
            }
        }
        Commands::Upgrade { ppd, output } => {
            upgrade_ppd(&ppd, output.as_deref())?;
        }
    }

    Ok(())
}
