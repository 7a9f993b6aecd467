//! Side-by-side comparison of the latest Finaer and Hoggax logs at the
//! configured border points

use anyhow::{Context, Result};
use clap::Parser;
use price_monitor::compare::{build_border_matrix, build_comparison, Pricing};
use price_monitor::record::{latest_provider_log, read_quote_log, utc_stamp};
use price_monitor::report::{borders_workbook, save_workbook, TitledMatrix};
use price_monitor::{MonitorConfig, Provider};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(about = "Compare both providers at the border scenarios")]
struct Args {
    #[arg(long)]
    config: Option<PathBuf>,

    /// Finaer quote log (default: latest in the output directory)
    #[arg(long)]
    finaer_log: Option<PathBuf>,

    /// Hoggax quote log (default: latest in the output directory)
    #[arg(long)]
    hoggax_log: Option<PathBuf>,

    /// Destination workbook
    #[arg(long)]
    output: Option<PathBuf>,
}

fn resolve_log(explicit: Option<PathBuf>, dir: &Path, provider: Provider) -> Result<PathBuf> {
    match explicit {
        Some(p) => Ok(p),
        None => latest_provider_log(dir, provider).with_context(|| format!("finding the latest {provider} log")),
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let config = MonitorConfig::load(args.config.as_deref()).context("loading config")?;
    let (a, b) = (Provider::Finaer, Provider::Hoggax);

    let a_path = resolve_log(args.finaer_log, &config.output_dir, a)?;
    let b_path = resolve_log(args.hoggax_log, &config.output_dir, b)?;
    let a_records = read_quote_log(&a_path).with_context(|| format!("reading {}", a_path.display()))?;
    let b_records = read_quote_log(&b_path).with_context(|| format!("reading {}", b_path.display()))?;
    println!("{a}: {} records from {}", a_records.len(), a_path.display());
    println!("{b}: {} records from {}", b_records.len(), b_path.display());

    let pricing = Pricing::from_config(&config, a, b);
    let rows = build_comparison(&a_records, &b_records, &config.targets, &pricing);
    println!("{} comparison rows", rows.len());

    let matrices = [
        TitledMatrix::for_provider(a, build_border_matrix(&a_records, &config.targets, &config.matrix_terms)),
        TitledMatrix::for_provider(b, build_border_matrix(&b_records, &config.targets, &config.matrix_terms)),
    ];

    let path = args.output.unwrap_or_else(|| {
        config
            .output_dir
            .join(format!("comparativa_{a}_vs_{b}_{}.xlsx", utc_stamp(chrono::Utc::now())))
    });
    let mut wb = borders_workbook(&rows, a, b, &matrices)?;
    save_workbook(&mut wb, &path).with_context(|| format!("writing {}", path.display()))?;
    println!("Wrote {}", path.display());
    Ok(())
}
