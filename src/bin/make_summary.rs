//! Segment summary across the latest quote logs, optionally with one
//! provider's matrix taken from a hand-maintained rate sheet

use anyhow::{Context, Result};
use clap::Parser;
use price_monitor::compare::{build_percent_matrix, summarize_segments};
use price_monitor::rates::{load_rate_sheet, rate_matrix, with_default_discount};
use price_monitor::record::{latest_provider_log, read_quote_log, utc_stamp};
use price_monitor::report::{save_workbook, summary_workbook, TitledMatrix};
use price_monitor::{MonitorConfig, Provider, QuoteRecord};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(about = "Summarize quote logs per segment and term")]
struct Args {
    #[arg(long)]
    config: Option<PathBuf>,

    /// Rate sheet standing in for Hoggax's quote log
    #[arg(long)]
    rates: Option<PathBuf>,

    /// Discount assumed where the rate sheet has none
    #[arg(long, default_value_t = 0.15)]
    rates_discount: f64,

    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let config = MonitorConfig::load(args.config.as_deref()).context("loading config")?;
    let terms = &config.matrix_terms;

    let mut records: Vec<QuoteRecord> = Vec::new();
    let mut matrices = Vec::new();
    for provider in Provider::ALL {
        if provider == Provider::Hoggax {
            if let Some(path) = &args.rates {
                let mut entries =
                    load_rate_sheet(path).with_context(|| format!("reading rate sheet {}", path.display()))?;
                with_default_discount(&mut entries, args.rates_discount);
                println!("{provider}: {} rates from {}", entries.len(), path.display());
                matrices.push(TitledMatrix::for_provider(provider, rate_matrix(&entries, terms)));
                continue;
            }
        }

        let path = match latest_provider_log(&config.output_dir, provider) {
            Ok(p) => p,
            Err(e) => {
                log::warn!("{provider}: {e}");
                continue;
            }
        };
        let provider_records = read_quote_log(&path).with_context(|| format!("reading {}", path.display()))?;
        println!("{provider}: {} records from {}", provider_records.len(), path.display());
        matrices.push(TitledMatrix::for_provider(provider, build_percent_matrix(&provider_records, terms)));
        records.extend(provider_records);
    }

    if matrices.is_empty() {
        anyhow::bail!("no quote logs in {} and no rate sheet given", config.output_dir.display());
    }

    let summaries = summarize_segments(&records);
    let path = args
        .output
        .unwrap_or_else(|| config.output_dir.join(format!("resumen_{}.xlsx", utc_stamp(chrono::Utc::now()))));
    let mut wb = summary_workbook(&summaries, &matrices)?;
    save_workbook(&mut wb, &path).with_context(|| format!("writing {}", path.display()))?;
    println!("{} summary rows, {} matrices -> {}", summaries.len(), matrices.len(), path.display());
    Ok(())
}
