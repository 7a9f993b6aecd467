//! Write the border-scenario grid as a scenario CSV

use anyhow::{Context, Result};
use clap::Parser;
use price_monitor::scenario::{write_scenarios, ScenarioGrid};
use price_monitor::MonitorConfig;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(about = "Generate the comparison scenario grid")]
struct Args {
    #[arg(long)]
    config: Option<PathBuf>,

    /// Destination CSV, overrides the config's scenarios path
    #[arg(long)]
    output: Option<PathBuf>,

    /// Monthly bases (rent + expenses), comma separated
    #[arg(long, value_delimiter = ',')]
    bases: Vec<u64>,

    /// Terms in months, comma separated
    #[arg(long, value_delimiter = ',')]
    terms: Vec<u32>,

    /// Monthly expenses carved out of each base
    #[arg(long, default_value_t = 0)]
    expenses: u64,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let config = MonitorConfig::load(args.config.as_deref()).context("loading config")?;

    let mut grid = ScenarioGrid::from_targets(&config.targets);
    if !args.bases.is_empty() {
        grid.monthly_bases = args.bases;
    }
    if !args.terms.is_empty() {
        grid.terms = args.terms;
    }
    grid.expenses = args.expenses;

    let scenarios = grid.generate();
    let path = args.output.unwrap_or(config.scenarios_path);
    write_scenarios(&path, &scenarios).with_context(|| format!("writing {}", path.display()))?;
    println!("Wrote {} scenarios to {}", scenarios.len(), path.display());
    Ok(())
}
