//! Quote every enabled scenario against the selected providers
//!
//! Writes one `<provider>_<stamp>.jsonl` log per provider under the output
//! directory and prints a per-provider tally.

use anyhow::{Context, Result};
use clap::Parser;
use price_monitor::pipeline::run_provider;
use price_monitor::record::read_quote_log;
use price_monitor::report::{quote_log_workbook, save_workbook};
use price_monitor::scenario::load_scenarios;
use price_monitor::{MonitorConfig, Provider};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(about = "Fetch guarantee quotes for every enabled scenario")]
struct Args {
    /// TOML config file (defaults apply when omitted)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Scenario CSV, overrides the config
    #[arg(long)]
    scenarios: Option<PathBuf>,

    /// Provider to quote; repeat for several (default: all)
    #[arg(long = "provider")]
    providers: Vec<Provider>,

    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Pause between requests in milliseconds
    #[arg(long)]
    delay_ms: Option<u64>,

    /// Also write a workbook of the fresh quotes next to each log
    #[arg(long)]
    xlsx: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut config = MonitorConfig::load(args.config.as_deref()).context("loading config")?;
    if let Some(path) = args.scenarios {
        config.scenarios_path = path;
    }
    if let Some(dir) = args.output_dir {
        config.output_dir = dir;
    }
    if let Some(ms) = args.delay_ms {
        config.request_delay_ms = ms;
    }

    let scenarios = load_scenarios(&config.scenarios_path)
        .with_context(|| format!("loading scenarios from {}", config.scenarios_path.display()))?;
    let enabled = scenarios.iter().filter(|s| s.enabled).count();
    println!("Loaded {} scenarios ({enabled} enabled)", scenarios.len());

    let providers = if args.providers.is_empty() { Provider::ALL.to_vec() } else { args.providers };

    let mut failed = 0;
    for provider in providers {
        let start = Instant::now();
        let report = run_provider(provider, &scenarios, &config).with_context(|| format!("running {provider}"))?;
        println!(
            "{provider}: {}/{} quotes written to {} in {:?}",
            report.written,
            report.attempted,
            report.log_path.display(),
            start.elapsed()
        );
        for failure in &report.failures {
            println!("  {}: {}", failure.scenario_id, failure.message);
        }
        failed += report.failures.len();

        if args.xlsx && report.written > 0 {
            let records = read_quote_log(&report.log_path)?;
            let path = report.log_path.with_extension("xlsx");
            let mut wb = quote_log_workbook(&records)?;
            save_workbook(&mut wb, &path).with_context(|| format!("writing {}", path.display()))?;
            println!("  workbook: {}", path.display());
        }
    }

    if failed > 0 {
        println!("{failed} scenario(s) failed; see the log output above");
    }
    Ok(())
}
