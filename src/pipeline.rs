//! Fetch → normalize → append, one scenario at a time
//!
//! A failing scenario is logged and recorded in the [`RunReport`]; the batch
//! always continues. Only log-file I/O aborts a run.

use crate::config::MonitorConfig;
use crate::error::Result;
use crate::normalize::{normalize, NormalizedQuote, TransferRule};
use crate::provider::{client_for, Provider, QuoteClient};
use crate::record::{log_path, utc_stamp, QuoteLog, QuoteRecord};
use crate::scenario::Scenario;
use chrono::Utc;
use log::{info, warn};
use serde_json::Value;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioFailure {
    pub scenario_id: String,
    pub message: String,
}

/// Outcome of one provider run
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub provider: Provider,
    pub log_path: PathBuf,
    /// Enabled scenarios attempted
    pub attempted: usize,
    pub written: usize,
    pub failures: Vec<ScenarioFailure>,
}

impl RunReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Quote every enabled scenario through `client`, appending to `log`.
/// `delay` is slept between consecutive requests.
pub fn run_scenarios(
    client: &dyn QuoteClient,
    scenarios: &[Scenario],
    rule: &TransferRule,
    delay: Duration,
    log: &mut QuoteLog,
) -> Result<RunReport> {
    let provider = client.provider();
    let mut report = RunReport {
        provider,
        log_path: log.path().to_path_buf(),
        attempted: 0,
        written: 0,
        failures: Vec::new(),
    };

    for scenario in scenarios.iter().filter(|s| s.enabled) {
        if report.attempted > 0 && !delay.is_zero() {
            thread::sleep(delay);
        }
        report.attempted += 1;

        match quote_one(client, scenario, rule) {
            Ok((normalized, raw)) => {
                if !normalized.errors.is_empty() {
                    warn!("{provider} {}: provider reported {:?}", scenario.scenario_id, normalized.errors);
                }
                info!("{provider} {}: {} plans", scenario.scenario_id, normalized.plans.len());
                log.append(&QuoteRecord::new(provider, scenario, normalized, raw))?;
                report.written += 1;
            }
            Err(e) => {
                warn!("{provider} {}: {e}", scenario.scenario_id);
                report.failures.push(ScenarioFailure {
                    scenario_id: scenario.scenario_id.clone(),
                    message: e.to_string(),
                });
            }
        }
    }

    Ok(report)
}

fn quote_one(client: &dyn QuoteClient, scenario: &Scenario, rule: &TransferRule) -> Result<(NormalizedQuote, Value)> {
    let raw = client.fetch(scenario)?;
    let normalized = normalize(client.provider(), &raw, &scenario.snapshot(), rule)?;
    Ok((normalized, raw))
}

/// Full run for one provider: builds the client from `config` and writes a
/// fresh timestamped log under `config.output_dir`.
pub fn run_provider(provider: Provider, scenarios: &[Scenario], config: &MonitorConfig) -> Result<RunReport> {
    let client = client_for(provider, config)?;
    let rule = TransferRule::from_settings(config.provider(provider));
    let path = log_path(&config.output_dir, provider, &utc_stamp(Utc::now()));
    let mut log = QuoteLog::create(&path)?;
    info!("{provider}: writing {}", path.display());
    run_scenarios(client.as_ref(), scenarios, &rule, config.request_delay(), &mut log)
}
