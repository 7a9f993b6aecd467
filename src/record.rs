//! Quote log: one JSON line per (provider, scenario) fetch
//!
//! Each run writes a fresh `<provider>_<stamp>.jsonl`; later steps pick the
//! latest file by name, so the stamp format must sort chronologically.

use crate::error::{MonitorError, Result};
use crate::normalize::NormalizedQuote;
use crate::provider::Provider;
use crate::scenario::{Scenario, ScenarioSnapshot};
use chrono::{DateTime, Utc};
use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// File-name stamp, e.g. `2026-02-14T093015Z`
pub const STAMP_FORMAT: &str = "%Y-%m-%dT%H%M%SZ";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteRecord {
    pub timestamp: DateTime<Utc>,
    pub provider: Provider,
    pub scenario_id: String,
    pub scenario: ScenarioSnapshot,
    pub normalized: NormalizedQuote,
    pub raw: Value,
}

impl QuoteRecord {
    pub fn new(provider: Provider, scenario: &Scenario, normalized: NormalizedQuote, raw: Value) -> Self {
        Self {
            timestamp: Utc::now(),
            provider,
            scenario_id: scenario.scenario_id.clone(),
            scenario: scenario.snapshot(),
            normalized,
            raw,
        }
    }
}

pub fn utc_stamp(at: DateTime<Utc>) -> String {
    at.format(STAMP_FORMAT).to_string()
}

/// `<dir>/<provider>_<stamp>.jsonl`
pub fn log_path(dir: &Path, provider: Provider, stamp: &str) -> PathBuf {
    dir.join(format!("{}{stamp}.jsonl", provider.log_prefix()))
}

/// Append-only writer; every record is flushed so an interrupted run
/// leaves a readable prefix.
pub struct QuoteLog {
    path: PathBuf,
    out: BufWriter<File>,
    written: usize,
}

impl QuoteLog {
    pub fn create(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self { path, out: BufWriter::new(file), written: 0 })
    }

    pub fn append(&mut self, record: &QuoteRecord) -> Result<()> {
        serde_json::to_writer(&mut self.out, record)?;
        self.out.write_all(b"\n")?;
        self.out.flush()?;
        self.written += 1;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn written(&self) -> usize {
        self.written
    }
}

/// Read every record; blank lines are ignored and malformed ones (such as
/// a truncated last line) are skipped with a warning.
pub fn read_quote_log(path: &Path) -> Result<Vec<QuoteRecord>> {
    if !path.exists() {
        return Err(MonitorError::MissingFile(path.to_path_buf()));
    }
    let reader = BufReader::new(File::open(path)?);
    let mut records = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<QuoteRecord>(&line) {
            Ok(r) => records.push(r),
            Err(e) => warn!("{}:{}: skipping malformed record: {e}", path.display(), i + 1),
        }
    }
    Ok(records)
}

/// Greatest `<prefix>*.jsonl` file name in `dir`
pub fn latest_log(dir: &Path, prefix: &str) -> Result<PathBuf> {
    let no_log = || MonitorError::NoQuoteLog { dir: dir.to_path_buf(), prefix: prefix.to_string() };
    if !dir.is_dir() {
        return Err(no_log());
    }

    let mut best: Option<(String, PathBuf)> = None;
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if !(name.starts_with(prefix) && name.ends_with(".jsonl")) {
            continue;
        }
        if best.as_ref().map_or(true, |(b, _)| name > *b) {
            best = Some((name, entry.path()));
        }
    }
    best.map(|(_, p)| p).ok_or_else(no_log)
}

/// Latest log for a provider
pub fn latest_provider_log(dir: &Path, provider: Provider) -> Result<PathBuf> {
    latest_log(dir, &provider.log_prefix())
}
