//! Run configuration shared by every component
//!
//! One `MonitorConfig` is built per process (defaults, optionally overlaid by
//! a TOML file) and passed down by reference. Comparison targets, endpoints
//! and business-rule discounts all live here.

use crate::error::{MonitorError, Result};
use crate::provider::Provider;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const FINAER_URL: &str = "https://admin.finaersa.com.ar/api/web/calcular-costo-del-servicio/";
pub const HOGGAX_URL: &str = "https://api.hoggax.com/cotizador/individuo/cotizar";

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Scenario CSV read by the fetch step
    #[serde(default = "default_scenarios_path")]
    pub scenarios_path: PathBuf,

    /// Directory receiving quote logs and workbooks
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Flat pause between two provider requests (milliseconds)
    #[serde(default = "default_request_delay_ms")]
    pub request_delay_ms: u64,

    /// Per-request HTTP timeout (seconds)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "ProviderSettings::finaer")]
    pub finaer: ProviderSettings,

    #[serde(default = "ProviderSettings::hoggax")]
    pub hoggax: ProviderSettings,

    /// Border scenarios and installment counts compared across providers
    #[serde(default)]
    pub targets: ComparisonTargets,

    /// Term columns of the percentage matrices
    #[serde(default = "default_matrix_terms")]
    pub matrix_terms: Vec<u32>,
}

fn default_scenarios_path() -> PathBuf { PathBuf::from("data/scenarios.csv") }
fn default_output_dir() -> PathBuf { PathBuf::from("output") }
fn default_request_delay_ms() -> u64 { 250 }
fn default_timeout_secs() -> u64 { 30 }
fn default_matrix_terms() -> Vec<u32> { vec![3, 6, 12, 24, 36] }

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            scenarios_path: default_scenarios_path(),
            output_dir: default_output_dir(),
            request_delay_ms: default_request_delay_ms(),
            timeout_secs: default_timeout_secs(),
            finaer: ProviderSettings::finaer(),
            hoggax: ProviderSettings::hoggax(),
            targets: ComparisonTargets::default(),
            matrix_terms: default_matrix_terms(),
        }
    }
}

impl MonitorConfig {
    /// Parse a TOML document; absent keys keep their defaults
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Read a TOML config file
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(MonitorError::MissingFile(path.to_path_buf()));
        }
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Defaults when no file is given, otherwise the file (which must exist)
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::from_file(p),
            None => Ok(Self::default()),
        }
    }

    pub fn provider(&self, provider: Provider) -> &ProviderSettings {
        match provider {
            Provider::Finaer => &self.finaer,
            Provider::Hoggax => &self.hoggax,
        }
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Which price a cross-provider comparison reads for one side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonBasis {
    /// The analyst's all-upfront rule applied to the list price
    #[default]
    TransferRule,
    /// The provider's own quoted total
    ProviderTotal,
}

/// Endpoint and pricing rule for one provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSettings {
    pub endpoint: String,

    /// Analyst's all-upfront discount (fraction, e.g. 0.20), applied to the
    /// list price of single-payment plans only. Every normalized plan carries
    /// its result next to the provider's own discount.
    #[serde(default)]
    pub upfront_discount: Option<f64>,

    /// Price this provider is compared on in the borders report
    #[serde(default)]
    pub compare_on: ComparisonBasis,
}

impl ProviderSettings {
    pub fn finaer() -> Self {
        Self {
            endpoint: FINAER_URL.to_string(),
            upfront_discount: Some(0.20),
            compare_on: ComparisonBasis::TransferRule,
        }
    }

    /// Compared on the web total; the 15% rule is still computed per plan
    pub fn hoggax() -> Self {
        Self {
            endpoint: HOGGAX_URL.to_string(),
            upfront_discount: Some(0.15),
            compare_on: ComparisonBasis::ProviderTotal,
        }
    }
}

/// Border scenarios bounding each pricing segment
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ComparisonTargets {
    /// Monthly rent + expenses values to compare
    #[serde(default = "default_monthly_bases")]
    pub monthly_bases: Vec<u64>,

    #[serde(default = "default_terms")]
    pub terms: Vec<u32>,

    #[serde(default = "default_installment_counts")]
    pub installment_counts: Vec<u32>,
}

fn default_monthly_bases() -> Vec<u64> { vec![499_999, 799_999, 801_000] }
fn default_terms() -> Vec<u32> { vec![24, 36] }
fn default_installment_counts() -> Vec<u32> { vec![1, 3] }

impl Default for ComparisonTargets {
    fn default() -> Self {
        Self {
            monthly_bases: default_monthly_bases(),
            terms: default_terms(),
            installment_counts: default_installment_counts(),
        }
    }
}

impl ComparisonTargets {
    /// True when a monthly base is one of the border values
    pub fn matches_base(&self, monthly_base: f64) -> bool {
        self.monthly_bases.iter().any(|&b| (b as f64 - monthly_base).abs() < 0.5)
    }

    /// True when a scenario (base, term) is one of the border points
    pub fn matches_scenario(&self, monthly_base: f64, term_months: u32) -> bool {
        self.terms.contains(&term_months) && self.matches_base(monthly_base)
    }
}
