//! Provider identities and their quote endpoints

mod finaer;
mod hoggax;

pub use finaer::{FinaerClient, FinaerRequest};
pub use hoggax::{fixed_term_response, plazo_for_term, HoggaxClient, HoggaxRequest, FIXED_RULE_TERM, FIXED_RULE_UPFRONT_DISCOUNT};

use crate::config::MonitorConfig;
use crate::error::{MonitorError, Result};
use crate::scenario::Scenario;
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Competing guarantee providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Finaer,
    Hoggax,
}

impl Provider {
    pub const ALL: [Provider; 2] = [Provider::Finaer, Provider::Hoggax];

    pub fn name(&self) -> &'static str {
        match self {
            Provider::Finaer => "finaer",
            Provider::Hoggax => "hoggax",
        }
    }

    /// File-name prefix of this provider's quote logs
    pub fn log_prefix(&self) -> String {
        format!("{}_", self.name())
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "finaer" => Ok(Provider::Finaer),
            "hoggax" => Ok(Provider::Hoggax),
            other => Err(format!("unknown provider: {other}")),
        }
    }
}

/// Fetches one raw quote per scenario
pub trait QuoteClient {
    fn provider(&self) -> Provider;

    /// Raw provider JSON for one scenario
    fn fetch(&self, scenario: &Scenario) -> Result<Value>;
}

/// Build the client for `provider` from the run configuration
pub fn client_for(provider: Provider, config: &MonitorConfig) -> Result<Box<dyn QuoteClient>> {
    let endpoint = config.provider(provider).endpoint.clone();
    let http = http_client(config.timeout())?;
    Ok(match provider {
        Provider::Finaer => Box::new(FinaerClient::new(http, endpoint)),
        Provider::Hoggax => Box::new(HoggaxClient::new(http, endpoint)),
    })
}

pub(crate) fn http_client(timeout: Duration) -> Result<reqwest::blocking::Client> {
    Ok(reqwest::blocking::Client::builder().timeout(timeout).build()?)
}

/// POST a JSON body and return the JSON response; non-2xx is an error
pub(crate) fn post_json<T: Serialize>(
    client: &reqwest::blocking::Client,
    url: &str,
    body: &T,
) -> Result<Value> {
    debug!("POST {url}");
    let resp = client
        .post(url)
        .header(reqwest::header::ACCEPT, "application/json, text/plain, */*")
        .json(body)
        .send()?;
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().unwrap_or_default();
        return Err(MonitorError::Server { status: status.as_u16(), body });
    }
    Ok(resp.json()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_names() {
        assert_eq!("Finaer".parse::<Provider>(), Ok(Provider::Finaer));
        assert_eq!(" hoggax ".parse::<Provider>(), Ok(Provider::Hoggax));
        assert!("other".parse::<Provider>().is_err());
        assert_eq!(Provider::Hoggax.log_prefix(), "hoggax_");
        assert_eq!(serde_json::to_string(&Provider::Finaer).unwrap(), "\"finaer\"");
    }
}
