use super::{post_json, Provider, QuoteClient};
use crate::error::Result;
use crate::scenario::Scenario;
use serde::Serialize;
use serde_json::Value;

/// Request body; rent and term travel as strings
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinaerRequest {
    pub alquiler: String,
    pub expensas: u64,
    pub duracion_contrato: String,
    pub tipo_garantia: bool,
}

impl FinaerRequest {
    pub fn for_scenario(s: &Scenario) -> Self {
        Self {
            alquiler: s.monthly_rent.to_string(),
            expensas: s.monthly_expenses,
            duracion_contrato: s.term_months.to_string(),
            tipo_garantia: s.guarantee_type,
        }
    }
}

pub struct FinaerClient {
    http: reqwest::blocking::Client,
    endpoint: String,
}

impl FinaerClient {
    pub fn new(http: reqwest::blocking::Client, endpoint: String) -> Self {
        Self { http, endpoint }
    }
}

impl QuoteClient for FinaerClient {
    fn provider(&self) -> Provider {
        Provider::Finaer
    }

    fn fetch(&self, scenario: &Scenario) -> Result<Value> {
        post_json(&self.http, &self.endpoint, &FinaerRequest::for_scenario(scenario))
    }
}
