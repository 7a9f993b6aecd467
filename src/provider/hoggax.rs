use super::{post_json, Provider, QuoteClient};
use crate::error::{MonitorError, Result};
use crate::scenario::Scenario;
use serde::Serialize;
use serde_json::{json, Value};

/// Term quoted by rule instead of through the API
pub const FIXED_RULE_TERM: u32 = 12;

/// Single-payment discount of the fixed-term rule
pub const FIXED_RULE_UPFRONT_DISCOUNT: f64 = 0.15;

/// API `plazo` code for a term in months
pub fn plazo_for_term(term_months: u32) -> Option<u8> {
    match term_months {
        24 => Some(2),
        36 => Some(3),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HoggaxRequest {
    pub cotizacion: Cotizacion,
    pub meta: Meta,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cotizacion {
    pub alquiler: u64,
    pub expensas: u64,
    pub plazo: u8,
    pub discount_ref: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    pub fuente: String,
    pub medio: String,
    pub es_mobile: bool,
    pub es_renovacion: bool,
}

impl HoggaxRequest {
    pub fn for_scenario(s: &Scenario) -> Result<Self> {
        let plazo = plazo_for_term(s.term_months).ok_or(MonitorError::UnsupportedTerm {
            provider: Provider::Hoggax.to_string(),
            term_months: s.term_months,
        })?;
        Ok(Self {
            cotizacion: Cotizacion {
                alquiler: s.monthly_rent,
                expensas: s.monthly_expenses,
                plazo,
                discount_ref: String::new(),
            },
            meta: Meta {
                fuente: "Hoggax".into(),
                medio: "Cotizador (nueva web)".into(),
                es_mobile: false,
                es_renovacion: false,
            },
        })
    }
}

pub struct HoggaxClient {
    http: reqwest::blocking::Client,
    endpoint: String,
}

impl HoggaxClient {
    pub fn new(http: reqwest::blocking::Client, endpoint: String) -> Self {
        Self { http, endpoint }
    }
}

impl QuoteClient for HoggaxClient {
    fn provider(&self) -> Provider {
        Provider::Hoggax
    }

    fn fetch(&self, scenario: &Scenario) -> Result<Value> {
        if scenario.term_months == FIXED_RULE_TERM {
            return Ok(fixed_term_response(scenario));
        }
        let body = HoggaxRequest::for_scenario(scenario)?;
        post_json(&self.http, &self.endpoint, &body)
    }
}

/// Response for a term the API does not quote, built by rule in the API's
/// own shape: list = rent + expenses, one transfer payment at 15% off and
/// three interest-free installments at list.
pub fn fixed_term_response(s: &Scenario) -> Value {
    let base = s.monthly_base();
    let upfront = (base as f64 * (1.0 - FIXED_RULE_UPFRONT_DISCOUNT)).round() as u64;
    let installment = (base as f64 / 3.0).round() as u64;
    json!({
        "source": "fixed_rule",
        "payload": {
            "cotizacion": {
                "alquiler": s.monthly_rent,
                "expensas": s.monthly_expenses,
                "plazo_meses": s.term_months,
                "importeRaw": base,
                "facilidades_pago": [
                    {
                        "texto": "15% OFF",
                        "sub_texto": "Transferencia",
                        "precio_texto": "Precio FINAL",
                        "info_texto": "",
                        "importe": upfront,
                    },
                    {
                        "texto": "3 CUOTAS sin interés",
                        "sub_texto": "Crédito o Débito",
                        "precio_texto": "Cuotas",
                        "info_texto": format!("Importe total: $ {}. CFT: 0.00%", format_peso(base)),
                        "importe": installment,
                    },
                ],
            }
        }
    })
}

/// 1413747 -> "1.413.747"
fn format_peso(amount: u64) -> String {
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}
