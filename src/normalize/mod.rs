//! Response normalization
//!
//! Turns each provider's raw JSON into a [`NormalizedQuote`]: a list of
//! comparable [`NormalizedPlan`]s sorted by installment count, plus the
//! scenario-level values the provider echoed back.

pub mod amount;
pub mod rules;
mod finaer;
mod hoggax;

pub use finaer::normalize_finaer;
pub use hoggax::normalize_hoggax;

use crate::config::ProviderSettings;
use crate::error::Result;
use crate::provider::Provider;
use crate::scenario::ScenarioSnapshot;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Whether a quoted amount is the whole price or one installment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceKind {
    Total,
    PerInstallment,
}

/// One comparable payment plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedPlan {
    /// Number of payments; 1 = all up front
    pub installment_count: u32,
    /// Provider display label, when the provider has one
    pub label: Option<String>,
    pub price_kind: PriceKind,

    pub total_price: Option<f64>,
    pub list_price_before_discount: Option<f64>,
    pub discount_absolute: Option<f64>,
    /// Fraction (0.2 = 20%)
    pub discount_fraction: Option<f64>,
    /// Discount percentage exactly as the provider reports it
    pub provider_discount_percent: Option<f64>,

    pub advance_payment: Option<f64>,
    pub installment_amount: Option<f64>,
    pub discount_deadline: Option<String>,

    /// total / term
    pub monthly_equivalent_cost: Option<f64>,
    /// total / ((rent + expenses) x term)
    pub fraction_of_contract_value: Option<f64>,
    /// total / (rent x term)
    pub fraction_of_rent_value: Option<f64>,

    /// Analyst's all-upfront discount applied to this plan (0 when the plan
    /// has more than one payment, `None` when no rule is configured)
    pub transfer_discount_fraction: Option<f64>,
    pub transfer_price: Option<f64>,
}

/// Normalized view of one provider response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedQuote {
    pub rent: f64,
    pub expenses: f64,
    pub term_months: u32,
    /// Quote-level list price, when the provider states one
    pub list_price: Option<f64>,
    /// Provider-level discount data kept verbatim
    pub provider_discount_metadata: Option<Value>,
    /// Sorted ascending by installment count
    pub plans: Vec<NormalizedPlan>,
    /// Provider-reported errors; empty on success
    pub errors: Vec<String>,
}

impl NormalizedQuote {
    pub fn plan(&self, installment_count: u32) -> Option<&NormalizedPlan> {
        self.plans.iter().find(|p| p.installment_count == installment_count)
    }
}

/// The analyst's single-payment discount rule
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TransferRule {
    pub upfront_discount: Option<f64>,
}

impl TransferRule {
    pub fn new(upfront_discount: Option<f64>) -> Self {
        Self { upfront_discount }
    }

    pub fn from_settings(settings: &ProviderSettings) -> Self {
        Self::new(settings.upfront_discount)
    }

    /// (discount fraction, transfer price). With a rule, one payment pays
    /// `list x (1 - rate)` and anything else pays list. Without a rule the
    /// provider's own total stands.
    pub fn apply(&self, installment_count: u32, list_price: Option<f64>, total_price: Option<f64>) -> (Option<f64>, Option<f64>) {
        match self.upfront_discount {
            Some(rate) => {
                let fraction = if installment_count == 1 { rate } else { 0.0 };
                (Some(fraction), list_price.map(|l| l * (1.0 - fraction)))
            }
            None => (None, total_price),
        }
    }
}

/// Monthly bases the derived metrics divide by
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct QuoteBase {
    pub rent: f64,
    pub expenses: f64,
    pub term_months: u32,
}

/// Plan values as read from the provider, before derived metrics
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PlanDraft {
    pub installment_count: u32,
    pub label: Option<String>,
    pub price_kind: PriceKind,
    pub total_price: Option<f64>,
    pub list_price: Option<f64>,
    pub discount_absolute: Option<f64>,
    pub discount_fraction: Option<f64>,
    pub provider_discount_percent: Option<f64>,
    pub advance_payment: Option<f64>,
    pub installment_amount: Option<f64>,
    pub discount_deadline: Option<String>,
}

impl PlanDraft {
    pub fn new(installment_count: u32, price_kind: PriceKind) -> Self {
        Self {
            installment_count,
            label: None,
            price_kind,
            total_price: None,
            list_price: None,
            discount_absolute: None,
            discount_fraction: None,
            provider_discount_percent: None,
            advance_payment: None,
            installment_amount: None,
            discount_deadline: None,
        }
    }

    /// Attach derived metrics and the transfer rule
    pub fn finish(self, base: &QuoteBase, rule: &TransferRule) -> NormalizedPlan {
        let term = base.term_months as f64;

        // discount / list whenever both are known, so the two never disagree
        let discount_fraction = match (self.discount_absolute, self.list_price) {
            (Some(abs), Some(list)) if list > 0.0 => Some(abs / list),
            (_, Some(list)) if list <= 0.0 => None,
            _ => self.discount_fraction,
        };

        let (transfer_discount_fraction, transfer_price) =
            rule.apply(self.installment_count, self.list_price, self.total_price);

        NormalizedPlan {
            installment_count: self.installment_count,
            label: self.label,
            price_kind: self.price_kind,
            total_price: self.total_price,
            list_price_before_discount: self.list_price,
            discount_absolute: self.discount_absolute,
            discount_fraction,
            provider_discount_percent: self.provider_discount_percent,
            advance_payment: self.advance_payment,
            installment_amount: self.installment_amount,
            discount_deadline: self.discount_deadline,
            monthly_equivalent_cost: ratio(self.total_price, term),
            fraction_of_contract_value: ratio(self.total_price, (base.rent + base.expenses) * term),
            fraction_of_rent_value: ratio(self.total_price, base.rent * term),
            transfer_discount_fraction,
            transfer_price,
        }
    }
}

/// `num / den`, unknown when the denominator is not positive
pub fn ratio(num: Option<f64>, den: f64) -> Option<f64> {
    match num {
        Some(n) if den > 0.0 => Some(n / den),
        _ => None,
    }
}

/// Normalize a raw response from `provider`. The snapshot fills in
/// scenario values the response does not echo.
pub fn normalize(provider: Provider, raw: &Value, snapshot: &ScenarioSnapshot, rule: &TransferRule) -> Result<NormalizedQuote> {
    let mut quote = match provider {
        Provider::Finaer => normalize_finaer(raw, snapshot, rule)?,
        Provider::Hoggax => normalize_hoggax(raw, snapshot, rule)?,
    };
    quote.plans.sort_by_key(|p| p.installment_count);
    Ok(quote)
}

/// First present, non-null field among aliases
pub(crate) fn field<'a>(obj: &'a Value, names: &[&str]) -> Option<&'a Value> {
    names.iter().filter_map(|n| obj.get(*n)).find(|v| !v.is_null())
}

/// Top-level `errors` array as messages
pub(crate) fn provider_errors(raw: &Value) -> Vec<String> {
    raw.get("errors")
        .and_then(Value::as_array)
        .map(|errs| {
            errs.iter()
                .map(|e| match e {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect()
        })
        .unwrap_or_default()
}

pub(crate) fn text_field(obj: &Value, names: &[&str]) -> String {
    match field(obj, names) {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn base() -> QuoteBase {
        QuoteBase { rent: 400_000.0, expenses: 100_000.0, term_months: 12 }
    }

    #[test]
    fn test_ratio() {
        assert_eq!(ratio(Some(10.0), 4.0), Some(2.5));
        assert_eq!(ratio(Some(10.0), 0.0), None);
        assert_eq!(ratio(None, 4.0), None);
    }

    #[test]
    fn test_transfer_rule() {
        let rule = TransferRule::new(Some(0.15));
        let (f, p) = rule.apply(1, Some(100_000.0), Some(90_000.0));
        assert_eq!(f, Some(0.15));
        assert_relative_eq!(p.unwrap(), 85_000.0);

        let (f, p) = rule.apply(3, Some(100_000.0), Some(90_000.0));
        assert_eq!(f, Some(0.0));
        assert_eq!(p, Some(100_000.0));

        let (f, p) = TransferRule::default().apply(1, Some(100_000.0), Some(90_000.0));
        assert_eq!(f, None);
        assert_eq!(p, Some(90_000.0));
    }

    #[test]
    fn test_finish_metrics() {
        let mut draft = PlanDraft::new(1, PriceKind::Total);
        draft.total_price = Some(600_000.0);
        draft.list_price = Some(750_000.0);
        draft.discount_absolute = Some(150_000.0);
        // a stale fraction loses to abs / list
        draft.discount_fraction = Some(0.5);

        let plan = draft.finish(&base(), &TransferRule::new(Some(0.2)));
        assert_relative_eq!(plan.discount_fraction.unwrap(), 0.2);
        assert_relative_eq!(plan.monthly_equivalent_cost.unwrap(), 50_000.0);
        assert_relative_eq!(plan.fraction_of_contract_value.unwrap(), 0.1);
        assert_relative_eq!(plan.fraction_of_rent_value.unwrap(), 0.125);
        assert_relative_eq!(plan.transfer_price.unwrap(), 600_000.0);
    }

    #[test]
    fn test_finish_zero_term() {
        let mut draft = PlanDraft::new(3, PriceKind::Total);
        draft.total_price = Some(600_000.0);
        let plan = draft.finish(&QuoteBase { rent: 1.0, expenses: 0.0, term_months: 0 }, &TransferRule::default());
        assert_eq!(plan.monthly_equivalent_cost, None);
        assert_eq!(plan.fraction_of_contract_value, None);
        assert_eq!(plan.fraction_of_rent_value, None);
    }

    #[test]
    fn test_finish_zero_base() {
        let mut draft = PlanDraft::new(1, PriceKind::Total);
        draft.total_price = Some(120_000.0);
        let plan = draft.finish(&QuoteBase { rent: 0.0, expenses: 0.0, term_months: 12 }, &TransferRule::default());
        assert_eq!(plan.monthly_equivalent_cost, Some(10_000.0));
        assert_eq!(plan.fraction_of_contract_value, None);
        assert_eq!(plan.fraction_of_rent_value, None);
    }
}
