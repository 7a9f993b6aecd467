//! Free-text provider
//!
//! Plans are display cards: a label, a price-kind caption and an info line
//! with amounts embedded in prose. Values come out of the named rules in
//! [`super::rules`]; a rule that stops matching leaves its field unknown.

use super::amount::{amount_from_value, count_from_value};
use super::rules::{self, PlanField};
use super::{field, provider_errors, text_field, NormalizedQuote, PlanDraft, PriceKind, QuoteBase, TransferRule};
use crate::error::{MonitorError, Result};
use crate::scenario::ScenarioSnapshot;
use log::{debug, warn};
use serde_json::Value;

/// Locate the quotation object and its plan list in either response shape
fn locate(raw: &Value) -> Result<(&Value, &[Value])> {
    let candidates = [("/payload/cotizacion", "facilidades_pago"), ("/body/quotation", "payment_methods")];
    for (path, list) in candidates {
        if let Some(q) = raw.pointer(path).filter(|q| q.is_object()) {
            let methods = q.get(list).and_then(Value::as_array).map(Vec::as_slice).unwrap_or_default();
            return Ok((q, methods));
        }
    }
    Err(MonitorError::Shape("hoggax: neither payload.cotizacion nor body.quotation present".into()))
}

pub fn normalize_hoggax(raw: &Value, snapshot: &ScenarioSnapshot, rule: &TransferRule) -> Result<NormalizedQuote> {
    let (quote, methods) = locate(raw)?;
    let num = |names: &[&str]| field(quote, names).and_then(amount_from_value);

    let base = QuoteBase {
        rent: num(&["alquiler", "rent"]).unwrap_or(snapshot.rent as f64),
        expenses: num(&["expensas", "expenses"]).unwrap_or(snapshot.expenses as f64),
        // `plazo` is an API code, not months
        term_months: field(quote, &["plazo_meses", "term"])
            .and_then(count_from_value)
            .unwrap_or(snapshot.term_months),
    };

    let mut plans = Vec::with_capacity(methods.len());
    for method in methods {
        match plan_draft(method) {
            Some(draft) => plans.push(draft.finish(&base, rule)),
            None => warn!("hoggax: no installment count in plan {:?}, skipped", text_field(method, &["texto"])),
        }
    }

    Ok(NormalizedQuote {
        rent: base.rent,
        expenses: base.expenses,
        term_months: base.term_months,
        list_price: num(&["importeRaw", "importe"]),
        provider_discount_metadata: field(quote, &["discount_value"]).cloned(),
        plans,
        errors: provider_errors(raw),
    })
}

/// Read one display card. `None` when the installment count is unknown.
fn plan_draft(method: &Value) -> Option<PlanDraft> {
    let label = text_field(method, &["texto"]);
    let sub = text_field(method, &["sub_texto", "subTexto"]);
    let caption = text_field(method, &["precio_texto", "precioTexto"]);
    let info = text_field(method, &["info_texto", "infoTexto"]);
    let importe = field(method, &["importe"]).and_then(amount_from_value);

    let count = rules::installment_count(&label)?;

    let mut draft = if is_total_caption(&caption) {
        let mut d = PlanDraft::new(count, PriceKind::Total);
        d.total_price = importe;
        d.installment_amount = if count == 1 { importe } else { rules::extract(PlanField::InstallmentAmount, &info) };
        d
    } else {
        let mut d = PlanDraft::new(count, PriceKind::PerInstallment);
        d.installment_amount = importe;
        d.total_price = rules::extract(PlanField::TotalAmount, &info).or_else(|| importe.map(|i| i * count as f64));
        d
    };

    draft.label = Some(if sub.is_empty() { label.clone() } else { format!("{label} / {sub}") });
    draft.advance_payment = rules::extract(PlanField::AdvanceAmount, &info);

    let claimed = rules::discount_fraction(&label);
    draft.provider_discount_percent = claimed.map(|f| f * 100.0);

    let (abs, fraction) = back_compute(draft.total_price, rules::extract(PlanField::SavingsAmount, &info), claimed);
    draft.discount_absolute = abs;
    draft.discount_fraction = fraction;
    draft.list_price = match (draft.total_price, abs) {
        (Some(total), Some(abs)) => Some(total + abs),
        _ => None,
    };

    debug!("hoggax plan {label:?}: count={count} total={:?} discount={abs:?}", draft.total_price);
    Some(draft)
}

/// "Precio FINAL" marks `importe` as the whole price
fn is_total_caption(caption: &str) -> bool {
    caption.trim().to_lowercase().starts_with("precio")
}

/// Fill in whichever of (absolute discount, fraction) is missing from the
/// other and the total. The fraction is of the pre-discount price.
pub(crate) fn back_compute(total: Option<f64>, abs: Option<f64>, fraction: Option<f64>) -> (Option<f64>, Option<f64>) {
    let Some(total) = total.filter(|t| *t > 0.0) else {
        return (abs, fraction);
    };
    match (abs, fraction) {
        (None, Some(f)) if f < 1.0 => (Some(total / (1.0 - f) - total), Some(f)),
        (Some(a), None) if total + a > 0.0 => (Some(a), Some(a / (total + a))),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MonitorConfig;
    use crate::normalize::normalize;
    use crate::provider::{fixed_term_response, Provider};
    use crate::scenario::Scenario;
    use approx::assert_relative_eq;
    use serde_json::json;

    fn snapshot(term: u32) -> ScenarioSnapshot {
        ScenarioSnapshot { rent: 799_999, expenses: 0, term_months: term, guarantee_type: false }
    }

    fn payload() -> Value {
        json!({"payload": {"cotizacion": {
            "alquiler": 799999,
            "expensas": 0,
            "importeRaw": 1_999_998,
            "facilidades_pago": [
                {"texto": "3 CUOTAS sin interés", "sub_texto": "Crédito o Débito", "precio_texto": "Cuotas",
                 "info_texto": "Importe total: $ 1.999.998. CFT: 0.00%", "importe": 666_666},
                {"texto": "15% OFF", "sub_texto": "Transferencia", "precio_texto": "Precio FINAL",
                 "info_texto": "Te ahorrás $ 299.999", "importe": 1_699_999},
                {"texto": "6 CUOTAS", "sub_texto": "Crédito", "precio_texto": "Cuotas",
                 "info_texto": "", "importe": 400000},
                {"texto": "Tarjeta", "precio_texto": "Cuotas", "importe": 1}
            ]
        }}})
    }

    #[test]
    fn test_back_compute() {
        let (abs, f) = back_compute(Some(850.0), None, Some(0.15));
        assert_relative_eq!(abs.unwrap(), 150.0, epsilon = 1e-9);
        assert_eq!(f, Some(0.15));

        let (abs, f) = back_compute(Some(850.0), Some(150.0), None);
        assert_eq!(abs, Some(150.0));
        assert_relative_eq!(f.unwrap(), 0.15);

        assert_eq!(back_compute(None, None, Some(0.15)), (None, Some(0.15)));
        assert_eq!(back_compute(Some(850.0), None, Some(1.0)), (None, Some(1.0)));
    }

    #[test]
    fn test_payload_shape() {
        let quote = normalize(Provider::Hoggax, &payload(), &snapshot(24), &TransferRule::default()).expect("normalize");
        // the card without a count is dropped
        let counts: Vec<u32> = quote.plans.iter().map(|p| p.installment_count).collect();
        assert_eq!(counts, vec![1, 3, 6]);
        assert_eq!(quote.list_price, Some(1_999_998.0));
        assert_eq!(quote.term_months, 24);

        let upfront = quote.plan(1).unwrap();
        assert_eq!(upfront.price_kind, PriceKind::Total);
        assert_eq!(upfront.total_price, Some(1_699_999.0));
        assert_eq!(upfront.installment_amount, Some(1_699_999.0));
        assert_eq!(upfront.discount_absolute, Some(299_999.0));
        assert_eq!(upfront.list_price_before_discount, Some(1_999_998.0));
        assert_relative_eq!(upfront.discount_fraction.unwrap(), 299_999.0 / 1_999_998.0);
        assert_relative_eq!(upfront.provider_discount_percent.unwrap(), 15.0);
        assert_eq!(upfront.label.as_deref(), Some("15% OFF / Transferencia"));
        // without a rule the provider's total stands
        assert_eq!(upfront.transfer_price, Some(1_699_999.0));
        assert_eq!(upfront.transfer_discount_fraction, None);

        let three = quote.plan(3).unwrap();
        assert_eq!(three.price_kind, PriceKind::PerInstallment);
        assert_eq!(three.total_price, Some(1_999_998.0));
        assert_eq!(three.installment_amount, Some(666_666.0));
        assert_eq!(three.discount_fraction, None);
        assert_relative_eq!(three.fraction_of_contract_value.unwrap(), 1_999_998.0 / (799_999.0 * 24.0));

        // no "Importe total" phrase: count x installment
        let six = quote.plan(6).unwrap();
        assert_eq!(six.total_price, Some(2_400_000.0));
    }

    #[test]
    fn test_body_shape() {
        let raw = json!({"body": {"quotation": {
            "rent": 450000, "expenses": 50000, "term": 36, "discount_value": 10,
            "payment_methods": [
                {"texto": "10% OFF", "subTexto": "Transferencia", "precioTexto": "Precio FINAL",
                 "infoTexto": "", "importe": 900000},
                {"texto": "7,5% Adel. + 23 CUOTAS", "subTexto": "Crédito", "precioTexto": "Cuotas",
                 "infoTexto": "Adelanto: $ 75.000. Importe total: $ 1.000.000. CFT: 0.00%", "importe": 39_130}
            ]
        }}});
        let quote = normalize(Provider::Hoggax, &raw, &snapshot(24), &TransferRule::default()).expect("normalize");
        assert_eq!(quote.rent, 450_000.0);
        assert_eq!(quote.term_months, 36);
        assert_eq!(quote.list_price, None);
        assert_eq!(quote.provider_discount_metadata, Some(json!(10)));

        let upfront = quote.plan(1).unwrap();
        assert_relative_eq!(upfront.discount_absolute.unwrap(), 100_000.0, epsilon = 1e-6);
        assert_relative_eq!(upfront.discount_fraction.unwrap(), 0.1, epsilon = 1e-12);
        assert_relative_eq!(upfront.list_price_before_discount.unwrap(), 1_000_000.0, epsilon = 1e-6);

        let adv = quote.plan(23).unwrap();
        assert_eq!(adv.advance_payment, Some(75_000.0));
        assert_eq!(adv.total_price, Some(1_000_000.0));
        assert_eq!(adv.installment_amount, Some(39_130.0));
        // the advance percentage is not a discount
        assert_eq!(adv.provider_discount_percent, None);
        assert_eq!(adv.discount_fraction, None);
    }

    #[test]
    fn test_default_rule_kept_apart_from_provider_discount() {
        let raw = json!({"body": {"quotation": {
            "rent": 450000, "expenses": 50000, "term": 24,
            "payment_methods": [
                {"texto": "10% OFF", "subTexto": "Transferencia", "precioTexto": "Precio FINAL",
                 "infoTexto": "", "importe": 900000}
            ]
        }}});
        let rule = TransferRule::from_settings(&MonitorConfig::default().hoggax);
        let quote = normalize(Provider::Hoggax, &raw, &snapshot(24), &rule).expect("normalize");
        let upfront = quote.plan(1).unwrap();

        // what the provider claims
        assert_relative_eq!(upfront.discount_fraction.unwrap(), 0.1, epsilon = 1e-12);
        assert_relative_eq!(upfront.provider_discount_percent.unwrap(), 10.0);
        assert_eq!(upfront.total_price, Some(900_000.0));

        // the analyst's 15% on the same list price
        assert_eq!(upfront.transfer_discount_fraction, Some(0.15));
        assert_relative_eq!(upfront.transfer_price.unwrap(), 850_000.0, epsilon = 1e-6);
        assert_ne!(upfront.transfer_discount_fraction, upfront.discount_fraction);
    }

    #[test]
    fn test_fixed_term_response_normalizes() {
        let scenario = Scenario {
            scenario_id: "S_799999_12".into(),
            monthly_rent: 799_999,
            monthly_expenses: 0,
            term_months: 12,
            guarantee_type: false,
            enabled: true,
        };
        let raw = fixed_term_response(&scenario);
        let quote = normalize(Provider::Hoggax, &raw, &scenario.snapshot(), &TransferRule::default()).expect("normalize");
        assert_eq!(quote.term_months, 12);
        assert_eq!(quote.list_price, Some(799_999.0));

        let upfront = quote.plan(1).unwrap();
        assert_eq!(upfront.total_price, Some(679_999.0));
        assert_relative_eq!(upfront.discount_fraction.unwrap(), 0.15, epsilon = 1e-12);

        let three = quote.plan(3).unwrap();
        assert_eq!(three.total_price, Some(799_999.0));
        assert_eq!(three.installment_amount, Some(266_666.0));
    }

    #[test]
    fn test_unknown_shape() {
        let err = normalize_hoggax(&json!({"status": "ok"}), &snapshot(24), &TransferRule::default()).unwrap_err();
        assert!(matches!(err, MonitorError::Shape(_)));
    }

    #[test]
    fn test_garbled_info_degrades_to_unknown() {
        let raw = json!({"payload": {"cotizacion": {"facilidades_pago": [
            {"texto": "3 CUOTAS", "precio_texto": "Cuotas", "info_texto": "consultar", "importe": null}
        ]}}});
        let quote = normalize_hoggax(&raw, &snapshot(24), &TransferRule::default()).expect("normalize");
        let plan = &quote.plans[0];
        assert_eq!(plan.total_price, None);
        assert_eq!(plan.installment_amount, None);
        assert_eq!(plan.monthly_equivalent_cost, None);
    }
}
