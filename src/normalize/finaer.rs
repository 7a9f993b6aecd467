//! Structured-JSON provider
//!
//! Plans already arrive as objects with numeric fields; normalization is
//! renaming plus the derived metrics.

use super::amount::{amount_from_value, count_from_value};
use super::{field, provider_errors, NormalizedQuote, PlanDraft, PriceKind, QuoteBase, TransferRule};
use crate::error::{MonitorError, Result};
use crate::scenario::ScenarioSnapshot;
use log::warn;
use serde_json::Value;

pub fn normalize_finaer(raw: &Value, snapshot: &ScenarioSnapshot, rule: &TransferRule) -> Result<NormalizedQuote> {
    let errors = provider_errors(raw);

    let obj = match raw.get("object") {
        Some(o) if o.is_object() => o,
        _ => {
            let detail = if errors.is_empty() { "missing `object`".to_string() } else { errors.join("; ") };
            return Err(MonitorError::Shape(format!("finaer: {detail}")));
        }
    };

    let num = |names: &[&str]| field(obj, names).and_then(amount_from_value);

    let base = QuoteBase {
        rent: num(&["alquiler"]).unwrap_or(snapshot.rent as f64),
        expenses: num(&["expensas"]).unwrap_or(snapshot.expenses as f64),
        term_months: field(obj, &["duracion_del_contrato_en_meses"])
            .and_then(count_from_value)
            .unwrap_or(snapshot.term_months),
    };

    let mut plans = Vec::new();
    let entries = obj
        .get("posibles_planes_de_cuotas")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    for (i, p) in entries.iter().enumerate() {
        let Some(count) = field(p, &["cantidad_de_cuotas"]).and_then(count_from_value) else {
            warn!("finaer: plan {i} has no installment count, skipped");
            continue;
        };
        let pnum = |names: &[&str]| field(p, names).and_then(amount_from_value);

        let mut draft = PlanDraft::new(count, PriceKind::Total);
        draft.label = Some(format!("{count} cuotas"));
        draft.total_price = pnum(&["monto_final"]);
        draft.list_price = pnum(&["honorario_sin_descuentos"]);
        draft.discount_absolute = pnum(&["descuento_aplicado"]);
        draft.provider_discount_percent = pnum(&["porcentaje_de_descuento_aplicado"]);
        draft.advance_payment = pnum(&["anticipo"]);
        draft.installment_amount = pnum(&["monto_cuotas"]);
        draft.discount_deadline = field(p, &["fecha_limite_descuento"]).map(|v| match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        });

        plans.push(draft.finish(&base, rule));
    }

    Ok(NormalizedQuote {
        rent: base.rent,
        expenses: base.expenses,
        term_months: base.term_months,
        list_price: None,
        provider_discount_metadata: field(obj, &["porcentaje_descuento_mercadopago"]).cloned(),
        plans,
        errors,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize;
    use crate::provider::Provider;
    use approx::assert_relative_eq;
    use serde_json::json;

    fn snapshot() -> ScenarioSnapshot {
        ScenarioSnapshot { rent: 500_000, expenses: 0, term_months: 12, guarantee_type: false }
    }

    #[test]
    fn test_single_plan_metrics() {
        let raw = json!({"object": {
            "alquiler": "500000",
            "expensas": 0,
            "duracion_del_contrato_en_meses": 12,
            "posibles_planes_de_cuotas": [{
                "cantidad_de_cuotas": 1,
                "monto_final": 500000,
                "honorario_sin_descuentos": 625000,
                "descuento_aplicado": 125000
            }]
        }});

        let quote = normalize_finaer(&raw, &snapshot(), &TransferRule::default()).expect("normalize");
        assert_eq!(quote.plans.len(), 1);
        assert!(quote.errors.is_empty());

        let plan = &quote.plans[0];
        assert_relative_eq!(plan.discount_fraction.unwrap(), 0.2);
        assert_relative_eq!(plan.monthly_equivalent_cost.unwrap(), 41_666.67, epsilon = 0.005);
        assert_relative_eq!(plan.fraction_of_contract_value.unwrap(), 0.08333, epsilon = 1e-5);
        assert_relative_eq!(plan.fraction_of_rent_value.unwrap(), 500_000.0 / 6_000_000.0);
        assert_eq!(plan.advance_payment, None);
        assert_eq!(plan.installment_amount, None);
    }

    #[test]
    fn test_plans_sorted_and_rule_applied() {
        let raw = json!({"object": {
            "alquiler": "400000",
            "expensas": 100000,
            "duracion_del_contrato_en_meses": 24,
            "porcentaje_descuento_mercadopago": 10,
            "posibles_planes_de_cuotas": [
                {"cantidad_de_cuotas": 6, "monto_final": 1200000, "honorario_sin_descuentos": 1200000,
                 "monto_cuotas": 200000, "anticipo": 0, "descuento_aplicado": 0},
                {"cantidad_de_cuotas": 1, "monto_final": 960000, "honorario_sin_descuentos": 1200000,
                 "descuento_aplicado": 240000, "porcentaje_de_descuento_aplicado": 20,
                 "fecha_limite_descuento": "2026-03-01"},
                {"cantidad_de_cuotas": "3", "monto_final": "1.200.000,00", "honorario_sin_descuentos": 1200000}
            ]
        }, "errors": []});

        let quote = normalize(Provider::Finaer, &raw, &snapshot(), &TransferRule::new(Some(0.2))).expect("normalize");
        let counts: Vec<u32> = quote.plans.iter().map(|p| p.installment_count).collect();
        assert_eq!(counts, vec![1, 3, 6]);
        assert_eq!(quote.term_months, 24);
        assert_eq!(quote.provider_discount_metadata, Some(json!(10)));

        let upfront = quote.plan(1).unwrap();
        assert_relative_eq!(upfront.transfer_price.unwrap(), 960_000.0);
        assert_eq!(upfront.provider_discount_percent, Some(20.0));
        assert_eq!(upfront.discount_deadline.as_deref(), Some("2026-03-01"));

        let three = quote.plan(3).unwrap();
        assert_eq!(three.total_price, Some(1_200_000.0));
        assert_eq!(three.discount_absolute, None);
        assert_eq!(three.discount_fraction, None);
        assert_eq!(three.transfer_price, Some(1_200_000.0));
        assert_eq!(three.transfer_discount_fraction, Some(0.0));

        let six = quote.plan(6).unwrap();
        assert_eq!(six.discount_fraction, Some(0.0));
        assert_eq!(six.installment_amount, Some(200_000.0));
        assert_relative_eq!(six.fraction_of_contract_value.unwrap(), 0.1);
    }

    #[test]
    fn test_missing_fields_are_none() {
        let raw = json!({"object": {"posibles_planes_de_cuotas": [{"cantidad_de_cuotas": 2}]}});
        let quote = normalize_finaer(&raw, &snapshot(), &TransferRule::default()).expect("normalize");
        // scenario values fill in what the response omits
        assert_eq!(quote.rent, 500_000.0);
        assert_eq!(quote.term_months, 12);
        let plan = &quote.plans[0];
        assert_eq!(plan.total_price, None);
        assert_eq!(plan.monthly_equivalent_cost, None);
        assert_eq!(plan.discount_fraction, None);
    }

    #[test]
    fn test_missing_object_is_shape_error() {
        let raw = json!({"object": null, "errors": ["alquiler inválido"]});
        let err = normalize_finaer(&raw, &snapshot(), &TransferRule::default()).unwrap_err();
        assert!(err.to_string().contains("alquiler inválido"));
    }

    #[test]
    fn test_plan_without_count_skipped() {
        let raw = json!({"object": {"posibles_planes_de_cuotas": [{"monto_final": 1}, {"cantidad_de_cuotas": 1}]}});
        let quote = normalize_finaer(&raw, &snapshot(), &TransferRule::default()).expect("normalize");
        assert_eq!(quote.plans.len(), 1);
    }
}
