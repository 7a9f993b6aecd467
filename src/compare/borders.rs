//! Long-form comparison at the segment borders
//!
//! One row per (monthly base, term, installment count) found among the
//! configured targets, with each provider's list price, transfer price and
//! per-installment equivalent side by side.

use super::select::select_plan_with_count;
use super::Mean;
use crate::config::{ComparisonBasis, ComparisonTargets, MonitorConfig, ProviderSettings};
use crate::normalize::{NormalizedPlan, TransferRule};
use crate::provider::Provider;
use crate::record::QuoteRecord;
use crate::scenario::Segment;
use log::debug;
use serde::Serialize;
use std::collections::BTreeMap;

/// How one side of the comparison is priced
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SidePrice {
    /// `list x (1 - rate)` for one payment, list otherwise
    Rule(TransferRule),
    /// The plan's own total; the single-payment discount reported is the
    /// effective `1 - total / list`
    ProviderTotal,
}

impl SidePrice {
    pub fn from_settings(settings: &ProviderSettings) -> Self {
        match settings.compare_on {
            ComparisonBasis::TransferRule => SidePrice::Rule(TransferRule::from_settings(settings)),
            ComparisonBasis::ProviderTotal => SidePrice::ProviderTotal,
        }
    }
}

/// Pricing of the two compared providers
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pricing {
    pub a: SidePrice,
    pub b: SidePrice,
}

impl Pricing {
    pub fn from_config(config: &MonitorConfig, a: Provider, b: Provider) -> Self {
        Self {
            a: SidePrice::from_settings(config.provider(a)),
            b: SidePrice::from_settings(config.provider(b)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonRow {
    pub segment: Segment,
    pub monthly_base: u64,
    pub term_months: u32,
    pub installment_count: u32,

    pub list_price_a: Option<f64>,
    pub transfer_discount_a: Option<f64>,
    pub transfer_price_a: Option<f64>,
    pub per_installment_a: Option<f64>,

    pub list_price_b: Option<f64>,
    pub transfer_discount_b: Option<f64>,
    pub transfer_price_b: Option<f64>,
    pub per_installment_b: Option<f64>,

    /// list_a - list_b
    pub list_delta: Option<f64>,
    /// transfer_a - transfer_b
    pub price_delta: Option<f64>,
}

type Key = (u64, u32, u32);

/// Averages of one provider's side for a key
#[derive(Debug, Clone, Copy, Default)]
struct SideAcc {
    list: Mean,
    discount: Mean,
    price: Mean,
    per_installment: Mean,
}

/// One priced plan on one side
#[derive(Debug, Clone, Copy, PartialEq)]
struct Side {
    list: Option<f64>,
    discount: Option<f64>,
    price: Option<f64>,
    per_installment: Option<f64>,
}

fn price_side(record: &QuoteRecord, plan: &NormalizedPlan, pricing: &SidePrice) -> Side {
    let count = plan.installment_count;
    let list = plan
        .list_price_before_discount
        .or(record.normalized.list_price)
        .or(plan.total_price);

    let (discount, price) = match pricing {
        SidePrice::Rule(rule) => rule.apply(count, list, plan.total_price),
        SidePrice::ProviderTotal => {
            // effective discount of the provider's own single-payment total
            let discount = match (list, plan.total_price) {
                (Some(l), Some(t)) if count == 1 && l > 0.0 => Some(1.0 - t / l),
                (Some(_), Some(_)) => Some(0.0),
                _ => None,
            };
            (discount, plan.total_price)
        }
    };

    Side { list, discount, price, per_installment: price.map(|p| p / count as f64) }
}

fn collect(records: &[QuoteRecord], targets: &ComparisonTargets, pricing: &SidePrice) -> BTreeMap<Key, SideAcc> {
    let mut out: BTreeMap<Key, SideAcc> = BTreeMap::new();
    for record in records {
        let snap = &record.scenario;
        let base = snap.monthly_base();
        if !targets.matches_scenario(base as f64, snap.term_months) {
            continue;
        }
        for &count in &targets.installment_counts {
            let Some(plan) = select_plan_with_count(&record.normalized.plans, count) else {
                debug!("{} {}: no {count}-payment plan", record.provider, record.scenario_id);
                continue;
            };
            let side = price_side(record, plan, pricing);
            let acc = out.entry((base, snap.term_months, count)).or_default();
            acc.list.push(side.list);
            acc.discount.push(side.discount);
            acc.price.push(side.price);
            acc.per_installment.push(side.per_installment);
        }
    }
    out
}

fn delta(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    Some(a? - b?)
}

/// Join provider `a` and provider `b` records on (base, term, count).
/// Repeated scenarios are averaged; a key present on one side only still
/// yields a row, with the other side unknown.
pub fn build_comparison(
    a: &[QuoteRecord],
    b: &[QuoteRecord],
    targets: &ComparisonTargets,
    pricing: &Pricing,
) -> Vec<ComparisonRow> {
    let side_a = collect(a, targets, &pricing.a);
    let side_b = collect(b, targets, &pricing.b);

    let mut keys: Vec<Key> = side_a.keys().chain(side_b.keys()).copied().collect();
    keys.sort_unstable();
    keys.dedup();

    keys.into_iter()
        .map(|key @ (base, term, count)| {
            let sa = side_a.get(&key).copied().unwrap_or_default();
            let sb = side_b.get(&key).copied().unwrap_or_default();
            ComparisonRow {
                segment: Segment::from_monthly_base(base as f64),
                monthly_base: base,
                term_months: term,
                installment_count: count,
                list_price_a: sa.list.value(),
                transfer_discount_a: sa.discount.value(),
                transfer_price_a: sa.price.value(),
                per_installment_a: sa.per_installment.value(),
                list_price_b: sb.list.value(),
                transfer_discount_b: sb.discount.value(),
                transfer_price_b: sb.price.value(),
                per_installment_b: sb.per_installment.value(),
                list_delta: delta(sa.list.value(), sb.list.value()),
                price_delta: delta(sa.price.value(), sb.price.value()),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::{NormalizedQuote, PlanDraft, PriceKind, QuoteBase};
    use crate::scenario::Scenario;
    use approx::assert_relative_eq;
    use serde_json::Value;

    fn record(provider: Provider, base: u64, term: u32, list_price: Option<f64>, plans: Vec<(u32, f64, Option<f64>)>) -> QuoteRecord {
        let qb = QuoteBase { rent: base as f64, expenses: 0.0, term_months: term };
        let plans = plans
            .into_iter()
            .map(|(count, total, list)| {
                let mut d = PlanDraft::new(count, PriceKind::Total);
                d.total_price = Some(total);
                d.list_price = list;
                d.finish(&qb, &TransferRule::default())
            })
            .collect();
        let scenario = Scenario {
            scenario_id: format!("S_{base}_{term}"),
            monthly_rent: base,
            monthly_expenses: 0,
            term_months: term,
            guarantee_type: false,
            enabled: true,
        };
        let normalized = NormalizedQuote {
            rent: base as f64,
            expenses: 0.0,
            term_months: term,
            list_price,
            provider_discount_metadata: None,
            plans,
            errors: vec![],
        };
        QuoteRecord::new(provider, &scenario, normalized, Value::Null)
    }

    fn pricing() -> Pricing {
        Pricing { a: SidePrice::Rule(TransferRule::new(Some(0.20))), b: SidePrice::ProviderTotal }
    }

    #[test]
    fn test_business_rule_and_deltas() {
        let a = vec![record(
            Provider::Finaer,
            499_999,
            24,
            None,
            vec![(1, 800_000.0, Some(1_000_000.0)), (3, 1_000_000.0, Some(1_000_000.0))],
        )];
        let b = vec![record(
            Provider::Hoggax,
            499_999,
            24,
            Some(1_100_000.0),
            vec![(1, 935_000.0, Some(1_100_000.0)), (3, 1_100_000.0, None)],
        )];

        let rows = build_comparison(&a, &b, &ComparisonTargets::default(), &pricing());
        assert_eq!(rows.len(), 2);

        let one = &rows[0];
        assert_eq!((one.segment, one.term_months, one.installment_count), (Segment::UpTo500k, 24, 1));
        assert_relative_eq!(one.transfer_price_a.unwrap(), 800_000.0);
        assert_eq!(one.transfer_discount_a, Some(0.2));
        assert_relative_eq!(one.transfer_discount_b.unwrap(), 0.15);
        assert_relative_eq!(one.price_delta.unwrap(), -135_000.0);
        assert_relative_eq!(one.list_delta.unwrap(), -100_000.0);

        let three = &rows[1];
        // list falls back to the quote-level list price
        assert_eq!(three.list_price_b, Some(1_100_000.0));
        assert_eq!(three.transfer_price_a, Some(1_000_000.0));
        assert_relative_eq!(three.per_installment_a.unwrap(), 333_333.333, epsilon = 0.001);
        assert_eq!(three.transfer_discount_b, Some(0.0));
    }

    #[test]
    fn test_non_targets_filtered_and_duplicates_averaged() {
        let a = vec![
            record(Provider::Finaer, 799_999, 36, None, vec![(1, 0.0, Some(1_000_000.0))]),
            record(Provider::Finaer, 799_999, 36, None, vec![(1, 0.0, Some(2_000_000.0))]),
            // not a border base
            record(Provider::Finaer, 650_000, 36, None, vec![(1, 0.0, Some(9.0))]),
            // not a target term
            record(Provider::Finaer, 799_999, 12, None, vec![(1, 0.0, Some(9.0))]),
        ];
        let rows = build_comparison(&a, &[], &ComparisonTargets::default(), &pricing());
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.segment, Segment::From500kTo800k);
        assert_relative_eq!(row.list_price_a.unwrap(), 1_500_000.0);
        assert_relative_eq!(row.transfer_price_a.unwrap(), 1_200_000.0);
        assert_eq!(row.transfer_price_b, None);
        assert_eq!(row.price_delta, None);
    }

    #[test]
    fn test_rows_sorted_by_base_term_count() {
        let a = vec![
            record(Provider::Finaer, 801_000, 24, None, vec![(3, 1.0, None), (1, 1.0, None)]),
            record(Provider::Finaer, 499_999, 36, None, vec![(1, 1.0, None)]),
            record(Provider::Finaer, 499_999, 24, None, vec![(1, 1.0, None)]),
        ];
        let rows = build_comparison(&a, &[], &ComparisonTargets::default(), &pricing());
        let keys: Vec<(u64, u32, u32)> = rows.iter().map(|r| (r.monthly_base, r.term_months, r.installment_count)).collect();
        assert_eq!(keys, vec![(499_999, 24, 1), (499_999, 36, 1), (801_000, 24, 1), (801_000, 24, 3)]);
        assert_eq!(rows[3].segment, Segment::Over800k);
    }

    #[test]
    fn test_pricing_from_config() {
        let mut config = MonitorConfig::default();
        let p = Pricing::from_config(&config, Provider::Finaer, Provider::Hoggax);
        assert_eq!(p.a, SidePrice::Rule(TransferRule::new(Some(0.20))));
        assert_eq!(p.b, SidePrice::ProviderTotal);

        // Hoggax priced on its 15% rule instead of the web total
        config.hoggax.compare_on = ComparisonBasis::TransferRule;
        let p = Pricing::from_config(&config, Provider::Finaer, Provider::Hoggax);
        let b = vec![record(Provider::Hoggax, 499_999, 24, None, vec![(1, 900_000.0, Some(1_000_000.0))])];
        let rows = build_comparison(&[], &b, &ComparisonTargets::default(), &p);
        assert_relative_eq!(rows[0].transfer_price_b.unwrap(), 850_000.0);
        assert_eq!(rows[0].transfer_discount_b, Some(0.15));
    }
}
