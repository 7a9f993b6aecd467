//! Per-segment averages of each provider's comparable plan

use super::select::select_comparable_plan;
use super::Mean;
use crate::provider::Provider;
use crate::record::QuoteRecord;
use crate::scenario::Segment;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentSummary {
    pub provider: Provider,
    pub segment: Segment,
    pub term_months: u32,
    /// Distinct scenario ids contributing
    pub scenarios: usize,
    pub mean_total_price: Option<f64>,
    pub mean_list_price: Option<f64>,
    pub mean_discount_absolute: Option<f64>,
    pub mean_discount_fraction: Option<f64>,
    pub mean_fraction_of_contract: Option<f64>,
    pub mean_monthly_cost: Option<f64>,
}

#[derive(Default)]
struct Acc {
    ids: BTreeSet<String>,
    total: Mean,
    list: Mean,
    discount_abs: Mean,
    discount_fraction: Mean,
    contract: Mean,
    monthly: Mean,
}

/// Group by (provider, segment, term), sorted in that order
pub fn summarize_segments(records: &[QuoteRecord]) -> Vec<SegmentSummary> {
    let mut groups: BTreeMap<(Provider, Segment, u32), Acc> = BTreeMap::new();

    for record in records {
        let Some(plan) = select_comparable_plan(&record.normalized.plans) else {
            continue;
        };
        let key = (record.provider, record.scenario.segment(), record.scenario.term_months);
        let acc = groups.entry(key).or_default();
        acc.ids.insert(record.scenario_id.clone());
        acc.total.push(plan.total_price);
        acc.list.push(plan.list_price_before_discount.or(record.normalized.list_price));
        acc.discount_abs.push(plan.discount_absolute);
        acc.discount_fraction.push(plan.discount_fraction);
        acc.contract.push(plan.fraction_of_contract_value);
        acc.monthly.push(plan.monthly_equivalent_cost);
    }

    groups
        .into_iter()
        .map(|((provider, segment, term_months), acc)| SegmentSummary {
            provider,
            segment,
            term_months,
            scenarios: acc.ids.len(),
            mean_total_price: acc.total.value(),
            mean_list_price: acc.list.value(),
            mean_discount_absolute: acc.discount_abs.value(),
            mean_discount_fraction: acc.discount_fraction.value(),
            mean_fraction_of_contract: acc.contract.value(),
            mean_monthly_cost: acc.monthly.value(),
        })
        .collect()
}
