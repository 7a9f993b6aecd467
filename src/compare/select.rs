//! Which plan stands for a provider when several could

use crate::normalize::NormalizedPlan;

/// The comparable plan: a single up-front payment if offered, otherwise the
/// cheapest total. Unknown totals lose to any known one; ties keep source
/// order.
pub fn select_comparable_plan(plans: &[NormalizedPlan]) -> Option<&NormalizedPlan> {
    plans
        .iter()
        .find(|p| p.installment_count == 1)
        .or_else(|| cheapest(plans.iter()))
}

/// Cheapest plan among those with exactly `installment_count` payments
/// (variants such as credit vs debit share a count).
pub fn select_plan_with_count(plans: &[NormalizedPlan], installment_count: u32) -> Option<&NormalizedPlan> {
    cheapest(plans.iter().filter(|p| p.installment_count == installment_count))
}

fn cheapest<'a>(plans: impl Iterator<Item = &'a NormalizedPlan>) -> Option<&'a NormalizedPlan> {
    plans.min_by(|a, b| {
        let a = a.total_price.unwrap_or(f64::INFINITY);
        let b = b.total_price.unwrap_or(f64::INFINITY);
        a.total_cmp(&b)
    })
}
