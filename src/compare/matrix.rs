//! Segment x term matrix of price as a fraction of contract value

use super::select::select_comparable_plan;
use super::Mean;
use crate::config::ComparisonTargets;
use crate::normalize::ratio;
use crate::record::QuoteRecord;
use crate::scenario::Segment;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatrixRow {
    pub segment: Segment,
    /// One cell per matrix term; `None` where no scenario was quoted
    pub cells: Vec<Option<f64>>,
}

/// Rows are always the three segments in report order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PercentMatrix {
    pub terms: Vec<u32>,
    pub rows: Vec<MatrixRow>,
    /// Mean discount fraction of the comparable plans, per term
    pub discount_row: Vec<Option<f64>>,
}

impl PercentMatrix {
    /// Assemble a matrix from per-(segment, term) means
    pub(crate) fn from_cells(terms: &[u32], cells: &BTreeMap<(Segment, u32), Mean>, discounts: &BTreeMap<u32, Mean>) -> Self {
        let rows = Segment::ALL
            .iter()
            .map(|&segment| MatrixRow {
                segment,
                cells: terms
                    .iter()
                    .map(|t| cells.get(&(segment, *t)).and_then(Mean::value))
                    .collect(),
            })
            .collect();
        let discount_row = terms.iter().map(|t| discounts.get(t).and_then(Mean::value)).collect();
        Self { terms: terms.to_vec(), rows, discount_row }
    }

    pub fn cell(&self, segment: Segment, term_months: u32) -> Option<f64> {
        let col = self.terms.iter().position(|t| *t == term_months)?;
        self.rows.iter().find(|r| r.segment == segment)?.cells[col]
    }

    pub fn is_empty(&self) -> bool {
        self.rows.iter().all(|r| r.cells.iter().all(Option::is_none))
    }
}

/// Pivot one provider's records. Each record contributes the fraction of
/// contract value of its comparable plan; records on a term outside `terms`
/// are ignored.
pub fn build_percent_matrix(records: &[QuoteRecord], terms: &[u32]) -> PercentMatrix {
    pivot(records.iter(), terms)
}

/// [`build_percent_matrix`] over the border monthly bases of `targets` only
pub fn build_border_matrix(records: &[QuoteRecord], targets: &ComparisonTargets, terms: &[u32]) -> PercentMatrix {
    let border = records
        .iter()
        .filter(|r| targets.matches_base(r.scenario.monthly_base() as f64));
    pivot(border, terms)
}

fn pivot<'a>(records: impl Iterator<Item = &'a QuoteRecord>, terms: &[u32]) -> PercentMatrix {
    let mut cells: BTreeMap<(Segment, u32), Mean> = BTreeMap::new();
    let mut discounts: BTreeMap<u32, Mean> = BTreeMap::new();

    for record in records {
        let snap = &record.scenario;
        if !terms.contains(&snap.term_months) {
            continue;
        }
        let Some(plan) = select_comparable_plan(&record.normalized.plans) else {
            continue;
        };
        let fraction = plan
            .fraction_of_contract_value
            .or_else(|| ratio(plan.total_price, snap.contract_value()));

        cells.entry((snap.segment(), snap.term_months)).or_default().push(fraction);
        discounts.entry(snap.term_months).or_default().push(plan.discount_fraction);
    }

    PercentMatrix::from_cells(terms, &cells, &discounts)
}
