//! Border-scenario generator
//!
//! Produces the minimal scenario grid used for cross-provider comparison:
//! every configured monthly base (rent + expenses) at every configured term.
//! Keeping the grid small avoids noise from scenarios no report reads.

use super::Scenario;
use crate::config::ComparisonTargets;
use serde::{Deserialize, Serialize};

/// Parameters for generating the grid
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioGrid {
    /// Monthly rent + expenses values
    #[serde(default = "default_monthly_bases")]
    pub monthly_bases: Vec<u64>,

    /// Contract terms in months
    #[serde(default = "default_terms")]
    pub terms: Vec<u32>,

    /// Monthly expenses carved out of each base (0 = all rent)
    #[serde(default)]
    pub expenses: u64,

    #[serde(default)]
    pub guarantee_type: bool,
}

fn default_monthly_bases() -> Vec<u64> { ComparisonTargets::default().monthly_bases }
fn default_terms() -> Vec<u32> { ComparisonTargets::default().terms }

impl Default for ScenarioGrid {
    fn default() -> Self {
        Self::from_targets(&ComparisonTargets::default())
    }
}

impl ScenarioGrid {
    /// Grid covering exactly the comparison border points
    pub fn from_targets(targets: &ComparisonTargets) -> Self {
        Self {
            monthly_bases: targets.monthly_bases.clone(),
            terms: targets.terms.clone(),
            expenses: 0,
            guarantee_type: false,
        }
    }

    /// One enabled scenario per (base, term), ids `S_<base>_<term>`
    pub fn generate(&self) -> Vec<Scenario> {
        let mut scenarios = Vec::with_capacity(self.monthly_bases.len() * self.terms.len());
        for &base in &self.monthly_bases {
            let expenses = self.expenses.min(base);
            for &term in &self.terms {
                if term == 0 {
                    continue;
                }
                scenarios.push(Scenario {
                    scenario_id: format!("S_{base}_{term}"),
                    monthly_rent: base - expenses,
                    monthly_expenses: expenses,
                    term_months: term,
                    guarantee_type: self.guarantee_type,
                    enabled: true,
                });
            }
        }
        scenarios
    }
}
