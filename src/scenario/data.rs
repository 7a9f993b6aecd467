use serde::{Deserialize, Serialize};
use std::fmt;

/// One synthetic rent scenario to quote
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub scenario_id: String,
    pub monthly_rent: u64,
    pub monthly_expenses: u64,
    pub term_months: u32,
    /// Provider-specific guarantee flavour flag (Finaer `tipo_garantia`)
    pub guarantee_type: bool,
    /// Rows with `run = false` are loaded but not quoted
    pub enabled: bool,
}

impl Scenario {
    /// Rent + expenses per month
    pub fn monthly_base(&self) -> u64 {
        self.monthly_rent + self.monthly_expenses
    }

    pub fn segment(&self) -> Segment {
        Segment::from_monthly_base(self.monthly_base() as f64)
    }

    pub fn snapshot(&self) -> ScenarioSnapshot {
        ScenarioSnapshot {
            rent: self.monthly_rent,
            expenses: self.monthly_expenses,
            term_months: self.term_months,
            guarantee_type: self.guarantee_type,
        }
    }
}

/// Copy of the scenario inputs stored with every quote record
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScenarioSnapshot {
    pub rent: u64,
    pub expenses: u64,
    pub term_months: u32,
    pub guarantee_type: bool,
}

impl ScenarioSnapshot {
    pub fn monthly_base(&self) -> u64 {
        self.rent + self.expenses
    }

    /// Total contract value: (rent + expenses) x term
    pub fn contract_value(&self) -> f64 {
        self.monthly_base() as f64 * self.term_months as f64
    }

    pub fn segment(&self) -> Segment {
        Segment::from_monthly_base(self.monthly_base() as f64)
    }
}

/// Band of monthly rent + expenses used to group scenarios
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Segment {
    #[serde(rename = "hasta_500k")]
    UpTo500k,
    #[serde(rename = "500k-800k")]
    From500kTo800k,
    #[serde(rename = "mayor_800k")]
    Over800k,
}

impl Segment {
    /// Report order
    pub const ALL: [Segment; 3] = [Segment::UpTo500k, Segment::From500kTo800k, Segment::Over800k];

    /// Upper bounds are inclusive: 500 000 is still the lower band
    pub fn from_monthly_base(monthly_base: f64) -> Self {
        if monthly_base <= 500_000.0 {
            Segment::UpTo500k
        } else if monthly_base <= 800_000.0 {
            Segment::From500kTo800k
        } else {
            Segment::Over800k
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Segment::UpTo500k => "hasta_500k",
            Segment::From500kTo800k => "500k-800k",
            Segment::Over800k => "mayor_800k",
        }
    }

    /// Accepts the labels used by the different hand-made rate sheets
    pub fn from_label(label: &str) -> Option<Self> {
        let norm: String = label
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect();
        match norm.as_str() {
            "hasta500k" | "hasta500000" => Some(Segment::UpTo500k),
            "500k800k" | "500800k" | "500000800000" => Some(Segment::From500kTo800k),
            "mayor800k" | "mayora800000" | "mayor800000" => Some(Segment::Over800k),
            _ => None,
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
