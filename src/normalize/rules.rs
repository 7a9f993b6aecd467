//! Named extraction rules for free-text plan fields
//!
//! Each rule maps one pattern to one plan field. A label-format change makes
//! a rule stop matching, which yields `None` for that field and leaves the
//! rest of the plan intact.

use super::amount::{parse_peso_amount, percent_to_fraction};
use regex::Regex;
use std::sync::LazyLock;

/// Plan field a rule fills
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanField {
    TotalAmount,
    InstallmentAmount,
    AdvanceAmount,
    SavingsAmount,
    AdvanceFraction,
    DiscountFraction,
    InstallmentCount,
}

/// How the first capture group becomes a number
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Capture {
    Peso,
    Percent,
    Count,
    /// Pattern match alone means one payment
    SinglePayment,
}

pub struct ExtractionRule {
    pub name: &'static str,
    pub field: PlanField,
    pattern: Regex,
    capture: Capture,
}

impl ExtractionRule {
    fn new(name: &'static str, field: PlanField, pattern: &str, capture: Capture) -> Self {
        Self {
            name,
            field,
            pattern: Regex::new(pattern).expect("valid extraction pattern"),
            capture,
        }
    }

    /// Apply this rule alone
    pub fn apply(&self, text: &str) -> Option<f64> {
        let caps = self.pattern.captures(text)?;
        match self.capture {
            Capture::SinglePayment => Some(1.0),
            Capture::Peso => parse_peso_amount(caps.get(1)?.as_str()),
            Capture::Percent => percent_to_fraction(caps.get(1)?.as_str()),
            Capture::Count => caps.get(1)?.as_str().parse::<u32>().ok().filter(|n| *n >= 1).map(f64::from),
        }
    }
}

const AMOUNT: &str = r"\$?\s*([0-9][0-9.,]*)";

static RULES: LazyLock<Vec<ExtractionRule>> = LazyLock::new(|| {
    vec![
        ExtractionRule::new(
            "importe_total",
            PlanField::TotalAmount,
            &format!(r"(?i)importe\s+total:?\s*{AMOUNT}"),
            Capture::Peso,
        ),
        ExtractionRule::new(
            "importe_cuota",
            PlanField::InstallmentAmount,
            &format!(r"(?i)importe\s+(?:de\s+la\s+)?cuota:?\s*{AMOUNT}"),
            Capture::Peso,
        ),
        ExtractionRule::new(
            "adelanto",
            PlanField::AdvanceAmount,
            &format!(r"(?i)adelanto:?\s*{AMOUNT}"),
            Capture::Peso,
        ),
        ExtractionRule::new(
            "te_ahorras",
            PlanField::SavingsAmount,
            &format!(r"(?i)te\s+ahorr\w*:?\s*{AMOUNT}"),
            Capture::Peso,
        ),
        ExtractionRule::new(
            "pct_adelanto",
            PlanField::AdvanceFraction,
            r"(?i)(\d+(?:[.,]\d+)?)\s*%\s*adel",
            Capture::Percent,
        ),
        ExtractionRule::new(
            "pct_descuento",
            PlanField::DiscountFraction,
            r"(\d+(?:[.,]\d+)?)\s*%",
            Capture::Percent,
        ),
        // single-payment keywords come before the "N cuotas" pattern
        ExtractionRule::new(
            "pago_unico",
            PlanField::InstallmentCount,
            r"(?i)transferencia|\boff\b",
            Capture::SinglePayment,
        ),
        ExtractionRule::new(
            "n_cuotas",
            PlanField::InstallmentCount,
            r"(?i)(\d+)\s*cuot",
            Capture::Count,
        ),
    ]
});

/// The full rule table, in evaluation order
pub fn rules() -> &'static [ExtractionRule] {
    &RULES
}

/// First matching rule for `field`
pub fn extract(field: PlanField, text: &str) -> Option<f64> {
    rules()
        .iter()
        .filter(|r| r.field == field)
        .find_map(|r| r.apply(text))
}

/// Installment count from a plan label ("15% OFF" -> 1, "3 CUOTAS" -> 3)
pub fn installment_count(label: &str) -> Option<u32> {
    extract(PlanField::InstallmentCount, label).map(|n| n as u32)
}

/// Provider-claimed discount in a label. A percentage that qualifies an
/// advance ("7,5% Adel.") is not a discount.
pub fn discount_fraction(label: &str) -> Option<f64> {
    if extract(PlanField::AdvanceFraction, label).is_some() {
        return None;
    }
    extract(PlanField::DiscountFraction, label)
}
