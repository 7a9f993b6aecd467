//! Fraction vs whole-percent detection for hand-made data
//!
//! Heuristic only: a column whose largest magnitude is at most
//! [`PERCENT_SCALE_THRESHOLD`] is taken as fractions, anything larger as
//! whole percents. A genuine fraction above 3.5 (a 350% markup) or a
//! whole-percent column that never exceeds 3.5 is misread.

/// Largest magnitude still read as a fraction
pub const PERCENT_SCALE_THRESHOLD: f64 = 3.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PercentScale {
    /// 0.15 means 15%
    Fraction,
    /// 15 means 15%
    WholePercent,
}

impl PercentScale {
    /// Decide the scale of a whole column. Non-finite values are ignored;
    /// an empty column counts as fractions.
    pub fn detect<I: IntoIterator<Item = f64>>(values: I) -> Self {
        let max = values
            .into_iter()
            .filter(|v| v.is_finite())
            .map(f64::abs)
            .fold(None, |m: Option<f64>, v| Some(m.map_or(v, |m| m.max(v))));
        match max {
            Some(m) if m > PERCENT_SCALE_THRESHOLD => PercentScale::WholePercent,
            _ => PercentScale::Fraction,
        }
    }

    pub fn to_fraction(self, v: f64) -> f64 {
        match self {
            PercentScale::Fraction => v,
            PercentScale::WholePercent => v / 100.0,
        }
    }

    /// Rescale a column in place to fractions, detecting its scale first
    pub fn normalize_column(values: &mut [Option<f64>]) -> Self {
        let scale = Self::detect(values.iter().flatten().copied());
        for v in values.iter_mut().flatten() {
            *v = scale.to_fraction(*v);
        }
        scale
    }
}
