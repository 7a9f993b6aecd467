//! Cross-provider comparison
//!
//! Everything here reads normalized quote records and produces plain data
//! (rows, matrices, summaries) for the report renderer. Percentages stay as
//! fractions throughout.

pub mod borders;
pub mod matrix;
pub mod percent;
pub mod select;
pub mod summary;

pub use borders::{build_comparison, ComparisonRow, Pricing, SidePrice};
pub use matrix::{build_border_matrix, build_percent_matrix, MatrixRow, PercentMatrix};
pub use percent::{PercentScale, PERCENT_SCALE_THRESHOLD};
pub use select::{select_comparable_plan, select_plan_with_count};
pub use summary::{summarize_segments, SegmentSummary};

/// Running mean that ignores unknown values
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct Mean {
    sum: f64,
    n: usize,
}

impl Mean {
    pub fn push(&mut self, v: Option<f64>) {
        if let Some(v) = v.filter(|v| v.is_finite()) {
            self.sum += v;
            self.n += 1;
        }
    }

    /// `None` when nothing known was pushed
    pub fn value(&self) -> Option<f64> {
        (self.n > 0).then(|| self.sum / self.n as f64)
    }
}
