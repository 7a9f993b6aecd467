//! Rental-guarantee price monitor
//!
//! Quotes a fixed set of synthetic rent scenarios against two competing
//! guarantee providers, normalizes their responses into comparable plans,
//! keeps a line-delimited quote log and renders comparison workbooks.

pub mod error;
pub mod config;
pub mod scenario;
pub mod provider;
pub mod normalize;
pub mod record;
pub mod pipeline;
pub mod compare;
pub mod rates;
pub mod report;

pub use config::MonitorConfig;
pub use error::{MonitorError, Result};
pub use normalize::{NormalizedPlan, NormalizedQuote};
pub use provider::Provider;
pub use record::QuoteRecord;
pub use scenario::{Scenario, Segment};
