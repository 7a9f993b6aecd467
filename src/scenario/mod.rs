//! Scenario data structures, CSV loading and border-grid generation

mod data;
pub mod loader;
pub mod generator;

pub use data::{Scenario, ScenarioSnapshot, Segment};
pub use loader::{load_scenarios, load_scenarios_from_reader, sniff_delimiter, write_scenarios};
pub use generator::ScenarioGrid;
