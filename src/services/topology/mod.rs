//! Topology Module
//!
//! Diagram types and the pre-analysis step that turns a raw diagram into
//! `TopologyFacts` for prompt enrichment.

mod analyzer;
mod models;

pub use analyzer::{analyze, tally_device_types};
pub use models::*;
