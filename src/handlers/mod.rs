pub mod ai;
pub mod analysis_history;
pub mod project;
