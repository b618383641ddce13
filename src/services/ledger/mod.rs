//! Analysis Ledger
//!
//! SQLite-backed history of analyses plus the per-user and per-project
//! counters derived from it.

mod models;
mod repository;

pub use models::*;
pub use repository::LedgerRepository;
