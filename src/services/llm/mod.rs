//! LLM Gateway Module
//!
//! Owns the connection to the locally-hosted model server.
//!
//! # Architecture
//! ```text
//! ┌─────────────────┐
//! │   LLMGateway    │  ← Trait (health, catalog, switch, generate)
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌────────────────┐      ┌────────────────┐
//! │ LLMGatewayImpl │ ───▶ │ ModelSelection │  (shared, token-guarded writes)
//! └────────┬───────┘      └────────────────┘
//!          ▼
//!     ┌─────────┐
//!     │LLMClient│  → GET /v1/models, POST /v1/chat/completions
//!     └─────────┘
//! ```

mod client;
mod models;
mod selection;
mod service;

pub use client::LLMClient;
pub use models::*;
pub use selection::ModelSelection;
pub use service::{LLMGateway, LLMGatewayImpl};

#[cfg(test)]
mod tests;
