pub mod analysis;
pub mod ledger;
pub mod llm;
pub mod topology;

pub use analysis::AnalysisOrchestrator;
pub use ledger::LedgerRepository;
pub use llm::{LLMGateway, LLMGatewayImpl, ModelSelection};
