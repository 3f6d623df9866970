// Token Risk Screener
// Pre-trade fraud and risk screening engine for token/pair assets

pub mod checks;
pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod storage;
pub mod utils;

pub use checks::{CheckRegistry, RiskCheck};
pub use config::{EngineSettings, ProfileRegistry, RiskProfile};
pub use engine::{
    AssessOptions, AssetRef, BulkOptions, BulkSummary, EngineStats, ScreeningEngine,
};
pub use error::ScreenerError;
pub use models::{
    Assessment, CheckCategory, CheckContext, CheckResult, CheckStatus, Decision, RiskEvent,
    RiskLevel,
};
pub use storage::{AssessmentStore, MemoryStore, NoopStore};
