// Screening Engine Module
// Scoring, decision rules, confidence, explanation, and orchestration

pub mod batch;
pub mod confidence;
pub mod coordinator;
pub mod decision;
pub mod explainability;
pub mod scoring;

// Re-export main types
pub use batch::{AssetRef, BulkOptions, BulkSummary};
pub use coordinator::{AssessOptions, EngineStats, ScreeningEngine};
pub use decision::{
    decide, DecisionOutcome, DecisionReason, ABSOLUTE_MIN_LIQUIDITY_USD, CRITICAL_FAILURE_LIMIT,
    HARD_BLOCK_SCORE,
};
pub use explainability::{build_explanation, Explanation, MAX_COUNTERFACTUALS};
pub use scoring::{overall_score, NO_EVIDENCE_SCORE, WARNING_WEIGHT_FACTOR};
