// Shared fixtures for the engine integration tests
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use uuid::Uuid;

use token_risk_screener::models::detail_keys;
use token_risk_screener::{
    Assessment, AssessmentStore, CheckCategory, CheckContext, CheckRegistry, CheckResult,
    EngineSettings, RiskCheck, RiskEvent, ScreenerError,
};

pub const TOKEN: &str = "0x1111111111111111111111111111111111111111";
pub const PAIR: &str = "0x2222222222222222222222222222222222222222";

/// What a mock check does every time the coordinator invokes it.
#[derive(Clone)]
pub enum MockBehavior {
    /// Return a completed result with this score and detail payload.
    Succeed { score: f64, details: Value },
    /// Return a warning (partial evidence) result.
    Warn { score: f64, details: Value },
    /// Fail every attempt with a retryable check error.
    Fail { message: String },
    /// Sleep longer than any sane budget so the attempt times out.
    Hang { delay: Duration },
    /// Fail the first `failures` attempts, then succeed.
    RecoverAfter { failures: u32, score: f64 },
}

/// Scriptable check used to drive the coordinator through every path the
/// real checks can take: success, partial data, errors, and hangs.
pub struct MockCheck {
    category: CheckCategory,
    behavior: MockBehavior,
    budget: Duration,
    retries: u32,
    attempts: AtomicU32,
}

impl MockCheck {
    pub fn new(category: CheckCategory, behavior: MockBehavior) -> Self {
        Self {
            category,
            behavior,
            budget: Duration::from_secs(5),
            retries: 2,
            attempts: AtomicU32::new(0),
        }
    }

    pub fn succeeding(category: CheckCategory, score: f64) -> Self {
        Self::new(
            category,
            MockBehavior::Succeed {
                score,
                details: Value::Null,
            },
        )
    }

    pub fn with_budget(mut self, budget: Duration) -> Self {
        self.budget = budget;
        self
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RiskCheck for MockCheck {
    fn category(&self) -> CheckCategory {
        self.category
    }

    async fn run(&self, _ctx: &CheckContext) -> Result<CheckResult, ScreenerError> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        match &self.behavior {
            MockBehavior::Succeed { score, details } => Ok(CheckResult::completed(
                self.category,
                *score,
                0.9,
                details.clone(),
            )),
            MockBehavior::Warn { score, details } => Ok(CheckResult::warning(
                self.category,
                *score,
                0.4,
                details.clone(),
            )),
            MockBehavior::Fail { message } => {
                Err(ScreenerError::check_failed(self.category, message.clone()))
            }
            MockBehavior::Hang { delay } => {
                tokio::time::sleep(*delay).await;
                Ok(CheckResult::completed(self.category, 0.0, 0.9, Value::Null))
            }
            MockBehavior::RecoverAfter { failures, score } => {
                if attempt <= *failures {
                    Err(ScreenerError::check_failed(
                        self.category,
                        format!("transient failure on attempt {}", attempt),
                    ))
                } else {
                    Ok(CheckResult::completed(self.category, *score, 0.9, Value::Null))
                }
            }
        }
    }

    fn timeout(&self) -> Duration {
        self.budget
    }

    fn max_retries(&self) -> u32 {
        self.retries
    }
}

/// Store whose every hook fails, for verifying persistence stays best-effort.
pub struct FailingStore;

#[async_trait]
impl AssessmentStore for FailingStore {
    async fn create_assessment(&self, _assessment: &Assessment) -> Result<(), ScreenerError> {
        Err(ScreenerError::PersistenceFailure {
            operation: "create_assessment".to_string(),
            message: "store offline".to_string(),
        })
    }

    async fn save_assessment_result(
        &self,
        _id: Uuid,
        _assessment: &Assessment,
    ) -> Result<(), ScreenerError> {
        Err(ScreenerError::PersistenceFailure {
            operation: "save_assessment_result".to_string(),
            message: "store offline".to_string(),
        })
    }

    async fn record_event(&self, _event: RiskEvent) -> Result<(), ScreenerError> {
        Err(ScreenerError::PersistenceFailure {
            operation: "record_event".to_string(),
            message: "store offline".to_string(),
        })
    }
}

/// Engine settings with millisecond retry delays so failure paths stay fast.
pub fn fast_settings() -> EngineSettings {
    let mut settings = EngineSettings::default();
    settings.retry.base_delay_ms = 1;
    settings.retry.max_delay_ms = 2;
    settings
}

/// Registry covering the four core categories with the scores and details
/// of a token that passes every profile rule.
pub fn clean_registry() -> CheckRegistry {
    let mut registry = CheckRegistry::new();
    registry.register(Arc::new(MockCheck::new(
        CheckCategory::FraudDetection,
        MockBehavior::Succeed {
            score: 5.0,
            details: json!({
                detail_keys::FRAUD_CONFIRMED: false,
                detail_keys::TRANSFERS_DISABLED: false,
            }),
        },
    )));
    registry.register(Arc::new(MockCheck::new(
        CheckCategory::Liquidity,
        MockBehavior::Succeed {
            score: 10.0,
            details: json!({ detail_keys::LIQUIDITY_USD: 120_000.0 }),
        },
    )));
    registry.register(Arc::new(MockCheck::new(
        CheckCategory::Ownership,
        MockBehavior::Succeed {
            score: 5.0,
            details: json!({ detail_keys::OWNERSHIP_RENOUNCED: true }),
        },
    )));
    registry.register(Arc::new(MockCheck::new(
        CheckCategory::TaxAnalysis,
        MockBehavior::Succeed {
            score: 8.0,
            details: json!({
                detail_keys::SELL_TAX_PERCENT: 3.0,
                detail_keys::BUY_TAX_PERCENT: 1.0,
            }),
        },
    )));
    registry
}
