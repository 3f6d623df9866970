use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Risk check categories the screener knows how to dispatch.
///
/// Fraud detection and liquidity are safety-critical: their failure or
/// absence weighs heaviest in decisions and confidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckCategory {
    FraudDetection,
    Liquidity,
    Ownership,
    TaxAnalysis,
    HolderDistribution,
    MarketSentiment,
}

impl CheckCategory {
    /// All known categories, heaviest weight first.
    pub fn all() -> [CheckCategory; 6] {
        [
            CheckCategory::FraudDetection,
            CheckCategory::Liquidity,
            CheckCategory::TaxAnalysis,
            CheckCategory::Ownership,
            CheckCategory::HolderDistribution,
            CheckCategory::MarketSentiment,
        ]
    }

    /// Default aggregation weight for the category. The weights over
    /// `all()` sum to 1.0; profiles may override per category.
    pub fn default_weight(&self) -> f64 {
        match self {
            CheckCategory::FraudDetection => 0.35,
            CheckCategory::Liquidity => 0.25,
            CheckCategory::TaxAnalysis => 0.20,
            CheckCategory::Ownership => 0.10,
            CheckCategory::HolderDistribution => 0.05,
            CheckCategory::MarketSentiment => 0.05,
        }
    }

    /// Safety-critical categories drive the failure-count block rule and
    /// the confidence bonuses/penalties.
    pub fn is_safety_critical(&self) -> bool {
        matches!(
            self,
            CheckCategory::FraudDetection | CheckCategory::Liquidity
        )
    }

    /// Whether the category blocks on its own threshold when a profile
    /// does not list it explicitly.
    pub fn default_blocking(&self) -> bool {
        self.is_safety_critical()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CheckCategory::FraudDetection => "fraud_detection",
            CheckCategory::Liquidity => "liquidity",
            CheckCategory::Ownership => "ownership",
            CheckCategory::TaxAnalysis => "tax_analysis",
            CheckCategory::HolderDistribution => "holder_distribution",
            CheckCategory::MarketSentiment => "market_sentiment",
        }
    }
}

impl fmt::Display for CheckCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle status of a single check execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    Pending,
    Running,
    Completed,
    Warning,
    Failed,
    Timeout,
}

impl CheckStatus {
    /// Completed and Warning results carry usable evidence; Warning
    /// contributes at a reduced weight during aggregation.
    pub fn is_successful(&self) -> bool {
        matches!(self, CheckStatus::Completed | CheckStatus::Warning)
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, CheckStatus::Failed | CheckStatus::Timeout)
    }
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CheckStatus::Pending => "pending",
            CheckStatus::Running => "running",
            CheckStatus::Completed => "completed",
            CheckStatus::Warning => "warning",
            CheckStatus::Failed => "failed",
            CheckStatus::Timeout => "timeout",
        };
        f.write_str(s)
    }
}

/// Canonical keys the decision engine and explainability reporter read
/// from `CheckResult::details`. Checks populate whichever apply.
pub mod detail_keys {
    /// bool: the fraud check confirmed honeypot/fraud behaviour.
    pub const FRAUD_CONFIRMED: &str = "fraud_confirmed";
    /// bool: transfers are confirmed disabled (unsellable token).
    pub const TRANSFERS_DISABLED: &str = "transfers_disabled";
    /// f64: pool liquidity in USD.
    pub const LIQUIDITY_USD: &str = "liquidity_usd";
    /// f64: simulated sell tax percentage.
    pub const SELL_TAX_PERCENT: &str = "sell_tax_percent";
    /// f64: simulated buy tax percentage.
    pub const BUY_TAX_PERCENT: &str = "buy_tax_percent";
    /// bool: contract ownership has been renounced.
    pub const OWNERSHIP_RENOUNCED: &str = "ownership_renounced";
}

/// Outcome of a single risk check, normalized into a uniform envelope
/// regardless of how the check completed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResult {
    pub category: CheckCategory,
    pub status: CheckStatus,
    /// 0 = no risk found, 100 = maximum risk.
    pub risk_score: f64,
    /// 0.0 to 1.0 confidence the check has in its own reading.
    pub confidence: f64,
    /// Resolved aggregation weight: profile override, else the check's
    /// declared weight, else the category default.
    pub weight: f64,
    /// Opaque check-specific findings, read via `detail_keys`.
    pub details: serde_json::Value,
    pub error: Option<String>,
    pub execution_time_ms: u64,
}

impl CheckResult {
    pub fn completed(
        category: CheckCategory,
        risk_score: f64,
        confidence: f64,
        details: serde_json::Value,
    ) -> Self {
        Self::with_status(category, CheckStatus::Completed, risk_score, confidence, details)
    }

    /// Partial-evidence result: usable but discounted during scoring.
    pub fn warning(
        category: CheckCategory,
        risk_score: f64,
        confidence: f64,
        details: serde_json::Value,
    ) -> Self {
        Self::with_status(category, CheckStatus::Warning, risk_score, confidence, details)
    }

    fn with_status(
        category: CheckCategory,
        status: CheckStatus,
        risk_score: f64,
        confidence: f64,
        details: serde_json::Value,
    ) -> Self {
        Self {
            category,
            status,
            risk_score: risk_score.max(0.0).min(100.0),
            confidence: confidence.max(0.0).min(1.0),
            weight: category.default_weight(),
            details,
            error: None,
            execution_time_ms: 0,
        }
    }

    /// A failed check is treated as maximum risk with zero confidence:
    /// absence of evidence never counts in the asset's favor.
    pub fn failed(category: CheckCategory, error: impl Into<String>) -> Self {
        Self {
            category,
            status: CheckStatus::Failed,
            risk_score: 100.0,
            confidence: 0.0,
            weight: category.default_weight(),
            details: serde_json::Value::Null,
            error: Some(error.into()),
            execution_time_ms: 0,
        }
    }

    pub fn timed_out(category: CheckCategory, budget: Duration) -> Self {
        Self {
            category,
            status: CheckStatus::Timeout,
            risk_score: 100.0,
            confidence: 0.0,
            weight: category.default_weight(),
            details: serde_json::Value::Null,
            error: Some(format!("timed out after {}ms", budget.as_millis())),
            execution_time_ms: budget.as_millis() as u64,
        }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight.max(0.0);
        self
    }

    pub fn with_execution_time(mut self, elapsed: Duration) -> Self {
        self.execution_time_ms = elapsed.as_millis() as u64;
        self
    }

    pub fn is_successful(&self) -> bool {
        self.status.is_successful()
    }

    /// Typed read of a boolean detail flag.
    pub fn detail_bool(&self, key: &str) -> Option<bool> {
        self.details.get(key).and_then(|v| v.as_bool())
    }

    /// Typed read of a numeric detail value.
    pub fn detail_f64(&self, key: &str) -> Option<f64> {
        self.details.get(key).and_then(|v| v.as_f64())
    }
}

/// Input handed to every check invocation.
#[derive(Debug, Clone)]
pub struct CheckContext {
    pub token_address: String,
    pub pair_address: String,
    /// Time the check is allowed to spend on one attempt. The coordinator
    /// enforces this externally as well.
    pub budget: Duration,
}

impl CheckContext {
    pub fn new(token_address: impl Into<String>, pair_address: impl Into<String>, budget: Duration) -> Self {
        Self {
            token_address: token_address.into(),
            pair_address: pair_address.into(),
            budget,
        }
    }
}
