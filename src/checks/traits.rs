// Risk Check Contract - the interface every screening check implements
use std::time::Duration;

use async_trait::async_trait;

use crate::error::ScreenerError;
use crate::models::check::{CheckCategory, CheckContext, CheckResult};

/// Fallback per-attempt time budget for checks that do not declare one.
pub const DEFAULT_CHECK_TIMEOUT: Duration = Duration::from_secs(10);

/// Core trait that all risk checks implement.
///
/// Checks are assumed unreliable: they may error, hang, or return partial
/// data. The coordinator wraps every invocation in the retry and timeout
/// machinery, so implementations only need to report honestly through the
/// uniform `CheckResult` envelope. Partial evidence should be returned as
/// a `Warning` result rather than an error.
#[async_trait]
pub trait RiskCheck: Send + Sync {
    /// Category this check covers; one registered check per category.
    fn category(&self) -> CheckCategory;

    /// Execute the check for one token/pair. Implementations should honor
    /// `ctx.budget`; the coordinator enforces it externally regardless.
    async fn run(&self, ctx: &CheckContext) -> Result<CheckResult, ScreenerError>;

    /// Aggregation weight when the active profile has no override.
    fn default_weight(&self) -> f64 {
        self.category().default_weight()
    }

    /// Whether this check's score should block on its own when the
    /// profile does not list a threshold for the category.
    fn is_blocking(&self) -> bool {
        self.category().default_blocking()
    }

    /// Time budget for a single attempt.
    fn timeout(&self) -> Duration {
        DEFAULT_CHECK_TIMEOUT
    }

    /// Retries after the first attempt before the check is recorded failed.
    fn max_retries(&self) -> u32 {
        2
    }

    /// Check implementation version, for audit trails.
    fn version(&self) -> &'static str {
        "1.0.0"
    }

    /// Descriptor used for logging and diagnostics.
    fn describe(&self) -> serde_json::Value {
        serde_json::json!({
            "category": self.category(),
            "version": self.version(),
            "default_weight": self.default_weight(),
            "blocking": self.is_blocking(),
            "timeout_ms": self.timeout().as_millis() as u64,
            "max_retries": self.max_retries(),
        })
    }
}
