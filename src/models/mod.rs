// Data model for the screening engine
pub mod assessment;
pub mod check;
pub mod events;

pub use assessment::{Assessment, AssessmentState, Decision, RiskLevel, RiskSignal};
pub use check::{detail_keys, CheckCategory, CheckContext, CheckResult, CheckStatus};
pub use events::{RiskEvent, RiskEventType};
