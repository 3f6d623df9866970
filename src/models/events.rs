use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::assessment::{Assessment, Decision, RiskLevel};

/// Screening event types surfaced to the persistence hooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskEventType {
    AssessmentCompleted,
    AssetBlocked,
    AssetSkipped,
    BulkCompleted,
}

/// Notable screening outcome recorded through `AssessmentStore`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskEvent {
    pub id: Uuid,
    pub event_type: RiskEventType,
    pub severity: RiskLevel,
    pub token_address: String,
    pub profile_name: String,
    pub payload: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl RiskEvent {
    pub fn new(
        event_type: RiskEventType,
        severity: RiskLevel,
        token_address: impl Into<String>,
        profile_name: impl Into<String>,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            event_type,
            severity,
            token_address: token_address.into(),
            profile_name: profile_name.into(),
            payload,
            created_at: Utc::now(),
        }
    }

    /// Event describing a finished assessment, typed by its decision.
    pub fn from_assessment(assessment: &Assessment) -> Self {
        let event_type = match assessment.decision {
            Decision::Block => RiskEventType::AssetBlocked,
            Decision::Skip => RiskEventType::AssetSkipped,
            Decision::Approve => RiskEventType::AssessmentCompleted,
        };
        Self::new(
            event_type,
            assessment.risk_level,
            assessment.token_address.clone(),
            assessment.profile_name.clone(),
            serde_json::json!({
                "assessment_id": assessment.id,
                "decision": assessment.decision,
                "overall_risk_score": assessment.overall_risk_score,
                "confidence": assessment.confidence,
                "rationale": assessment.rationale,
            }),
        )
    }
}
