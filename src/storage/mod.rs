// Persistence hooks for assessments and risk events
use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::ScreenerError;
use crate::models::assessment::Assessment;
use crate::models::events::RiskEvent;

/// Storage surface the engine notifies during screening.
///
/// Every hook is best-effort: failures are logged and recorded on the
/// assessment, never propagated. Implementations back this with whatever
/// durability they need.
#[async_trait]
pub trait AssessmentStore: Send + Sync {
    /// Called with the pending skeleton before any check runs.
    async fn create_assessment(&self, assessment: &Assessment) -> Result<(), ScreenerError>;

    /// Called once the assessment reaches its final decision.
    async fn save_assessment_result(
        &self,
        id: Uuid,
        assessment: &Assessment,
    ) -> Result<(), ScreenerError>;

    /// Called for notable outcomes (blocks, skips, bulk completion).
    async fn record_event(&self, event: RiskEvent) -> Result<(), ScreenerError>;
}

/// Store that drops everything; the default when callers provide none.
pub struct NoopStore;

#[async_trait]
impl AssessmentStore for NoopStore {
    async fn create_assessment(&self, _assessment: &Assessment) -> Result<(), ScreenerError> {
        Ok(())
    }

    async fn save_assessment_result(
        &self,
        _id: Uuid,
        _assessment: &Assessment,
    ) -> Result<(), ScreenerError> {
        Ok(())
    }

    async fn record_event(&self, _event: RiskEvent) -> Result<(), ScreenerError> {
        Ok(())
    }
}

/// In-memory store for tests, demos, and short-lived processes.
#[derive(Default)]
pub struct MemoryStore {
    created: Mutex<Vec<Assessment>>,
    saved: Mutex<HashMap<Uuid, Assessment>>,
    events: Mutex<Vec<RiskEvent>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn created(&self) -> Vec<Assessment> {
        self.created.lock().await.clone()
    }

    pub async fn saved(&self) -> Vec<Assessment> {
        self.saved.lock().await.values().cloned().collect()
    }

    pub async fn saved_for(&self, id: Uuid) -> Option<Assessment> {
        self.saved.lock().await.get(&id).cloned()
    }

    pub async fn events(&self) -> Vec<RiskEvent> {
        self.events.lock().await.clone()
    }

    pub async fn event_count(&self) -> usize {
        self.events.lock().await.len()
    }
}

#[async_trait]
impl AssessmentStore for MemoryStore {
    async fn create_assessment(&self, assessment: &Assessment) -> Result<(), ScreenerError> {
        self.created.lock().await.push(assessment.clone());
        Ok(())
    }

    async fn save_assessment_result(
        &self,
        id: Uuid,
        assessment: &Assessment,
    ) -> Result<(), ScreenerError> {
        self.saved.lock().await.insert(id, assessment.clone());
        Ok(())
    }

    async fn record_event(&self, event: RiskEvent) -> Result<(), ScreenerError> {
        self.events.lock().await.push(event);
        Ok(())
    }
}
