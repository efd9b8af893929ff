//! The retrieval agent seam.

use async_trait::async_trait;
use switchboard_core::AppResult;

use crate::types::{AgentId, AgentOutput};

/// A source of context for one query.
///
/// Implementations map provider failures to `AppError::Retrieval`; the
/// orchestrator turns those into an error marker and carries on.
#[async_trait]
pub trait RetrievalAgent: Send + Sync {
    fn id(&self) -> AgentId;

    async fn query(&self, text: &str) -> AppResult<AgentOutput>;
}
