//! In-memory healing service for tests and offline runs

use crate::api::{BroadcastResponse, HealingApi, HealingCode, IntentionRequest, SoulArchiveEntry};
use crate::error::{ApiError, ApiResult};
use async_trait::async_trait;
use serde_json::json;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// Record of a call made to the mock service
#[derive(Debug, Clone, PartialEq)]
pub enum MockCall {
    Broadcast(IntentionRequest),
    SearchCodes(String),
    LoadArchives,
}

/// Mock service behavior configuration
#[derive(Debug, Clone, Default)]
pub struct MockBehavior {
    /// Fixed broadcast reply; when unset the request is echoed back as the packet payload
    pub broadcast_response: Option<BroadcastResponse>,
    /// Catalog searched by `search_healing_codes`
    pub codes: Vec<HealingCode>,
    /// Entries returned by `load_soul_archives`
    pub archives: Vec<SoulArchiveEntry>,
    /// Per-call archive answers consumed in order before falling back to `archives`
    pub queued_archives: VecDeque<Vec<SoulArchiveEntry>>,
    /// Error returned by every call while set
    pub error: Option<ApiError>,
    /// Delay applied to each call
    pub latency: Duration,
    /// Per-call delays consumed in order before falling back to `latency`
    pub queued_latencies: VecDeque<Duration>,
}

/// Mock implementation of [`HealingApi`]
#[derive(Debug, Clone, Default)]
pub struct MockHealingApi {
    behavior: Arc<RwLock<MockBehavior>>,
    call_history: Arc<RwLock<Vec<MockCall>>>,
}

impl MockHealingApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_behavior(behavior: MockBehavior) -> Self {
        Self {
            behavior: Arc::new(RwLock::new(behavior)),
            call_history: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Change the behavior of subsequent calls
    pub async fn update_behavior<F>(&self, f: F)
    where
        F: FnOnce(&mut MockBehavior),
    {
        let mut behavior = self.behavior.write().await;
        f(&mut behavior);
    }

    pub async fn calls(&self) -> Vec<MockCall> {
        self.call_history.read().await.clone()
    }

    /// Record the call, snapshot its result, then wait out its latency
    ///
    /// The result is taken when the call starts, so a slow call answers with the
    /// state the service had when it was issued.
    async fn respond<T, F>(&self, call: MockCall, snapshot: F) -> ApiResult<T>
    where
        T: Send,
        F: FnOnce(&mut MockBehavior) -> ApiResult<T> + Send,
    {
        self.call_history.write().await.push(call);

        let (delay, error, result) = {
            let mut behavior = self.behavior.write().await;
            let delay = behavior
                .queued_latencies
                .pop_front()
                .unwrap_or(behavior.latency);
            let error = behavior.error.clone();
            (delay, error, snapshot(&mut behavior))
        };

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        match error {
            Some(error) => Err(error),
            None => result,
        }
    }
}

/// Echo of the request in the shape the real service answers with
pub fn echo_broadcast(request: &IntentionRequest) -> ApiResult<BroadcastResponse> {
    Ok(BroadcastResponse::new(json!({
        "packet": { "payload": serde_json::to_value(request)? },
        "packet_base64": "bW9jay1wYWNrZXQ="
    })))
}

fn matches_query(code: &HealingCode, query: &str) -> bool {
    let query = query.to_lowercase();
    [&code.code, &code.description, &code.category]
        .iter()
        .any(|field| field.to_lowercase().contains(&query))
}

#[async_trait]
impl HealingApi for MockHealingApi {
    async fn broadcast_intention(&self, request: &IntentionRequest) -> ApiResult<BroadcastResponse> {
        self.respond(MockCall::Broadcast(request.clone()), |behavior| {
            match behavior.broadcast_response.clone() {
                Some(response) => Ok(response),
                None => echo_broadcast(request),
            }
        })
        .await
    }

    async fn search_healing_codes(&self, query: &str) -> ApiResult<Vec<HealingCode>> {
        self.respond(MockCall::SearchCodes(query.to_string()), |behavior| {
            Ok(behavior
                .codes
                .iter()
                .filter(|code| query.is_empty() || matches_query(code, query))
                .cloned()
                .collect())
        })
        .await
    }

    async fn load_soul_archives(&self) -> ApiResult<Vec<SoulArchiveEntry>> {
        self.respond(MockCall::LoadArchives, |behavior| {
            Ok(behavior
                .queued_archives
                .pop_front()
                .unwrap_or_else(|| behavior.archives.clone()))
        })
        .await
    }
}
