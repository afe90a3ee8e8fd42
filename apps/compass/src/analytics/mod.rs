//! Analytics batching.
//!
//! Events queue in memory and go out as one `batch_events` request on a fixed
//! interval, plus a final best-effort flush on shutdown. A failed flush drops
//! its batch; losing events on a crash is accepted.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::gateway::{GatewayClient, GatewayError};

const SEND_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsEvent {
    pub id: Uuid,
    pub event_type: String,
    pub user_id: Option<String>,
    pub properties: Value,
    pub timestamp: DateTime<Utc>,
}

impl AnalyticsEvent {
    pub fn new(event_type: impl Into<String>, user_id: Option<&str>, properties: Value) -> Self {
        Self {
            id: Uuid::new_v4(),
            event_type: event_type.into(),
            user_id: user_id.map(str::to_string),
            properties,
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EventBatch<'a> {
    event_type: &'static str,
    events: &'a [AnalyticsEvent],
}

#[async_trait]
pub trait AnalyticsSink: Send + Sync {
    async fn send(&self, events: &[AnalyticsEvent]) -> Result<(), GatewayError>;
}

/// Posts batches to the analytics endpoint.
pub struct HttpSink {
    client: GatewayClient,
    url: String,
}

impl HttpSink {
    pub fn new(client: GatewayClient, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl AnalyticsSink for HttpSink {
    async fn send(&self, events: &[AnalyticsEvent]) -> Result<(), GatewayError> {
        let batch = EventBatch {
            event_type: "batch_events",
            events,
        };
        self.client
            .post_json(&self.url, &batch, Some(SEND_TIMEOUT))
            .await
            .map(|_| ())
    }
}

pub struct AnalyticsBatcher {
    queue: Mutex<Vec<AnalyticsEvent>>,
    sink: Arc<dyn AnalyticsSink>,
}

impl AnalyticsBatcher {
    pub fn new(sink: Arc<dyn AnalyticsSink>) -> Arc<Self> {
        Arc::new(Self {
            queue: Mutex::new(Vec::new()),
            sink,
        })
    }

    pub async fn track(&self, event_type: &str, user_id: Option<&str>, properties: Value) {
        self.queue
            .lock()
            .await
            .push(AnalyticsEvent::new(event_type, user_id, properties));
    }

    pub async fn pending(&self) -> usize {
        self.queue.lock().await.len()
    }

    /// Sends everything queued so far. Returns how many events were delivered.
    pub async fn flush(&self) -> usize {
        let events = std::mem::take(&mut *self.queue.lock().await);
        if events.is_empty() {
            return 0;
        }
        match self.sink.send(&events).await {
            Ok(()) => {
                debug!("Flushed {} analytics events", events.len());
                events.len()
            }
            Err(e) => {
                warn!("Dropping {} analytics events: {e}", events.len());
                0
            }
        }
    }

    /// Starts the periodic flush task.
    pub fn start(self: &Arc<Self>, every: Duration) -> AnalyticsHandle {
        let batcher = Arc::clone(self);
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            loop {
                ticker.tick().await;
                batcher.flush().await;
            }
        });
        AnalyticsHandle {
            batcher: Arc::clone(self),
            task,
        }
    }
}

/// Owns the flush task. Dropping it without [`AnalyticsHandle::shutdown`]
/// leaves the task running until the runtime stops.
pub struct AnalyticsHandle {
    batcher: Arc<AnalyticsBatcher>,
    task: JoinHandle<()>,
}

impl AnalyticsHandle {
    pub fn batcher(&self) -> &Arc<AnalyticsBatcher> {
        &self.batcher
    }

    /// Stops the timer and makes one last attempt to deliver queued events.
    pub async fn shutdown(self) -> usize {
        self.task.abort();
        self.batcher.flush().await
    }
}
