//! Application State
//!
//! Shared state accessible by all API handlers, constructed once at startup
//! and injected everywhere. Wrapped in Arc for thread-safe sharing across
//! async tasks.

use crate::store::{EventLog, InsightStore};
use crate::websocket::{ConnectionHub, HubConfig};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// Append-only circadian event log
    pub events: Arc<Mutex<EventLog>>,
    /// Generated insight store
    pub insights: Arc<Mutex<InsightStore>>,
    /// API configuration
    pub config: Arc<ApiConfig>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
    /// WebSocket connection hub for real-time notifications
    pub ws_hub: Arc<ConnectionHub>,
}

impl AppState {
    /// Create a new AppState with a default hub configuration
    pub fn new(events: EventLog, insights: InsightStore, config: ApiConfig) -> Self {
        Self::with_hub_config(events, insights, config, HubConfig::default())
    }

    /// Create AppState with a custom WebSocket hub configuration
    pub fn with_hub_config(
        events: EventLog,
        insights: InsightStore,
        config: ApiConfig,
        hub_config: HubConfig,
    ) -> Self {
        Self {
            events: Arc::new(Mutex::new(events)),
            insights: Arc::new(Mutex::new(insights)),
            config: Arc::new(config),
            start_time: Instant::now(),
            ws_hub: Arc::new(ConnectionHub::new(hub_config)),
        }
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Get WebSocket connection count
    pub async fn ws_connection_count(&self) -> usize {
        self.ws_hub.connection_count().await
    }
}

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Request timeout in milliseconds
    pub request_timeout_ms: u64,
    /// Maximum request body size in bytes
    pub max_body_size: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8086,
            request_timeout_ms: 30_000,
            max_body_size: 1024 * 1024, // 1MB; event payloads are tiny
        }
    }
}

impl ApiConfig {
    /// Create config with custom host and port
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
