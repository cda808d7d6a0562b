use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::events::{EventBus, ListenerStats};
use crate::predictions::PredictionService;

/// Shared application state for API handlers
#[derive(Clone)]
pub struct AppState {
    pub predictions: PredictionService,

    /// Producer side of the in-process match events
    pub events: EventBus,

    /// Counters of the teams-assigned listener
    pub listener_stats: Arc<ListenerStats>,

    /// Application start time
    pub start_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(
        predictions: PredictionService,
        events: EventBus,
        listener_stats: Arc<ListenerStats>,
    ) -> Self {
        Self {
            predictions,
            events,
            listener_stats,
            start_time: Utc::now(),
        }
    }

    /// Get system uptime in seconds
    pub fn uptime_seconds(&self) -> i64 {
        (Utc::now() - self.start_time).num_seconds()
    }
}
