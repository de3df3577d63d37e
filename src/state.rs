use std::sync::Arc;

use tokio::sync::broadcast;

use crate::engine::coordinator::RideCoordinator;
use crate::engine::fare::{self, FarePolicy};
use crate::engine::notify::{BroadcastNotifier, RideEvent};
use crate::observability::metrics::Metrics;

/// Everything a request handler may touch. The registry itself is only
/// reachable through the coordinator's operations.
pub struct AppState {
    pub coordinator: RideCoordinator,
    pub events: BroadcastNotifier,
    pub metrics: Metrics,
}

impl AppState {
    pub fn new(event_buffer_size: usize) -> Self {
        Self::with_fare_policy(event_buffer_size, fare::fare)
    }

    pub fn with_fare_policy(event_buffer_size: usize, fare_policy: FarePolicy) -> Self {
        let (events_tx, _unused_rx) = broadcast::channel::<RideEvent>(event_buffer_size);
        let events = BroadcastNotifier::new(events_tx);

        Self {
            coordinator: RideCoordinator::with_parts(fare_policy, Arc::new(events.clone())),
            events,
            metrics: Metrics::new(),
        }
    }
}
