//! Outbound ride events. Delivery happens after the coordinator has released
//! its lock, so a failing notifier can never undo a committed transition.

use serde::Serialize;
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::models::driver::Driver;
use crate::models::ride::Ride;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RideEvent {
    Requested {
        ride: Ride,
        available_drivers: Vec<Driver>,
    },
    Accepted {
        ride: Ride,
    },
    Completed {
        ride: Ride,
    },
    Cancelled {
        ride: Ride,
    },
}

impl RideEvent {
    pub fn ride(&self) -> &Ride {
        match self {
            RideEvent::Requested { ride, .. }
            | RideEvent::Accepted { ride }
            | RideEvent::Completed { ride }
            | RideEvent::Cancelled { ride } => ride,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            RideEvent::Requested { .. } => "requested",
            RideEvent::Accepted { .. } => "accepted",
            RideEvent::Completed { .. } => "completed",
            RideEvent::Cancelled { .. } => "cancelled",
        }
    }
}

#[derive(Debug, Error)]
#[error("ride notification failed: {0}")]
pub struct NotifyError(pub String);

pub trait RideNotifier: Send + Sync {
    fn publish(&self, event: &RideEvent) -> Result<(), NotifyError>;
}

/// Writes each event to the log and nothing else.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl RideNotifier for LogNotifier {
    fn publish(&self, event: &RideEvent) -> Result<(), NotifyError> {
        log_event(event);
        Ok(())
    }
}

/// Fans events out to every live subscriber, e.g. websocket clients.
#[derive(Debug, Clone)]
pub struct BroadcastNotifier {
    tx: broadcast::Sender<RideEvent>,
}

impl BroadcastNotifier {
    pub fn new(tx: broadcast::Sender<RideEvent>) -> Self {
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RideEvent> {
        self.tx.subscribe()
    }
}

impl RideNotifier for BroadcastNotifier {
    fn publish(&self, event: &RideEvent) -> Result<(), NotifyError> {
        log_event(event);

        // No subscriber is a normal state, not a delivery failure.
        if self.tx.send(event.clone()).is_err() {
            debug!(ride_id = %event.ride().id, "no ride event subscribers");
        }
        Ok(())
    }
}

fn log_event(event: &RideEvent) {
    match event {
        RideEvent::Requested {
            ride,
            available_drivers,
        } => {
            if !available_drivers.is_empty() {
                info!(
                    ride_id = %ride.id,
                    drivers = available_drivers.len(),
                    "notifying available drivers about ride"
                );
            }
        }
        other => {
            debug!(ride_id = %other.ride().id, event = other.name(), "ride event");
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use tokio::sync::broadcast;

    use super::{BroadcastNotifier, RideEvent, RideNotifier};
    use crate::models::driver::Location;
    use crate::models::ride::{Ride, RideStatus};

    fn ride() -> Ride {
        Ride {
            id: "ride_1".to_string(),
            rider_id: "R1".to_string(),
            driver_id: None,
            pickup: Location::default(),
            dropoff: Location { lat: 1.0, lng: 1.0 },
            status: RideStatus::Requested,
            request_time: Utc::now(),
            accept_time: None,
            complete_time: None,
            fare: 15.0,
        }
    }

    #[test]
    fn publishing_without_subscribers_is_ok() {
        let (tx, _) = broadcast::channel(4);
        let notifier = BroadcastNotifier::new(tx);

        let event = RideEvent::Accepted { ride: ride() };
        assert!(notifier.publish(&event).is_ok());
    }

    #[tokio::test]
    async fn subscribers_receive_published_events() {
        let (tx, _) = broadcast::channel(4);
        let notifier = BroadcastNotifier::new(tx);
        let mut rx = notifier.subscribe();

        notifier
            .publish(&RideEvent::Requested {
                ride: ride(),
                available_drivers: Vec::new(),
            })
            .unwrap();

        let received = rx.recv().await.unwrap();
        assert_eq!(received.name(), "requested");
        assert_eq!(received.ride().id, "ride_1");
    }

    #[test]
    fn events_serialize_with_a_tag() {
        let json = serde_json::to_value(RideEvent::Cancelled { ride: ride() }).unwrap();
        assert_eq!(json["event"], "cancelled");
        assert_eq!(json["ride"]["status"], "requested");
    }
}
