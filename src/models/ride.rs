use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::driver::Location;

pub const RIDE_ID_PREFIX: &str = "ride_";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RideStatus {
    Requested,
    Accepted,
    /// Kept for a future "start ride" event; nothing transitions into it today
    /// but completion accepts it.
    InProgress,
    Completed,
    Cancelled,
}

impl RideStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, RideStatus::Completed | RideStatus::Cancelled)
    }

    /// A ride is active while a driver is busy on its behalf.
    pub fn is_active(self) -> bool {
        matches!(self, RideStatus::Accepted | RideStatus::InProgress)
    }

    pub fn can_accept(self) -> bool {
        self == RideStatus::Requested
    }

    pub fn can_complete(self) -> bool {
        self.is_active()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RideStatus::Requested => "requested",
            RideStatus::Accepted => "accepted",
            RideStatus::InProgress => "in_progress",
            RideStatus::Completed => "completed",
            RideStatus::Cancelled => "cancelled",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Ride {
    pub id: String,
    pub rider_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver_id: Option<String>,
    pub pickup: Location,
    pub dropoff: Location,
    pub status: RideStatus,
    pub request_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accept_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complete_time: Option<DateTime<Utc>>,
    pub fare: f64,
}

pub fn ride_id_for(seq: u64) -> String {
    format!("{RIDE_ID_PREFIX}{seq}")
}

/// Inverse of [`ride_id_for`]. Anything the coordinator could not have issued
/// yields `None`.
pub fn ride_seq(id: &str) -> Option<u64> {
    let digits = id.strip_prefix(RIDE_ID_PREFIX)?;
    if digits.starts_with('0') || digits.starts_with('+') {
        return None;
    }
    digits.parse().ok()
}
