use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Location {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DriverStatus {
    #[default]
    Available,
    Busy,
    /// Not reachable through any coordinator operation yet.
    Offline,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Driver {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub location: Location,
    #[serde(default)]
    pub status: DriverStatus,
}

impl Driver {
    pub fn is_available(&self) -> bool {
        self.status == DriverStatus::Available
    }
}
