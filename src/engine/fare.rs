//! Fare policy applied once, when a ride is requested.

use crate::config::FareDistance;
use crate::geo::haversine_km;
use crate::models::driver::Location;

pub const BASE_FARE: f64 = 5.0;
pub const RATE_PER_KM: f64 = 2.0;

/// Stand-in trip length until a real distance is charged.
pub const PLACEHOLDER_DISTANCE_KM: f64 = 5.0;

/// Pure function from pickup/dropoff to price.
pub type FarePolicy = fn(&Location, &Location) -> f64;

/// `BASE_FARE + distance * RATE_PER_KM` over the placeholder distance.
pub fn fare(_pickup: &Location, _dropoff: &Location) -> f64 {
    priced(PLACEHOLDER_DISTANCE_KM)
}

/// Same formula, charging the great-circle distance between the two points.
pub fn haversine_fare(pickup: &Location, dropoff: &Location) -> f64 {
    priced(haversine_km(pickup, dropoff))
}

pub fn policy_for(distance: FareDistance) -> FarePolicy {
    match distance {
        FareDistance::Fixed => fare,
        FareDistance::Haversine => haversine_fare,
    }
}

fn priced(distance_km: f64) -> f64 {
    BASE_FARE + distance_km.max(0.0) * RATE_PER_KM
}
