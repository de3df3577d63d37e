//! The ride coordinator: authoritative state for drivers, riders and rides.
//!
//! All three tables sit behind one reader/writer lock. Mutations hold the
//! write guard for their whole body, so a reader never sees a ride and its
//! driver half-updated. Events go out only after the guard is dropped.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::engine::fare::{self, FarePolicy};
use crate::engine::notify::{LogNotifier, RideEvent, RideNotifier};
use crate::error::CoordinatorError;
use crate::models::driver::{Driver, DriverStatus, Location};
use crate::models::ride::{ride_id_for, ride_seq, Ride, RideStatus};
use crate::models::rider::Rider;

#[derive(Default)]
struct Tables {
    drivers: BTreeMap<String, Driver>,
    riders: BTreeMap<String, Rider>,
    rides: BTreeMap<u64, Ride>,
    last_ride_seq: u64,
}

impl Tables {
    fn ride_mut(&mut self, id: &str) -> Result<&mut Ride, CoordinatorError> {
        ride_seq(id)
            .and_then(|seq| self.rides.get_mut(&seq))
            .ok_or_else(ride_not_found)
    }

    fn available_drivers(&self) -> Vec<Driver> {
        self.drivers
            .values()
            .filter(|driver| driver.is_available())
            .cloned()
            .collect()
    }

    fn release_driver(&mut self, driver_id: &str) {
        match self.drivers.get_mut(driver_id) {
            Some(driver) => driver.status = DriverStatus::Available,
            None => warn!(driver_id, "assigned driver missing from registry"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct RegistryCounts {
    pub drivers: usize,
    pub riders: usize,
    pub rides: usize,
}

pub struct RideCoordinator {
    tables: RwLock<Tables>,
    fare_policy: FarePolicy,
    notifier: Arc<dyn RideNotifier>,
}

impl Default for RideCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl RideCoordinator {
    pub fn new() -> Self {
        Self::with_parts(fare::fare, Arc::new(LogNotifier))
    }

    pub fn with_parts(fare_policy: FarePolicy, notifier: Arc<dyn RideNotifier>) -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
            fare_policy,
            notifier,
        }
    }

    pub async fn create_rider(&self, rider: Rider) -> Result<Rider, CoordinatorError> {
        let mut tables = self.tables.write().await;

        if tables.riders.contains_key(&rider.id) {
            return Err(CoordinatorError::Conflict(format!(
                "rider with ID {} already exists",
                rider.id
            )));
        }

        tables.riders.insert(rider.id.clone(), rider.clone());
        info!(rider_id = %rider.id, "rider created");
        Ok(rider)
    }

    /// Signup implies readiness: whatever status came in, the stored driver
    /// is available.
    pub async fn create_driver(&self, mut driver: Driver) -> Result<Driver, CoordinatorError> {
        let mut tables = self.tables.write().await;

        if tables.drivers.contains_key(&driver.id) {
            return Err(CoordinatorError::Conflict(format!(
                "driver with ID {} already exists",
                driver.id
            )));
        }

        driver.status = DriverStatus::Available;
        tables.drivers.insert(driver.id.clone(), driver.clone());
        info!(driver_id = %driver.id, "driver created");
        Ok(driver)
    }

    pub async fn update_driver_location(
        &self,
        driver_id: &str,
        location: Location,
    ) -> Result<Driver, CoordinatorError> {
        let mut tables = self.tables.write().await;

        let driver = tables
            .drivers
            .get_mut(driver_id)
            .ok_or_else(driver_not_found)?;
        driver.location = location;

        debug!(driver_id, lat = location.lat, lng = location.lng, "driver location updated");
        Ok(driver.clone())
    }

    pub async fn create_ride_request(
        &self,
        rider_id: &str,
        pickup: Location,
        dropoff: Location,
    ) -> Result<Ride, CoordinatorError> {
        let (ride, available_drivers) = {
            let mut tables = self.tables.write().await;

            if !tables.riders.contains_key(rider_id) {
                return Err(rider_not_found());
            }

            tables.last_ride_seq += 1;
            let seq = tables.last_ride_seq;
            let ride = Ride {
                id: ride_id_for(seq),
                rider_id: rider_id.to_string(),
                driver_id: None,
                pickup,
                dropoff,
                status: RideStatus::Requested,
                request_time: Utc::now(),
                accept_time: None,
                complete_time: None,
                fare: (self.fare_policy)(&pickup, &dropoff),
            };
            tables.rides.insert(seq, ride.clone());

            (ride, tables.available_drivers())
        };

        info!(ride_id = %ride.id, rider_id, fare = ride.fare, "ride requested");
        self.publish(RideEvent::Requested {
            ride: ride.clone(),
            available_drivers,
        });

        Ok(ride)
    }

    pub async fn accept_ride(
        &self,
        ride_id: &str,
        driver_id: &str,
    ) -> Result<Ride, CoordinatorError> {
        let ride = {
            let mut tables = self.tables.write().await;
            let tables = &mut *tables;

            let seq = ride_seq(ride_id)
                .filter(|seq| tables.rides.contains_key(seq))
                .ok_or_else(ride_not_found)?;
            let driver_available = tables
                .drivers
                .get(driver_id)
                .map(Driver::is_available)
                .ok_or_else(driver_not_found)?;

            let ride = tables
                .rides
                .get_mut(&seq)
                .ok_or_else(ride_not_found)?;
            if !ride.status.can_accept() {
                debug!(ride_id, status = ride.status.as_str(), "accept rejected");
                return Err(CoordinatorError::InvalidTransition(
                    "ride is not available for acceptance".to_string(),
                ));
            }
            if !driver_available {
                return Err(CoordinatorError::Unavailable(
                    "driver is not available".to_string(),
                ));
            }

            ride.driver_id = Some(driver_id.to_string());
            ride.status = RideStatus::Accepted;
            ride.accept_time = Some(Utc::now());
            let accepted = ride.clone();

            if let Some(driver) = tables.drivers.get_mut(driver_id) {
                driver.status = DriverStatus::Busy;
            }

            accepted
        };

        info!(ride_id, driver_id, "ride accepted");
        self.publish(RideEvent::Accepted { ride: ride.clone() });
        Ok(ride)
    }

    /// Only the assigned driver may complete, and that check comes before
    /// the status check.
    pub async fn complete_ride(
        &self,
        ride_id: &str,
        driver_id: &str,
    ) -> Result<Ride, CoordinatorError> {
        let ride = {
            let mut tables = self.tables.write().await;

            let ride = tables.ride_mut(ride_id)?;
            if ride.driver_id.as_deref() != Some(driver_id) {
                return Err(CoordinatorError::Forbidden(
                    "driver is not assigned to this ride".to_string(),
                ));
            }
            if !ride.status.can_complete() {
                return Err(CoordinatorError::InvalidTransition(
                    "ride cannot be completed in current status".to_string(),
                ));
            }

            let now = Utc::now();
            ride.status = RideStatus::Completed;
            ride.complete_time = Some(ride.accept_time.map_or(now, |accepted| accepted.max(now)));
            let completed = ride.clone();

            tables.release_driver(driver_id);
            completed
        };

        info!(ride_id, driver_id, fare = ride.fare, "ride completed");
        self.publish(RideEvent::Completed { ride: ride.clone() });
        Ok(ride)
    }

    /// Cancelling a cancelled ride is a no-op that returns it unchanged.
    pub async fn cancel_ride(&self, ride_id: &str) -> Result<Ride, CoordinatorError> {
        let ride = {
            let mut tables = self.tables.write().await;

            let ride = tables.ride_mut(ride_id)?;
            match ride.status {
                RideStatus::Completed => {
                    return Err(CoordinatorError::InvalidTransition(
                        "cannot cancel completed ride".to_string(),
                    ));
                }
                RideStatus::Cancelled => {
                    debug!(ride_id, "ride already cancelled");
                    return Ok(ride.clone());
                }
                _ => {}
            }

            ride.status = RideStatus::Cancelled;
            let cancelled = ride.clone();

            if let Some(driver_id) = cancelled.driver_id.as_deref() {
                tables.release_driver(driver_id);
            }
            cancelled
        };

        info!(ride_id, driver_id = ?ride.driver_id, "ride cancelled");
        self.publish(RideEvent::Cancelled { ride: ride.clone() });
        Ok(ride)
    }

    pub async fn get_ride(&self, ride_id: &str) -> Result<Ride, CoordinatorError> {
        let tables = self.tables.read().await;
        ride_seq(ride_id)
            .and_then(|seq| tables.rides.get(&seq))
            .cloned()
            .ok_or_else(ride_not_found)
    }

    pub async fn get_driver(&self, driver_id: &str) -> Result<Driver, CoordinatorError> {
        let tables = self.tables.read().await;
        tables
            .drivers
            .get(driver_id)
            .cloned()
            .ok_or_else(driver_not_found)
    }

    pub async fn get_rider(&self, rider_id: &str) -> Result<Rider, CoordinatorError> {
        let tables = self.tables.read().await;
        tables
            .riders
            .get(rider_id)
            .cloned()
            .ok_or_else(|| CoordinatorError::NotFound("rider not found".to_string()))
    }

    /// Rides still waiting for a driver, oldest first.
    pub async fn available_rides(&self) -> Vec<Ride> {
        self.rides_where(|ride| ride.status == RideStatus::Requested).await
    }

    pub async fn available_drivers(&self) -> Vec<Driver> {
        self.tables.read().await.available_drivers()
    }

    pub async fn driver_rides(&self, driver_id: &str) -> Vec<Ride> {
        self.rides_where(|ride| ride.driver_id.as_deref() == Some(driver_id))
            .await
    }

    pub async fn rider_rides(&self, rider_id: &str) -> Vec<Ride> {
        self.rides_where(|ride| ride.rider_id == rider_id).await
    }

    pub async fn counts(&self) -> RegistryCounts {
        let tables = self.tables.read().await;
        RegistryCounts {
            drivers: tables.drivers.len(),
            riders: tables.riders.len(),
            rides: tables.rides.len(),
        }
    }

    async fn rides_where<F>(&self, keep: F) -> Vec<Ride>
    where
        F: Fn(&Ride) -> bool,
    {
        let tables = self.tables.read().await;
        tables
            .rides
            .values()
            .filter(|ride| keep(ride))
            .cloned()
            .collect()
    }

    fn publish(&self, event: RideEvent) {
        if let Err(err) = self.notifier.publish(&event) {
            warn!(
                error = %err,
                ride_id = %event.ride().id,
                event = event.name(),
                "ride event dropped"
            );
        }
    }
}

fn ride_not_found() -> CoordinatorError {
    CoordinatorError::NotFound("ride not found".to_string())
}

fn rider_not_found() -> CoordinatorError {
    CoordinatorError::NotFound("rider not found".to_string())
}

fn driver_not_found() -> CoordinatorError {
    CoordinatorError::NotFound("driver not found".to_string())
}
