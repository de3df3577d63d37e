//! Startup bootstrap of the driver table from a JSON array of drivers.

use std::fs;
use std::path::Path;

use tracing::{info, warn};

use crate::engine::coordinator::RideCoordinator;
use crate::error::{AppError, CoordinatorError};
use crate::models::driver::Driver;

pub fn load_drivers(path: &Path) -> Result<Vec<Driver>, AppError> {
    let raw = fs::read_to_string(path).map_err(|err| {
        AppError::Seed(format!("failed to read {}: {err}", path.display()))
    })?;

    parse_drivers(&raw).map_err(|err| AppError::Seed(format!("{}: {err}", path.display())))
}

fn parse_drivers(raw: &str) -> Result<Vec<Driver>, String> {
    let drivers: Vec<Driver> =
        serde_json::from_str(raw).map_err(|err| format!("invalid driver seed: {err}"))?;

    if let Some(position) = drivers.iter().position(|driver| driver.id.trim().is_empty()) {
        return Err(format!("driver at index {position} has an empty id"));
    }

    Ok(drivers)
}

/// Registers every seeded driver. Repeated IDs keep the first record.
pub async fn seed_coordinator(
    coordinator: &RideCoordinator,
    drivers: Vec<Driver>,
) -> Result<usize, AppError> {
    let mut seeded = 0;

    for driver in drivers {
        let driver_id = driver.id.clone();
        match coordinator.create_driver(driver).await {
            Ok(_) => seeded += 1,
            Err(CoordinatorError::Conflict(_)) => {
                warn!(driver_id = %driver_id, "duplicate driver in seed; skipping");
            }
            Err(err) => return Err(err.into()),
        }
    }

    info!(drivers = seeded, "driver seed loaded");
    Ok(seeded)
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use super::{load_drivers, seed_coordinator};
    use crate::engine::coordinator::RideCoordinator;
    use crate::error::AppError;
    use crate::models::driver::DriverStatus;

    fn seed_file(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "ride-coordinator-{}-{name}.json",
            std::process::id()
        ));
        fs::write(&path, contents).unwrap();
        path
    }

    #[tokio::test]
    async fn seeds_drivers_as_available() {
        let path = seed_file(
            "valid",
            r#"[
                {"id": "D1", "name": "Ana", "location": {"lat": 40.7, "lng": -74.0}, "status": "busy"},
                {"id": "D2", "name": "Ben", "location": {"lat": 40.8, "lng": -73.9}},
                {"id": "D1", "name": "Ana again"}
            ]"#,
        );

        let drivers = load_drivers(&path).unwrap();
        assert_eq!(drivers.len(), 3);

        let coordinator = RideCoordinator::new();
        let seeded = seed_coordinator(&coordinator, drivers).await.unwrap();
        assert_eq!(seeded, 2);

        let d1 = coordinator.get_driver("D1").await.unwrap();
        assert_eq!(d1.name, "Ana");
        assert_eq!(d1.status, DriverStatus::Available);
        assert_eq!(coordinator.available_drivers().await.len(), 2);

        fs::remove_file(path).unwrap();
    }

    #[test]
    fn missing_seed_file_is_fatal() {
        let path = std::env::temp_dir().join("ride-coordinator-does-not-exist.json");
        assert!(matches!(load_drivers(&path), Err(AppError::Seed(_))));
    }

    #[test]
    fn malformed_seed_is_fatal() {
        let path = seed_file("malformed", r#"{"id": "D1"}"#);
        assert!(matches!(load_drivers(&path), Err(AppError::Seed(_))));
        fs::remove_file(path).unwrap();
    }

    #[test]
    fn empty_driver_id_is_fatal() {
        let path = seed_file("empty-id", r#"[{"id": " ", "name": "Nobody"}]"#);
        let err = load_drivers(&path).unwrap_err();
        assert!(err.to_string().contains("index 0"));
        fs::remove_file(path).unwrap();
    }
}
