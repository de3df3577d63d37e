use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::AppError;

/// Which distance the fare policy charges for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FareDistance {
    #[default]
    Fixed,
    Haversine,
}

impl FromStr for FareDistance {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "fixed" => Ok(FareDistance::Fixed),
            "haversine" => Ok(FareDistance::Haversine),
            other => Err(format!("unknown fare distance {other:?}, expected fixed/haversine")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub http_port: u16,
    pub log_level: String,
    pub driver_seed_path: PathBuf,
    pub event_buffer_size: usize,
    pub fare_distance: FareDistance,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let _ = dotenvy::dotenv();

        let event_buffer_size = parse_or_default("EVENT_BUFFER_SIZE", 1024)?;
        if event_buffer_size == 0 {
            return Err(AppError::Config(
                "EVENT_BUFFER_SIZE must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            http_port: parse_or_default("HTTP_PORT", 8080)?,
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            driver_seed_path: env::var("DRIVER_SEED_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("drivers.json")),
            event_buffer_size,
            fare_distance: parse_or_default("FARE_DISTANCE", FareDistance::Fixed)?,
        })
    }
}

fn parse_or_default<T>(key: &str, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|err| AppError::Config(format!("invalid {key}: {err}"))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::FareDistance;

    #[test]
    fn fare_distance_parses_case_insensitively() {
        assert_eq!("Haversine".parse::<FareDistance>(), Ok(FareDistance::Haversine));
        assert_eq!(" fixed ".parse::<FareDistance>(), Ok(FareDistance::Fixed));
        assert!("manhattan".parse::<FareDistance>().is_err());
    }
}
