//! Device/session history as input to the travel validator

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use thiserror::Error;

use crate::models::{DeviceHistory, DeviceRecord, LoginEvent};

/// Errors that can occur while loading a device history
#[derive(Error, Debug)]
pub enum InputError {
    #[error("Failed to open history file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid history file {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Map stored device records to login events
///
/// Records at exactly (0, 0) predate location tracking and are skipped.
pub fn assemble_login_events(devices: &[DeviceRecord]) -> Vec<LoginEvent> {
    let events: Vec<LoginEvent> = devices
        .iter()
        .filter(|device| !device.coordinates.is_unset())
        .map(|device| LoginEvent::at(device.coordinates, device.created_at))
        .collect();

    if events.len() < devices.len() {
        log::debug!(
            "Skipped {} device record(s) without coordinates",
            devices.len() - events.len()
        );
    }

    events
}

/// Load a JSON device history from disk
pub fn load_device_history<P: AsRef<Path>>(path: P) -> Result<DeviceHistory, InputError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| InputError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let history: DeviceHistory =
        serde_json::from_reader(BufReader::new(file)).map_err(|source| InputError::Json {
            path: path.display().to_string(),
            source,
        })?;

    log::debug!(
        "Loaded {} device record(s) for '{}' from {}",
        history.devices.len(),
        history.identity,
        path.display()
    );
    Ok(history)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Coordinates;
    use chrono::{TimeZone, Utc};
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn device(longitude: f64, latitude: f64, hour: u32) -> DeviceRecord {
        DeviceRecord {
            id: None,
            coordinates: Coordinates::new(longitude, latitude),
            created_at: Utc.with_ymd_and_hms(2024, 3, 1, hour, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_unset_coordinates_are_dropped() {
        let devices = vec![
            device(37.618423, 55.751244, 14),
            device(0.0, 0.0, 15),
            device(11.578439, 48.136091, 16),
        ];
        let events = assemble_login_events(&devices);

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].longitude, 37.618423);
        assert_eq!(events[1].occurred_at, Utc.with_ymd_and_hms(2024, 3, 1, 16, 0, 0).unwrap());
    }

    #[test]
    fn test_single_zero_axis_is_kept() {
        // On the equator or the prime meridian, but not both
        let devices = vec![device(0.0, 51.4779, 10), device(32.58, 0.0, 11)];
        assert_eq!(assemble_login_events(&devices).len(), 2);
    }

    #[test]
    fn test_empty_history() {
        assert!(assemble_login_events(&[]).is_empty());
    }

    #[test]
    fn test_load_device_history() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "identity": "alice",
                "devices": [
                    {{"id": "d1", "coordinates": {{"longitude": 37.618423, "latitude": 55.751244}}, "created_at": "2024-03-01T14:00:00Z"}},
                    {{"created_at": "2024-03-01T15:00:00Z"}}
                ]
            }}"#
        )
        .unwrap();

        let history = load_device_history(file.path()).unwrap();
        assert_eq!(history.identity, "alice");
        assert_eq!(history.devices.len(), 2);
        assert_eq!(history.devices[0].id.as_deref(), Some("d1"));
        assert!(history.devices[1].coordinates.is_unset());
        assert_eq!(assemble_login_events(&history.devices).len(), 1);
    }

    #[test]
    fn test_missing_history_file() {
        let result = load_device_history("/nonexistent/history.json");
        assert!(matches!(result, Err(InputError::Io { .. })));
    }

    #[test]
    fn test_invalid_history_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(matches!(load_device_history(file.path()), Err(InputError::Json { .. })));
    }
}
