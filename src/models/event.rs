use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A longitude/latitude pair in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coordinates {
    pub longitude: f64,
    pub latitude: f64,
}

impl Coordinates {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Coordinates { longitude, latitude }
    }

    /// (0, 0) marks a record that never had a location attached
    pub fn is_unset(&self) -> bool {
        self.longitude == 0.0 && self.latitude == 0.0
    }
}

/// One authenticated login with its best-known origin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginEvent {
    pub longitude: f64,
    pub latitude: f64,
    pub occurred_at: DateTime<Utc>,
}

impl LoginEvent {
    pub fn new(longitude: f64, latitude: f64, occurred_at: DateTime<Utc>) -> Self {
        LoginEvent {
            longitude,
            latitude,
            occurred_at,
        }
    }

    pub fn at(coordinates: Coordinates, occurred_at: DateTime<Utc>) -> Self {
        Self::new(coordinates.longitude, coordinates.latitude, occurred_at)
    }

    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.longitude, self.latitude)
    }
}

/// A stored device/session record as kept by the session service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceRecord {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub coordinates: Coordinates,
    pub created_at: DateTime<Utc>,
}

/// Session history of a single identity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceHistory {
    pub identity: String,
    #[serde(default)]
    pub devices: Vec<DeviceRecord>,
}
