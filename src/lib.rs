//! Impossible travel detection for login histories
//!
//! Feed the logins of one identity to a [`TravelValidator`] and get back a
//! single allow/deny verdict.

pub mod config;
pub mod detection;
pub mod input;
pub mod models;
pub mod output;

// Re-export commonly used types
pub use config::Config;
pub use detection::{GeoPoint, TravelValidator, Validator, ValidatorConfig, ValidatorOption};
pub use input::{GeoHeaderExtractor, RequestHeaders};
pub use models::{Coordinates, DeviceRecord, LoginEvent, TravelReport, TravelViolation};
