use serde::{Deserialize, Serialize};

use super::LoginEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// Two different places at the same instant
    Teleport,
    /// Implied speed above the configured maximum
    ExcessiveSpeed,
}

/// The first pair of logins found to be physically implausible
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TravelViolation {
    pub kind: ViolationKind,
    /// The more recent login of the pair
    pub later: LoginEvent,
    pub earlier: LoginEvent,
    pub distance_km: f64,
    pub elapsed_seconds: f64,
    /// Absent for teleports
    pub speed_kmh: Option<f64>,
    pub max_allowed_speed_kmh: f64,
}

impl TravelViolation {
    pub fn describe(&self) -> String {
        match self.kind {
            ViolationKind::Teleport => format!(
                "Logins {:.1} km apart at the same instant ({}). \
                 Locations: ({:.4}, {:.4}) and ({:.4}, {:.4}).",
                self.distance_km,
                self.later.occurred_at.to_rfc3339(),
                self.earlier.latitude,
                self.earlier.longitude,
                self.later.latitude,
                self.later.longitude
            ),
            ViolationKind::ExcessiveSpeed => format!(
                "Traveled {:.1} km in {:.2} hours ({:.0} km/h). \
                 Max plausible speed: {:.0} km/h. Previous location: ({:.4}, {:.4}), \
                 Later location: ({:.4}, {:.4}).",
                self.distance_km,
                self.elapsed_seconds / 3600.0,
                self.speed_kmh.unwrap_or_default(),
                self.max_allowed_speed_kmh,
                self.earlier.latitude,
                self.earlier.longitude,
                self.later.latitude,
                self.later.longitude
            ),
        }
    }
}

/// Verdict for one identity, as written by the output handler
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TravelReport {
    pub identity: String,
    pub valid: bool,
    pub events_checked: usize,
    pub violation: Option<TravelViolation>,
    pub description: String,
}

impl TravelReport {
    pub fn new(identity: &str, events_checked: usize, violation: Option<TravelViolation>) -> Self {
        let description = match &violation {
            Some(v) => format!("User '{}': {}", identity, v.describe()),
            None => format!(
                "User '{}': no impossible travel across {} login(s).",
                identity, events_checked
            ),
        };

        TravelReport {
            identity: identity.to_string(),
            valid: violation.is_none(),
            events_checked,
            violation,
            description,
        }
    }

    /// Report for a login whose location could not be determined
    pub fn unlocated(identity: &str, valid: bool, reason: &str) -> Self {
        TravelReport {
            identity: identity.to_string(),
            valid,
            events_checked: 0,
            violation: None,
            description: format!(
                "User '{}': travel check not performed ({}).",
                identity, reason
            ),
        }
    }
}
