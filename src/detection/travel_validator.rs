//! Impossible travel detection
//!
//! Compares every pair of logins of one identity and rejects the history
//! if any pair implies a travel speed above the configured maximum.

use chrono::Duration;

use super::geodesic::{great_circle_distance, GeoPoint};
use crate::models::{LoginEvent, TravelViolation, ViolationKind};

/// Default maximum plausible travel speed in km/h
pub const DEFAULT_MAX_ALLOWED_SPEED_KMH: f64 = 10.0;

/// Default cap on the number of logins compared per call
pub const DEFAULT_MAX_EVENTS: usize = 512;

/// A named override applied on top of the defaults
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ValidatorOption {
    /// Maximum allowed speed in km/h. `0` keeps the previous value.
    MaxAllowedSpeed(f64),
    /// Maximum number of logins compared per call. `0` keeps the previous value.
    MaxEvents(usize),
}

/// Immutable validator settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidatorConfig {
    max_allowed_speed_kmh: f64,
    max_events: usize,
}

impl ValidatorConfig {
    pub fn builder() -> ValidatorConfigBuilder {
        ValidatorConfigBuilder::default()
    }

    pub fn max_allowed_speed_kmh(&self) -> f64 {
        self.max_allowed_speed_kmh
    }

    pub fn max_events(&self) -> usize {
        self.max_events
    }

    fn apply(&mut self, option: ValidatorOption) {
        match option {
            // Zero means "not set" and keeps whatever was there before.
            ValidatorOption::MaxAllowedSpeed(speed) if speed == 0.0 => {}
            ValidatorOption::MaxAllowedSpeed(speed) if !(speed.is_finite() && speed > 0.0) => {
                log::warn!(
                    "Ignoring invalid max allowed speed {} km/h, keeping {} km/h",
                    speed,
                    self.max_allowed_speed_kmh
                );
            }
            ValidatorOption::MaxAllowedSpeed(speed) => self.max_allowed_speed_kmh = speed,
            ValidatorOption::MaxEvents(0) => {}
            ValidatorOption::MaxEvents(max_events) => self.max_events = max_events,
        }
    }
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        ValidatorConfig {
            max_allowed_speed_kmh: DEFAULT_MAX_ALLOWED_SPEED_KMH,
            max_events: DEFAULT_MAX_EVENTS,
        }
    }
}

/// Applies overrides in the order they are given
#[derive(Debug, Clone, Default)]
pub struct ValidatorConfigBuilder {
    config: ValidatorConfig,
}

impl ValidatorConfigBuilder {
    pub fn with_max_allowed_speed(self, speed_kmh: f64) -> Self {
        self.option(ValidatorOption::MaxAllowedSpeed(speed_kmh))
    }

    pub fn with_max_events(self, max_events: usize) -> Self {
        self.option(ValidatorOption::MaxEvents(max_events))
    }

    pub fn option(mut self, option: ValidatorOption) -> Self {
        self.config.apply(option);
        self
    }

    pub fn options<I>(self, options: I) -> Self
    where
        I: IntoIterator<Item = ValidatorOption>,
    {
        options.into_iter().fold(self, |builder, option| builder.option(option))
    }

    pub fn build(self) -> ValidatorConfig {
        self.config
    }
}

/// Decides whether a login history is physically plausible
pub trait Validator: Send + Sync {
    /// Returns `false` if any two logins imply impossible travel
    fn is_valid(&self, events: &[LoginEvent]) -> bool;
}

/// Exhaustive pairwise travel validator
///
/// The caller's slice is never reordered; logins are copied and sorted
/// most recent first before every pair `(i, j)` with `i < j` is compared,
/// not only neighbouring logins.
#[derive(Debug, Clone, Default)]
pub struct TravelValidator {
    config: ValidatorConfig,
}

impl TravelValidator {
    pub fn new(config: ValidatorConfig) -> Self {
        TravelValidator { config }
    }

    pub fn with_options<I>(options: I) -> Self
    where
        I: IntoIterator<Item = ValidatorOption>,
    {
        Self::new(ValidatorConfig::builder().options(options).build())
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Number of logins a call with `events` actually compares
    pub fn events_compared(&self, events: &[LoginEvent]) -> usize {
        events.len().min(self.config.max_events)
    }

    /// Find the first implausible pair of logins, if any
    pub fn find_violation(&self, events: &[LoginEvent]) -> Option<TravelViolation> {
        if events.len() < 2 {
            return None;
        }

        let mut logins = events.to_vec();
        // Ties on time are broken by location so the cap below keeps the
        // same logins whatever order they arrived in.
        logins.sort_by(|a, b| {
            b.occurred_at
                .cmp(&a.occurred_at)
                .then_with(|| a.longitude.total_cmp(&b.longitude))
                .then_with(|| a.latitude.total_cmp(&b.latitude))
        });

        if logins.len() > self.config.max_events {
            log::warn!(
                "Received {} logins, comparing only the {} most recent",
                logins.len(),
                self.config.max_events
            );
            logins.truncate(self.config.max_events);
        }

        for (current_idx, current) in logins.iter().enumerate() {
            for target in &logins[current_idx + 1..] {
                if let Some(violation) = self.check_pair(current, target) {
                    log::debug!(
                        "Impossible travel between {} and {}",
                        target.occurred_at,
                        current.occurred_at
                    );
                    return Some(violation);
                }
            }
        }

        log::debug!("Compared {} logins, no impossible travel", logins.len());
        None
    }

    /// `current` must not be older than `target`
    fn check_pair(&self, current: &LoginEvent, target: &LoginEvent) -> Option<TravelViolation> {
        let distance_km = great_circle_distance(GeoPoint::from(current), GeoPoint::from(target));
        let elapsed_seconds = seconds(current.occurred_at - target.occurred_at);

        if elapsed_seconds == 0.0 {
            if distance_km == 0.0 {
                return None;
            }
            return Some(self.violation(ViolationKind::Teleport, current, target, distance_km, 0.0, None));
        }

        let speed_kmh = distance_km / (elapsed_seconds / 3600.0);
        if speed_kmh > self.config.max_allowed_speed_kmh {
            return Some(self.violation(
                ViolationKind::ExcessiveSpeed,
                current,
                target,
                distance_km,
                elapsed_seconds,
                Some(speed_kmh),
            ));
        }

        None
    }

    fn violation(
        &self,
        kind: ViolationKind,
        later: &LoginEvent,
        earlier: &LoginEvent,
        distance_km: f64,
        elapsed_seconds: f64,
        speed_kmh: Option<f64>,
    ) -> TravelViolation {
        TravelViolation {
            kind,
            later: later.clone(),
            earlier: earlier.clone(),
            distance_km,
            elapsed_seconds,
            speed_kmh,
            max_allowed_speed_kmh: self.config.max_allowed_speed_kmh,
        }
    }
}

impl Validator for TravelValidator {
    fn is_valid(&self, events: &[LoginEvent]) -> bool {
        self.find_violation(events).is_none()
    }
}

/// Fractional seconds at microsecond resolution
fn seconds(delta: Duration) -> f64 {
    match delta.num_microseconds() {
        Some(micros) => micros as f64 / 1_000_000.0,
        None => delta.num_seconds() as f64,
    }
}
