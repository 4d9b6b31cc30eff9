pub mod event;
pub mod report;

pub use event::{Coordinates, DeviceHistory, DeviceRecord, LoginEvent};
pub use report::{TravelReport, TravelViolation, ViolationKind};
