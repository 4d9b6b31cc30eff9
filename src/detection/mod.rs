pub mod geodesic;
pub mod travel_validator;

pub use geodesic::{great_circle_distance, GeoPoint};
pub use travel_validator::{
    TravelValidator, Validator, ValidatorConfig, ValidatorConfigBuilder, ValidatorOption,
};
