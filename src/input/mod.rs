pub mod devices;
pub mod headers;

pub use devices::{assemble_login_events, load_device_history, InputError};
pub use headers::{bearer_token, GeoHeaderExtractor, HeaderError, RequestHeaders};
