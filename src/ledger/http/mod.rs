mod handlers;
pub mod reps;

pub use handlers::{routes, Endpoint, EndpointParseError};
