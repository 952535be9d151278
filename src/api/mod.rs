pub mod error;
pub mod handlers;
pub mod query_extractor;
pub mod request_log;
pub mod routes;

pub use error::{ApiError, ErrorResponse};
pub use handlers::*;
pub use routes::*;
