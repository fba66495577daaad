//! JSON-over-HTTP front for the read-only endpoints and the request log.

mod error;
mod handlers;
mod types;

pub use error::ApiError;
pub use handlers::create_router;
pub use types::AppState;
