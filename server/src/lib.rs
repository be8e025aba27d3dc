pub mod routes;
pub mod state;
pub mod telemetry;

pub use routes::{router, ApiError};
pub use state::AppState;
