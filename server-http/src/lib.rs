pub mod api;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::{build_app, build_router};
pub use state::AppState;
