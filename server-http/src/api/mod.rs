pub mod requests;
pub mod responses;

pub use requests::CreatePasteRequest;
pub use responses::{ErrorResponse, HealthResponse, PasteResponse};
