//! HTTP surface for Switchboard.
//!
//! Endpoints:
//! - `POST /upload_pdf/` - store and index a PDF (multipart field `file`)
//! - `POST /ask/` - answer a question (form fields `query`, `filename`)
//! - `GET /logs/` - routing audit records
//! - `GET /health` - liveness

pub mod error;
pub mod handlers;
pub mod routes;
pub mod server;
pub mod state;

pub use error::ApiError;
pub use routes::create_router;
pub use server::serve;
pub use state::AppState;
