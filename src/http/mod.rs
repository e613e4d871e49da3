//! HTTP surface of the orchestrator
//!
//! - POST /offer - negotiate a media connection for a session
//! - GET /ws/:session_id - duplex client channel (transcript relay)
//! - POST /answers - dispatch an answer for background evaluation
//! - GET / - service info
//! - GET /health - health check

mod handlers;
mod routes;
mod state;
mod ws;

pub use handlers::{AnswerResponse, AnswerSubmission, ErrorResponse, OfferRequest};
pub use routes::create_router;
pub use state::AppState;
