//! Ingest API Library
//!
//! HTTP handlers, authentication, and the process lifecycle that ties the request
//! path (credential issuance, text generation) to the background verdict poller.

mod api_doc;
mod handlers;

pub mod auth;
pub mod constants;
pub mod error;
pub mod setup;
pub mod state;

pub use error::{ErrorResponse, HttpAppError};
pub use state::AppState;
