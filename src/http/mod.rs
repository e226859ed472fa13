//! HTTP front door.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID)
//!     → routing::Classifier (backend + canonical path)
//!     → server.rs (forward once to the backend's upstream)
//!     → response.rs (gateway error responses)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{request_id, X_REQUEST_ID};
pub use response::error_response;
pub use server::{HttpServer, RoutingState};
