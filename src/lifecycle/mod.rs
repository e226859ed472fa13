//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Validate → Build routing state → Bind listener
//!
//! Shutdown (shutdown.rs):
//!     Ctrl+C / SIGTERM → broadcast → stop accepting → drain → exit
//! ```

pub mod shutdown;

pub use shutdown::{wait_for_signal, Shutdown};
