//! HTTP hosting subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware wiring)
//!     → filter::anti_xss (path/query/body inspection)
//!     → forward handler (rewrite authority, send upstream)
//!     → response relayed to client
//! ```

pub mod server;

pub use server::GuardServer;
