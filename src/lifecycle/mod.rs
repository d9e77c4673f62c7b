//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     Load config → Validate → Initialize observability → Bind → Serve
//!
//! Shutdown (shutdown.rs):
//!     Ctrl-C or coordinator trigger → Stop accepting → Drain → Exit
//! ```

pub mod shutdown;

pub use shutdown::Shutdown;
