//! Anti-XSS Request-Filtering Gateway Library

pub mod config;
pub mod detect;
pub mod filter;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use config::GuardConfig;
pub use http::GuardServer;
pub use lifecycle::Shutdown;
