//! Request filtering subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → anti_xss.rs (scan path, decoded query, buffered body)
//!         match → fixed 400 response, downstream never invoked
//!         clean → request rebuilt with its full body, passed downstream
//!     → headers.rs (extra response headers on rejection)
//! ```
//!
//! # Design Decisions
//! - First match on any channel wins; channels are never combined
//! - Fail closed: a match on one channel rejects the whole request
//! - The downstream handler always sees the complete original body

pub mod anti_xss;
pub mod headers;

pub use anti_xss::{anti_xss_middleware, RequestChannel};
pub use headers::ResponseHeaderPolicy;
