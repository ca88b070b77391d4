//! Request handler module
//!
//! Resolves request paths against the served root and produces responses:
//! file content, directory listings and error pages.

pub mod listing;
pub mod pipeline;
pub mod resolver;
pub mod router;

// Re-export main entry point
pub use router::{handle_request, RequestContext};
