//! Request handler module
//!
//! Responsible for request routing dispatch; resource logic lives in the
//! per-resource modules.

pub mod router;

// Re-export main entry point
pub use router::handle_request;
