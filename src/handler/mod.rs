//! Request handler module
//!
//! Routes each request to the health probes, the JSON API, uploaded files
//! or the landing page.

pub mod router;
pub mod static_files;

// Re-export main entry point
pub use router::handle_request;
