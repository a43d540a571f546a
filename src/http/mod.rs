//! HTTP protocol layer module
//!
//! Response builders, caching helpers and MIME detection shared by the
//! static surface and the API.

pub mod cache;
pub mod mime;
pub mod response;

// Re-export commonly used types
pub use cache::CachePolicy;
pub use response::{
    build_404_response, build_405_response, build_413_response, build_health_response,
    build_options_response,
};
