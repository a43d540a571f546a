//! Routing module
//!
//! Path pattern matching with `:name` parameter capture, used by the API
//! route table.

mod matcher;

pub use matcher::{match_pattern, PathParams};
