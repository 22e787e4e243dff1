//! HTTP protocol layer module
//!
//! Response builders shared by the router and the resource handlers.

pub mod response;

// Re-export commonly used builders
pub use response::{
    build_400_response, build_401_response, build_404_response, build_405_response,
    build_500_response, build_empty_response, build_health_response, build_json_response,
    build_options_response,
};
