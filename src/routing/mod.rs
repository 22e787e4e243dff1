//! Routing module
//!
//! Provides the declarative route table and path matching:
//! - Literal and `{param}` segment patterns
//! - A guard attached to every route

mod matcher;
mod table;

pub use matcher::match_route;
pub use table::{advertised_paths, build_routes, Endpoint, Guard, Route};
