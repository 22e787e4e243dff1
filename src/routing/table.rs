//! API route table
//!
//! Routes are matched in order, so literal paths must precede patterns
//! that would also capture them.

use crate::config::HealthConfig;

/// Capability check applied before the handler runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guard {
    Public,
    /// Requires a valid bearer token
    Authenticated,
}

/// Handler a route dispatches to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    ListBikes,
    GetBike,
    Inventory,
    Liveness,
    Readiness,
}

#[derive(Debug)]
pub struct Route {
    pub pattern: String,
    pub guard: Guard,
    pub endpoint: Endpoint,
}

impl Route {
    fn new(pattern: &str, guard: Guard, endpoint: Endpoint) -> Self {
        Self {
            pattern: pattern.to_string(),
            guard,
            endpoint,
        }
    }
}

/// All routes served for GET and HEAD: the bike API, then the health
/// probes when enabled
pub fn build_routes(health: &HealthConfig) -> Vec<Route> {
    let mut routes = vec![
        Route::new("/api/bike", Guard::Authenticated, Endpoint::ListBikes),
        Route::new("/api/bike/inventory", Guard::Authenticated, Endpoint::Inventory),
        Route::new("/api/bike/{id}", Guard::Authenticated, Endpoint::GetBike),
    ];

    if health.enabled {
        routes.push(Route::new(&health.liveness_path, Guard::Public, Endpoint::Liveness));
        routes.push(Route::new(&health.readiness_path, Guard::Public, Endpoint::Readiness));
    }

    routes
}

/// Paths advertised in 404 responses
pub fn advertised_paths(routes: &[Route]) -> Vec<&str> {
    routes.iter().map(|route| route.pattern.as_str()).collect()
}
