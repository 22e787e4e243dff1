//! Route matching module
//!
//! Matches a request path against segment patterns such as `/api/bike/{id}`.
//! Literal segments compare ASCII case-insensitively; `{name}` captures one
//! segment. A single trailing slash is ignored.

use super::table::Route;

/// Values captured from `{name}` segments
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Params<'a>(Vec<(&'a str, String)>);

impl Params<'_> {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Find the first matching route for a given path
pub fn match_route<'a>(path: &str, routes: &'a [Route]) -> Option<(&'a Route, Params<'a>)> {
    routes
        .iter()
        .find_map(|route| match_path(&route.pattern, path).map(|params| (route, params)))
}

/// Check if a path matches a pattern, capturing parameters
pub fn match_path<'a>(pattern: &'a str, path: &str) -> Option<Params<'a>> {
    let mut pattern_segments = segments(pattern);
    let mut path_segments = segments(path);
    let mut params = Vec::new();

    loop {
        match (pattern_segments.next(), path_segments.next()) {
            (None, None) => return Some(Params(params)),
            (Some(expected), Some(actual)) => {
                if let Some(name) = capture_name(expected) {
                    if actual.is_empty() {
                        return None;
                    }
                    params.push((name, actual.to_string()));
                } else if !expected.eq_ignore_ascii_case(actual) {
                    return None;
                }
            }
            _ => return None,
        }
    }
}

fn segments(path: &str) -> std::str::Split<'_, char> {
    let trimmed = path.strip_prefix('/').unwrap_or(path);
    let trimmed = trimmed.strip_suffix('/').unwrap_or(trimmed);
    trimmed.split('/')
}

fn capture_name(segment: &str) -> Option<&str> {
    segment.strip_prefix('{')?.strip_suffix('}')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HealthConfig;
    use crate::routing::table::{build_routes, Endpoint};

    #[test]
    fn test_match_path_literal() {
        assert!(match_path("/api/bike", "/api/bike").is_some());
        assert!(match_path("/api/bike", "/API/Bike").is_some());
        assert!(match_path("/api/bike", "/api/bike/").is_some());
        assert!(match_path("/api/bike", "/api/bikes").is_none());
        assert!(match_path("/api/bike", "/api").is_none());
        assert!(match_path("/api/bike", "/api/bike/1").is_none());
    }

    #[test]
    fn test_match_path_capture() {
        let params = match_path("/api/bike/{id}", "/api/bike/42").unwrap();
        assert_eq!(params.get("id"), Some("42"));
        assert_eq!(params.get("other"), None);

        // Captured verbatim; parsing is the handler's concern
        let params = match_path("/api/bike/{id}", "/api/bike/abc").unwrap();
        assert_eq!(params.get("id"), Some("abc"));

        assert!(match_path("/api/bike/{id}", "/api/bike//").is_none());
        assert!(match_path("/api/bike/{id}", "/api/bike/1/2").is_none());
    }

    #[test]
    fn test_literal_route_wins_over_capture() {
        let routes = build_routes(&HealthConfig::default());
        let (route, params) = match_route("/api/bike/inventory", &routes).unwrap();
        assert_eq!(route.endpoint, Endpoint::Inventory);
        assert_eq!(params, Params::default());

        let (route, params) = match_route("/api/bike/7", &routes).unwrap();
        assert_eq!(route.endpoint, Endpoint::GetBike);
        assert_eq!(params.get("id"), Some("7"));

        let (route, _) = match_route("/api/bike", &routes).unwrap();
        assert_eq!(route.endpoint, Endpoint::ListBikes);

        assert!(match_route("/api/owner", &routes).is_none());
    }
}
