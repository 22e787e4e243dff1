//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: method validation, route
//! matching, the route's guard, then the resource or health handler.

use crate::auth::Identity;
use crate::bikes;
use crate::config::AppState;
use crate::http;
use crate::logger::{self, AccessLogEntry};
use crate::routing::{self, Endpoint, Guard};
use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::header::{SERVER, USER_AGENT};
use hyper::{Method, Request, Response, StatusCode};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Instant;

/// Request context encapsulating information needed for request processing
pub struct RequestContext<'a> {
    pub path: &'a str,
    pub is_head: bool,
    pub headers: &'a hyper::HeaderMap,
}

/// Main entry point for HTTP request handling
///
/// No route reads a request body, so any body type is accepted.
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    remote_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let (parts, _) = req.into_parts();
    let method = &parts.method;
    let path = parts.uri.path();

    // 1. Check HTTP method
    let (mut response, identity) = match check_http_method(method, state.config.http.enable_cors)
    {
        Some(resp) => (resp, None),
        None => {
            let ctx = RequestContext {
                path,
                is_head: *method == Method::HEAD,
                headers: &parts.headers,
            };
            route_request(&ctx, &state).await
        }
    };

    if let Ok(value) = state.config.http.server_name.parse() {
        response.headers_mut().insert(SERVER, value);
    }

    // 2. Access log (lock-free check)
    if state.cached_access_log.load(Ordering::Relaxed) {
        let mut entry =
            AccessLogEntry::new(remote_addr.ip().to_string(), method.to_string(), path.to_string());
        entry.remote_user = identity.map(|id| id.subject);
        entry.query = parts.uri.query().map(ToString::to_string);
        entry.http_version = format!("{:?}", parts.version)
            .trim_start_matches("HTTP/")
            .to_string();
        entry.status = response.status().as_u16();
        entry.body_bytes = usize::try_from(response.body().size_hint().exact().unwrap_or(0))
            .unwrap_or(usize::MAX);
        entry.user_agent = parts
            .headers
            .get(USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string);
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Check HTTP method and return appropriate response for non-GET/HEAD methods
fn check_http_method(method: &Method, enable_cors: bool) -> Option<Response<Full<Bytes>>> {
    match method {
        &Method::GET | &Method::HEAD => None,
        &Method::OPTIONS => Some(http::build_options_response(enable_cors)),
        _ => {
            logger::log_warning(&format!("Method not allowed: {method}"));
            Some(http::build_405_response())
        }
    }
}

/// Route request based on path; returns the caller identity when a guard established one
async fn route_request(
    ctx: &RequestContext<'_>,
    state: &Arc<AppState>,
) -> (Response<Full<Bytes>>, Option<Identity>) {
    // 1. Route table
    let Some((route, params)) = routing::match_route(ctx.path, &state.routes) else {
        return (http::build_404_response(&routing::advertised_paths(&state.routes)), None);
    };

    // 2. Guard
    let identity = match route.guard {
        Guard::Public => None,
        Guard::Authenticated => match state.tokens.authenticate(ctx.headers) {
            Ok(identity) => {
                logger::log_authenticated(&identity);
                Some(identity)
            }
            Err(e) => {
                logger::log_warning(&format!("Rejected {}: {e}", ctx.path));
                return (http::build_401_response(e.code(), &e.to_string()), None);
            }
        },
    };

    // 3. Dispatch
    let response = match route.endpoint {
        Endpoint::Liveness => http::build_health_response(StatusCode::OK, "ok"),
        Endpoint::Readiness => check_readiness(state).await,
        Endpoint::ListBikes => bikes::list(state, ctx.is_head).await,
        Endpoint::Inventory => bikes::inventory(state, ctx.is_head).await,
        Endpoint::GetBike => {
            let id = params.get("id").unwrap_or_default();
            bikes::get_by_id(state, id, ctx.is_head).await
        }
    };
    (response, identity)
}

/// Readiness: the store must accept a session
async fn check_readiness(state: &AppState) -> Response<Full<Bytes>> {
    match state.store.run(|session| session.ping()).await {
        Ok(()) => http::build_health_response(StatusCode::OK, "ok"),
        Err(e) => {
            logger::log_warning(&format!("Readiness check failed: {e}"));
            http::build_health_response(StatusCode::SERVICE_UNAVAILABLE, "unavailable")
        }
    }
}
