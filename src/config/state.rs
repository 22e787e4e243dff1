// Application state module
// Everything a request handler needs, passed explicitly through the service

use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tokio::sync::Notify;

use super::types::Config;
use crate::auth::TokenValidator;
use crate::routing::{self, Route};
use crate::store::Store;

/// Application state
pub struct AppState {
    pub config: Config,
    /// How to open a store session; sessions themselves are per request
    pub store: Store,
    pub tokens: TokenValidator,
    /// Matched in order for every GET/HEAD request
    pub routes: Vec<Route>,
    /// Notified once when the process should stop accepting connections
    pub shutdown: Arc<Notify>,

    // Cached config values for fast access without locks
    pub cached_access_log: Arc<AtomicBool>,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self {
            config: config.clone(),
            store: Store::new(&config.database),
            tokens: TokenValidator::new(&config.auth),
            routes: routing::build_routes(&config.health),
            shutdown: Arc::new(Notify::new()),
            cached_access_log: Arc::new(AtomicBool::new(config.logging.access_log)),
        }
    }
}
