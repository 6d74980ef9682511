//! Application state

use portal_auth::JwtManager;
use portal_db::{Database, UserStore};
use std::sync::Arc;

/// Prometheus render handle shared with the metrics route
pub type MetricsHandle = metrics_exporter_prometheus::PrometheusHandle;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub users: Arc<dyn UserStore>,
    pub jwt: Arc<JwtManager>,
}

impl AppState {
    pub fn new(db: Database, jwt: Arc<JwtManager>) -> Self {
        Self {
            users: Arc::new(db.clone()),
            db,
            jwt,
        }
    }
}
