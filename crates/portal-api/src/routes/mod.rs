//! API routes

mod auth;
mod health;
pub mod metrics;
mod points;
mod types;
mod users;
mod validation;

use axum::{Router, middleware::from_fn_with_state};
use portal_auth::auth_middleware;
use std::sync::Arc;

use crate::state::{AppState, MetricsHandle};

/// Create the main router
///
/// `/register`, `/login` and the health checks are public; everything else
/// sits behind the bearer-token middleware.
pub fn create_router(state: AppState, metrics_handle: Option<Arc<MetricsHandle>>) -> Router {
    let protected = Router::new()
        .merge(users::routes())
        .merge(points::routes())
        .route_layer(from_fn_with_state(state.jwt.clone(), auth_middleware));

    let mut router = Router::new()
        .merge(health::routes())
        .merge(auth::routes())
        .merge(protected)
        .with_state(state);

    if let Some(handle) = metrics_handle {
        router = router.merge(metrics::routes(handle));
    }

    router
}
