//! Points listing

use axum::{Json, Router, extract::State, routing::get};
use portal_auth::AuthUser;
use tracing::debug;

use crate::error::ApiError;
use crate::state::AppState;

use super::types::PointResponse;

/// GET /points
async fn list_points(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<PointResponse>>, ApiError> {
    let points = state.db.list_points_with_users().await?;

    debug!("User {} listed {} points", user.id, points.len());

    Ok(Json(points.into_iter().map(PointResponse::from).collect()))
}

/// Create point routes (require authentication)
pub fn routes() -> Router<AppState> {
    Router::new().route("/points", get(list_points))
}
