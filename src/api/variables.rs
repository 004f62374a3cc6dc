//! Configuration-backed variable endpoints.

use axum::extract::State;

use super::{success, ApiResult};
use crate::AppState;

/// GET /api/variables/title - Application title for the front-end chrome.
///
/// The title is read from configuration once at startup; this handler serves
/// the process-lifetime cached value.
pub async fn get_app_title(State(state): State<AppState>) -> ApiResult<String> {
    success(state.config.app_title.clone())
}
